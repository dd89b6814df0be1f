use crate::utils::{ensure_directory, list_export_roots, move_tree, MoveResult};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Configuration for a merge run
#[derive(Debug, Clone)]
pub struct MergeConfig {
    /// Name prefix identifying export folders under the input root
    pub export_prefix: String,
    /// Subfolders of each export folder whose contents are merged
    pub subfolders: Vec<String>,
    /// Mirror each subfolder under an identically named directory in the
    /// output tree instead of directly into the output root
    pub namespace_subfolders: bool,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            export_prefix: "Takeout ".to_string(),
            subfolders: vec!["Drive".to_string(), "Google Photos".to_string()],
            namespace_subfolders: true,
        }
    }
}

/// Top-level failures that abort a merge run. Per-entry failures never
/// surface here; they are aggregated into the report instead.
#[derive(Error, Debug)]
pub enum MergeError {
    #[error("input directory does not exist: {0}")]
    InputRootMissing(PathBuf),

    #[error("failed to scan input directory: {0}")]
    ScanInputRoot(anyhow::Error),

    #[error("failed to create output directory: {0}")]
    CreateOutputRoot(anyhow::Error),
}

/// Main merge operation: consolidate every matching export folder under
/// the input root into a single tree under the output root.
///
/// Files already present at their destination are skipped, never
/// overwritten. Sources are moved, not copied.
pub fn merge_exports(
    input_root: &Path,
    output_root: &Path,
    config: &MergeConfig,
) -> Result<MergeReport, MergeError> {
    if !input_root.is_dir() {
        return Err(MergeError::InputRootMissing(input_root.to_path_buf()));
    }

    info!("Creating output directory: {}", output_root.display());
    ensure_directory(output_root).map_err(MergeError::CreateOutputRoot)?;

    info!("Scanning for export folders in: {}", input_root.display());
    let export_roots = list_export_roots(input_root, &config.export_prefix)
        .map_err(MergeError::ScanInputRoot)?;

    if export_roots.is_empty() {
        info!("No export folders found. Nothing to merge.");
        return Ok(MergeReport::empty());
    }

    info!("Found {} export folders", export_roots.len());

    let mut report = MergeReport::empty();

    for export_root in &export_roots {
        info!("Processing export folder: {}", export_root.display());

        let mut found_subfolder = false;
        for subfolder in &config.subfolders {
            let subfolder_path = export_root.join(subfolder);
            if !subfolder_path.is_dir() {
                debug!(
                    "No '{}' subdirectory in: {}",
                    subfolder,
                    export_root.display()
                );
                continue;
            }
            found_subfolder = true;

            let dest_base = if config.namespace_subfolders {
                output_root.join(subfolder)
            } else {
                output_root.to_path_buf()
            };

            info!(
                "Merging '{}' from: {}",
                subfolder,
                export_root.display()
            );
            if let Err(e) = ensure_directory(&dest_base) {
                error!("Failed to prepare {}: {}", dest_base.display(), e);
                report.errors.push(MoveErrorInfo {
                    source: subfolder_path.to_string_lossy().to_string(),
                    destination: dest_base.to_string_lossy().to_string(),
                    error: e.to_string(),
                });
                continue;
            }

            let results = move_tree(&subfolder_path, &dest_base);
            apply_results(&mut report, results);
        }

        if found_subfolder {
            report.roots_processed += 1;
        } else {
            warn!(
                "Skipping export folder (no configured subdirectories): {}",
                export_root.display()
            );
            report.roots_skipped += 1;
        }
    }

    info!(
        "Merge completed. Moved: {}, Skipped: {}, Errors: {}",
        report.moved_files,
        report.skipped_files,
        report.errors.len()
    );

    Ok(report)
}

/// Fold per-entry results into the run report, logging each outcome
fn apply_results(report: &mut MergeReport, results: Vec<MoveResult>) {
    for result in results {
        match result {
            MoveResult::Moved {
                source,
                destination,
            } => {
                report.moved_files += 1;
                debug!("Moved {} -> {}", source.display(), destination.display());
            }
            MoveResult::SkippedExisting {
                source,
                destination,
            } => {
                report.skipped_files += 1;
                info!(
                    "Skipping existing file: {} (source left at {})",
                    destination.display(),
                    source.display()
                );
            }
            MoveResult::DirCreated { destination } => {
                report.directories_created += 1;
                debug!("Created directory: {}", destination.display());
            }
            MoveResult::Error {
                source,
                destination,
                error,
            } => {
                error!(
                    "Failed to process {} -> {}: {}",
                    source.display(),
                    destination.display(),
                    error
                );
                report.errors.push(MoveErrorInfo {
                    source: source.to_string_lossy().to_string(),
                    destination: destination.to_string_lossy().to_string(),
                    error,
                });
            }
        }
    }
}

/// Report structure for a merge run
#[derive(Debug, Clone)]
pub struct MergeReport {
    pub roots_processed: usize,
    pub roots_skipped: usize,
    pub moved_files: usize,
    pub skipped_files: usize,
    pub directories_created: usize,
    pub errors: Vec<MoveErrorInfo>,
}

impl MergeReport {
    pub fn empty() -> Self {
        Self {
            roots_processed: 0,
            roots_skipped: 0,
            moved_files: 0,
            skipped_files: 0,
            directories_created: 0,
            errors: Vec::new(),
        }
    }

    pub fn total_processed(&self) -> usize {
        self.moved_files + self.skipped_files + self.errors.len()
    }

    pub fn success_rate(&self) -> f64 {
        let total = self.total_processed();
        if total == 0 {
            0.0
        } else {
            self.moved_files as f64 / total as f64
        }
    }
}

#[derive(Debug, Clone)]
pub struct MoveErrorInfo {
    pub source: String,
    pub destination: String,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_matches_takeout_layout() {
        let config = MergeConfig::default();
        assert_eq!(config.export_prefix, "Takeout ");
        assert_eq!(config.subfolders, ["Drive", "Google Photos"]);
        assert!(config.namespace_subfolders);
    }

    #[test]
    fn test_apply_results_aggregates_outcomes() {
        let mut report = MergeReport::empty();
        let results = vec![
            MoveResult::Moved {
                source: PathBuf::from("/in/a"),
                destination: PathBuf::from("/out/a"),
            },
            MoveResult::SkippedExisting {
                source: PathBuf::from("/in/b"),
                destination: PathBuf::from("/out/b"),
            },
            MoveResult::DirCreated {
                destination: PathBuf::from("/out/d"),
            },
            MoveResult::Error {
                source: PathBuf::from("/in/c"),
                destination: PathBuf::from("/out/c"),
                error: "permission denied".to_string(),
            },
        ];

        apply_results(&mut report, results);

        assert_eq!(report.moved_files, 1);
        assert_eq!(report.skipped_files, 1);
        assert_eq!(report.directories_created, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].error, "permission denied");
        assert_eq!(report.total_processed(), 3);
    }

    #[test]
    fn test_success_rate_on_empty_report_is_zero() {
        let report = MergeReport::empty();
        assert_eq!(report.success_rate(), 0.0);
    }
}
