use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// List export root directories under a base directory
/// Returns only children that are directories whose name starts with the
/// given prefix, sorted lexicographically by path
pub fn list_export_roots<P: AsRef<Path>>(base: P, prefix: &str) -> Result<Vec<PathBuf>> {
    let base_path = base.as_ref();

    let entries = fs::read_dir(base_path)
        .with_context(|| format!("Failed to read directory: {:?}", base_path))?;

    let mut roots: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .filter(|path| name_has_prefix(path, prefix))
        .collect();

    roots.sort();
    Ok(roots)
}

/// Check if the final path component starts with the given prefix
/// Pure function
fn name_has_prefix(path: &Path, prefix: &str) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(|name| name.starts_with(prefix))
        .unwrap_or(false)
}

/// Create a directory and all of its parents; idempotent
pub fn ensure_directory<P: AsRef<Path>>(path: P) -> Result<()> {
    let dir_path = path.as_ref();
    fs::create_dir_all(dir_path)
        .with_context(|| format!("Failed to create directory: {:?}", dir_path))
}

/// Move a file from source to destination
/// Returns Ok(false) when the destination is already occupied; the source
/// file is left in place.
///
/// Rename is attempted first. When source and destination sit on different
/// volumes the rename fails and the move degrades to copy+delete, which is
/// not atomic.
pub fn move_file_safe<P: AsRef<Path>, Q: AsRef<Path>>(source: P, destination: Q) -> Result<bool> {
    let src_path = source.as_ref();
    let dest_path = destination.as_ref();

    if !src_path.exists() {
        anyhow::bail!("Source file does not exist: {:?}", src_path);
    }

    if dest_path.exists() {
        return Ok(false); // File already exists, skip
    }

    // Lazy parent creation, on demand
    if let Some(parent) = dest_path.parent() {
        ensure_directory(parent)?;
    }

    if fs::rename(src_path, dest_path).is_err() {
        fs::copy(src_path, dest_path).with_context(|| {
            format!("Failed to copy file from {:?} to {:?}", src_path, dest_path)
        })?;
        fs::remove_file(src_path)
            .with_context(|| format!("Failed to remove source file after copy: {:?}", src_path))?;
    }

    Ok(true)
}

/// Move every entry of a source subtree into the mirrored position under a
/// destination root, depth-first. Per-entry failures are caught into
/// `MoveResult::Error` so the walk continues with the next entry.
pub fn move_tree<P: AsRef<Path>, Q: AsRef<Path>>(source_dir: P, dest_dir: Q) -> Vec<MoveResult> {
    let src_root = source_dir.as_ref();
    let dest_root = dest_dir.as_ref();

    WalkDir::new(src_root)
        .min_depth(1)
        .into_iter()
        .map(|entry| match entry {
            Ok(entry) => move_entry(entry.path(), entry.file_type().is_dir(), src_root, dest_root),
            Err(e) => {
                let source = e
                    .path()
                    .map(Path::to_path_buf)
                    .unwrap_or_else(|| src_root.to_path_buf());
                MoveResult::Error {
                    source,
                    destination: dest_root.to_path_buf(),
                    error: e.to_string(),
                }
            }
        })
        .collect()
}

/// Mirror a single walked entry into the destination tree
fn move_entry(item: &Path, is_dir: bool, src_root: &Path, dest_root: &Path) -> MoveResult {
    let dest_path = match item.strip_prefix(src_root) {
        Ok(relative) => dest_root.join(relative),
        Err(e) => {
            return MoveResult::Error {
                source: item.to_path_buf(),
                destination: dest_root.to_path_buf(),
                error: e.to_string(),
            }
        }
    };

    if is_dir {
        match ensure_directory(&dest_path) {
            Ok(()) => MoveResult::DirCreated {
                destination: dest_path,
            },
            Err(e) => MoveResult::Error {
                source: item.to_path_buf(),
                destination: dest_path,
                error: e.to_string(),
            },
        }
    } else {
        match move_file_safe(item, &dest_path) {
            Ok(true) => MoveResult::Moved {
                source: item.to_path_buf(),
                destination: dest_path,
            },
            Ok(false) => MoveResult::SkippedExisting {
                source: item.to_path_buf(),
                destination: dest_path,
            },
            Err(e) => MoveResult::Error {
                source: item.to_path_buf(),
                destination: dest_path,
                error: e.to_string(),
            },
        }
    }
}

/// Result of mirroring one entry of a source subtree
#[derive(Debug, Clone)]
pub enum MoveResult {
    Moved {
        source: PathBuf,
        destination: PathBuf,
    },
    SkippedExisting {
        source: PathBuf,
        destination: PathBuf,
    },
    DirCreated {
        destination: PathBuf,
    },
    Error {
        source: PathBuf,
        destination: PathBuf,
        error: String,
    },
}

impl MoveResult {
    pub fn is_moved(&self) -> bool {
        matches!(self, MoveResult::Moved { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, MoveResult::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_name_has_prefix() {
        assert!(name_has_prefix(Path::new("/tmp/Takeout 1"), "Takeout "));
        assert!(!name_has_prefix(Path::new("/tmp/Other"), "Takeout "));
        assert!(!name_has_prefix(Path::new("/"), "Takeout "));
    }

    #[test]
    fn test_list_export_roots_filters_and_sorts() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("Takeout 2")).unwrap();
        fs::create_dir(dir.path().join("Takeout 1")).unwrap();
        fs::create_dir(dir.path().join("Other")).unwrap();
        fs::write(dir.path().join("Takeout 3"), b"a plain file").unwrap();

        let roots = list_export_roots(dir.path(), "Takeout ").unwrap();
        let names: Vec<_> = roots
            .iter()
            .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["Takeout 1", "Takeout 2"]);
    }

    #[test]
    fn test_move_file_safe_moves_new_file() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("out").join("a.txt");
        fs::write(&src, b"payload").unwrap();

        assert!(move_file_safe(&src, &dest).unwrap());
        assert!(!src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"payload");
    }

    #[test]
    fn test_move_file_safe_skips_existing_destination() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("a.txt");
        let dest = dir.path().join("b.txt");
        fs::write(&src, b"new").unwrap();
        fs::write(&dest, b"old").unwrap();

        assert!(!move_file_safe(&src, &dest).unwrap());
        assert!(src.exists());
        assert_eq!(fs::read(&dest).unwrap(), b"old");
    }

    #[test]
    fn test_move_file_safe_missing_source_is_error() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("absent.txt");
        let dest = dir.path().join("b.txt");

        assert!(move_file_safe(&src, &dest).is_err());
    }

    #[test]
    fn test_move_tree_mirrors_empty_directories() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(src.join("photos").join("2023")).unwrap();

        let results = move_tree(&src, &dest);
        assert!(results.iter().all(|r| !r.is_error()));
        assert!(dest.join("photos").join("2023").is_dir());
    }

    #[test]
    fn test_move_tree_moves_nested_files_and_skips_collisions() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dest = dir.path().join("dest");
        fs::create_dir_all(src.join("docs")).unwrap();
        fs::write(src.join("docs").join("a.txt"), b"fresh").unwrap();
        fs::create_dir_all(dest.join("docs")).unwrap();
        fs::write(dest.join("docs").join("a.txt"), b"already here").unwrap();
        fs::write(src.join("b.txt"), b"unique").unwrap();

        let results = move_tree(&src, &dest);

        let moved = results.iter().filter(|r| r.is_moved()).count();
        let skipped = results
            .iter()
            .filter(|r| matches!(r, MoveResult::SkippedExisting { .. }))
            .count();
        assert_eq!(moved, 1);
        assert_eq!(skipped, 1);
        assert_eq!(
            fs::read(dest.join("docs").join("a.txt")).unwrap(),
            b"already here"
        );
        assert_eq!(fs::read(dest.join("b.txt")).unwrap(), b"unique");
        assert!(src.join("docs").join("a.txt").exists());
        assert!(!src.join("b.txt").exists());
    }
}
