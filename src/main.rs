use anyhow::Result;
use clap::{Arg, Command};
use std::path::PathBuf;
use takeout_merge::{merge_exports, AppConfig, MergeConfig, MergeReport};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Parse command line arguments
    let matches = Command::new("takeout-merge")
        .version("0.1")
        .about("Merge Google Takeout folders into a single directory")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("DIR")
                .help("Path to the input directory containing Takeout folders")
                .required(true),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Path to the output directory where files will be merged")
                .required(true),
        )
        .get_matches();

    let config = create_app_config(&matches);

    // Initialize logging
    initialize_logging();

    // Run the application
    run_application(config)
}

/// Pure function to create application configuration from CLI arguments
fn create_app_config(matches: &clap::ArgMatches) -> AppConfig {
    let input = PathBuf::from(matches.get_one::<String>("input").unwrap());
    let output = PathBuf::from(matches.get_one::<String>("output").unwrap());

    AppConfig {
        input,
        output,
        merge: MergeConfig::default(),
    }
}

/// Initialize structured logging with tracing
fn initialize_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

/// Main application logic
fn run_application(config: AppConfig) -> Result<()> {
    info!(
        "Starting merge with input: {} and output: {}",
        config.input.display(),
        config.output.display()
    );

    let report = merge_exports(&config.input, &config.output, &config.merge)?;
    print_merge_report(&report);

    info!("Merge completed successfully.");
    Ok(())
}

/// Print the merge report
fn print_merge_report(report: &MergeReport) {
    info!("=== MERGE REPORT ===");
    info!("Export folders processed: {}", report.roots_processed);
    info!("Export folders skipped: {}", report.roots_skipped);
    info!("Files moved: {}", report.moved_files);
    info!("Files skipped (already present): {}", report.skipped_files);
    info!("Directories created: {}", report.directories_created);
    info!("Errors: {}", report.errors.len());
    info!("Success rate: {:.2}%", report.success_rate() * 100.0);

    if !report.errors.is_empty() {
        error!("Errors encountered:");
        for err in &report.errors {
            error!("  {} -> {}: {}", err.source, err.destination, err.error);
        }
    }
}
