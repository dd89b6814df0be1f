pub mod services;
pub mod utils;

// Re-export commonly used types
pub use services::{merge_exports, MergeConfig, MergeError, MergeReport, MoveErrorInfo};
pub use utils::{ensure_directory, list_export_roots, move_file_safe, move_tree, MoveResult};

use std::path::PathBuf;

// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub merge: MergeConfig,
}
