pub mod file_operations;

pub use file_operations::{
    ensure_directory, list_export_roots, move_file_safe, move_tree, MoveResult,
};
