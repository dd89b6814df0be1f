pub mod merge;

pub use merge::{merge_exports, MergeConfig, MergeError, MergeReport, MoveErrorInfo};
