//! File system storage management
//!
//! Path resolution, directory listing and file operations on volumes.

pub mod filetype;
pub mod listing;
pub mod operations;
pub mod results;
pub mod validation;

// Re-export commonly used items
pub use listing::list_directory;
pub use results::{DeleteResult, Disposition, Entry, EntryKind, FileStream, UploadResult};
pub use validation::{ResolvedPath, resolve, sanitize_filename};
