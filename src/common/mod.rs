//! Common module
//!
//! Shared error types, logging, filesystem and resource helpers used
//! throughout the crate.

pub mod error;
pub mod fs;
pub mod log;
pub mod resource;

// Re-export commonly used types and functions
pub use error::{TlsError, Result};
pub use fs::{check_file_exists, read_all, read_file};
pub use log::init_logger;
pub use resource::{add_resource_root, read_resource, resolve_resource};
