//! Filesystem layer for file-sentry
//!
//! Provides deterministic source-to-mirror path mapping, content
//! checksums, and safe I/O operations.

pub mod checksum;
pub mod error;
pub mod io;
pub mod path;

pub use error::{Error, Result};
pub use path::{destination_dir, destination_file, sanitize_segment};
