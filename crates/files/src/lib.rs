//! EMR Download Store
//!
//! Patient attachments and general files are served from object storage through short-lived
//! presigned URLs. Once the bytes are fetched, this crate writes them to a local download
//! directory and returns a [`DownloadReceipt`] describing what was stored.
//!
//! ## Design Principles
//!
//! - Filenames come from the backend and are untrusted: path components are stripped
//! - Existing files are never overwritten; a numbered sibling is chosen instead
//! - Re-downloading identical content reuses the existing file
//! - Every receipt carries the SHA-256 digest and a best-effort media type
//!
//! ## Example Usage
//!
//! ```no_run
//! use emr_files::DownloadStore;
//! use std::path::Path;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = DownloadStore::new(Path::new("downloads"))?;
//! let receipt = store.save(b"%PDF-1.7 ...", "ket-qua-xet-nghiem.pdf")?;
//! println!("saved {} ({})", receipt.path.display(), receipt.sha256);
//! # Ok(())
//! # }
//! ```

mod store;

pub use store::{sanitise_filename, DownloadReceipt, DownloadStore};

/// Errors that can occur while storing downloads
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// Download directory exists but is not a directory
    #[error("Invalid download directory: {0}")]
    InvalidDirectory(String),

    /// Filename is empty once unsafe components are removed
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
