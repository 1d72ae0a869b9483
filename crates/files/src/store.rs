//! Download directory implementation
//!
//! # Layout
//!
//! ```text
//! <download_dir>/
//! ├── ket-qua-xet-nghiem.pdf
//! ├── ket-qua-xet-nghiem (1).pdf   # different content, same name
//! └── phac-do.docx
//! ```

use crate::FilesError;
use chrono::{DateTime, Utc};
use emr_types::NonEmptyText;
use sha2::{Digest, Sha256};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Upper bound on numbered siblings tried for one filename.
const MAX_NAME_ATTEMPTS: u32 = 1_000;

/// What was written for one download.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct DownloadReceipt {
    /// Where the bytes now live
    pub path: PathBuf,

    /// Hexadecimal SHA-256 digest of the content
    pub sha256: String,

    /// Size of the file in bytes
    pub size_bytes: u64,

    /// Detected media type (MIME type), if available
    ///
    /// This is a best-effort detection from the file's magic bytes.
    pub media_type: Option<NonEmptyText>,

    /// Filename as given by the backend
    pub original_filename: NonEmptyText,

    /// Whether an identical file already existed and was reused
    pub reused_existing: bool,

    /// UTC timestamp when the file was stored
    pub saved_at: DateTime<Utc>,
}

/// Writes downloaded files into a single directory.
#[derive(Debug, Clone)]
pub struct DownloadStore {
    directory: PathBuf,
}

impl DownloadStore {
    /// Creates a store rooted at `directory`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the path exists but is not a directory, or if it cannot be
    /// created.
    pub fn new(directory: &Path) -> Result<Self, FilesError> {
        if directory.exists() && !directory.is_dir() {
            return Err(FilesError::InvalidDirectory(format!(
                "Path is not a directory: {}",
                directory.display()
            )));
        }

        fs::create_dir_all(directory).map_err(|e| {
            FilesError::Io(std::io::Error::new(
                e.kind(),
                format!(
                    "Failed to create download directory {}: {}",
                    directory.display(),
                    e
                ),
            ))
        })?;

        Ok(Self {
            directory: directory.to_path_buf(),
        })
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Stores `bytes` under a sanitised form of `filename`.
    ///
    /// If a file with that name already holds the same content it is reused. Otherwise the
    /// first free `name (n).ext` sibling is used.
    ///
    /// # Errors
    ///
    /// Returns `FilesError` if the filename is unusable or the write fails.
    pub fn save(&self, bytes: &[u8], filename: &str) -> Result<DownloadReceipt, FilesError> {
        let original_filename = NonEmptyText::new(filename)
            .map_err(|_| FilesError::InvalidFilename(filename.to_string()))?;
        let safe_name = sanitise_filename(filename)
            .ok_or_else(|| FilesError::InvalidFilename(filename.to_string()))?;

        let sha256 = hex::encode(Sha256::digest(bytes));
        let media_type = infer::get(bytes).and_then(|kind| NonEmptyText::new(kind.mime_type()).ok());

        let (stem, extension) = split_extension(&safe_name);
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let candidate_name = if attempt == 0 {
                safe_name.clone()
            } else {
                format!("{stem} ({attempt}){extension}")
            };
            let candidate = self.directory.join(&candidate_name);

            if candidate.exists() {
                if file_digest(&candidate)? == sha256 {
                    tracing::debug!("reusing identical download {}", candidate.display());
                    return Ok(DownloadReceipt {
                        path: candidate,
                        sha256,
                        size_bytes: bytes.len() as u64,
                        media_type,
                        original_filename,
                        reused_existing: true,
                        saved_at: Utc::now(),
                    });
                }
                continue;
            }

            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&candidate)
            {
                Ok(mut file) => {
                    write_or_remove(&candidate, || {
                        file.write_all(bytes)?;
                        file.sync_all()
                    })?;
                    tracing::info!("saved download {}", candidate.display());
                    return Ok(DownloadReceipt {
                        path: candidate,
                        sha256,
                        size_bytes: bytes.len() as u64,
                        media_type,
                        original_filename,
                        reused_existing: false,
                        saved_at: Utc::now(),
                    });
                }
                // Lost a race with another writer; try the next name.
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(e) => {
                    return Err(FilesError::Io(std::io::Error::new(
                        e.kind(),
                        format!("Failed to write {}: {}", candidate.display(), e),
                    )))
                }
            }
        }

        Err(FilesError::InvalidFilename(format!(
            "no free name for {safe_name} after {MAX_NAME_ATTEMPTS} attempts"
        )))
    }
}

/// Runs `write` against the file just created at `path`, deleting it again if the write fails so
/// a truncated copy never takes the name.
fn write_or_remove(
    path: &Path,
    write: impl FnOnce() -> std::io::Result<()>,
) -> std::io::Result<()> {
    let Err(e) = write() else {
        return Ok(());
    };
    match fs::remove_file(path) {
        Ok(()) => tracing::warn!("discarded incomplete download {}", path.display()),
        Err(remove) if remove.kind() != std::io::ErrorKind::NotFound => {
            tracing::warn!("could not remove incomplete download {}: {}", path.display(), remove)
        }
        Err(_) => {}
    }
    Err(e)
}

/// Reduces a backend-supplied filename to a single safe path component.
///
/// Directory parts (either separator) are dropped, control characters removed, and names that
/// end up empty, `.` or `..` are rejected.
pub fn sanitise_filename(filename: &str) -> Option<String> {
    let last = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !c.is_control())
        .map(|c| if matches!(c, ':' | '*' | '?' | '"' | '<' | '>' | '|') { '_' } else { c })
        .collect();
    let cleaned = cleaned.trim().to_string();

    if cleaned.is_empty() || cleaned == "." || cleaned == ".." {
        return None;
    }
    Some(cleaned)
}

fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    }
}

fn file_digest(path: &Path) -> Result<String, FilesError> {
    let existing = fs::read(path)?;
    Ok(hex::encode(Sha256::digest(&existing)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];

    #[test]
    fn test_save_writes_file_with_digest_and_media_type() {
        let dir = TempDir::new().expect("temp dir");
        let store = DownloadStore::new(dir.path()).expect("store");

        let receipt = store.save(PNG_HEADER, "xquang.png").expect("save");

        assert_eq!(receipt.path, dir.path().join("xquang.png"));
        assert_eq!(fs::read(&receipt.path).expect("read"), PNG_HEADER);
        assert_eq!(receipt.sha256, hex::encode(Sha256::digest(PNG_HEADER)));
        assert_eq!(receipt.size_bytes, PNG_HEADER.len() as u64);
        assert_eq!(
            receipt.media_type.as_ref().map(|m| m.as_str()),
            Some("image/png")
        );
        assert!(!receipt.reused_existing);
    }

    #[test]
    fn test_identical_content_is_reused() {
        let dir = TempDir::new().expect("temp dir");
        let store = DownloadStore::new(dir.path()).expect("store");

        let first = store.save(b"same", "a.txt").expect("save");
        let second = store.save(b"same", "a.txt").expect("save again");

        assert_eq!(first.path, second.path);
        assert!(second.reused_existing);
    }

    #[test]
    fn test_different_content_gets_numbered_sibling() {
        let dir = TempDir::new().expect("temp dir");
        let store = DownloadStore::new(dir.path()).expect("store");

        store.save(b"one", "report.pdf").expect("save");
        let second = store.save(b"two", "report.pdf").expect("save");
        let third = store.save(b"three", "report.pdf").expect("save");

        assert_eq!(second.path, dir.path().join("report (1).pdf"));
        assert_eq!(third.path, dir.path().join("report (2).pdf"));
        assert_eq!(fs::read(dir.path().join("report.pdf")).expect("read"), b"one");
    }

    #[test]
    fn test_failed_write_leaves_no_partial_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("ket-qua.pdf");
        fs::write(&path, b"%PDF-1.7 nua chung").expect("seed file");

        let err = write_or_remove(&path, || Err(std::io::Error::other("disk full"))).expect_err("write failed");
        assert_eq!(err.to_string(), "disk full");
        assert!(!path.exists());

        let store = DownloadStore::new(dir.path()).expect("store");
        let receipt = store.save(b"%PDF-1.7 day du", "ket-qua.pdf").expect("save");
        assert_eq!(receipt.path, path);
    }

    #[test]
    fn test_successful_write_keeps_file() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("a.txt");
        fs::write(&path, b"x").expect("seed file");
        write_or_remove(&path, || Ok(())).expect("write");
        assert!(path.exists());
    }

    #[test]
    fn test_traversal_is_stripped() {
        let dir = TempDir::new().expect("temp dir");
        let store = DownloadStore::new(&dir.path().join("dl")).expect("store");

        let receipt = store.save(b"x", "../../etc/passwd").expect("save");
        assert_eq!(receipt.path, dir.path().join("dl").join("passwd"));
        assert_eq!(receipt.original_filename.as_str(), "../../etc/passwd");
    }

    #[test]
    fn test_sanitise_filename() {
        assert_eq!(sanitise_filename(r"C:\tmp\a.pdf").as_deref(), Some("a.pdf"));
        assert_eq!(sanitise_filename("a:b?.pdf").as_deref(), Some("a_b_.pdf"));
        assert_eq!(sanitise_filename("dir/.."), None);
        assert_eq!(sanitise_filename("   "), None);
        assert_eq!(sanitise_filename(".env").as_deref(), Some(".env"));
    }

    #[test]
    fn test_store_rejects_file_as_directory() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("not-a-dir");
        fs::write(&file, b"x").expect("write");
        assert!(matches!(
            DownloadStore::new(&file),
            Err(FilesError::InvalidDirectory(_))
        ));
    }

    #[test]
    fn test_split_extension() {
        assert_eq!(split_extension("a.tar.gz"), ("a.tar", ".gz"));
        assert_eq!(split_extension(".env"), (".env", ""));
        assert_eq!(split_extension("README"), ("README", ""));
    }
}
