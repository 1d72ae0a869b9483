//! General (non-patient) documents: protocols, forms, circulars.

use crate::search::fold_for_search;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralFile {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub folder: Option<String>,
    pub storage_key: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub uploaded_by: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Folder name used for files the backend did not file anywhere.
pub const UNFILED_FOLDER: &str = "Chưa phân loại";

impl GeneralFile {
    pub fn folder_name(&self) -> &str {
        self.folder
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .unwrap_or(UNFILED_FOLDER)
    }
}

/// Folder names with their file counts, sorted by name.
pub fn folder_counts(files: &[GeneralFile]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for file in files {
        *counts.entry(file.folder_name().to_string()).or_insert(0) += 1;
    }
    counts
}

/// Files in `folder` (when given) whose name contains `query` (when given).
pub fn filter_files<'a>(
    files: &'a [GeneralFile],
    folder: Option<&str>,
    query: Option<&str>,
) -> Vec<&'a GeneralFile> {
    let needle = query.map(fold_for_search).filter(|q| !q.is_empty());
    files
        .iter()
        .filter(|f| folder.map_or(true, |wanted| f.folder_name() == wanted.trim()))
        .filter(|f| {
            needle
                .as_deref()
                .map_or(true, |n| fold_for_search(&f.name).contains(n))
        })
        .collect()
}

/// Human-readable size, e.g. `1.5 MB`.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}
