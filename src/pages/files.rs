use crate::app::App;
use emr_client::ClientResult;
use emr_core::general_files::{filter_files, format_size, GeneralFile, UNFILED_FOLDER};
use emr_core::CoreError;
use emr_files::DownloadReceipt;
use std::collections::BTreeMap;
use std::fmt::Write;

pub async fn list(
    app: &App,
    folder: Option<&str>,
    search: Option<&str>,
    folders_only: bool,
) -> ClientResult<String> {
    let queries = app.client.general_files();
    if folders_only {
        return Ok(render_folders(&queries.folders().await?));
    }

    // Unfiled documents have no folder on the backend. Search is matched locally, ignoring
    // diacritics.
    let server_folder = folder.filter(|f| f.trim() != UNFILED_FOLDER);
    let files = queries.list(server_folder, None).await?;
    let shown = filter_files(&files, folder, search);
    Ok(render_files(&shown))
}

pub async fn download(app: &App, key: &str, name: Option<&str>) -> ClientResult<String> {
    let filename = match name {
        Some(name) => name.to_string(),
        None => default_filename(key)
            .ok_or_else(|| CoreError::InvalidInput(format!("cannot derive a filename from {key:?}")))?,
    };
    let store = app.download_store()?;
    let receipt = app.client.storage().download(key, &filename, &store).await?;
    Ok(render_receipt(&receipt))
}

fn default_filename(key: &str) -> Option<String> {
    key.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.trim().is_empty())
        .map(str::to_string)
}

pub fn render_folders(folders: &BTreeMap<String, usize>) -> String {
    if folders.is_empty() {
        return "Chưa có thư mục.".into();
    }
    let mut out = String::new();
    for (name, count) in folders {
        let _ = writeln!(out, "{name:<28} {count:>4} tệp");
    }
    out.trim_end().to_string()
}

pub fn render_files(files: &[&GeneralFile]) -> String {
    if files.is_empty() {
        return "Không có tệp phù hợp.".into();
    }
    let mut out = String::new();
    for file in files {
        let _ = writeln!(
            out,
            "{:<36} {:<18} {:>9}  {}",
            file.name,
            file.folder_name(),
            file.size.map_or_else(|| "-".to_string(), format_size),
            file.storage_key
        );
    }
    out.trim_end().to_string()
}

pub fn render_receipt(receipt: &DownloadReceipt) -> String {
    let verb = if receipt.reused_existing {
        "Tệp đã có sẵn"
    } else {
        "Đã lưu"
    };
    format!(
        "{verb}: {} ({}, {})\nSHA-256: {}",
        receipt.path.display(),
        format_size(receipt.size_bytes),
        receipt
            .media_type
            .as_ref()
            .map_or("không rõ định dạng", |m| m.as_str()),
        receipt.sha256
    )
}
