use super::general_files_key;
use crate::{ApiClient, ClientResult, QueryClient};
use emr_core::general_files::{folder_counts, GeneralFile};
use std::collections::BTreeMap;

#[derive(Clone)]
pub struct GeneralFileQueries {
    api: ApiClient,
    queries: QueryClient,
}

impl GeneralFileQueries {
    pub fn new(api: ApiClient, queries: QueryClient) -> Self {
        Self { api, queries }
    }

    /// Files, optionally narrowed to one folder and a name search.
    pub async fn list(
        &self,
        folder: Option<&str>,
        search: Option<&str>,
    ) -> ClientResult<Vec<GeneralFile>> {
        let folder = folder.map(str::trim).filter(|f| !f.is_empty());
        let search = search.map(str::trim).filter(|s| !s.is_empty());
        let key = general_files_key()
            .with("list")
            .with_opt(folder)
            .with_opt(search);

        let mut query = Vec::new();
        if let Some(folder) = folder {
            query.push(("folder", folder.to_string()));
        }
        if let Some(search) = search {
            query.push(("search", search.to_string()));
        }

        let api = self.api.clone();
        self.queries
            .fetch(&key, move || {
                let api = api.clone();
                let query = query.clone();
                async move { api.get("/general-files", &query).await }
            })
            .await
    }

    /// Folder names with file counts, built from the unfiltered list.
    pub async fn folders(&self) -> ClientResult<BTreeMap<String, usize>> {
        let files = self.list(None, None).await?;
        Ok(folder_counts(&files))
    }
}
