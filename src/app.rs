//! Everything a page needs: configuration, the backend client and the shared session.

use crate::config::AppConfig;
use crate::router::Router;
use chrono::{FixedOffset, NaiveDate, Utc};
use emr_client::{ClientResult, EmrClient, SharedSession};
use emr_core::AuthStore;
use emr_files::DownloadStore;
use std::sync::Arc;
use tokio::sync::Mutex;

pub struct App {
    pub config: AppConfig,
    pub client: EmrClient,
    pub session: SharedSession,
}

impl App {
    pub fn new(config: AppConfig) -> ClientResult<Self> {
        let session: SharedSession =
            Arc::new(Mutex::new(AuthStore::load(config.core.session_path())));
        let client = EmrClient::new(config.client.clone(), Arc::clone(&session))?;
        Ok(Self {
            config,
            client,
            session,
        })
    }

    pub fn router(&self) -> Router {
        Router::new(Arc::clone(&self.session))
    }

    pub fn offset(&self) -> FixedOffset {
        self.config.core.utc_offset()
    }

    /// Today's date in the display offset.
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.offset()).date_naive()
    }

    pub fn download_store(&self) -> ClientResult<DownloadStore> {
        Ok(DownloadStore::new(&self.config.download_dir)?)
    }
}
