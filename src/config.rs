//! Startup configuration, resolved once from the environment.

use emr_client::config::{
    api_url_from_env_value, chat_url_from_env_value, duration_secs_from_env_value,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_STALE_SECS,
};
use emr_client::ClientConfig;
use emr_core::config::{session_path_from_env_value, utc_offset_from_env_value};
use emr_core::CoreConfig;
use std::path::PathBuf;

pub const DEFAULT_DOWNLOAD_DIR: &str = "downloads";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub core: CoreConfig,
    pub client: ClientConfig,
    pub download_dir: PathBuf,
}

/// Raw environment values, kept apart so resolution can be tested without touching the
/// process environment.
#[derive(Clone, Debug, Default)]
pub struct EnvValues {
    pub api_url: Option<String>,
    pub chat_url: Option<String>,
    pub session_file: Option<String>,
    pub home: Option<String>,
    pub utc_offset: Option<String>,
    pub request_timeout_secs: Option<String>,
    pub stale_secs: Option<String>,
    pub download_dir: Option<String>,
}

impl EnvValues {
    pub fn from_process() -> Self {
        let var = |name: &str| std::env::var(name).ok();
        Self {
            api_url: var("EMR_API_URL"),
            chat_url: var("EMR_CHAT_URL"),
            session_file: var("EMR_SESSION_FILE"),
            home: var("HOME").or_else(|| var("USERPROFILE")),
            utc_offset: var("EMR_UTC_OFFSET"),
            request_timeout_secs: var("EMR_REQUEST_TIMEOUT_SECS"),
            stale_secs: var("EMR_STALE_SECS"),
            download_dir: var("EMR_DOWNLOAD_DIR"),
        }
    }
}

impl AppConfig {
    pub fn resolve(env: EnvValues) -> anyhow::Result<Self> {
        let utc_offset = utc_offset_from_env_value(env.utc_offset)?;
        let session_path = session_path_from_env_value(env.session_file, env.home);
        let core = CoreConfig::new(session_path, utc_offset)?;

        let api_url = api_url_from_env_value(env.api_url)?;
        let chat_url = chat_url_from_env_value(env.chat_url, &api_url)?;
        let request_timeout = duration_secs_from_env_value(
            "EMR_REQUEST_TIMEOUT_SECS",
            env.request_timeout_secs,
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;
        let stale_after =
            duration_secs_from_env_value("EMR_STALE_SECS", env.stale_secs, DEFAULT_STALE_SECS)?;
        let client = ClientConfig::new(api_url, chat_url)
            .with_request_timeout(request_timeout)
            .with_stale_after(stale_after);

        let download_dir = env
            .download_dir
            .filter(|d| !d.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DOWNLOAD_DIR));

        Ok(Self {
            core,
            client,
            download_dir,
        })
    }
}
