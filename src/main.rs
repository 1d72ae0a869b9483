//! `emr`: terminal client for the EMR dashboard backend.
//!
//! Every invocation resolves configuration, restores the persisted session, gates the requested
//! page through the router and prints the rendered page. Logs go to stderr so page output can be
//! piped.
//!
//! # Environment Variables
//! - `EMR_API_URL`: backend base URL (default: `http://localhost:8080`)
//! - `EMR_CHAT_URL`: assistant endpoint (default: `{EMR_API_URL}/chat`)
//! - `EMR_SESSION_FILE`: where the session is persisted (default: under `$HOME`)
//! - `EMR_UTC_OFFSET`: display offset for dates and time folders
//! - `EMR_REQUEST_TIMEOUT_SECS`, `EMR_STALE_SECS`: request timeout and cache staleness
//! - `EMR_DOWNLOAD_DIR`: where downloaded documents are saved (default: `downloads`)
//! - `RUST_LOG`: log filter (default adds `emr=info`)

mod app;
mod cli;
mod config;
mod pages;
mod router;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::app::App;
use crate::cli::Cli;
use crate::config::{AppConfig, EnvValues};
use crate::pages::Input;
use crate::router::{error_boundary, redirect_notice, Navigation, Route};

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env().add_directive("emr=info".parse()?))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::resolve(EnvValues::from_process())?;
    let app = App::new(config)?;

    let route = cli.command.route();
    if let Some(route) = route.clone() {
        if let Navigation::Redirected { from, to } = app.router().navigate(route).await {
            eprintln!("{}", redirect_notice(&from, &to));
            return Ok(ExitCode::FAILURE);
        }
    }

    let mut input = Input::new();
    match pages::render(&app, cli.command, &mut input).await {
        Ok(output) => {
            if !output.is_empty() {
                println!("{output}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::debug!("page failed: {:?}", e);
            eprintln!("{}", error_boundary(&route.unwrap_or(Route::Home), &e));
            Ok(ExitCode::FAILURE)
        }
    }
}
