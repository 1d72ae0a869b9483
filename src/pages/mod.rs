//! Text pages.
//!
//! Each page fetches through the query façades and renders plain text. Rendering functions are
//! pure so they can be tested without a backend.

pub mod auth;
pub mod chat;
pub mod dashboard;
pub mod files;
pub mod patients;

use crate::app::App;
use crate::cli::{Command, PatientsArgs};
use crate::router::Route;
use emr_client::{ClientError, ClientResult};
use emr_core::CoreError;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

/// Line-oriented terminal input shared by prompts and the chat loop.
pub struct Input {
    lines: Lines<BufReader<Stdin>>,
}

impl Input {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// Next line, or `None` at end of input.
    pub async fn next_line(&mut self) -> ClientResult<Option<String>> {
        self.lines.next_line().await.map_err(input_error)
    }

    /// Writes `label` and reads the answer. End of input counts as an empty answer.
    pub async fn prompt(&mut self, label: &str) -> ClientResult<String> {
        let mut stderr = tokio::io::stderr();
        stderr
            .write_all(format!("{label}: ").as_bytes())
            .await
            .map_err(input_error)?;
        stderr.flush().await.map_err(input_error)?;
        Ok(self.next_line().await?.unwrap_or_default())
    }
}

fn input_error(e: std::io::Error) -> ClientError {
    CoreError::InvalidInput(format!("không đọc được dữ liệu nhập: {e}")).into()
}

/// Renders the page for `command`.
pub async fn render(app: &App, command: Command, input: &mut Input) -> ClientResult<String> {
    match command {
        Command::Login { email, password } => auth::login(app, &email, password, input).await,
        Command::Logout => auth::logout(app).await,
        Command::Whoami => auth::whoami(app).await,
        Command::ForgotPassword { email } => auth::forgot_password(app, &email).await,
        Command::ResetPassword {
            token,
            password,
            confirm,
        } => auth::reset_password(app, &token, password, confirm, input).await,
        Command::Dashboard { months } => dashboard::show(app, months).await,
        Command::Patients(args) => patients::list(app, &args).await,
        Command::Patient {
            id,
            records,
            files,
            json,
        } => {
            let options = patients::DetailOptions {
                records,
                files,
                json,
            };
            patients::detail(app, &id, options).await
        }
        Command::UpdatePatient(args) => patients::update(app, &args).await,
        Command::Files {
            folder,
            search,
            folders,
        } => files::list(app, folder.as_deref(), search.as_deref(), folders).await,
        Command::Download { key, name } => files::download(app, &key, name.as_deref()).await,
        Command::Chat { message } => chat::run(app, message, input).await,
        Command::Open { path } => open(app, &path, input).await,
        Command::Health => health(app).await,
    }
}

/// Renders the default view of a dashboard path.
async fn open(app: &App, path: &str, input: &mut Input) -> ClientResult<String> {
    match Route::parse(path) {
        Some(Route::Home) => dashboard::show(app, dashboard::DEFAULT_MONTHS).await,
        Some(Route::Patients) => patients::list(app, &PatientsArgs::default()).await,
        Some(Route::Patient(id)) => {
            let options = patients::DetailOptions {
                records: true,
                files: true,
                json: false,
            };
            patients::detail(app, &id, options).await
        }
        Some(Route::GeneralFiles) => files::list(app, None, None, false).await,
        Some(Route::Chat) => chat::run(app, None, input).await,
        Some(Route::Login) => Ok("Dùng `emr login <email>` để đăng nhập.".into()),
        Some(Route::ForgotPassword) => {
            Ok("Dùng `emr forgot-password <email>` để nhận liên kết đặt lại mật khẩu.".into())
        }
        Some(Route::ResetPassword) => {
            Ok("Dùng `emr reset-password <token>` để đặt mật khẩu mới.".into())
        }
        None => Err(ClientError::NotFound(format!("no page at {path}"))),
    }
}

async fn health(app: &App) -> ClientResult<String> {
    let health = app.client.health().await?;
    Ok(format!(
        "{} ({})",
        health.summary(),
        app.client.api().config().api_url()
    ))
}

/// `-` for missing values.
pub(crate) fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.trim().is_empty()).unwrap_or("-")
}
