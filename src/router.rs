//! Route table and navigation.
//!
//! Each page has a path and an access rule. Navigating re-reads the persisted session, runs
//! the route's loader and either renders the page or follows the redirect. Page failures are
//! caught by [`error_boundary`], which renders a failure card instead of aborting.

use emr_client::{ClientError, ErrorCategory, SharedSession};
use emr_core::constants::{
    CHAT_PATH, FORGOT_PASSWORD_PATH, GENERAL_FILES_PATH, HOME_PATH, LOGIN_PATH, PATIENTS_PATH,
    RESET_PASSWORD_PATH,
};
use emr_core::routes::{run_loader, LoaderOutcome, RouteAccess};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    ForgotPassword,
    ResetPassword,
    Patients,
    Patient(String),
    GeneralFiles,
    Chat,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Home => HOME_PATH.to_string(),
            Route::Login => LOGIN_PATH.to_string(),
            Route::ForgotPassword => FORGOT_PASSWORD_PATH.to_string(),
            Route::ResetPassword => RESET_PASSWORD_PATH.to_string(),
            Route::Patients => PATIENTS_PATH.to_string(),
            Route::Patient(id) => format!("{PATIENTS_PATH}/{id}"),
            Route::GeneralFiles => GENERAL_FILES_PATH.to_string(),
            Route::Chat => CHAT_PATH.to_string(),
        }
    }

    pub fn access(&self) -> RouteAccess {
        match self {
            Route::Login | Route::ForgotPassword => RouteAccess::GuestOnly,
            // Reset links arrive by email and must work whether or not someone is signed in.
            Route::ResetPassword => RouteAccess::Public,
            Route::Home
            | Route::Patients
            | Route::Patient(_)
            | Route::GeneralFiles
            | Route::Chat => RouteAccess::Protected,
        }
    }

    /// Resolves a path such as `/patients/p1?tab=files`. Query strings and trailing slashes are
    /// ignored.
    pub fn parse(path: &str) -> Option<Route> {
        let path = path.trim();
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let path = match path.trim_end_matches('/') {
            "" => HOME_PATH,
            trimmed => trimmed,
        };

        match path {
            HOME_PATH => Some(Route::Home),
            LOGIN_PATH => Some(Route::Login),
            FORGOT_PASSWORD_PATH => Some(Route::ForgotPassword),
            RESET_PASSWORD_PATH => Some(Route::ResetPassword),
            PATIENTS_PATH => Some(Route::Patients),
            GENERAL_FILES_PATH => Some(Route::GeneralFiles),
            CHAT_PATH => Some(Route::Chat),
            other => {
                let id = other.strip_prefix(PATIENTS_PATH)?.strip_prefix('/')?;
                (!id.is_empty() && !id.contains('/')).then(|| Route::Patient(id.to_string()))
            }
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirected { from: Route, to: Route },
}

pub struct Router {
    session: SharedSession,
}

impl Router {
    pub fn new(session: SharedSession) -> Self {
        Self { session }
    }

    /// Runs the loader for `route` against the session as currently persisted.
    pub async fn navigate(&self, route: Route) -> Navigation {
        let outcome = {
            let mut store = self.session.lock().await;
            store.reload();
            run_loader(route.access(), store.session())
        };

        match outcome {
            LoaderOutcome::Allow => Navigation::Render(route),
            LoaderOutcome::Redirect(path) => {
                let to = Route::parse(path).unwrap_or(Route::Home);
                tracing::debug!(from = %route, to = %to, "redirect");
                Navigation::Redirected { from: route, to }
            }
        }
    }
}

/// Message shown when a navigation was redirected.
pub fn redirect_notice(from: &Route, to: &Route) -> String {
    match to {
        Route::Login => format!(
            "Bạn cần đăng nhập để mở {from}. Chạy `emr login <email>` để tiếp tục."
        ),
        Route::Home => format!("Bạn đã đăng nhập; {from} chỉ dành cho khách. Chuyển về {to}."),
        _ => format!("Chuyển hướng từ {from} tới {to}."),
    }
}

/// Failure card rendered when a page fails.
pub fn error_boundary(route: &Route, error: &ClientError) -> String {
    match error.category() {
        ErrorCategory::Unauthorized => {
            tracing::warn!(route = %route, "session ended while rendering");
            format!(
                "{}\nChạy `emr login <email>` để đăng nhập lại.",
                error.user_message()
            )
        }
        ErrorCategory::NotFound => error.user_message(),
        ErrorCategory::Validation | ErrorCategory::Forbidden => {
            format!("Lỗi: {}", error.user_message())
        }
        ErrorCategory::Network => {
            tracing::error!(route = %route, "page failed: {}", error);
            format!(
                "┌ Đã xảy ra lỗi\n│ {}\n│ Không thể tải {route}.\n└ Hãy thử lại sau ít phút.",
                error.user_message()
            )
        }
    }
}
