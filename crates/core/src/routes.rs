//! Route loaders: access control that runs before a page renders.
//!
//! Every route declares a [`RouteAccess`]. Before rendering, the router re-reads the persisted
//! session and runs the matching loader, which either lets the navigation through or redirects.
//! Loaders never contact the backend; the profile fetch that can invalidate a session happens
//! separately after login.

use crate::constants::{HOME_PATH, LOGIN_PATH};
use crate::session::{SessionState, StoredSession};

/// Who may open a route.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RouteAccess {
    /// Signed-in doctors only.
    Protected,
    /// Signed-out visitors only (login, password recovery).
    GuestOnly,
    /// Anyone.
    Public,
}

/// Result of running a loader.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoaderOutcome {
    Allow,
    Redirect(&'static str),
}

/// Loader for dashboard routes: anything short of an authenticated doctor goes to login.
pub fn protected_loader(session: &StoredSession) -> LoaderOutcome {
    match session.state() {
        SessionState::Authenticated => LoaderOutcome::Allow,
        SessionState::Anonymous | SessionState::PendingProfile => {
            LoaderOutcome::Redirect(LOGIN_PATH)
        }
    }
}

/// Loader for the authentication screens: signed-in doctors go home.
pub fn guest_loader(session: &StoredSession) -> LoaderOutcome {
    match session.state() {
        SessionState::Authenticated => LoaderOutcome::Redirect(HOME_PATH),
        SessionState::Anonymous | SessionState::PendingProfile => LoaderOutcome::Allow,
    }
}

/// Runs the loader for `access`.
pub fn run_loader(access: RouteAccess, session: &StoredSession) -> LoaderOutcome {
    let outcome = match access {
        RouteAccess::Protected => protected_loader(session),
        RouteAccess::GuestOnly => guest_loader(session),
        RouteAccess::Public => LoaderOutcome::Allow,
    };
    tracing::debug!(?access, ?outcome, "route loader");
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::{UserProfile, UserStatus};

    fn session(token: Option<&str>, roles: &[&str], status: UserStatus) -> StoredSession {
        StoredSession {
            access_token: token.map(str::to_string),
            user: Some(UserProfile {
                id: "u1".into(),
                email: "bs@bv.vn".into(),
                full_name: None,
                roles: roles.iter().map(|r| r.to_string()).collect(),
                status,
            }),
        }
    }

    #[test]
    fn test_protected_without_token_redirects_to_login() {
        let empty = StoredSession::default();
        assert_eq!(protected_loader(&empty), LoaderOutcome::Redirect(LOGIN_PATH));
        assert_eq!(
            protected_loader(&session(None, &["doctor"], UserStatus::Active)),
            LoaderOutcome::Redirect("/auth/login")
        );
    }

    #[test]
    fn test_protected_with_doctor_token_allows() {
        let s = session(Some("tok"), &["doctor"], UserStatus::Active);
        assert_eq!(protected_loader(&s), LoaderOutcome::Allow);
    }

    #[test]
    fn test_protected_rejects_wrong_role_or_status() {
        for s in [
            session(Some("tok"), &["admin"], UserStatus::Active),
            session(Some("tok"), &["doctor"], UserStatus::Suspended),
            StoredSession {
                access_token: Some("tok".into()),
                user: None,
            },
        ] {
            assert_eq!(protected_loader(&s), LoaderOutcome::Redirect(LOGIN_PATH));
        }
    }

    #[test]
    fn test_guest_routes() {
        let signed_in = session(Some("tok"), &["doctor"], UserStatus::Active);
        assert_eq!(guest_loader(&signed_in), LoaderOutcome::Redirect(HOME_PATH));
        assert_eq!(
            guest_loader(&StoredSession::default()),
            LoaderOutcome::Allow
        );
    }

    #[test]
    fn test_public_always_allows() {
        assert_eq!(
            run_loader(RouteAccess::Public, &StoredSession::default()),
            LoaderOutcome::Allow
        );
    }
}
