//! Persisted authentication session.
//!
//! The dashboard keeps its access token and the signed-in user's profile in a small JSON file,
//! the terminal counterpart of browser local storage. [`AuthStore`] owns that file and the
//! session state machine:
//!
//! ```text
//! anonymous --begin_session--> pending profile --apply_profile(doctor, active)--> authenticated
//!     ^                               |                                              |
//!     +---- apply_profile(invalid) ---+                                              |
//!     +------------------ logout | handle_unauthorized | apply_profile(invalid) -----+
//! ```
//!
//! Only the role/status check depends on the server (through the profile fetch); every other
//! transition is local. A missing or unreadable session file reads as anonymous.

use crate::{CoreError, CoreResult};
use api_shared::UserProfile;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// What is written to the session file.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredSession {
    #[serde(default)]
    pub access_token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
}

/// Where the session stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No token.
    Anonymous,
    /// Token acquired, profile not yet confirmed.
    PendingProfile,
    /// Token and an active doctor profile.
    Authenticated,
}

impl StoredSession {
    pub fn state(&self) -> SessionState {
        let has_token = self
            .access_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty());
        match (&self.user, has_token) {
            (_, false) => SessionState::Anonymous,
            (Some(user), true) if user.is_doctor() && user.is_active() => {
                SessionState::Authenticated
            }
            _ => SessionState::PendingProfile,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.state() == SessionState::Authenticated
    }
}

/// Why a profile was refused.
fn access_problem(profile: &UserProfile) -> Option<String> {
    if !profile.is_active() {
        return Some(format!("tài khoản {} chưa được kích hoạt", profile.email));
    }
    if !profile.is_doctor() {
        return Some(format!("tài khoản {} không có vai trò bác sĩ", profile.email));
    }
    None
}

/// File-backed session store.
#[derive(Debug)]
pub struct AuthStore {
    path: PathBuf,
    session: StoredSession,
}

impl AuthStore {
    /// Opens the store at `path`, reading any session already persisted there.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let session = read_session(&path);
        Self { path, session }
    }

    /// Re-reads the session file, picking up changes made by other processes.
    pub fn reload(&mut self) {
        self.session = read_session(&self.path);
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn session(&self) -> &StoredSession {
        &self.session
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn token(&self) -> Option<&str> {
        self.session
            .access_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.session.user.as_ref()
    }

    /// Stores a freshly issued token. Any previous profile is dropped until re-confirmed.
    pub fn begin_session(&mut self, access_token: impl Into<String>) -> CoreResult<()> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CoreError::InvalidInput("access token cannot be empty".into()));
        }
        self.session = StoredSession {
            access_token: Some(access_token),
            user: None,
        };
        self.persist()?;
        tracing::debug!("session token stored, awaiting profile");
        Ok(())
    }

    /// Confirms the session with the user's profile.
    ///
    /// Inactive accounts and accounts without the doctor role are refused: the session is
    /// cleared and `CoreError::AccessDenied` is returned.
    pub fn apply_profile(&mut self, profile: UserProfile) -> CoreResult<()> {
        if self.token().is_none() {
            return Err(CoreError::NoSession);
        }

        if let Some(problem) = access_problem(&profile) {
            tracing::warn!(user = %profile.email, "profile refused: {}", problem);
            self.clear()?;
            return Err(CoreError::AccessDenied(problem));
        }

        tracing::info!(user = %profile.email, "session authenticated");
        self.session.user = Some(profile);
        self.persist()
    }

    /// Ends the session at the user's request.
    pub fn logout(&mut self) -> CoreResult<()> {
        tracing::info!("session ended by logout");
        self.clear()
    }

    /// Ends the session because the backend rejected the token.
    pub fn handle_unauthorized(&mut self) -> CoreResult<()> {
        if self.state() != SessionState::Anonymous {
            tracing::warn!("backend rejected the access token, clearing session");
        }
        self.clear()
    }

    fn clear(&mut self) -> CoreResult<()> {
        self.session = StoredSession::default();
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CoreError::SessionRemove(e)),
        }
    }

    fn persist(&self) -> CoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(CoreError::SessionDirCreation)?;
        }

        let json =
            serde_json::to_string_pretty(&self.session).map_err(CoreError::Serialization)?;

        // Readers only ever see a complete file.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(CoreError::SessionWrite)?;
        restrict_permissions(&tmp)?;
        fs::rename(&tmp, &self.path).map_err(CoreError::SessionWrite)
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> CoreResult<()> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(CoreError::SessionWrite)
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> CoreResult<()> {
    Ok(())
}

fn read_session(path: &Path) -> StoredSession {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return StoredSession::default(),
        Err(e) => {
            tracing::warn!("failed to read session file {}: {}", path.display(), e);
            return StoredSession::default();
        }
    };

    serde_json::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!("ignoring corrupt session file {}: {}", path.display(), e);
        StoredSession::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use api_shared::UserStatus;
    use tempfile::TempDir;

    fn doctor() -> UserProfile {
        UserProfile {
            id: "u1".into(),
            email: "bs.an@benhvien.vn".into(),
            full_name: Some("BS. Nguyễn An".into()),
            roles: vec!["doctor".into()],
            status: UserStatus::Active,
        }
    }

    fn store_in(dir: &TempDir) -> AuthStore {
        AuthStore::load(dir.path().join("nested").join("session.json"))
    }

    #[test]
    fn test_new_store_is_anonymous() {
        let dir = TempDir::new().expect("temp dir");
        let store = store_in(&dir);
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(store.token().is_none());
    }

    #[test]
    fn test_login_flow_reaches_authenticated_and_persists() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);

        store.begin_session("tok-1").expect("begin");
        assert_eq!(store.state(), SessionState::PendingProfile);

        store.apply_profile(doctor()).expect("doctor accepted");
        assert_eq!(store.state(), SessionState::Authenticated);

        let reopened = AuthStore::load(store.path());
        assert!(reopened.is_authenticated());
        assert_eq!(reopened.token(), Some("tok-1"));
        assert_eq!(reopened.user().map(|u| u.id.as_str()), Some("u1"));
    }

    #[test]
    fn test_non_doctor_profile_clears_session() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);
        store.begin_session("tok").expect("begin");

        let mut nurse = doctor();
        nurse.roles = vec!["nurse".into()];
        let err = store.apply_profile(nurse).expect_err("nurse refused");

        assert!(matches!(err, CoreError::AccessDenied(_)));
        assert_eq!(store.state(), SessionState::Anonymous);
        assert!(!store.path().exists(), "session file should be removed");
    }

    #[test]
    fn test_inactive_doctor_is_refused() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);
        store.begin_session("tok").expect("begin");

        let mut inactive = doctor();
        inactive.status = UserStatus::Inactive;
        assert!(matches!(
            store.apply_profile(inactive),
            Err(CoreError::AccessDenied(_))
        ));
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_profile_without_token_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);
        assert!(matches!(
            store.apply_profile(doctor()),
            Err(CoreError::NoSession)
        ));
    }

    #[test]
    fn test_logout_and_unauthorized_return_to_anonymous() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);

        store.begin_session("tok").expect("begin");
        store.apply_profile(doctor()).expect("profile");
        store.logout().expect("logout");
        assert_eq!(store.state(), SessionState::Anonymous);

        store.begin_session("tok-2").expect("begin");
        store.apply_profile(doctor()).expect("profile");
        store.handle_unauthorized().expect("401");
        assert_eq!(store.state(), SessionState::Anonymous);
        assert_eq!(AuthStore::load(store.path()).state(), SessionState::Anonymous);

        // Clearing an already empty store is fine.
        store.logout().expect("second logout");
    }

    #[test]
    fn test_corrupt_file_reads_as_anonymous() {
        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").expect("write");
        let store = AuthStore::load(&path);
        assert_eq!(store.state(), SessionState::Anonymous);
    }

    #[test]
    fn test_reload_sees_external_logout() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);
        store.begin_session("tok").expect("begin");
        store.apply_profile(doctor()).expect("profile");

        let mut other = AuthStore::load(store.path());
        other.logout().expect("logout elsewhere");

        assert!(store.is_authenticated(), "stale in-memory copy");
        store.reload();
        assert!(!store.is_authenticated());
    }

    #[test]
    fn test_blank_token_is_rejected() {
        let dir = TempDir::new().expect("temp dir");
        let mut store = store_in(&dir);
        assert!(store.begin_session("  ").is_err());
    }
}
