//! Constants used throughout the EMR core crate.
//!
//! Route paths, labels and defaults live here so pages, loaders and tests agree on them.

/// Dashboard home route.
pub const HOME_PATH: &str = "/";

/// Login route; protected routes redirect here.
pub const LOGIN_PATH: &str = "/auth/login";

/// Forgot-password route.
pub const FORGOT_PASSWORD_PATH: &str = "/auth/forgot-password";

/// Reset-password route.
pub const RESET_PASSWORD_PATH: &str = "/auth/reset-password";

/// Patient list route.
pub const PATIENTS_PATH: &str = "/patients";

/// General files route.
pub const GENERAL_FILES_PATH: &str = "/general-files";

/// AI assistant route.
pub const CHAT_PATH: &str = "/chat";

/// Directory created under the user's home for the persisted session.
pub const DEFAULT_SESSION_DIR_NAME: &str = ".emr-dashboard";

/// Filename of the persisted session.
pub const SESSION_FILENAME: &str = "session.json";

/// Display offset used when none is configured (Indochina Time).
pub const DEFAULT_UTC_OFFSET: &str = "+07:00";

/// Label of the time folder holding patients whose creation date is missing or unparseable.
pub const UNKNOWN_FOLDER_LABEL: &str = "Không xác định";

/// Minimum password length accepted by the reset-password form.
pub const MIN_PASSWORD_LENGTH: usize = 8;
