//! # EMR Core
//!
//! Core logic of the EMR dashboard, free of any network or terminal concerns:
//! - Patient, medical record and general-file models as returned by the backend
//! - Time folders: grouping patients by creation day, week, month or year
//! - Client-side patient filtering and dashboard statistics
//! - Form validation for the authentication screens
//! - The persisted auth session and the route loaders that gate pages on it
//! - Startup configuration
//!
//! **No transport concerns**: HTTP calls and request caching belong in `emr-client`; rendering
//! and the CLI belong in the `emr-dashboard` binary.

pub mod config;
pub mod constants;
pub mod dashboard;
pub mod error;
pub mod general_files;
pub mod patient;
pub mod routes;
pub mod search;
pub mod session;
pub mod time_folder;
pub mod timestamps;
pub mod validation;

pub use config::CoreConfig;
pub use error::{CoreError, CoreResult};
pub use patient::{
    BloodType, EmergencyContact, Gender, Insurance, MedicalRecord, Patient, PatientFile,
    PatientUpdate, TestResult, VitalSigns,
};
pub use session::{AuthStore, SessionState, StoredSession};
pub use time_folder::{group_into_time_folders, Granularity, TimeFolder, TimeFolderKey};

// Re-export the validated primitives used in this crate's public API.
pub use emr_types::{EmailAddress, NonEmptyText, TextError};
