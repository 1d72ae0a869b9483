//! Query façades, one per backend resource.
//!
//! Each façade builds the cache key for a read and hands the request to the shared
//! [`QueryClient`](crate::QueryClient). Keys are grouped by resource so mutations can drop
//! everything that depends on what they changed.

mod general_files;
mod patients;
mod user;

pub use general_files::GeneralFileQueries;
pub use patients::{PatientListParams, PatientQueries};
pub use user::UserQueries;

use crate::query::QueryKey;
use crate::ClientResult;
use emr_core::CoreError;

pub fn patients_key() -> QueryKey {
    QueryKey::new("patients")
}

pub fn patient_list_key() -> QueryKey {
    patients_key().with("list")
}

pub fn patient_all_key() -> QueryKey {
    patients_key().with("all")
}

pub fn patient_detail_key(id: &str) -> QueryKey {
    patients_key().with("detail").with(id)
}

pub fn patient_records_key(id: &str) -> QueryKey {
    patients_key().with("records").with(id)
}

pub fn patient_files_key(id: &str) -> QueryKey {
    patients_key().with("files").with(id)
}

pub fn general_files_key() -> QueryKey {
    QueryKey::new("general-files")
}

pub fn user_profile_key() -> QueryKey {
    QueryKey::new("user").with("profile")
}

/// Rejects ids that would change the shape of a request path.
pub(crate) fn checked_id(id: &str) -> ClientResult<&str> {
    let id = id.trim();
    if id.is_empty() || id.contains(['/', '?', '#', '\\']) {
        return Err(CoreError::InvalidInput(format!("invalid id {id:?}")).into());
    }
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_id() {
        assert_eq!(checked_id(" p-1 ").expect("valid"), "p-1");
        assert!(checked_id("").is_err());
        assert!(checked_id("../admin").is_err());
        assert!(checked_id("1?x=2").is_err());
    }

    #[test]
    fn test_detail_keys_sit_under_patients() {
        let detail = patient_detail_key("7").to_string();
        assert!(patients_key().is_prefix_of(&detail));
        assert!(!patient_list_key().is_prefix_of(&detail));
    }
}
