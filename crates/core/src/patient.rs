//! Patient domain model.
//!
//! These structures mirror the backend's patient payloads. The backend owns the lifecycle; the
//! dashboard only reads them and merges mutation responses back into its cache. Timestamps are
//! kept as raw strings because older records carry missing or malformed values, and the patient
//! list must still group them (see [`crate::time_folder`]).

use crate::timestamps::parse_timestamp;
use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::{Deserialize, Serialize};

// ============================================================================
// ENUMERATIONS
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Gender {
    /// Vietnamese label used by the patient pages.
    pub fn label(self) -> &'static str {
        match self {
            Gender::Male => "Nam",
            Gender::Female => "Nữ",
            Gender::Other => "Khác",
            Gender::Unknown => "Chưa rõ",
        }
    }

    /// Parses CLI/filter input, accepting English and Vietnamese spellings.
    pub fn from_filter(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "male" | "m" | "nam" => Some(Gender::Male),
            "female" | "f" | "nữ" | "nu" => Some(Gender::Female),
            "other" | "khác" | "khac" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// ABO/Rh blood group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }

    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_uppercase().as_str() {
            "A+" => Some(BloodType::APositive),
            "A-" => Some(BloodType::ANegative),
            "B+" => Some(BloodType::BPositive),
            "B-" => Some(BloodType::BNegative),
            "AB+" => Some(BloodType::AbPositive),
            "AB-" => Some(BloodType::AbNegative),
            "O+" => Some(BloodType::OPositive),
            "O-" => Some(BloodType::ONegative),
            _ => None,
        }
    }
}

/// Reads a blood type, treating blank or unrecognised values as absent so one odd record cannot
/// fail a whole patient list.
fn lenient_blood_type<'de, D>(deserializer: D) -> Result<Option<BloodType>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw: Option<serde_json::Value> = Option::deserialize(deserializer)?;
    let Some(serde_json::Value::String(raw)) = raw else {
        return Ok(None);
    };
    let parsed = BloodType::parse(&raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::debug!(value = %raw, "ignoring unrecognised blood type");
    }
    Ok(parsed)
}

// ============================================================================
// NESTED STRUCTURES
// ============================================================================

/// A set of vital signs taken at one point in time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct VitalSigns {
    #[serde(default)]
    pub recorded_at: Option<String>,
    #[serde(default)]
    pub heart_rate: Option<f32>,
    #[serde(default)]
    pub blood_pressure_systolic: Option<i32>,
    #[serde(default)]
    pub blood_pressure_diastolic: Option<i32>,
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub respiratory_rate: Option<f32>,
    #[serde(default)]
    pub oxygen_saturation: Option<f32>,
    #[serde(default)]
    pub weight: Option<f32>,
    #[serde(default)]
    pub height: Option<f32>,
}

impl VitalSigns {
    /// Blood pressure as `systolic/diastolic` when both readings exist.
    pub fn blood_pressure(&self) -> Option<String> {
        match (self.blood_pressure_systolic, self.blood_pressure_diastolic) {
            (Some(sys), Some(dia)) => Some(format!("{sys}/{dia}")),
            _ => None,
        }
    }

    /// Body-mass index from weight (kg) and height (cm).
    pub fn bmi(&self) -> Option<f32> {
        let weight = self.weight?;
        let height_m = self.height? / 100.0;
        if height_m <= 0.0 {
            return None;
        }
        Some(weight / (height_m * height_m))
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub name: String,
    #[serde(default)]
    pub relationship: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Insurance {
    #[serde(default)]
    pub provider: Option<String>,
    #[serde(default)]
    pub policy_number: Option<String>,
    #[serde(default)]
    pub valid_until: Option<String>,
}

/// Laboratory or imaging result inside a medical record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TestResult {
    pub name: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub reference_range: Option<String>,
    #[serde(default)]
    pub is_abnormal: bool,
    #[serde(default)]
    pub performed_at: Option<String>,
}

/// One encounter in a patient's history.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MedicalRecord {
    pub id: String,
    #[serde(default)]
    pub visit_date: Option<String>,
    #[serde(default)]
    pub doctor_name: Option<String>,
    #[serde(default)]
    pub chief_complaint: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub treatment: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub test_results: Vec<TestResult>,
}

/// Attachment stored in object storage and referenced by `storage_key`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientFile {
    pub id: String,
    pub name: String,
    pub storage_key: String,
    #[serde(default)]
    pub mime_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub uploaded_at: Option<String>,
}

// ============================================================================
// PATIENT
// ============================================================================

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    pub id: String,
    pub full_name: String,
    #[serde(default)]
    pub date_of_birth: Option<String>,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub citizen_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_blood_type")]
    pub blood_type: Option<BloodType>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub medical_history: Vec<String>,
    #[serde(default)]
    pub vital_signs: Option<VitalSigns>,
    #[serde(default)]
    pub assigned_doctor: Option<String>,
    #[serde(default)]
    pub emergency_contact: Option<EmergencyContact>,
    #[serde(default)]
    pub insurance: Option<Insurance>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Patient {
    /// Minimal patient, mostly useful for fixtures.
    pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            full_name: full_name.into(),
            date_of_birth: None,
            gender: Gender::Unknown,
            phone: None,
            email: None,
            address: None,
            citizen_id: None,
            blood_type: None,
            allergies: Vec::new(),
            medical_history: Vec::new(),
            vital_signs: None,
            assigned_doctor: None,
            emergency_contact: None,
            insurance: None,
            created_at: None,
            updated_at: None,
        }
    }

    /// Parsed date of birth, if present and well-formed.
    pub fn birth_date(&self, offset: FixedOffset) -> Option<NaiveDate> {
        self.date_of_birth
            .as_deref()
            .and_then(|raw| parse_timestamp(raw, offset))
            .map(|dt| dt.date_naive())
    }

    /// Age in whole years on `today`.
    pub fn age_on(&self, today: NaiveDate, offset: FixedOffset) -> Option<u32> {
        let born = self.birth_date(offset)?;
        let mut years = today.year() - born.year();
        if (today.month(), today.day()) < (born.month(), born.day()) {
            years -= 1;
        }
        u32::try_from(years).ok()
    }

    /// Applies a partial update in place, the way a mutation response is merged into the
    /// cached detail before the server copy arrives.
    pub fn apply_update(&mut self, update: &PatientUpdate) {
        if let Some(name) = &update.full_name {
            self.full_name = name.clone();
        }
        if let Some(phone) = &update.phone {
            self.phone = Some(phone.clone());
        }
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
        if let Some(address) = &update.address {
            self.address = Some(address.clone());
        }
        if let Some(allergies) = &update.allergies {
            self.allergies = allergies.clone();
        }
        if let Some(history) = &update.medical_history {
            self.medical_history = history.clone();
        }
        if let Some(doctor) = &update.assigned_doctor {
            self.assigned_doctor = Some(doctor.clone());
        }
        if let Some(contact) = &update.emergency_contact {
            self.emergency_contact = Some(contact.clone());
        }
    }
}

/// Body of `PATCH /patient/{id}`; absent fields are left unchanged.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PatientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allergies: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medical_history: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assigned_doctor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub emergency_contact: Option<EmergencyContact>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        *self == PatientUpdate::default()
    }
}
