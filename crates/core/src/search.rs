//! Client-side patient filtering for the patient list.
//!
//! The backend performs the coarse `search` query; this filter narrows the current page by
//! gender, blood type and a free-text needle without another round-trip. Text matching ignores
//! case and Vietnamese diacritics, so `nguyen` finds `Nguyễn`.

use crate::patient::{BloodType, Gender, Patient};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PatientFilter {
    pub query: Option<String>,
    pub gender: Option<Gender>,
    pub blood_type: Option<BloodType>,
}

impl PatientFilter {
    pub fn is_empty(&self) -> bool {
        self.normalised_query().is_none() && self.gender.is_none() && self.blood_type.is_none()
    }

    fn normalised_query(&self) -> Option<String> {
        self.query
            .as_deref()
            .map(fold_for_search)
            .filter(|q| !q.is_empty())
    }

    pub fn matches(&self, patient: &Patient) -> bool {
        if let Some(gender) = self.gender {
            if patient.gender != gender {
                return false;
            }
        }
        if let Some(blood_type) = self.blood_type {
            if patient.blood_type != Some(blood_type) {
                return false;
            }
        }
        match self.normalised_query() {
            Some(needle) => searchable_fields(patient).any(|field| fold_for_search(field).contains(&needle)),
            None => true,
        }
    }

    /// Patients that match, in input order.
    pub fn apply<'a>(&self, patients: &'a [Patient]) -> Vec<&'a Patient> {
        patients.iter().filter(|p| self.matches(p)).collect()
    }
}

fn searchable_fields(patient: &Patient) -> impl Iterator<Item = &str> {
    [
        Some(patient.full_name.as_str()),
        Some(patient.id.as_str()),
        patient.phone.as_deref(),
        patient.email.as_deref(),
        patient.citizen_id.as_deref(),
    ]
    .into_iter()
    .flatten()
}

/// Combining diacritical marks, as left by decomposed (NFD) input.
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036F}';

/// Lowercase, strip Vietnamese diacritics and collapse whitespace.
///
/// Both precomposed letters and decomposed base-plus-mark sequences fold to the bare letter.
pub fn fold_for_search(input: &str) -> String {
    let folded: String = input
        .chars()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .flat_map(char::to_lowercase)
        .map(strip_diacritic)
        .collect();
    folded.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn strip_diacritic(c: char) -> char {
    match c {
        'à' | 'á' | 'ả' | 'ã' | 'ạ' | 'ă' | 'ằ' | 'ắ' | 'ẳ' | 'ẵ' | 'ặ' | 'â' | 'ầ' | 'ấ' | 'ẩ'
        | 'ẫ' | 'ậ' => 'a',
        'è' | 'é' | 'ẻ' | 'ẽ' | 'ẹ' | 'ê' | 'ề' | 'ế' | 'ể' | 'ễ' | 'ệ' => 'e',
        'ì' | 'í' | 'ỉ' | 'ĩ' | 'ị' => 'i',
        'ò' | 'ó' | 'ỏ' | 'õ' | 'ọ' | 'ô' | 'ồ' | 'ố' | 'ổ' | 'ỗ' | 'ộ' | 'ơ' | 'ờ' | 'ớ' | 'ở'
        | 'ỡ' | 'ợ' => 'o',
        'ù' | 'ú' | 'ủ' | 'ũ' | 'ụ' | 'ư' | 'ừ' | 'ứ' | 'ử' | 'ữ' | 'ự' => 'u',
        'ỳ' | 'ý' | 'ỷ' | 'ỹ' | 'ỵ' => 'y',
        'đ' => 'd',
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Vec<Patient> {
        let mut a = Patient::new("p1", "Nguyễn Văn An");
        a.gender = Gender::Male;
        a.blood_type = Some(BloodType::OPositive);
        a.phone = Some("0901234567".into());

        let mut b = Patient::new("p2", "Đặng Thị Bích");
        b.gender = Gender::Female;
        b.blood_type = Some(BloodType::APositive);

        let mut c = Patient::new("p3", "Lê Minh Châu");
        c.gender = Gender::Female;
        c.citizen_id = Some("079123456789".into());

        vec![a, b, c]
    }

    fn ids(patients: &[&Patient]) -> Vec<String> {
        patients.iter().map(|p| p.id.clone()).collect()
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let patients = sample();
        let filter = PatientFilter {
            query: Some("   ".into()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&patients).len(), 3);
    }

    #[test]
    fn test_query_ignores_diacritics_and_case() {
        let patients = sample();
        let filter = PatientFilter {
            query: Some("NGUYEN van".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&patients)), vec!["p1"]);

        let filter = PatientFilter {
            query: Some("dang".into()),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&patients)), vec!["p2"]);
    }

    #[test]
    fn test_query_matches_phone_and_citizen_id() {
        let patients = sample();
        for (needle, expected) in [("0901", "p1"), ("0791234", "p3")] {
            let filter = PatientFilter {
                query: Some(needle.into()),
                ..Default::default()
            };
            assert_eq!(ids(&filter.apply(&patients)), vec![expected]);
        }
    }

    #[test]
    fn test_gender_and_blood_type_combine() {
        let patients = sample();
        let filter = PatientFilter {
            gender: Some(Gender::Female),
            blood_type: Some(BloodType::APositive),
            ..Default::default()
        };
        assert_eq!(ids(&filter.apply(&patients)), vec!["p2"]);
    }

    #[test]
    fn test_fold_collapses_whitespace() {
        assert_eq!(fold_for_search("  Trần   Thị "), "tran thi");
    }

    #[test]
    fn test_fold_strips_decomposed_marks() {
        assert_eq!(fold_for_search("Nguye\u{0302}\u{0303}n"), "nguyen");
        assert_eq!(fold_for_search("Tra\u{0302}\u{0300}n Thi\u{0323}"), "tran thi");

        let patient = Patient::new("p9", "Nguye\u{0302}\u{0303}n Văn Hùng");
        let filter = PatientFilter {
            query: Some("nguyen van hung".into()),
            ..Default::default()
        };
        assert!(filter.matches(&patient));
    }
}
