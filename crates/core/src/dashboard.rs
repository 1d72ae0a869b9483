//! Aggregate statistics for the dashboard home page.

use crate::patient::{BloodType, Gender, Patient};
use crate::time_folder::{group_into_time_folders, Granularity, TimeFolderKey};
use chrono::{Datelike, FixedOffset, NaiveDate};
use std::collections::BTreeMap;

/// Longest monthly intake series the dashboard computes.
pub const MAX_INTAKE_MONTHS: u32 = 120;

/// Age brackets shown on the dashboard.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AgeBracket {
    Child,
    YoungAdult,
    MiddleAged,
    Senior,
    Unknown,
}

impl AgeBracket {
    pub const ALL: [AgeBracket; 5] = [
        AgeBracket::Child,
        AgeBracket::YoungAdult,
        AgeBracket::MiddleAged,
        AgeBracket::Senior,
        AgeBracket::Unknown,
    ];

    pub fn for_age(age: Option<u32>) -> Self {
        match age {
            Some(0..=17) => AgeBracket::Child,
            Some(18..=39) => AgeBracket::YoungAdult,
            Some(40..=59) => AgeBracket::MiddleAged,
            Some(_) => AgeBracket::Senior,
            None => AgeBracket::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AgeBracket::Child => "0-17",
            AgeBracket::YoungAdult => "18-39",
            AgeBracket::MiddleAged => "40-59",
            AgeBracket::Senior => "60+",
            AgeBracket::Unknown => "Chưa rõ",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DashboardStats {
    pub total_patients: usize,
    pub new_this_month: usize,
    pub by_gender: Vec<(Gender, usize)>,
    pub by_blood_type: BTreeMap<BloodType, usize>,
    pub by_age: Vec<(AgeBracket, usize)>,
    pub average_age: Option<f64>,
    pub with_allergies: usize,
    /// Month labels with counts, oldest first, ending at the current month. Months without new
    /// patients are present with a zero count.
    pub monthly_intake: Vec<(String, usize)>,
}

impl DashboardStats {
    /// Computes statistics over `patients` as of `today`, with a `months`-long intake series
    /// clamped to `1..=MAX_INTAKE_MONTHS`.
    pub fn compute(
        patients: &[Patient],
        today: NaiveDate,
        offset: FixedOffset,
        months: u32,
    ) -> Self {
        let mut gender_counts = [0usize; 4];
        let mut by_blood_type = BTreeMap::new();
        let mut age_counts = [0usize; 5];
        let mut age_sum = 0u64;
        let mut aged = 0u64;
        let mut with_allergies = 0;

        for patient in patients {
            let gender_slot = match patient.gender {
                Gender::Male => 0,
                Gender::Female => 1,
                Gender::Other => 2,
                Gender::Unknown => 3,
            };
            gender_counts[gender_slot] += 1;

            if let Some(blood_type) = patient.blood_type {
                *by_blood_type.entry(blood_type).or_insert(0) += 1;
            }

            let age = patient.age_on(today, offset);
            if let Some(age) = age {
                age_sum += u64::from(age);
                aged += 1;
            }
            let bracket = AgeBracket::for_age(age);
            if let Some(slot) = AgeBracket::ALL.iter().position(|b| *b == bracket) {
                age_counts[slot] += 1;
            }

            if !patient.allergies.is_empty() {
                with_allergies += 1;
            }
        }

        let folders = group_into_time_folders(patients, Granularity::Month, offset);
        let month_count = |year: i32, month: u32| {
            folders
                .iter()
                .find(|f| f.key == TimeFolderKey::Month { year, month })
                .map_or(0, |f| f.count())
        };

        let monthly_intake = trailing_months(today, months.clamp(1, MAX_INTAKE_MONTHS))
            .into_iter()
            .map(|(year, month)| {
                (
                    TimeFolderKey::Month { year, month }.label(),
                    month_count(year, month),
                )
            })
            .collect();

        Self {
            total_patients: patients.len(),
            new_this_month: month_count(today.year(), today.month()),
            by_gender: [Gender::Male, Gender::Female, Gender::Other, Gender::Unknown]
                .into_iter()
                .zip(gender_counts)
                .collect(),
            by_blood_type,
            by_age: AgeBracket::ALL.into_iter().zip(age_counts).collect(),
            average_age: (aged > 0).then(|| age_sum as f64 / aged as f64),
            with_allergies,
            monthly_intake,
        }
    }
}

/// `(year, month)` pairs for the `count` months ending at `today`'s month, oldest first.
fn trailing_months(today: NaiveDate, count: u32) -> Vec<(i32, u32)> {
    let current = today.year() * 12 + today.month0() as i32;
    (0..count as i32)
        .rev()
        .map(|back| {
            let index = current - back;
            (index.div_euclid(12), index.rem_euclid(12) as u32 + 1)
        })
        .collect()
}
