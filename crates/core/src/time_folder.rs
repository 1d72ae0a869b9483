//! Time folders: grouping patients into labelled periods by creation date.
//!
//! The patient list can be browsed as a set of folders, one per day, ISO week, month or year,
//! newest first. Folders are derived on demand from the current patient set and the selected
//! [`Granularity`]; nothing is cached between calls, so switching granularity always recomputes
//! from scratch.
//!
//! ## Keys and labels
//!
//! | Granularity | Label example      |
//! |-------------|--------------------|
//! | day         | `Ngày 05/01/2024`  |
//! | week        | `Tuần 01/2024`     |
//! | month       | `Tháng 01/2024`    |
//! | year        | `Năm 2024`         |
//!
//! Week folders use the ISO week-year, so 30 December 2024 falls in `Tuần 01/2025`.
//!
//! Patients whose creation timestamp is missing or unparseable all land in a single
//! `Không xác định` folder, which always sorts last.

use crate::constants::UNKNOWN_FOLDER_LABEL;
use crate::patient::Patient;
use crate::timestamps::parse_timestamp;
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Weekday};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// GRANULARITY
// ============================================================================

/// Size of the period each folder covers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Granularity {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Granularity {
    pub const ALL: [Granularity; 4] = [
        Granularity::Day,
        Granularity::Week,
        Granularity::Month,
        Granularity::Year,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "day" | "ngày" | "ngay" => Ok(Granularity::Day),
            "week" | "tuần" | "tuan" => Ok(Granularity::Week),
            "month" | "tháng" | "thang" => Ok(Granularity::Month),
            "year" | "năm" | "nam" => Ok(Granularity::Year),
            other => Err(format!(
                "unknown granularity '{other}' (expected day, week, month or year)"
            )),
        }
    }
}

// ============================================================================
// FOLDER KEY
// ============================================================================

/// The period a folder represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TimeFolderKey {
    Day(NaiveDate),
    /// ISO week-year and week number.
    Week { year: i32, week: u32 },
    Month { year: i32, month: u32 },
    Year(i32),
    Unknown,
}

impl TimeFolderKey {
    /// Key for a timestamp at the given granularity.
    pub fn for_timestamp(timestamp: &DateTime<FixedOffset>, granularity: Granularity) -> Self {
        match granularity {
            Granularity::Day => TimeFolderKey::Day(timestamp.date_naive()),
            Granularity::Week => {
                let iso = timestamp.iso_week();
                TimeFolderKey::Week {
                    year: iso.year(),
                    week: iso.week(),
                }
            }
            Granularity::Month => TimeFolderKey::Month {
                year: timestamp.year(),
                month: timestamp.month(),
            },
            Granularity::Year => TimeFolderKey::Year(timestamp.year()),
        }
    }

    /// Key for a raw backend timestamp; missing or unparseable values map to `Unknown`.
    pub fn for_raw(raw: Option<&str>, granularity: Granularity, offset: FixedOffset) -> Self {
        raw.and_then(|r| parse_timestamp(r, offset))
            .map(|ts| Self::for_timestamp(&ts, granularity))
            .unwrap_or(TimeFolderKey::Unknown)
    }

    pub fn label(&self) -> String {
        match self {
            TimeFolderKey::Day(date) => format!("Ngày {}", date.format("%d/%m/%Y")),
            TimeFolderKey::Week { year, week } => format!("Tuần {week:02}/{year}"),
            TimeFolderKey::Month { year, month } => format!("Tháng {month:02}/{year}"),
            TimeFolderKey::Year(year) => format!("Năm {year}"),
            TimeFolderKey::Unknown => UNKNOWN_FOLDER_LABEL.to_string(),
        }
    }

    /// Recovers a key from one of the four label shapes, or the unknown label.
    pub fn parse_label(label: &str) -> Option<Self> {
        let label = label.trim();
        if label == UNKNOWN_FOLDER_LABEL {
            return Some(TimeFolderKey::Unknown);
        }

        if let Some(rest) = label.strip_prefix("Ngày ") {
            return NaiveDate::parse_from_str(rest, "%d/%m/%Y")
                .ok()
                .map(TimeFolderKey::Day);
        }
        if let Some(rest) = label.strip_prefix("Tuần ") {
            let (week, year) = split_pair(rest)?;
            // Rejects week numbers the ISO calendar does not have for that year.
            NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)?;
            return Some(TimeFolderKey::Week { year, week });
        }
        if let Some(rest) = label.strip_prefix("Tháng ") {
            let (month, year) = split_pair(rest)?;
            NaiveDate::from_ymd_opt(year, month, 1)?;
            return Some(TimeFolderKey::Month { year, month });
        }
        if let Some(rest) = label.strip_prefix("Năm ") {
            return rest.parse::<i32>().ok().map(TimeFolderKey::Year);
        }

        None
    }

    /// First day of the represented period; `None` for the unknown folder.
    pub fn period_start(&self) -> Option<NaiveDate> {
        match *self {
            TimeFolderKey::Day(date) => Some(date),
            TimeFolderKey::Week { year, week } => {
                NaiveDate::from_isoywd_opt(year, week, Weekday::Mon)
            }
            TimeFolderKey::Month { year, month } => NaiveDate::from_ymd_opt(year, month, 1),
            TimeFolderKey::Year(year) => NaiveDate::from_ymd_opt(year, 1, 1),
            TimeFolderKey::Unknown => None,
        }
    }

    /// Folder order: newest period first, unknown last.
    pub fn display_order(&self, other: &Self) -> Ordering {
        match (self.period_start(), other.period_start()) {
            (Some(a), Some(b)) => b.cmp(&a),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }
}

fn split_pair(s: &str) -> Option<(u32, i32)> {
    let (first, year) = s.split_once('/')?;
    if first.len() != 2 || year.len() != 4 {
        return None;
    }
    Some((first.parse().ok()?, year.parse().ok()?))
}

impl fmt::Display for TimeFolderKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

// ============================================================================
// GROUPING
// ============================================================================

/// Anything with a creation timestamp that can be filed into time folders.
pub trait CreatedAt {
    fn created_at(&self) -> Option<&str>;
}

impl CreatedAt for Patient {
    fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }
}

/// A labelled bucket of items sharing a period.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeFolder<'a, T> {
    pub key: TimeFolderKey,
    pub label: String,
    /// Members in input order.
    pub items: Vec<&'a T>,
}

impl<T> TimeFolder<'_, T> {
    pub fn count(&self) -> usize {
        self.items.len()
    }
}

/// Partition `items` into folders at `granularity`, newest first, unknown last.
///
/// Every item lands in exactly one folder. Items keep their input order within a folder.
pub fn group_into_time_folders<T: CreatedAt>(
    items: &[T],
    granularity: Granularity,
    offset: FixedOffset,
) -> Vec<TimeFolder<'_, T>> {
    let mut index: HashMap<TimeFolderKey, usize> = HashMap::new();
    let mut folders: Vec<TimeFolder<'_, T>> = Vec::new();

    for item in items {
        let key = TimeFolderKey::for_raw(item.created_at(), granularity, offset);
        let slot = *index.entry(key).or_insert_with(|| {
            folders.push(TimeFolder {
                key,
                label: key.label(),
                items: Vec::new(),
            });
            folders.len() - 1
        });
        folders[slot].items.push(item);
    }

    // Stable sort; distinct keys never compare equal except the single unknown folder.
    folders.sort_by(|a, b| a.key.display_order(&b.key));

    tracing::debug!(
        granularity = %granularity,
        items = items.len(),
        folders = folders.len(),
        "grouped into time folders"
    );

    folders
}

/// Folder with the given label, if present.
pub fn find_folder<'f, 'a, T>(
    folders: &'f [TimeFolder<'a, T>],
    label: &str,
) -> Option<&'f TimeFolder<'a, T>> {
    let label = label.trim();
    folders.iter().find(|f| f.label == label)
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn ict() -> FixedOffset {
        FixedOffset::east_opt(7 * 3600).unwrap()
    }

    fn created_at_strategy() -> impl Strategy<Value = Option<String>> {
        prop_oneof![
            3 => (1990i32..2030, 1u32..=12, 1u32..=28, 0u32..24)
                .prop_map(|(y, m, d, h)| Some(format!("{y:04}-{m:02}-{d:02}T{h:02}:00:00Z"))),
            1 => Just(None),
            1 => "[a-z ]{0,8}".prop_map(Some),
        ]
    }

    fn granularity_strategy() -> impl Strategy<Value = Granularity> {
        prop::sample::select(Granularity::ALL.to_vec())
    }

    fn patients_strategy() -> impl Strategy<Value = Vec<Patient>> {
        prop::collection::vec(created_at_strategy(), 0..60).prop_map(|dates| {
            dates
                .into_iter()
                .enumerate()
                .map(|(i, created_at)| {
                    let mut p = Patient::new(i.to_string(), format!("P{i}"));
                    p.created_at = created_at;
                    p
                })
                .collect()
        })
    }

    proptest! {
        #[test]
        fn prop_every_patient_in_exactly_one_folder(
            patients in patients_strategy(),
            granularity in granularity_strategy(),
        ) {
            let folders = group_into_time_folders(&patients, granularity, ict());
            let mut seen: Vec<&str> = folders
                .iter()
                .flat_map(|f| f.items.iter().map(|p| p.id.as_str()))
                .collect();
            seen.sort_unstable();
            let mut expected: Vec<&str> = patients.iter().map(|p| p.id.as_str()).collect();
            expected.sort_unstable();
            prop_assert_eq!(seen, expected);
            prop_assert!(folders.iter().all(|f| f.count() > 0));
        }

        #[test]
        fn prop_folders_descend_and_unknown_is_last(
            patients in patients_strategy(),
            granularity in granularity_strategy(),
        ) {
            let folders = group_into_time_folders(&patients, granularity, ict());
            for pair in folders.windows(2) {
                prop_assert_eq!(pair[0].key.display_order(&pair[1].key), Ordering::Less);
            }
            if let Some(pos) = folders.iter().position(|f| f.key == TimeFolderKey::Unknown) {
                prop_assert_eq!(pos, folders.len() - 1);
            }
            for folder in &folders {
                prop_assert_eq!(TimeFolderKey::parse_label(&folder.label), Some(folder.key));
            }
        }

        #[test]
        fn prop_switching_granularity_back_is_identical(
            patients in patients_strategy(),
            first in granularity_strategy(),
            second in granularity_strategy(),
        ) {
            let before = group_into_time_folders(&patients, first, ict());
            let _other = group_into_time_folders(&patients, second, ict());
            let after = group_into_time_folders(&patients, first, ict());
            prop_assert_eq!(before, after);
        }
    }
}
