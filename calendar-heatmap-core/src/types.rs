//! Core domain types for the calendar heatmap
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Overview** | The current zoom granularity: global, year, month, week or day |
//! | **DayRecord** | One day of tracked time with its raw detail entries |
//! | **Detail** | A single tracked interval: category, start timestamp, duration |
//! | **Summary** | Category totals for a scope, sorted by value descending |
//! | **AggregateNode** | A synthesized year/month/week scope folded from day records |
//!
//! Durations are whole seconds throughout.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

use crate::error::Error;

// ============================================
// Overview
// ============================================

/// Zoom level of the heatmap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Overview {
    /// All years side by side
    #[default]
    Global,
    /// One year, one cell per day
    Year,
    /// One month, one stacked block per day
    Month,
    /// One week, one stacked block per day
    Week,
    /// One day, one bar per tracked interval
    Day,
}

impl Overview {
    pub const ALL: [Overview; 5] = [
        Overview::Global,
        Overview::Year,
        Overview::Month,
        Overview::Week,
        Overview::Day,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Overview::Global => "global",
            Overview::Year => "year",
            Overview::Month => "month",
            Overview::Week => "week",
            Overview::Day => "day",
        }
    }
}

impl std::fmt::Display for Overview {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Overview {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "global" => Ok(Overview::Global),
            "year" => Ok(Overview::Year),
            "month" => Ok(Overview::Month),
            "week" => Ok(Overview::Week),
            "day" => Ok(Overview::Day),
            other => Err(Error::UnknownOverview(other.to_string())),
        }
    }
}

// ============================================
// Records
// ============================================

/// A single tracked interval inside a day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailEntry {
    /// Category label (project, activity, ...)
    pub name: String,
    /// When the interval started
    pub date: NaiveDateTime,
    /// Duration in seconds
    pub value: u64,
}

impl DetailEntry {
    /// End of the interval.
    ///
    /// Durations too large for the calendar end at the last millisecond of
    /// the start day.
    pub fn end(&self) -> NaiveDateTime {
        i64::try_from(self.value)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|delta| self.date.checked_add_signed(delta))
            .unwrap_or_else(|| self.end_of_day())
    }

    fn end_of_day(&self) -> NaiveDateTime {
        self.date
            .date()
            .and_hms_milli_opt(23, 59, 59, 999)
            .unwrap_or(self.date)
    }
}

/// Total time for one category within a scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub name: String,
    pub value: u64,
}

impl CategorySummary {
    pub fn new(name: impl Into<String>, value: u64) -> Self {
        Self {
            name: name.into(),
            value,
        }
    }
}

/// One day of tracked time.
///
/// `summary` is derived from `details` the first time it is needed and kept
/// from then on; see [`crate::aggregate::summarize`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "DayRecordInput")]
pub struct DayRecord {
    pub date: NaiveDate,
    /// Seconds tracked on this day
    pub total: u64,
    pub details: Vec<DetailEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<Vec<CategorySummary>>,
}

impl DayRecord {
    /// Build a record from raw details; the total is the sum of the details.
    pub fn new(date: NaiveDate, details: Vec<DetailEntry>) -> Self {
        let total = details.iter().fold(0, |sum, d| u64::saturating_add(sum, d.value));
        Self {
            date,
            total,
            details,
            summary: None,
        }
    }
}

/// Wire shape of a day record: `total` and `summary` are optional.
#[derive(Deserialize)]
struct DayRecordInput {
    date: NaiveDate,
    #[serde(default)]
    total: Option<u64>,
    #[serde(default)]
    details: Vec<DetailEntry>,
    #[serde(default)]
    summary: Option<Vec<CategorySummary>>,
}

impl From<DayRecordInput> for DayRecord {
    fn from(input: DayRecordInput) -> Self {
        let total = input
            .total
            .unwrap_or_else(|| {
                input
                    .details
                    .iter()
                    .fold(0, |sum, d| u64::saturating_add(sum, d.value))
            });
        Self {
            date: input.date,
            total,
            details: input.details,
            summary: input.summary,
        }
    }
}

/// A year, month or week folded from its day records.
///
/// Recomputed on every render of the level that shows it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateNode {
    /// Anchor date of the period (its first day)
    pub date: NaiveDate,
    pub total: u64,
    pub summary: Vec<CategorySummary>,
}

// ============================================
// Navigation
// ============================================

/// What the user drilled into.
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    /// A day record, by index into the dataset
    Day(usize),
    /// A synthesized year/month/week
    Period(AggregateNode),
}

impl Selection {
    /// Date the selection is anchored on.
    pub fn date(&self, data: &[DayRecord]) -> Option<NaiveDate> {
        match self {
            Selection::Day(index) => data.get(*index).map(|d| d.date),
            Selection::Period(node) => Some(node.date),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overview_round_trip_names() {
        for overview in Overview::ALL {
            assert_eq!(overview.as_str().parse::<Overview>().unwrap(), overview);
        }
        assert!("decade".parse::<Overview>().is_err());
        assert_eq!(" Year ".parse::<Overview>().unwrap(), Overview::Year);
    }

    #[test]
    fn test_day_record_total_defaults_to_detail_sum() {
        let json = r#"{
            "date": "2024-03-05",
            "details": [
                {"name": "alpha", "date": "2024-03-05T09:00:00", "value": 600},
                {"name": "beta", "date": "2024-03-05T10:00:00", "value": 300}
            ]
        }"#;
        let record: DayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total, 900);
        assert!(record.summary.is_none());
        assert_eq!(record.details[1].end().to_string(), "2024-03-05 10:05:00");
    }

    #[test]
    fn test_oversized_duration_ends_with_the_day() {
        let json = r#"{
            "date": "2024-03-05",
            "details": [
                {"name": "alpha", "date": "2024-03-05T09:00:00", "value": 10000000000000000},
                {"name": "beta", "date": "2024-03-05T10:00:00", "value": 18446744073709551615}
            ]
        }"#;
        let record: DayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total, u64::MAX);
        for detail in &record.details {
            assert_eq!(detail.end().to_string(), "2024-03-05 23:59:59.999");
        }
    }

    #[test]
    fn test_day_record_keeps_provided_total_and_summary() {
        let json = r#"{
            "date": "2024-03-05",
            "total": 42,
            "details": [],
            "summary": [{"name": "alpha", "value": 42}]
        }"#;
        let record: DayRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.total, 42);
        assert_eq!(
            record.summary,
            Some(vec![CategorySummary::new("alpha", 42)])
        );
    }
}
