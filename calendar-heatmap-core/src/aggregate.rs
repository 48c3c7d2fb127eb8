//! Aggregation of day records into category summaries.
//!
//! Day summaries are memoised on the record the first time they are computed.
//! Period aggregates (year, month, week) are folded on demand and never cached.

use std::borrow::Cow;
use std::collections::HashMap;

use chrono::{Datelike, Duration, NaiveDate};

use crate::types::{AggregateNode, CategorySummary, DayRecord};

/// Time period a level of the heatmap aggregates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    /// Full year (e.g., 2024)
    Year(i32),
    /// Specific month (year, month 1-12)
    Month(i32, u32),
    /// Sunday-start week, identified by its first day
    Week(NaiveDate),
}

impl Period {
    /// Period of the given kind containing `date`.
    pub fn year_of(date: NaiveDate) -> Self {
        Period::Year(date.year())
    }

    pub fn month_of(date: NaiveDate) -> Self {
        Period::Month(date.year(), date.month())
    }

    pub fn week_of(date: NaiveDate) -> Self {
        Period::Week(start_of_week(date))
    }

    /// First day of the period.
    pub fn start(&self) -> NaiveDate {
        match *self {
            Period::Year(year) => first_of_month(year, 1),
            Period::Month(year, month) => first_of_month(year, month),
            Period::Week(start) => start,
        }
    }

    /// First day after the period (exclusive end).
    pub fn end(&self) -> NaiveDate {
        match *self {
            Period::Year(year) => first_of_month(year + 1, 1),
            Period::Month(year, month) => {
                let (next_year, next_month) = if month == 12 {
                    (year + 1, 1)
                } else {
                    (year, month + 1)
                };
                first_of_month(next_year, next_month)
            }
            Period::Week(start) => start + Duration::days(7),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start() <= date && date < self.end()
    }

    /// Date an aggregate of this period is anchored on.
    pub fn anchor(&self) -> NaiveDate {
        self.start()
    }

    /// Get display name for this period.
    pub fn display_name(&self) -> String {
        match *self {
            Period::Year(year) => format!("{}", year),
            Period::Month(year, month) => {
                format!("{} {}", crate::format::month_label(month), year)
            }
            Period::Week(start) => format!("Week {}", week_number(start)),
        }
    }
}

fn first_of_month(year: i32, month: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(NaiveDate::MIN)
}

/// Sunday on or before `date`.
pub fn start_of_week(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_sunday() as i64)
}

/// Week of year with Sunday-start weeks, where week 1 contains January 1st.
///
/// The last days of December belong to week 1 when their week contains the
/// next January 1st.
pub fn week_number(date: NaiveDate) -> u32 {
    let week_start = start_of_week(date);
    let week_end = week_start + Duration::days(6);
    if week_end.year() > week_start.year() {
        return 1;
    }
    let jan1 = first_of_month(date.year(), 1);
    let first_week = start_of_week(jan1);
    ((week_start - first_week).num_days() / 7) as u32 + 1
}

fn sorted_summary(totals: HashMap<String, u64>) -> Vec<CategorySummary> {
    let mut summary: Vec<CategorySummary> = totals
        .into_iter()
        .map(|(name, value)| CategorySummary { name, value })
        .collect();
    // Name tiebreak keeps the order stable across runs.
    summary.sort_by(|a, b| b.value.cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    summary
}

/// Fold a record's details into a name-keyed summary without caching it.
pub fn compute_summary(record: &DayRecord) -> Vec<CategorySummary> {
    let mut totals: HashMap<String, u64> = HashMap::new();
    for detail in &record.details {
        let value = totals.entry(detail.name.clone()).or_default();
        *value = value.saturating_add(detail.value);
    }
    sorted_summary(totals)
}

/// Summary of a day record, computed and stored on first use.
///
/// A record that already carries a summary is returned unchanged.
pub fn summarize(record: &mut DayRecord) -> &[CategorySummary] {
    if record.summary.is_none() {
        record.summary = Some(compute_summary(record));
    }
    record.summary.as_deref().unwrap_or_default()
}

/// Memoised summary when present, otherwise a freshly computed one.
pub fn summary_of(record: &DayRecord) -> Cow<'_, [CategorySummary]> {
    match &record.summary {
        Some(summary) => Cow::Borrowed(summary.as_slice()),
        None => Cow::Owned(compute_summary(record)),
    }
}

/// Summarize every record of a dataset.
pub fn summarize_all(data: &mut [DayRecord]) {
    for record in data.iter_mut() {
        summarize(record);
    }
}

/// Fold all records matching `predicate` into one aggregate anchored at `anchor`.
///
/// An empty match yields a zero total and an empty summary.
pub fn aggregate_where<F>(records: &[DayRecord], anchor: NaiveDate, predicate: F) -> AggregateNode
where
    F: Fn(&DayRecord) -> bool,
{
    let mut total: u64 = 0;
    let mut totals: HashMap<String, u64> = HashMap::new();

    for record in records.iter().filter(|r| predicate(r)) {
        total = u64::saturating_add(total, record.total);
        for entry in summary_of(record).iter() {
            let value = totals.entry(entry.name.clone()).or_default();
            *value = value.saturating_add(entry.value);
        }
    }

    AggregateNode {
        date: anchor,
        total,
        summary: sorted_summary(totals),
    }
}

/// Aggregate all records falling inside `period`.
pub fn aggregate_period(records: &[DayRecord], period: Period) -> AggregateNode {
    aggregate_where(records, period.anchor(), |r| period.contains(r.date))
}

/// Whether any record falls inside `period`.
pub fn period_has_data(records: &[DayRecord], period: Period) -> bool {
    records.iter().any(|r| period.contains(r.date))
}

/// Records inside `period`, in dataset order, with their dataset indices.
pub fn records_in(records: &[DayRecord], period: Period) -> Vec<(usize, &DayRecord)> {
    records
        .iter()
        .enumerate()
        .filter(|(_, r)| period.contains(r.date))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DetailEntry;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn detail(day: NaiveDate, name: &str, hour: u32, value: u64) -> DetailEntry {
        DetailEntry {
            name: name.to_string(),
            date: day.and_hms_opt(hour, 0, 0).unwrap(),
            value,
        }
    }

    fn record(day: NaiveDate, details: &[(&str, u64)]) -> DayRecord {
        let details = details
            .iter()
            .enumerate()
            .map(|(i, (name, value))| detail(day, name, i as u32, *value))
            .collect();
        DayRecord::new(day, details)
    }

    #[test]
    fn test_summarize_folds_and_sorts() {
        let mut r = record(
            date(2024, 1, 2),
            &[("beta", 100), ("alpha", 50), ("beta", 25), ("gamma", 300)],
        );
        let summary = summarize(&mut r).to_vec();
        assert_eq!(
            summary,
            vec![
                CategorySummary::new("gamma", 300),
                CategorySummary::new("beta", 125),
                CategorySummary::new("alpha", 50),
            ]
        );
        let sum: u64 = summary.iter().map(|s| s.value).sum();
        assert_eq!(sum, r.total);
    }

    #[test]
    fn test_summarize_is_memoised() {
        let mut r = record(date(2024, 1, 2), &[("alpha", 10)]);
        r.summary = Some(vec![CategorySummary::new("given", 10)]);
        assert_eq!(summarize(&mut r), &[CategorySummary::new("given", 10)]);

        let mut r = record(date(2024, 1, 2), &[("alpha", 10)]);
        summarize(&mut r);
        r.details.push(detail(date(2024, 1, 2), "late", 5, 99));
        assert_eq!(summarize(&mut r), &[CategorySummary::new("alpha", 10)]);
    }

    #[test]
    fn test_aggregate_period_merges_by_name() {
        let mut data = vec![
            record(date(2023, 12, 31), &[("alpha", 1000)]),
            record(date(2024, 1, 1), &[("alpha", 100), ("beta", 40)]),
            record(date(2024, 6, 1), &[("beta", 80)]),
        ];
        summarize_all(&mut data);

        let node = aggregate_period(&data, Period::Year(2024));
        assert_eq!(node.date, date(2024, 1, 1));
        assert_eq!(node.total, 220);
        assert_eq!(
            node.summary,
            vec![
                CategorySummary::new("beta", 120),
                CategorySummary::new("alpha", 100),
            ]
        );
    }

    #[test]
    fn test_aggregate_without_cached_summaries() {
        let data = vec![record(date(2024, 2, 1), &[("alpha", 5), ("alpha", 5)])];
        let node = aggregate_period(&data, Period::Month(2024, 2));
        assert_eq!(node.summary, vec![CategorySummary::new("alpha", 10)]);
    }

    #[test]
    fn test_aggregate_empty_range() {
        let data = vec![record(date(2024, 2, 1), &[("alpha", 5)])];
        let node = aggregate_period(&data, Period::Year(1999));
        assert_eq!(node.total, 0);
        assert!(node.summary.is_empty());

        let node = aggregate_where(&[], date(2024, 1, 1), |_| true);
        assert_eq!(node.total, 0);
        assert!(node.summary.is_empty());
    }

    #[test]
    fn test_period_bounds() {
        assert_eq!(Period::Month(2024, 12).end(), date(2025, 1, 1));
        assert_eq!(Period::Month(2024, 2).end(), date(2024, 3, 1));
        assert!(Period::Month(2024, 2).contains(date(2024, 2, 29)));
        assert!(!Period::Month(2024, 2).contains(date(2024, 3, 1)));

        // 2024-03-06 is a Wednesday
        let week = Period::week_of(date(2024, 3, 6));
        assert_eq!(week.start(), date(2024, 3, 3));
        assert_eq!(week.end(), date(2024, 3, 10));
        assert!(week.contains(date(2024, 3, 9)));
        assert!(!week.contains(date(2024, 3, 10)));
    }

    #[test]
    fn test_week_number() {
        // Jan 1st 2024 is a Monday; its week starts Sunday Dec 31st 2023
        assert_eq!(week_number(date(2024, 1, 1)), 1);
        assert_eq!(week_number(date(2023, 12, 31)), 1);
        assert_eq!(week_number(date(2024, 1, 7)), 2);
        assert_eq!(week_number(date(2024, 3, 6)), 10);
        assert_eq!(Period::week_of(date(2024, 3, 6)).display_name(), "Week 10");
    }

    #[test]
    fn test_period_display_name() {
        assert_eq!(Period::Year(2024).display_name(), "2024");
        assert_eq!(Period::Month(2024, 3).display_name(), "Mar 2024");
    }
}
