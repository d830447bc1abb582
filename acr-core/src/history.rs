//! The historical record store: daily weather observations for one airport
//! over many years, indexed by calendar day (month, day) ignoring year.

use crate::error::{AcrError, Result};
use crate::feature::FeatureSet;
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::collections::HashMap;

/// One observed day: the date and one value per feature, in feature-set order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoricalEntry {
    pub date: NaiveDate,
    pub values: Vec<f64>,
}

impl HistoricalEntry {
    pub fn new(date: NaiveDate, values: Vec<f64>) -> Self {
        HistoricalEntry { date, values }
    }

    pub fn month(&self) -> u32 {
        self.date.month()
    }

    pub fn day(&self) -> u32 {
        self.date.day()
    }

    pub fn value(&self, feature_index: usize) -> Option<f64> {
        self.values.get(feature_index).copied()
    }
}

/// Immutable, date-ordered collection of [`HistoricalEntry`] rows.
///
/// Built once per airport session and only read afterwards, so it can be
/// shared across threads behind an `Arc` without locking.
#[derive(Debug, Clone)]
pub struct HistoricalStore {
    features: FeatureSet,
    entries: Vec<HistoricalEntry>,
    by_month_day: HashMap<(u32, u32), Vec<usize>>,
}

impl HistoricalStore {
    /// Build a store from entries whose values follow `features` order.
    ///
    /// Entries are sorted by date. Two entries for the same date are
    /// rejected, as is an entry with the wrong number of values.
    pub fn new(features: FeatureSet, mut entries: Vec<HistoricalEntry>) -> Result<Self> {
        for entry in &entries {
            if entry.values.len() != features.len() {
                return Err(AcrError::configuration(format!(
                    "historical entry for {} has {} values, expected {}",
                    entry.date,
                    entry.values.len(),
                    features.len()
                )));
            }
        }
        entries.sort_by_key(|entry| entry.date);
        if let Some(pair) = entries.windows(2).find(|pair| pair[0].date == pair[1].date) {
            return Err(AcrError::configuration(format!(
                "historical record contains {} more than once",
                pair[0].date
            )));
        }

        let mut by_month_day: HashMap<(u32, u32), Vec<usize>> = HashMap::new();
        for (index, entry) in entries.iter().enumerate() {
            by_month_day
                .entry((entry.month(), entry.day()))
                .or_default()
                .push(index);
        }

        Ok(HistoricalStore {
            features,
            entries,
            by_month_day,
        })
    }

    /// The columns this store holds, in value order.
    pub fn features(&self) -> &FeatureSet {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[HistoricalEntry] {
        &self.entries
    }

    /// First and last recorded dates.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        match (self.entries.first(), self.entries.last()) {
            (Some(first), Some(last)) => Some((first.date, last.date)),
            _ => None,
        }
    }

    /// All entries recorded on `month`/`day` in any year, oldest first.
    /// May be empty.
    pub fn slice(&self, month: u32, day: u32) -> HistoricalSlice<'_> {
        let entries = self
            .by_month_day
            .get(&(month, day))
            .map(|indices| indices.iter().map(|&i| &self.entries[i]).collect())
            .unwrap_or_default();
        HistoricalSlice {
            month,
            day,
            entries,
        }
    }
}

/// Every entry for one calendar day across all recorded years.
#[derive(Debug, Clone)]
pub struct HistoricalSlice<'a> {
    month: u32,
    day: u32,
    entries: Vec<&'a HistoricalEntry>,
}

impl<'a> HistoricalSlice<'a> {
    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn day(&self) -> u32 {
        self.day
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a HistoricalEntry> + '_ {
        self.entries.iter().copied()
    }

    /// The entries dated on or before `date`.
    pub fn through(&self, date: NaiveDate) -> HistoricalSlice<'a> {
        let end = self.entries.partition_point(|entry| entry.date <= date);
        HistoricalSlice {
            month: self.month,
            day: self.day,
            entries: self.entries[..end].to_vec(),
        }
    }

    /// The `n` most recent entries (fewer if the slice is shorter), oldest first.
    pub fn most_recent(&self, n: usize) -> &[&'a HistoricalEntry] {
        let start = self.entries.len().saturating_sub(n);
        &self.entries[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn store() -> HistoricalStore {
        let features = FeatureSet::new(["wind", "snow"]).unwrap();
        HistoricalStore::new(
            features,
            vec![
                HistoricalEntry::new(date(2020, 1, 28), vec![10.0, 0.0]),
                HistoricalEntry::new(date(2018, 1, 28), vec![30.0, 2.0]),
                HistoricalEntry::new(date(2019, 1, 29), vec![5.0, 9.0]),
                HistoricalEntry::new(date(2019, 1, 28), vec![12.0, 1.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_slice_ignores_year_and_orders_by_date() {
        let store = store();
        let slice = store.slice(1, 28);
        assert_eq!(slice.len(), 3);
        let years: Vec<i32> = slice.iter().map(|e| e.date.year()).collect();
        assert_eq!(years, vec![2018, 2019, 2020]);
    }

    #[test]
    fn test_slice_can_be_empty() {
        let store = store();
        assert!(store.slice(7, 4).is_empty());
    }

    #[test]
    fn test_most_recent_takes_tail() {
        let store = store();
        let slice = store.slice(1, 28);
        let recent = slice.most_recent(2);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].date, date(2019, 1, 28));
        assert_eq!(recent[1].date, date(2020, 1, 28));
        assert_eq!(slice.most_recent(10).len(), 3);
    }

    #[test]
    fn test_through_drops_later_years() {
        let store = store();
        let slice = store.slice(1, 28).through(date(2019, 6, 1));
        assert_eq!(slice.len(), 2);
        assert_eq!(slice.most_recent(1)[0].date, date(2019, 1, 28));
        assert_eq!(store.slice(1, 28).through(date(2019, 1, 28)).len(), 2);
        assert!(store.slice(1, 28).through(date(2017, 12, 31)).is_empty());
    }

    #[test]
    fn test_date_span() {
        let store = store();
        assert_eq!(store.date_span(), Some((date(2018, 1, 28), date(2020, 1, 28))));
    }

    #[test]
    fn test_wrong_value_count_is_rejected() {
        let features = FeatureSet::new(["wind", "snow"]).unwrap();
        let result = HistoricalStore::new(
            features,
            vec![HistoricalEntry::new(date(2020, 1, 1), vec![1.0])],
        );
        assert!(matches!(result, Err(AcrError::Configuration(_))));
    }

    #[test]
    fn test_duplicate_dates_are_rejected() {
        let features = FeatureSet::new(["wind"]).unwrap();
        let result = HistoricalStore::new(
            features,
            vec![
                HistoricalEntry::new(date(2020, 1, 1), vec![1.0]),
                HistoricalEntry::new(date(2020, 1, 1), vec![2.0]),
            ],
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_store_is_shareable_across_threads() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<HistoricalStore>();
    }
}
