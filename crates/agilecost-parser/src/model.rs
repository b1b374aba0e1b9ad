use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, NaiveDateTime, SubsecRound, TimeDelta, Timelike, Utc};

/// Period-ending key shared by both series: a UTC instant truncated to the minute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey(NaiveDateTime);

impl SlotKey {
    pub const DISPLAY_FORMAT: &'static str = "%Y-%m-%d %H:%M";

    pub fn from_utc(instant: DateTime<Utc>) -> Self {
        let naive = instant.naive_utc().trunc_subsecs(0);
        Self(naive - TimeDelta::seconds(i64::from(naive.second())))
    }

    pub fn as_utc(&self) -> DateTime<Utc> {
        self.0.and_utc()
    }
}

impl From<DateTime<Utc>> for SlotKey {
    fn from(instant: DateTime<Utc>) -> Self {
        Self::from_utc(instant)
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(Self::DISPLAY_FORMAT))
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UsageRecord {
    pub half_hour_ending: DateTime<Utc>,
    pub usage_kwh: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceRecord {
    pub period_from: DateTime<Utc>,
    pub period_to: DateTime<Utc>,
    pub import_price_pence_per_kwh: f64,
    pub export_price_pence_per_kwh: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    FieldCount {
        expected: usize,
        found: usize,
    },
    InvalidField {
        column: &'static str,
        value: String,
        message: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::FieldCount { expected, found } => {
                write!(f, "expected {expected} fields, found {found}")
            }
            SkipReason::InvalidField {
                column,
                value,
                message,
            } => write!(f, "column '{column}' value '{value}': {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedRow {
    pub line: u64,
    pub reason: SkipReason,
}

/// Records keyed by period end. Inserting an existing key replaces the earlier record.
#[derive(Debug, Clone)]
pub struct TimeSeries<T> {
    records: BTreeMap<SlotKey, T>,
    skipped_rows: Vec<SkippedRow>,
}

pub type UsageSeries = TimeSeries<UsageRecord>;
pub type PriceSeries = TimeSeries<PriceRecord>;

impl<T> Default for TimeSeries<T> {
    fn default() -> Self {
        Self {
            records: BTreeMap::new(),
            skipped_rows: Vec::new(),
        }
    }
}

impl<T> TimeSeries<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: SlotKey, record: T) -> Option<T> {
        self.records.insert(key, record)
    }

    pub fn get(&self, key: &SlotKey) -> Option<&T> {
        self.records.get(key)
    }

    pub fn first(&self) -> Option<(&SlotKey, &T)> {
        self.records.iter().next()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, SlotKey, T> {
        self.records.iter()
    }

    pub fn skipped_rows(&self) -> &[SkippedRow] {
        &self.skipped_rows
    }

    pub(crate) fn record_skip(&mut self, line: u64, reason: SkipReason) {
        self.skipped_rows.push(SkippedRow { line, reason });
    }
}

impl<T> FromIterator<(SlotKey, T)> for TimeSeries<T> {
    fn from_iter<I: IntoIterator<Item = (SlotKey, T)>>(iter: I) -> Self {
        let mut series = Self::new();
        for (key, record) in iter {
            series.insert(key, record);
        }
        series
    }
}
