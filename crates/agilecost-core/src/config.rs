use std::path::PathBuf;

use agilecost_parser::SlotKey;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike, Utc};
use thiserror::Error;

pub const DEFAULT_USAGE_CSV: &str = "data/electricity_records.csv";
pub const DEFAULT_PRICES_CSV: &str =
    "data/agile-half-hour-actual-rates-01-11-2022_20-12-2023.csv";

pub const SLOT_MINUTES: i64 = 30;

pub const ENV_USAGE_CSV: &str = "AGILECOST_USAGE_CSV";
pub const ENV_PRICES_CSV: &str = "AGILECOST_PRICES_CSV";
pub const ENV_START: &str = "AGILECOST_START";
pub const ENV_END: &str = "AGILECOST_END";
pub const ENV_FLAT_TARIFF: &str = "AGILECOST_FLAT_TARIFF";

const DEFAULT_START: NaiveDateTime = naive(2022, 11, 1, 0, 0);
const DEFAULT_END: NaiveDateTime = naive(2023, 10, 30, 23, 30);

const fn naive(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    let date = match NaiveDate::from_ymd_opt(year, month, day) {
        Some(date) => date,
        None => panic!("invalid date constant"),
    };
    let time = match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(time) => time,
        None => panic!("invalid time constant"),
    };
    date.and_time(time)
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("billing window start {start} must be before end {end}")]
    EmptyWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("billing window {field} {instant} is not on a half-hour boundary")]
    Misaligned {
        field: &'static str,
        instant: DateTime<Utc>,
    },

    #[error("could not parse {field} '{value}': expected 'YYYY-MM-DD HH:MM' (UTC) or RFC 3339")]
    InvalidInstant { field: &'static str, value: String },
}

/// Half-hour grid to bill over. `end` bounds slot starts and is exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BillingWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl BillingWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, ConfigError> {
        ensure_aligned("start", start)?;
        ensure_aligned("end", end)?;
        if start >= end {
            return Err(ConfigError::EmptyWindow { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn slots(&self) -> HalfHourSlots {
        HalfHourSlots {
            next: self.start,
            end: self.end,
        }
    }

    pub fn slot_count(&self) -> usize {
        let minutes = (self.end - self.start).num_minutes();
        // Aligned bounds make this exact.
        usize::try_from(minutes / SLOT_MINUTES).unwrap_or_default()
    }
}

impl Default for BillingWindow {
    fn default() -> Self {
        Self {
            start: DEFAULT_START.and_utc(),
            end: DEFAULT_END.and_utc(),
        }
    }
}

fn ensure_aligned(field: &'static str, instant: DateTime<Utc>) -> Result<(), ConfigError> {
    let aligned = instant.minute() % 30 == 0 && instant.second() == 0 && instant.nanosecond() == 0;
    if aligned {
        Ok(())
    } else {
        Err(ConfigError::Misaligned { field, instant })
    }
}

/// Accepts `YYYY-MM-DD HH:MM` (read as UTC) or an RFC 3339 instant.
pub fn parse_instant(field: &'static str, value: &str) -> Result<DateTime<Utc>, ConfigError> {
    let trimmed = value.trim();
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%d %H:%M") {
        return Ok(naive.and_utc());
    }
    DateTime::parse_from_rfc3339(trimmed)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| ConfigError::InvalidInstant {
            field,
            value: trimmed.to_string(),
        })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HalfHourSlot {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl HalfHourSlot {
    /// Slots are joined on their end instant.
    pub fn key(&self) -> SlotKey {
        SlotKey::from_utc(self.end)
    }
}

#[derive(Debug, Clone)]
pub struct HalfHourSlots {
    next: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Iterator for HalfHourSlots {
    type Item = HalfHourSlot;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let start = self.next;
        let end = start + TimeDelta::minutes(SLOT_MINUTES);
        self.next = end;
        Some(HalfHourSlot { start, end })
    }
}

/// Everything a run needs, resolved once at startup.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub usage_csv: PathBuf,
    pub prices_csv: PathBuf,
    pub window: BillingWindow,
    pub flat_tariff: Option<PathBuf>,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            usage_csv: PathBuf::from(DEFAULT_USAGE_CSV),
            prices_csv: PathBuf::from(DEFAULT_PRICES_CSV),
            window: BillingWindow::default(),
            flat_tariff: None,
        }
    }
}

/// Values given explicitly on the command line. Unset fields fall back to the
/// environment, then to the built-in defaults.
#[derive(Debug, Clone, Default)]
pub struct ConfigFlags {
    pub usage_csv: Option<PathBuf>,
    pub prices_csv: Option<PathBuf>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub flat_tariff: Option<PathBuf>,
}

impl RunConfig {
    /// Resolves each value as flag, then `env(var)`, then default.
    pub fn resolve<F>(flags: ConfigFlags, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let pick_path =
            |flag: Option<PathBuf>, var: &str| flag.or_else(|| env(var).map(PathBuf::from));

        let start = match flags.start.or_else(|| env(ENV_START)) {
            Some(value) => parse_instant("start", &value)?,
            None => defaults.window.start(),
        };
        let end = match flags.end.or_else(|| env(ENV_END)) {
            Some(value) => parse_instant("end", &value)?,
            None => defaults.window.end(),
        };

        Ok(Self {
            usage_csv: pick_path(flags.usage_csv, ENV_USAGE_CSV)
                .unwrap_or(defaults.usage_csv),
            prices_csv: pick_path(flags.prices_csv, ENV_PRICES_CSV)
                .unwrap_or(defaults.prices_csv),
            window: BillingWindow::new(start, end)?,
            flat_tariff: pick_path(flags.flat_tariff, ENV_FLAT_TARIFF),
        })
    }
}
