use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

use crate::reconcile::Reconciliation;

#[derive(Debug, Error)]
pub enum TariffError {
    #[error("could not read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("period '{name}' ends ({to}) before it starts ({from})")]
    InvertedPeriod {
        name: String,
        from: NaiveDate,
        to: NaiveDate,
    },

    #[error("period '{name}' has invalid {field}: {value}")]
    InvalidRate {
        name: String,
        field: &'static str,
        value: f64,
    },

    #[error("periods '{first}' and '{second}' overlap")]
    Overlap { first: String, second: String },
}

/// A fixed-rate tariff in force over an inclusive date range.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FlatTariffPeriod {
    pub name: String,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub unit_rate_pence: f64,
    pub standing_charge_pence_per_day: f64,
}

impl FlatTariffPeriod {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from <= date && date <= self.to
    }

    fn validate(&self) -> Result<(), TariffError> {
        if self.from > self.to {
            return Err(TariffError::InvertedPeriod {
                name: self.name.clone(),
                from: self.from,
                to: self.to,
            });
        }
        for (field, value) in [
            ("unit_rate_pence", self.unit_rate_pence),
            (
                "standing_charge_pence_per_day",
                self.standing_charge_pence_per_day,
            ),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TariffError::InvalidRate {
                    name: self.name.clone(),
                    field,
                    value,
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct ScheduleFile {
    #[serde(default, rename = "period")]
    periods: Vec<FlatTariffPeriod>,
}

/// Non-overlapping flat tariff periods, ordered by start date.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatTariffSchedule {
    periods: Vec<FlatTariffPeriod>,
}

impl FlatTariffSchedule {
    pub fn new(mut periods: Vec<FlatTariffPeriod>) -> Result<Self, TariffError> {
        for period in &periods {
            period.validate()?;
        }
        periods.sort_by_key(|period| period.from);
        for pair in periods.windows(2) {
            if pair[1].from <= pair[0].to {
                return Err(TariffError::Overlap {
                    first: pair[0].name.clone(),
                    second: pair[1].name.clone(),
                });
            }
        }
        Ok(Self { periods })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, TariffError> {
        let file: ScheduleFile = toml::from_str(content)?;
        Self::new(file.periods)
    }

    pub fn load(path: &Path) -> Result<Self, TariffError> {
        let content = fs::read_to_string(path).map_err(|source| TariffError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let schedule = Self::from_toml_str(&content)?;
        info!(
            path = %path.display(),
            periods = schedule.periods.len(),
            "Loaded flat tariff schedule"
        );
        Ok(schedule)
    }

    pub fn periods(&self) -> &[FlatTariffPeriod] {
        &self.periods
    }

    pub fn period_for(&self, date: NaiveDate) -> Option<&FlatTariffPeriod> {
        self.periods.iter().find(|period| period.contains(date))
    }
}

/// Flat tariff cost of the consumption in a reconciled window, next to the
/// Agile cost of the same slots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatComparison {
    pub covered_days: usize,
    pub covered_slots: usize,
    pub uncovered_slots: usize,
    pub consumption_kwh: f64,
    pub unit_cost_pence: f64,
    pub standing_charge_pence: f64,
    pub agile_cost_pence: f64,
    /// Covered slots with no Agile price; they count towards the flat cost only.
    pub agile_unpriced_slots: usize,
}

impl FlatComparison {
    pub fn flat_cost_pence(&self) -> f64 {
        self.unit_cost_pence + self.standing_charge_pence
    }

    pub fn flat_cost_pounds(&self) -> f64 {
        self.flat_cost_pence() / 100.0
    }

    pub fn agile_cost_pounds(&self) -> f64 {
        self.agile_cost_pence / 100.0
    }
}

/// Slots are assigned to a period by the UTC date of their start. Each covered
/// day adds its period's standing charge once.
pub fn compare(reconciliation: &Reconciliation, schedule: &FlatTariffSchedule) -> FlatComparison {
    let mut comparison = FlatComparison::default();
    let mut days = BTreeSet::new();

    for slot in &reconciliation.slots {
        let date = slot.start.date_naive();
        let Some(period) = schedule.period_for(date) else {
            comparison.uncovered_slots += 1;
            continue;
        };

        comparison.covered_slots += 1;
        comparison.consumption_kwh += slot.usage_kwh;
        comparison.unit_cost_pence += slot.usage_kwh * period.unit_rate_pence;
        match slot.cost_pence {
            Some(cost) => comparison.agile_cost_pence += cost,
            None => comparison.agile_unpriced_slots += 1,
        }

        if days.insert(date) {
            comparison.standing_charge_pence += period.standing_charge_pence_per_day;
        }
    }

    comparison.covered_days = days.len();
    comparison
}
