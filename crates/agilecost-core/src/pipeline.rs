use agilecost_parser::{load_price_csv, load_usage_csv, PriceSeries, UsageSeries};
use tracing::info;

use crate::config::RunConfig;
use crate::error::Result;
use crate::flat_tariff::{compare, FlatComparison, FlatTariffSchedule};
use crate::reconcile::{reconcile, Reconciliation};

/// Both series plus the optional flat tariff schedule, loaded once and then read-only.
#[derive(Debug, Clone)]
pub struct Inputs {
    pub usage: UsageSeries,
    pub prices: PriceSeries,
    pub flat_tariff: Option<FlatTariffSchedule>,
}

impl Inputs {
    pub fn load(config: &RunConfig) -> Result<Self> {
        let usage = load_usage_csv(&config.usage_csv)?;
        let prices = load_price_csv(&config.prices_csv)?;
        let flat_tariff = config
            .flat_tariff
            .as_deref()
            .map(FlatTariffSchedule::load)
            .transpose()?;

        Ok(Self {
            usage,
            prices,
            flat_tariff,
        })
    }
}

#[derive(Debug, Clone)]
pub struct CostReport {
    pub reconciliation: Reconciliation,
    pub flat: Option<FlatComparison>,
}

pub fn evaluate(inputs: &Inputs, config: &RunConfig) -> Result<CostReport> {
    let reconciliation = reconcile(&inputs.usage, &inputs.prices, &config.window)?;
    let flat = inputs
        .flat_tariff
        .as_ref()
        .map(|schedule| compare(&reconciliation, schedule));

    if let Some(flat) = &flat {
        info!(
            covered_slots = flat.covered_slots,
            uncovered_slots = flat.uncovered_slots,
            "Compared against flat tariff"
        );
    }

    Ok(CostReport {
        reconciliation,
        flat,
    })
}

pub fn run(config: &RunConfig) -> Result<CostReport> {
    let inputs = Inputs::load(config)?;
    evaluate(&inputs, config)
}
