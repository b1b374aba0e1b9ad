use agilecost_parser::{PriceSeries, SlotKey, UsageSeries};
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{info, warn};

use crate::config::BillingWindow;

#[derive(Debug, Error, PartialEq)]
pub enum ReconcileError {
    /// The consumption series is expected to cover every slot in the window.
    #[error("no usage for slot ending {slot_end}")]
    MissingUsage { slot_end: SlotKey },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotCost {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub usage_kwh: f64,
    pub import_price_pence_per_kwh: Option<f64>,
    pub cost_pence: Option<f64>,
}

impl SlotCost {
    pub fn is_priced(&self) -> bool {
        self.cost_pence.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct Reconciliation {
    pub window: BillingWindow,
    pub slots: Vec<SlotCost>,
    pub missing_prices: Vec<SlotKey>,
    pub total_consumption_kwh: f64,
    pub total_cost_pence: f64,
}

impl Reconciliation {
    pub fn missing_periods(&self) -> usize {
        self.missing_prices.len()
    }

    pub fn total_cost_pounds(&self) -> f64 {
        self.total_cost_pence / 100.0
    }

    pub fn priced_slots(&self) -> impl Iterator<Item = &SlotCost> {
        self.slots.iter().filter(|slot| slot.is_priced())
    }
}

/// Walks the window one half hour at a time, joining usage and import price
/// on the slot's end instant.
///
/// Missing usage aborts. A missing price is counted and the slot contributes
/// nothing to either total.
pub fn reconcile(
    usage: &UsageSeries,
    prices: &PriceSeries,
    window: &BillingWindow,
) -> Result<Reconciliation, ReconcileError> {
    let mut slots = Vec::with_capacity(window.slot_count());
    let mut missing_prices = Vec::new();
    let mut total_consumption_kwh = 0.0;
    let mut total_cost_pence = 0.0;

    for slot in window.slots() {
        let key = slot.key();

        let consumption = usage
            .get(&key)
            .ok_or(ReconcileError::MissingUsage { slot_end: key })?;

        let Some(price) = prices.get(&key) else {
            warn!(slot_end = %key, "Missing price");
            missing_prices.push(key);
            slots.push(SlotCost {
                start: slot.start,
                end: slot.end,
                usage_kwh: consumption.usage_kwh,
                import_price_pence_per_kwh: None,
                cost_pence: None,
            });
            continue;
        };

        let cost_pence = consumption.usage_kwh * price.import_price_pence_per_kwh;
        total_consumption_kwh += consumption.usage_kwh;
        total_cost_pence += cost_pence;

        slots.push(SlotCost {
            start: slot.start,
            end: slot.end,
            usage_kwh: consumption.usage_kwh,
            import_price_pence_per_kwh: Some(price.import_price_pence_per_kwh),
            cost_pence: Some(cost_pence),
        });
    }

    info!(
        slots = slots.len(),
        missing_prices = missing_prices.len(),
        consumption_kwh = total_consumption_kwh,
        cost_pence = total_cost_pence,
        "Reconciled billing window"
    );

    Ok(Reconciliation {
        window: *window,
        slots,
        missing_prices,
        total_consumption_kwh,
        total_cost_pence,
    })
}
