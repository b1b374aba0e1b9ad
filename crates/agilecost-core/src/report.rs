use agilecost_parser::{PriceRecord, SlotKey, UsageRecord};

use crate::flat_tariff::FlatComparison;
use crate::reconcile::{Reconciliation, SlotCost};

const PERIOD_FORMAT: &str = "%d %B %Y at %H:%M";

pub fn first_usage_line(key: &SlotKey, record: &UsageRecord) -> String {
    format!("ending {key} : {:.4} kWh", record.usage_kwh)
}

pub fn first_price_line(key: &SlotKey, record: &PriceRecord) -> String {
    format!(
        "ending {key} : {:.4} p / kWh",
        record.import_price_pence_per_kwh
    )
}

/// `None` for slots without a price; those are reported in aggregate.
pub fn slot_line(slot: &SlotCost) -> Option<String> {
    let price = slot.import_price_pence_per_kwh?;
    Some(format!(
        "{}—{} used {:.4} kWh @ {:.2} p",
        slot.start.format("%Y-%m-%d %H:%M"),
        slot.end.format("%H:%M"),
        slot.usage_kwh,
        price
    ))
}

pub fn missing_periods_line(reconciliation: &Reconciliation) -> Option<String> {
    match reconciliation.missing_periods() {
        0 => None,
        missing => Some(format!("⚠️ {missing} missing periods excluded")),
    }
}

pub fn summary(reconciliation: &Reconciliation) -> String {
    let window = &reconciliation.window;
    format!(
        "     Period: {} to {}\nConsumption: {:.2} kWh\n Agile cost: £{:.2}",
        window.start().format(PERIOD_FORMAT),
        window.end().format(PERIOD_FORMAT),
        reconciliation.total_consumption_kwh,
        reconciliation.total_cost_pounds(),
    )
}

pub fn flat_comparison(comparison: &FlatComparison) -> String {
    let mut out = format!(
        concat!(
            "Flat tariff comparison\n",
            "   Covered days: {}\n",
            "    Consumption: {:.2} kWh\n",
            "      Unit cost: £{:.2}\n",
            "Standing charge: £{:.2}\n",
            "     Flat total: £{:.2}\n",
            "     Agile cost: £{:.2}",
        ),
        comparison.covered_days,
        comparison.consumption_kwh,
        comparison.unit_cost_pence / 100.0,
        comparison.standing_charge_pence / 100.0,
        comparison.flat_cost_pounds(),
        comparison.agile_cost_pounds(),
    );
    if comparison.agile_unpriced_slots > 0 {
        out.push_str(&format!(
            " ({} slots without an Agile price)",
            comparison.agile_unpriced_slots
        ));
    }
    if comparison.uncovered_slots > 0 {
        out.push_str(&format!(
            "\n      Uncovered: {} slots outside the schedule",
            comparison.uncovered_slots
        ));
    }
    out
}
