use agilecost_core::reconcile::ReconcileError;
use agilecost_core::{reconcile, report, BillingWindow};
use agilecost_parser::{PriceRecord, PriceSeries, SlotKey, UsageRecord, UsageSeries};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};

fn at(ts: &str) -> DateTime<Utc> {
    chrono::NaiveDateTime::parse_from_str(ts, "%Y-%m-%d %H:%M")
        .expect("parse instant")
        .and_utc()
}

fn usage_series(entries: &[(&str, f64)]) -> UsageSeries {
    entries
        .iter()
        .map(|&(ending, usage_kwh)| {
            let half_hour_ending = at(ending);
            (
                SlotKey::from_utc(half_hour_ending),
                UsageRecord {
                    half_hour_ending,
                    usage_kwh,
                },
            )
        })
        .collect()
}

fn price_series(entries: &[(&str, f64)]) -> PriceSeries {
    entries
        .iter()
        .map(|&(ending, import)| {
            let period_to = at(ending);
            (
                SlotKey::from_utc(period_to),
                PriceRecord {
                    period_from: period_to - TimeDelta::minutes(30),
                    period_to,
                    import_price_pence_per_kwh: import,
                    export_price_pence_per_kwh: 5.0,
                },
            )
        })
        .collect()
}

fn window(start: &str, end: &str) -> BillingWindow {
    BillingWindow::new(at(start), at(end)).expect("valid window")
}

#[test]
fn single_slot_accumulates_usage_and_cost() {
    let usage = usage_series(&[("2023-01-01 00:30", 0.5)]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0)]);

    let result = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 00:30"),
    )
    .expect("reconcile");

    assert_eq!(result.slots.len(), 1);
    assert!((result.total_consumption_kwh - 0.5).abs() < 1e-12);
    assert!((result.total_cost_pence - 10.0).abs() < 1e-12);
    assert!((result.total_cost_pounds() - 0.10).abs() < 1e-12);
    assert_eq!(result.missing_periods(), 0);
}

#[test]
fn missing_price_is_counted_and_contributes_nothing() {
    let usage = usage_series(&[
        ("2023-01-01 00:30", 0.5),
        ("2023-01-01 01:00", 0.7),
        ("2023-01-01 01:30", 0.2),
    ]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0), ("2023-01-01 01:30", 10.0)]);

    let result = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 01:30"),
    )
    .expect("reconcile");

    assert_eq!(result.missing_periods(), 1);
    assert_eq!(
        result.missing_prices,
        vec![SlotKey::from_utc(at("2023-01-01 01:00"))]
    );
    assert!((result.total_consumption_kwh - 0.7).abs() < 1e-12);
    assert!((result.total_cost_pence - 12.0).abs() < 1e-12);

    let unpriced = &result.slots[1];
    assert!(!unpriced.is_priced());
    assert_eq!(unpriced.usage_kwh, 0.7);
    assert_eq!(report::slot_line(unpriced), None);
}

#[test]
fn missing_usage_aborts() {
    let usage = usage_series(&[("2023-01-01 00:30", 0.5)]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0), ("2023-01-01 01:00", 20.0)]);

    let err = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 01:00"),
    )
    .expect_err("missing usage should abort");

    assert_eq!(
        err,
        ReconcileError::MissingUsage {
            slot_end: SlotKey::from_utc(at("2023-01-01 01:00"))
        }
    );
}

#[test]
fn window_end_bounds_slot_starts() {
    // The slot starting at `end` is outside the window, so its usage may be absent.
    let usage = usage_series(&[("2023-01-01 00:30", 0.5), ("2023-01-01 01:00", 0.5)]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0), ("2023-01-01 01:00", 20.0)]);

    let result = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 01:00"),
    )
    .expect("reconcile");

    assert_eq!(result.slots.len(), 2);
    assert_eq!(result.slots[1].end, at("2023-01-01 01:00"));
}

#[test]
fn records_outside_the_window_are_ignored() {
    let usage = usage_series(&[
        ("2022-12-31 23:30", 9.0),
        ("2023-01-01 00:30", 0.5),
        ("2023-01-01 01:00", 9.0),
    ]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0)]);

    let result = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 00:30"),
    )
    .expect("reconcile");

    assert!((result.total_consumption_kwh - 0.5).abs() < 1e-12);
}

#[test]
fn per_slot_consumption_sums_to_total() {
    let start = Utc.with_ymd_and_hms(2023, 3, 1, 0, 0, 0).unwrap();
    let mut usage = UsageSeries::new();
    let mut prices = PriceSeries::new();
    for i in 0..96_i64 {
        let end = start + TimeDelta::minutes(30 * (i + 1));
        let usage_kwh = 0.05 + (i % 7) as f64 * 0.113;
        usage.insert(
            SlotKey::from_utc(end),
            UsageRecord {
                half_hour_ending: end,
                usage_kwh,
            },
        );
        if i % 5 != 0 {
            prices.insert(
                SlotKey::from_utc(end),
                PriceRecord {
                    period_from: end - TimeDelta::minutes(30),
                    period_to: end,
                    import_price_pence_per_kwh: 12.5 + (i % 11) as f64,
                    export_price_pence_per_kwh: 4.0,
                },
            );
        }
    }

    let window = BillingWindow::new(start, start + TimeDelta::days(2)).expect("window");
    let result = reconcile(&usage, &prices, &window).expect("reconcile");

    let priced_sum: f64 = result.priced_slots().map(|slot| slot.usage_kwh).sum();
    let cost_sum: f64 = result.priced_slots().filter_map(|slot| slot.cost_pence).sum();

    assert_eq!(result.slots.len(), 96);
    assert_eq!(result.missing_periods(), 20);
    assert!((priced_sum - result.total_consumption_kwh).abs() < 1e-9);
    assert!((cost_sum - result.total_cost_pence).abs() < 1e-9);
}

#[test]
fn summary_reports_window_and_totals() {
    let usage = usage_series(&[("2023-01-01 00:30", 0.5)]);
    let prices = price_series(&[("2023-01-01 00:30", 20.0)]);
    let result = reconcile(
        &usage,
        &prices,
        &window("2023-01-01 00:00", "2023-01-01 00:30"),
    )
    .expect("reconcile");

    let text = report::summary(&result);
    assert!(text.contains("Period: 01 January 2023 at 00:00 to 01 January 2023 at 00:30"));
    assert!(text.contains("Consumption: 0.50 kWh"));
    assert!(text.contains("Agile cost: £0.10"));
    assert_eq!(report::missing_periods_line(&result), None);
    assert_eq!(
        report::slot_line(&result.slots[0]).as_deref(),
        Some("2023-01-01 00:00—00:30 used 0.5000 kWh @ 20.00 p")
    );
}

#[test]
fn first_record_lines_use_four_decimals() {
    let usage = usage_series(&[("2023-01-01 00:30", 0.5)]);
    let prices = price_series(&[("2023-01-01 00:30", 20.125)]);

    let (key, record) = usage.first().unwrap();
    assert_eq!(
        report::first_usage_line(key, record),
        "ending 2023-01-01 00:30 : 0.5000 kWh"
    );
    let (key, record) = prices.first().unwrap();
    assert_eq!(
        report::first_price_line(key, record),
        "ending 2023-01-01 00:30 : 20.1250 p / kWh"
    );
}
