use std::io::Read;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::ByteRecord;
use tracing::warn;

use crate::errors::LoadError;
use crate::loader::SeriesLoader;
use crate::model::{PriceRecord, PriceSeries, SkipReason, SlotKey};

use super::{csv_reader, field, line_of, lossy_field, next_row, skip_header};

/// Tariff period boundary without an offset, read as UTC, e.g. `01/11/2022 00:30`.
pub const PRICE_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Half-hourly Agile rates: `period_from,period_to,import_price,export_price`.
///
/// Tariff exports change shape often, so any row that does not parse is
/// logged and skipped rather than failing the load.
#[derive(Debug, Default, Clone, Copy)]
pub struct PriceLoader;

impl PriceLoader {
    const NAME: &'static str = "prices";
    const FIELD_COUNT: usize = 4;

    fn parse_row(record: &ByteRecord) -> Result<PriceRecord, SkipReason> {
        Ok(PriceRecord {
            period_from: parse_instant(record, 0, "period_from")?,
            period_to: parse_instant(record, 1, "period_to")?,
            import_price_pence_per_kwh: parse_price(record, 2, "import_price")?,
            export_price_pence_per_kwh: parse_price(record, 3, "export_price")?,
        })
    }
}

fn decode<'r>(
    record: &'r ByteRecord,
    index: usize,
    column: &'static str,
) -> Result<&'r str, SkipReason> {
    field(record, index).map_err(|err| invalid_field(column, &lossy_field(record, index), err))
}

fn parse_instant(
    record: &ByteRecord,
    index: usize,
    column: &'static str,
) -> Result<DateTime<Utc>, SkipReason> {
    let value = decode(record, index, column)?;
    NaiveDateTime::parse_from_str(value, PRICE_TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|err| invalid_field(column, value, err))
}

fn parse_price(record: &ByteRecord, index: usize, column: &'static str) -> Result<f64, SkipReason> {
    let value = decode(record, index, column)?;
    value
        .parse::<f64>()
        .map_err(|err| invalid_field(column, value, err))
}

fn invalid_field(column: &'static str, value: &str, err: impl ToString) -> SkipReason {
    SkipReason::InvalidField {
        column,
        value: value.to_string(),
        message: err.to_string(),
    }
}

impl SeriesLoader for PriceLoader {
    type Record = PriceRecord;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn read<R: Read>(&self, source: R) -> Result<PriceSeries, LoadError> {
        let mut reader = csv_reader(source);
        skip_header(Self::NAME, &mut reader)?;

        let mut series = PriceSeries::new();
        let mut record = ByteRecord::new();
        while next_row(Self::NAME, &mut reader, &mut record) {
            let line = line_of(&record);
            if record.len() != Self::FIELD_COUNT {
                series.record_skip(
                    line,
                    SkipReason::FieldCount {
                        expected: Self::FIELD_COUNT,
                        found: record.len(),
                    },
                );
                continue;
            }

            match Self::parse_row(&record) {
                Ok(price) => {
                    series.insert(SlotKey::from_utc(price.period_to), price);
                }
                Err(reason) => {
                    warn!(line, %reason, "Skipping price row");
                    series.record_skip(line, reason);
                }
            }
        }

        Ok(series)
    }
}
