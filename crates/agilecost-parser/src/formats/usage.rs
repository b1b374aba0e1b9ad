use std::io::Read;

use chrono::{DateTime, Utc};
use csv::ByteRecord;
use tracing::debug;

use crate::errors::LoadError;
use crate::loader::SeriesLoader;
use crate::model::{SkipReason, SlotKey, UsageRecord, UsageSeries};

use super::{csv_reader, field, line_of, lossy_field, next_row, skip_header};

/// Half-hour-ending timestamp with a fixed UTC offset, e.g. `2023-01-01 00:30:00+00:00`.
pub const USAGE_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%:z";

/// Consumption export: `timestamp,usage_kwh`.
///
/// A row with the wrong number of fields is skipped. A row whose timestamp or
/// usage does not parse fails the whole load, since the consumption series is
/// expected to be complete.
#[derive(Debug, Default, Clone, Copy)]
pub struct UsageLoader;

impl UsageLoader {
    const NAME: &'static str = "usage";
    const FIELD_COUNT: usize = 2;

    fn decode<'a>(
        record: &'a ByteRecord,
        index: usize,
        column: &'static str,
        line: u64,
    ) -> Result<&'a str, LoadError> {
        field(record, index).map_err(|source| LoadError::InvalidEncoding {
            loader: Self::NAME,
            line,
            column,
            value: lossy_field(record, index),
            source,
        })
    }

    fn parse_row(record: &ByteRecord, line: u64) -> Result<UsageRecord, LoadError> {
        let raw_timestamp = Self::decode(record, 0, "timestamp", line)?;
        let half_hour_ending = DateTime::parse_from_str(raw_timestamp, USAGE_TIMESTAMP_FORMAT)
            .map_err(|source| LoadError::InvalidTimestamp {
                loader: Self::NAME,
                line,
                value: raw_timestamp.to_string(),
                source,
            })?
            .with_timezone(&Utc);

        let raw_usage = Self::decode(record, 1, "usage", line)?;
        let usage_kwh = raw_usage
            .parse::<f64>()
            .map_err(|source| LoadError::InvalidNumber {
                loader: Self::NAME,
                line,
                column: "usage",
                value: raw_usage.to_string(),
                source,
            })?;

        Ok(UsageRecord {
            half_hour_ending,
            usage_kwh,
        })
    }
}

impl SeriesLoader for UsageLoader {
    type Record = UsageRecord;

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn read<R: Read>(&self, source: R) -> Result<UsageSeries, LoadError> {
        let mut reader = csv_reader(source);
        skip_header(Self::NAME, &mut reader)?;

        let mut series = UsageSeries::new();
        let mut record = ByteRecord::new();
        while next_row(Self::NAME, &mut reader, &mut record) {
            let line = line_of(&record);
            if record.len() != Self::FIELD_COUNT {
                debug!(line, fields = record.len(), "Skipping usage row");
                series.record_skip(
                    line,
                    SkipReason::FieldCount {
                        expected: Self::FIELD_COUNT,
                        found: record.len(),
                    },
                );
                continue;
            }

            let usage = Self::parse_row(&record, line)?;
            series.insert(SlotKey::from_utc(usage.half_hour_ending), usage);
        }

        Ok(series)
    }
}
