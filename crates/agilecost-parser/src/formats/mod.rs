mod common;
mod prices;
mod usage;

pub use prices::{PriceLoader, PRICE_TIMESTAMP_FORMAT};
pub use usage::{UsageLoader, USAGE_TIMESTAMP_FORMAT};

pub(crate) use common::{csv_reader, field, line_of, lossy_field, next_row, skip_header};
