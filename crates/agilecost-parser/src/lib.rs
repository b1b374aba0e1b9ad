pub mod errors;
pub mod formats;
pub mod model;
mod loader;

pub use errors::LoadError;
pub use formats::{PriceLoader, UsageLoader};
pub use loader::{load_price_csv, load_usage_csv, SeriesLoader};
pub use model::{
    PriceRecord, PriceSeries, SkipReason, SkippedRow, SlotKey, TimeSeries, UsageRecord,
    UsageSeries,
};
