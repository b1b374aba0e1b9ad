use std::fs::File;
use std::io::Read;
use std::path::Path;

use tracing::info;

use crate::errors::LoadError;
use crate::formats::{PriceLoader, UsageLoader};
use crate::model::{PriceSeries, TimeSeries, UsageSeries};

pub trait SeriesLoader {
    type Record;

    fn name(&self) -> &'static str;

    /// Reads a header row followed by data rows from `source`.
    fn read<R: Read>(&self, source: R) -> Result<TimeSeries<Self::Record>, LoadError>;

    fn load(&self, path: &Path) -> Result<TimeSeries<Self::Record>, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::Open {
            loader: self.name(),
            path: path.to_path_buf(),
            source,
        })?;
        let series = self.read(file)?;
        info!(
            loader = self.name(),
            path = %path.display(),
            records = series.len(),
            skipped = series.skipped_rows().len(),
            "Loaded series"
        );
        Ok(series)
    }
}

pub fn load_usage_csv(path: impl AsRef<Path>) -> Result<UsageSeries, LoadError> {
    UsageLoader.load(path.as_ref())
}

pub fn load_price_csv(path: impl AsRef<Path>) -> Result<PriceSeries, LoadError> {
    PriceLoader.load(path.as_ref())
}
