pub mod config;
pub mod error;
pub mod flat_tariff;
pub mod pipeline;
pub mod reconcile;
pub mod report;

pub use config::{BillingWindow, ConfigFlags, HalfHourSlot, RunConfig};
pub use error::{CostError, Result};
pub use flat_tariff::{FlatComparison, FlatTariffPeriod, FlatTariffSchedule};
pub use pipeline::{CostReport, Inputs};
pub use reconcile::{reconcile, Reconciliation, SlotCost};
