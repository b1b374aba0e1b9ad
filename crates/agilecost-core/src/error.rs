// crates/agilecost-core/src/error.rs

use agilecost_parser::LoadError;
use thiserror::Error;

use crate::config::ConfigError;
use crate::flat_tariff::TariffError;
use crate::reconcile::ReconcileError;

#[derive(Error, Debug)]
pub enum CostError {
    #[error("Failed to load input: {0}")]
    Load(#[from] LoadError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("Reconciliation aborted: {0}")]
    Reconcile(#[from] ReconcileError),

    #[error("Flat tariff schedule error: {0}")]
    Tariff(#[from] TariffError),
}

pub type Result<T> = std::result::Result<T, CostError>;
