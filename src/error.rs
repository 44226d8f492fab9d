//! Crate-wide error type

use thiserror::Error;

use crate::ledger::LedgerError;

#[derive(Error, Debug)]
pub enum Error {
    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;
