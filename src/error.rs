//! Errors for the account keeper.
//!
//! Contains error variants for:
//! - Durable storage failures (quota exceeded, store unavailable, I/O)
//! - Malformed persisted or imported data (JSON, CSV)
//! - Configuration and command-line usage errors
//!
//! The account store itself never returns these to its callers: load and
//! persist failures are logged and absorbed at the store boundary. They
//! surface from the [`DurableStore`](crate::DurableStore) implementations,
//! the CSV helpers and the command-line driver.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    /// The write would exceed the storage capacity.
    #[error("storage quota exceeded: {requested} bytes requested, quota is {quota} bytes")]
    QuotaExceeded { requested: usize, quota: usize },

    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    Usage(String),

    #[error("account not found: {0}")]
    AccountNotFound(String),
}
