//! Error types for the simulator

use thiserror::Error;

/// Result type for simulator operations
pub type Result<T> = std::result::Result<T, Error>;

/// Simulator errors
#[derive(Error, Debug)]
pub enum Error {
    /// Ledger rejected an operation
    #[error("Ledger error: {0}")]
    Core(#[from] surety_core::Error),

    /// Event subscription failed
    #[error("Subscription error: {0}")]
    Subscription(String),
}
