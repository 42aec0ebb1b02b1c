//! Error types for the insurance ledger

use thiserror::Error;

/// Result type for ledger operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error category, for callers that dispatch on the class of failure
/// rather than the specific variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Gate closed or caller lacks the required role
    AccessDenied,
    /// Flight, policy, oracle or request absent
    NotFound,
    /// Re-registration, re-purchase or re-funding
    Duplicate,
    /// Insufficient vote, quorum, fee or funding amount
    ThresholdNotMet,
    /// Operation against an entity already in a terminal state
    InvalidState,
    /// Infrastructure failure (mailbox, config)
    Internal,
}

/// Ledger errors
#[derive(Error, Debug)]
pub enum Error {
    /// Operational gate is closed
    #[error("Contract is not operational")]
    NotOperational,

    /// Gate toggle attempted by a non-owner
    #[error("Caller {0} is not the contract owner")]
    NotOwner(String),

    /// Caller is not a funded participant airline
    #[error("Caller {0} is not a participant airline")]
    NotParticipant(String),

    /// Caller airline is not registered
    #[error("Airline {0} is not registered")]
    NotRegistered(String),

    /// Vote cast for a candidate that is already registered
    #[error("Airline {0} is already registered")]
    AlreadyVoted(String),

    /// Funding amount below the participation threshold
    #[error("Funding amount {amount} is below the minimum of {minimum}")]
    BelowMinimumFunding {
        /// Offered amount
        amount: rust_decimal::Decimal,
        /// Required minimum
        minimum: rust_decimal::Decimal,
    },

    /// Airline attempted to fund twice
    #[error("Airline {0} is already funded")]
    AlreadyFunded(String),

    /// Flight key already registered
    #[error("Flight {0} is already registered")]
    DuplicateFlight(String),

    /// Flight key not registered
    #[error("Flight not found: {0}")]
    FlightNotFound(String),

    /// Premium exceeds the fixed cap
    #[error("Premium {amount} exceeds the cap of {cap}")]
    PaymentExceedsCap {
        /// Offered premium
        amount: rust_decimal::Decimal,
        /// Fixed cap
        cap: rust_decimal::Decimal,
    },

    /// Premium must be positive
    #[error("Premium must be positive, got {0}")]
    InvalidPremium(rust_decimal::Decimal),

    /// Second purchase for the same (passenger, flight) pair
    #[error("Policy already exists for passenger {0} on flight {1}")]
    DuplicatePolicy(String, String),

    /// Withdrawal with no credited balance
    #[error("No payout owed to {0}")]
    NothingOwed(String),

    /// Oracle registration fee below the fixed fee
    #[error("Registration fee {fee} is below the required {required}")]
    InsufficientFee {
        /// Offered fee
        fee: rust_decimal::Decimal,
        /// Required fee
        required: rust_decimal::Decimal,
    },

    /// Principal already holds oracle indexes
    #[error("Oracle {0} is already registered")]
    AlreadyRegistered(String),

    /// Response submitted for an index the caller does not hold
    #[error("Oracle {caller} does not hold index {index}")]
    IndexNotOwned {
        /// Responding principal
        caller: String,
        /// Index claimed
        index: u8,
    },

    /// No open status request matches the submission
    #[error("No open status request for index {index} on flight {flight}")]
    NoSuchRequest {
        /// Index submitted against
        index: u8,
        /// Flight submitted for
        flight: String,
    },

    /// Flight status already resolved; stale responses are rejected
    #[error("Flight {0} is already resolved to {1}")]
    AlreadyResolved(String, String),

    /// Oracles may only report terminal status codes
    #[error("Status code {0} cannot be reported by an oracle")]
    UnreportableStatus(u8),

    /// Concurrency error (actor mailbox closed, etc.)
    #[error("Concurrency error: {0}")]
    Concurrency(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Map this error onto its taxonomy category
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotOperational
            | Error::NotOwner(_)
            | Error::NotParticipant(_)
            | Error::NotRegistered(_)
            | Error::IndexNotOwned { .. } => ErrorKind::AccessDenied,

            Error::FlightNotFound(_)
            | Error::NothingOwed(_)
            | Error::NoSuchRequest { .. } => ErrorKind::NotFound,

            Error::AlreadyFunded(_)
            | Error::DuplicateFlight(_)
            | Error::DuplicatePolicy(_, _)
            | Error::AlreadyRegistered(_) => ErrorKind::Duplicate,

            Error::BelowMinimumFunding { .. }
            | Error::PaymentExceedsCap { .. }
            | Error::InvalidPremium(_)
            | Error::InsufficientFee { .. } => ErrorKind::ThresholdNotMet,

            Error::AlreadyVoted(_)
            | Error::AlreadyResolved(_, _)
            | Error::UnreportableStatus(_) => ErrorKind::InvalidState,

            Error::Concurrency(_) | Error::Config(_) => ErrorKind::Internal,
        }
    }
}
