//! FlightSurety Ledger Core
//!
//! Append-only state machine for flight-delay insurance: airline governance,
//! passenger insurance escrow and quorum-based oracle consensus over one
//! shared invariant surface (funds, participant sets, flight identity).
//!
//! # Architecture
//!
//! - **Single Writer**: one actor task serializes every mutating operation
//! - **Atomic Transactions**: an operation fully applies or leaves the store
//!   unchanged
//! - **Operational Gate**: owner-controlled switch checked first by every
//!   mutation; queries are never gated
//! - **Pull Payments**: resolutions credit owed balances, funds move only on
//!   explicit withdrawal
//! - **Post-Commit Events**: `StatusRequested` and `FlightCredited` published
//!   on an in-process broadcast bus
//!
//! # Invariants
//!
//! - Σ(payout_owed, unclaimed) ≤ contract-held funds for all time
//! - A flight's status transitions Unknown → one terminal code exactly once
//! - An oracle response counts only for an index the responder holds
//! - An airline never endorses the same candidate twice

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod actor;
pub mod app;
pub mod config;
pub mod error;
pub mod escrow;
pub mod events;
pub mod gate;
pub mod governance;
pub mod metrics;
pub mod oracle;
pub mod store;
pub mod types;

// Re-exports
pub use app::{StatusSnapshot, Surety};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use events::{Envelope, EventBus, SuretyEvent};
pub use governance::RegistrationOutcome;
pub use store::Store;
pub use types::{
    Airline, AirlineStatus, Flight, FlightKey, FlightStatus, InsuranceKey, InsurancePolicy,
    OracleRegistration, PrincipalId, RequestKey, RequestState, StatusRequest,
};
