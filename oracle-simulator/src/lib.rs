//! FlightSurety oracle-response simulator
//!
//! External collaborator of the insurance ledger: subscribes to the core's
//! `StatusRequested` events and answers them from a locally-held fleet of
//! simulated oracles, the way an operator would run real status watchers.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod simulator;

pub use error::{Error, Result};
pub use simulator::{
    run_subscriber, spawn, EventHandler, OracleSimulator, SimulatedOracle, SimulatorConfig,
};
