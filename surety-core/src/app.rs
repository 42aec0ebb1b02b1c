//! Main orchestration layer
//!
//! Ties the store, the actor and the event bus into a high-level API.
//! Mutations go through the single-writer actor; queries read the store
//! directly and are never gated.
//!
//! # Example
//!
//! ```no_run
//! use surety_core::{Config, Surety};
//!
//! #[tokio::main]
//! async fn main() -> surety_core::Result<()> {
//!     let surety = Surety::open(Config::default());
//!
//!     let founder = surety.config().founding_airline.clone();
//!     surety.fund_airline(founder, rust_decimal::Decimal::TEN).await?;
//!
//!     Ok(())
//! }
//! ```

use crate::{
    actor::{spawn_surety_actor, SuretyHandle},
    config::Config,
    escrow,
    events::{Envelope, EventBus},
    gate, governance,
    governance::RegistrationOutcome,
    metrics::Metrics,
    oracle,
    store::Store,
    types::{FlightKey, FlightStatus, InsuranceKey, InsurancePolicy, PrincipalId, StatusRequest},
    Result,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// Read-only summary for external status watchers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusSnapshot {
    /// Service name
    pub service: String,
    /// Service version
    pub version: String,
    /// Whether mutating operations are accepted
    pub operational: bool,
    /// Registered airlines
    pub airlines_registered: usize,
    /// Funded participants
    pub participants: usize,
    /// Registered flights
    pub flights: usize,
    /// Active policies
    pub policies: usize,
    /// Registered oracles
    pub oracles: usize,
    /// Funds currently held
    pub held_funds: Decimal,
    /// Credits owed but unclaimed
    pub outstanding_payouts: Decimal,
}

/// Main ledger interface
pub struct Surety {
    /// Actor handle for mutations
    handle: SuretyHandle,

    /// Direct store access (for reads)
    store: Arc<Store>,

    /// Event bus
    bus: EventBus,

    /// Metrics
    metrics: Metrics,

    /// Configuration
    config: Config,
}

impl Surety {
    /// Open the ledger at genesis and spawn the writer actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn open(config: Config) -> Self {
        let store = Arc::new(Store::new(&config));
        let bus = EventBus::new(config.event_buffer);
        let metrics = Metrics::default();
        let handle = spawn_surety_actor(
            store.clone(),
            config.clone(),
            bus.clone(),
            metrics.clone(),
        );

        tracing::info!(
            service = %config.service_name,
            owner = %config.owner,
            founding_airline = %config.founding_airline,
            "Ledger opened"
        );

        Self {
            handle,
            store,
            bus,
            metrics,
            config,
        }
    }

    /// Configuration in effect
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Metrics collector
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Cloneable mutation handle
    pub fn handle(&self) -> SuretyHandle {
        self.handle.clone()
    }

    /// Subscribe to domain events published after commit
    pub fn subscribe(&self) -> broadcast::Receiver<Envelope> {
        self.bus.subscribe()
    }

    // ---- Mutations (serialized through the actor) ----

    /// Toggle the operational gate (owner only)
    pub async fn set_operating_status(
        &self,
        caller: PrincipalId,
        operational: bool,
    ) -> Result<()> {
        self.handle.set_operating_status(caller, operational).await
    }

    /// Register or endorse an airline
    pub async fn register_airline(
        &self,
        caller: PrincipalId,
        candidate: PrincipalId,
    ) -> Result<RegistrationOutcome> {
        self.handle.register_airline(caller, candidate).await
    }

    /// Fund a registered airline, promoting it to participant
    pub async fn fund_airline(&self, caller: PrincipalId, amount: Decimal) -> Result<()> {
        self.handle.fund_airline(caller, amount).await
    }

    /// Register a flight at Unknown status
    pub async fn register_flight(&self, caller: PrincipalId, flight: FlightKey) -> Result<()> {
        self.handle.register_flight(caller, flight).await
    }

    /// Buy insurance for a registered flight
    pub async fn buy_insurance(
        &self,
        passenger: PrincipalId,
        flight: FlightKey,
        amount: Decimal,
    ) -> Result<InsuranceKey> {
        self.handle.buy_insurance(passenger, flight, amount).await
    }

    /// Withdraw all credited payouts for the passenger
    pub async fn withdraw(&self, passenger: PrincipalId) -> Result<Decimal> {
        self.handle.withdraw(passenger).await
    }

    /// Register a status oracle
    pub async fn register_oracle(&self, caller: PrincipalId, fee: Decimal) -> Result<[u8; 3]> {
        self.handle.register_oracle(caller, fee).await
    }

    /// Open a flight status request; emits `StatusRequested`
    pub async fn request_flight_status(&self, flight: FlightKey) -> Result<u8> {
        self.handle.request_flight_status(flight).await
    }

    /// Submit an oracle's status report
    pub async fn submit_oracle_response(
        &self,
        caller: PrincipalId,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    ) -> Result<Option<FlightStatus>> {
        self.handle
            .submit_oracle_response(caller, index, flight, status)
            .await
    }

    /// Shutdown the writer actor
    pub async fn shutdown(&self) -> Result<()> {
        self.handle.shutdown().await
    }

    // ---- Queries (direct reads, never gated) ----

    /// Whether mutating operations are accepted
    pub fn is_operational(&self) -> bool {
        self.store.read(gate::is_operational)
    }

    /// Whether the principal is a registered airline
    pub fn is_registered(&self, id: &PrincipalId) -> bool {
        self.store.read(|state| governance::is_registered(state, id))
    }

    /// Whether the principal is a funded participant
    pub fn is_participant(&self, id: &PrincipalId) -> bool {
        self.store.read(|state| governance::is_participant(state, id))
    }

    /// Number of funded participants
    pub fn participant_count(&self) -> usize {
        self.store.read(|state| state.participant_count())
    }

    /// Number of registered airlines, pending candidates excluded
    pub fn airline_count(&self) -> usize {
        self.store.read(governance::airline_count)
    }

    /// Endorsements recorded for a pending candidate
    pub fn votes_for(&self, id: &PrincipalId) -> usize {
        self.store.read(|state| governance::votes_for(state, id))
    }

    /// Status of a registered flight
    pub fn flight_status(&self, key: &FlightKey) -> Result<FlightStatus> {
        self.store.read(|state| escrow::flight_status(state, key))
    }

    /// Policy for a (passenger, flight) pair, if any
    pub fn policy(&self, passenger: &PrincipalId, flight: &FlightKey) -> Option<InsurancePolicy> {
        let key = InsuranceKey::derive(passenger, flight);
        self.store.read(|state| state.policy(&key).cloned())
    }

    /// Credited, unclaimed payout total for a passenger
    pub fn payout_owed(&self, passenger: &PrincipalId) -> Decimal {
        self.store.read(|state| escrow::payout_owed(state, passenger))
    }

    /// Premiums the passenger has paid in total
    pub fn premiums_paid(&self, passenger: &PrincipalId) -> Decimal {
        self.store
            .read(|state| escrow::premiums_paid(state, passenger))
    }

    /// Indexes assigned to a registered oracle
    pub fn oracle_indexes(&self, id: &PrincipalId) -> Option<[u8; 3]> {
        self.store.read(|state| oracle::oracle_indexes(state, id))
    }

    /// The open status request at (index, flight), if one exists
    pub fn open_request(&self, index: u8, flight: &FlightKey) -> Option<StatusRequest> {
        self.store
            .read(|state| oracle::open_request(state, index, flight))
    }

    /// Check the global solvency invariant
    pub fn check_escrow_solvency(&self) -> bool {
        self.store.read(|state| state.is_solvent())
    }

    /// Read-only summary for the external status endpoint
    pub fn status_snapshot(&self) -> StatusSnapshot {
        self.store.read(|state| StatusSnapshot {
            service: self.config.service_name.clone(),
            version: self.config.service_version.clone(),
            operational: state.operational,
            airlines_registered: state.registered_count(),
            participants: state.participant_count(),
            flights: state.flights.len(),
            policies: state.policies.len(),
            oracles: state.oracles.len(),
            held_funds: state.contract_held_funds(),
            outstanding_payouts: state.outstanding_payouts(),
        })
    }
}
