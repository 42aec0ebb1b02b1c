//! Event-driven oracle-response simulator
//!
//! Registers a fleet of simulated oracles at startup, then watches the
//! ledger's event bus. For every `StatusRequested` event it synthesizes a
//! status code and submits a response from each local oracle holding the
//! event's index. A rejected response is logged and the batch continues;
//! retry is this caller's policy, never the core's.

use crate::Result;
use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use surety_core::{
    actor::SuretyHandle, Envelope, FlightKey, FlightStatus, PrincipalId, Surety, SuretyEvent,
};
use tokio::sync::broadcast;

/// Handler for ledger events, the seam tests inject through
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle one published event
    async fn handle(&self, envelope: Envelope) -> Result<()>;
}

/// Simulator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulatorConfig {
    /// Number of oracles to register at startup
    pub oracle_count: usize,

    /// Principal id prefix for simulated oracles
    pub oracle_prefix: String,

    /// Always report this status instead of drawing one at random
    pub fixed_status: Option<FlightStatus>,

    /// Seed for status synthesis; None draws from entropy
    pub rng_seed: Option<u64>,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            oracle_count: 20,
            oracle_prefix: "sim-oracle".to_string(),
            fixed_status: None,
            rng_seed: None,
        }
    }
}

/// A locally-held simulated oracle
#[derive(Debug, Clone)]
pub struct SimulatedOracle {
    /// Oracle principal
    pub principal: PrincipalId,
    /// Indexes fetched once at registration
    pub indexes: [u8; 3],
}

/// Oracle-response simulator
///
/// Owns no ledger state beyond its registered index assignments.
pub struct OracleSimulator {
    handle: SuretyHandle,
    oracles: Vec<SimulatedOracle>,
    config: SimulatorConfig,
    rng: Mutex<StdRng>,
}

impl OracleSimulator {
    /// Register the fleet and fetch each oracle's indexes
    pub async fn register_fleet(surety: &Surety, config: SimulatorConfig) -> Result<Self> {
        let fee = surety.config().oracle.registration_fee;
        let handle = surety.handle();

        let mut oracles = Vec::with_capacity(config.oracle_count);
        for n in 0..config.oracle_count {
            let principal = PrincipalId::new(format!("{}-{}", config.oracle_prefix, n));
            let indexes = handle.register_oracle(principal.clone(), fee).await?;
            tracing::info!(oracle = %principal, ?indexes, "Simulated oracle registered");
            oracles.push(SimulatedOracle { principal, indexes });
        }

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            handle,
            oracles,
            config,
            rng: Mutex::new(rng),
        })
    }

    /// Registered fleet
    pub fn oracles(&self) -> &[SimulatedOracle] {
        &self.oracles
    }

    /// Synthesize the status this simulator reports for a request
    fn synthesize_status(&self) -> FlightStatus {
        if let Some(status) = self.config.fixed_status {
            return status;
        }
        let codes = FlightStatus::reportable();
        let pick = self.rng.lock().gen_range(0..codes.len());
        codes[pick]
    }

    /// Respond to one status request from every matching local oracle
    async fn respond(&self, index: u8, flight: FlightKey) {
        let status = self.synthesize_status();

        for oracle in self.oracles.iter().filter(|o| o.indexes.contains(&index)) {
            match self
                .handle
                .submit_oracle_response(oracle.principal.clone(), index, flight.clone(), status)
                .await
            {
                Ok(Some(resolved)) => {
                    tracing::info!(flight = %flight, %resolved, "Consensus reached");
                }
                Ok(None) => {
                    tracing::debug!(oracle = %oracle.principal, index, %status, "Response accepted");
                }
                Err(e) => {
                    // Expected once the flight resolves mid-batch
                    tracing::warn!(oracle = %oracle.principal, index, "Response rejected: {}", e);
                }
            }
        }
    }
}

#[async_trait]
impl EventHandler for OracleSimulator {
    async fn handle(&self, envelope: Envelope) -> Result<()> {
        if let SuretyEvent::StatusRequested { index, flight } = envelope.event {
            tracing::debug!(index, flight = %flight, "Status requested");
            self.respond(index, flight).await;
        }
        Ok(())
    }
}

/// Consume events from the bus, dispatching each to the handler.
///
/// A lagged receiver skips ahead with a warning; per-event handler errors are
/// logged and the loop continues. Returns when the bus closes.
pub async fn run_subscriber<H>(mut receiver: broadcast::Receiver<Envelope>, handler: Arc<H>)
where
    H: EventHandler + 'static,
{
    loop {
        match receiver.recv().await {
            Ok(envelope) => {
                if let Err(e) = handler.handle(envelope).await {
                    tracing::error!("Error handling event: {}", e);
                }
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event receiver lagged");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::debug!("Event bus closed, subscriber stopping");
                break;
            }
        }
    }
}

/// Convenience: spawn the simulator as a background subscriber task
pub fn spawn(simulator: OracleSimulator, receiver: broadcast::Receiver<Envelope>) -> Arc<OracleSimulator> {
    let simulator = Arc::new(simulator);
    let task = simulator.clone();
    tokio::spawn(async move {
        run_subscriber(receiver, task).await;
    });
    simulator
}
