//! Actor-based concurrency for the ledger
//!
//! This module implements the single-writer pattern using Tokio actors:
//! - One logical writer task serializes every mutating operation
//! - Each operation is one atomic transaction against the store
//! - Domain events are published only after the transaction commits
//!
//! Queries do not go through the actor; they take the store's read lock
//! directly via [`crate::Surety`].

use crate::{
    config::Config,
    error::{Error, Result},
    escrow, gate, governance,
    events::{EventBus, SuretyEvent},
    governance::RegistrationOutcome,
    metrics::Metrics,
    oracle,
    store::Store,
    types::{FlightKey, FlightStatus, InsuranceKey, PrincipalId},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot};

/// Message sent to the ledger actor
pub enum SuretyMessage {
    /// Toggle the operational gate
    SetOperatingStatus {
        caller: PrincipalId,
        operational: bool,
        response: oneshot::Sender<Result<()>>,
    },

    /// Register or endorse an airline
    RegisterAirline {
        caller: PrincipalId,
        candidate: PrincipalId,
        response: oneshot::Sender<Result<RegistrationOutcome>>,
    },

    /// Fund a registered airline
    FundAirline {
        caller: PrincipalId,
        amount: Decimal,
        response: oneshot::Sender<Result<()>>,
    },

    /// Register a flight
    RegisterFlight {
        caller: PrincipalId,
        flight: FlightKey,
        response: oneshot::Sender<Result<()>>,
    },

    /// Buy insurance for a flight
    BuyInsurance {
        passenger: PrincipalId,
        flight: FlightKey,
        amount: Decimal,
        response: oneshot::Sender<Result<InsuranceKey>>,
    },

    /// Withdraw credited payouts
    Withdraw {
        passenger: PrincipalId,
        response: oneshot::Sender<Result<Decimal>>,
    },

    /// Register a status oracle
    RegisterOracle {
        caller: PrincipalId,
        fee: Decimal,
        response: oneshot::Sender<Result<[u8; 3]>>,
    },

    /// Open a flight status request
    RequestFlightStatus {
        flight: FlightKey,
        response: oneshot::Sender<Result<u8>>,
    },

    /// Submit an oracle's status report
    SubmitOracleResponse {
        caller: PrincipalId,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
        response: oneshot::Sender<Result<Option<FlightStatus>>>,
    },

    /// Shutdown actor
    Shutdown,
}

/// Actor that processes ledger messages
pub struct SuretyActor {
    store: Arc<Store>,
    config: Config,
    bus: EventBus,
    metrics: Metrics,
    mailbox: mpsc::Receiver<SuretyMessage>,
}

impl SuretyActor {
    /// Create new actor
    pub fn new(
        store: Arc<Store>,
        config: Config,
        bus: EventBus,
        metrics: Metrics,
        mailbox: mpsc::Receiver<SuretyMessage>,
    ) -> Self {
        Self {
            store,
            config,
            bus,
            metrics,
            mailbox,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.mailbox.recv().await {
            if matches!(msg, SuretyMessage::Shutdown) {
                break;
            }
            self.handle_message(msg);
        }
        tracing::debug!("Surety actor stopped");
    }

    /// Apply one mutating operation atomically, publish its events on commit
    fn handle_message(&self, msg: SuretyMessage) {
        match msg {
            SuretyMessage::SetOperatingStatus {
                caller,
                operational,
                response,
            } => {
                let result = self
                    .store
                    .write(|state| gate::set_operating_status(state, &caller, operational));
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::RegisterAirline {
                caller,
                candidate,
                response,
            } => {
                let result = self.store.write(|state| {
                    governance::register_airline(state, &self.config, &caller, &candidate)
                });
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::FundAirline {
                caller,
                amount,
                response,
            } => {
                let result = self
                    .store
                    .write(|state| governance::fund_airline(state, &self.config, &caller, amount));
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::RegisterFlight {
                caller,
                flight,
                response,
            } => {
                let result = self
                    .store
                    .write(|state| escrow::register_flight(state, &caller, flight));
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::BuyInsurance {
                passenger,
                flight,
                amount,
                response,
            } => {
                let result = self.store.write(|state| {
                    escrow::buy_insurance(state, &self.config, &passenger, &flight, amount)
                });
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::Withdraw {
                passenger,
                response,
            } => {
                let result = self.store.write(|state| escrow::withdraw(state, &passenger));
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::RegisterOracle {
                caller,
                fee,
                response,
            } => {
                let result = self
                    .store
                    .write(|state| oracle::register_oracle(state, &self.config, &caller, fee));
                self.finish(result, Vec::new(), response);
            }

            SuretyMessage::RequestFlightStatus { flight, response } => {
                let result = self
                    .store
                    .write(|state| oracle::request_flight_status(state, &self.config, &flight));
                let (result, events) = match result {
                    Ok((index, newly_opened, events)) => {
                        if newly_opened {
                            self.metrics.open_requests.inc();
                        }
                        (Ok(index), events)
                    }
                    Err(e) => (Err(e), Vec::new()),
                };
                self.finish(result, events, response);
            }

            SuretyMessage::SubmitOracleResponse {
                caller,
                index,
                flight,
                status,
                response,
            } => {
                let result = self.store.write(|state| {
                    oracle::submit_oracle_response(state, &self.config, &caller, index, &flight, status)
                });
                let (result, events) = match result {
                    Ok((resolved, events)) => {
                        self.metrics.oracle_responses_total.inc();
                        if resolved.is_some() {
                            self.metrics.flights_resolved_total.inc();
                            self.metrics.open_requests.dec();
                        }
                        if !events.is_empty() {
                            self.metrics.flights_credited_total.inc();
                        }
                        (Ok(resolved), events)
                    }
                    Err(e) => (Err(e), Vec::new()),
                };
                self.finish(result, events, response);
            }

            SuretyMessage::Shutdown => {
                // Handled in main loop
            }
        }
    }

    /// Record metrics, publish post-commit events, reply to the caller
    fn finish<T>(
        &self,
        result: Result<T>,
        events: Vec<SuretyEvent>,
        response: oneshot::Sender<Result<T>>,
    ) {
        self.metrics.record_operation(result.is_err());
        if result.is_ok() {
            for event in events {
                self.bus.publish(event);
            }
        }
        let _ = response.send(result);
    }
}

/// Cloneable handle sending messages to the actor mailbox
#[derive(Clone)]
pub struct SuretyHandle {
    sender: mpsc::Sender<SuretyMessage>,
}

impl SuretyHandle {
    async fn call<T>(
        &self,
        make: impl FnOnce(oneshot::Sender<Result<T>>) -> SuretyMessage,
    ) -> Result<T> {
        let (tx, rx) = oneshot::channel();
        self.sender
            .send(make(tx))
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))?;
        rx.await
            .map_err(|_| Error::Concurrency("actor dropped response".to_string()))?
    }

    /// Toggle the operational gate
    pub async fn set_operating_status(
        &self,
        caller: PrincipalId,
        operational: bool,
    ) -> Result<()> {
        self.call(|response| SuretyMessage::SetOperatingStatus {
            caller,
            operational,
            response,
        })
        .await
    }

    /// Register or endorse an airline
    pub async fn register_airline(
        &self,
        caller: PrincipalId,
        candidate: PrincipalId,
    ) -> Result<RegistrationOutcome> {
        self.call(|response| SuretyMessage::RegisterAirline {
            caller,
            candidate,
            response,
        })
        .await
    }

    /// Fund a registered airline
    pub async fn fund_airline(&self, caller: PrincipalId, amount: Decimal) -> Result<()> {
        self.call(|response| SuretyMessage::FundAirline {
            caller,
            amount,
            response,
        })
        .await
    }

    /// Register a flight
    pub async fn register_flight(&self, caller: PrincipalId, flight: FlightKey) -> Result<()> {
        self.call(|response| SuretyMessage::RegisterFlight {
            caller,
            flight,
            response,
        })
        .await
    }

    /// Buy insurance for a flight
    pub async fn buy_insurance(
        &self,
        passenger: PrincipalId,
        flight: FlightKey,
        amount: Decimal,
    ) -> Result<InsuranceKey> {
        self.call(|response| SuretyMessage::BuyInsurance {
            passenger,
            flight,
            amount,
            response,
        })
        .await
    }

    /// Withdraw credited payouts
    pub async fn withdraw(&self, passenger: PrincipalId) -> Result<Decimal> {
        self.call(|response| SuretyMessage::Withdraw {
            passenger,
            response,
        })
        .await
    }

    /// Register a status oracle
    pub async fn register_oracle(&self, caller: PrincipalId, fee: Decimal) -> Result<[u8; 3]> {
        self.call(|response| SuretyMessage::RegisterOracle {
            caller,
            fee,
            response,
        })
        .await
    }

    /// Open a flight status request; returns the selected index
    pub async fn request_flight_status(&self, flight: FlightKey) -> Result<u8> {
        self.call(|response| SuretyMessage::RequestFlightStatus { flight, response })
            .await
    }

    /// Submit an oracle's status report; returns the resolved status, if any
    pub async fn submit_oracle_response(
        &self,
        caller: PrincipalId,
        index: u8,
        flight: FlightKey,
        status: FlightStatus,
    ) -> Result<Option<FlightStatus>> {
        self.call(|response| SuretyMessage::SubmitOracleResponse {
            caller,
            index,
            flight,
            status,
            response,
        })
        .await
    }

    /// Shutdown the actor
    pub async fn shutdown(&self) -> Result<()> {
        self.sender
            .send(SuretyMessage::Shutdown)
            .await
            .map_err(|_| Error::Concurrency("actor mailbox closed".to_string()))
    }
}

/// Spawn the ledger actor, returning its handle
pub fn spawn_surety_actor(
    store: Arc<Store>,
    config: Config,
    bus: EventBus,
    metrics: Metrics,
) -> SuretyHandle {
    let (sender, mailbox) = mpsc::channel(config.mailbox_capacity);
    let actor = SuretyActor::new(store, config, bus, metrics, mailbox);
    tokio::spawn(actor.run());
    SuretyHandle { sender }
}
