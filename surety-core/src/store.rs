//! Ledger state store
//!
//! All persistent entities live in one `LedgerState`, guarded by a single
//! `RwLock`. Mutations run only through the actor (one write lock per
//! operation), so every operation is an atomic transaction and mutations are
//! totally ordered by arrival. Queries take the read lock directly.
//!
//! # Entities
//!
//! - `airlines` - registry entries keyed by principal
//! - `flights` - flight definitions keyed by (airline, code, departure)
//! - `policies` - insurance policies keyed by blake3 insurance key
//! - `oracles` - index assignments keyed by principal
//! - `requests` - open/resolved status requests keyed by (index, flight)
//! - funding/premium/fee ledgers - contract-held funds, kept separate

use crate::{
    config::Config,
    error::{Error, Result},
    types::{
        Airline, Flight, FlightKey, InsuranceKey, InsurancePolicy, OracleRegistration,
        PrincipalId, RequestKey, StatusRequest,
    },
};
use parking_lot::RwLock;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The full mutable ledger state
///
/// Component operations take `&mut LedgerState` and must validate all
/// preconditions before touching any field, so that a returned error
/// leaves the state unchanged.
pub struct LedgerState {
    /// Operational gate
    pub(crate) operational: bool,

    /// Gate owner
    pub(crate) owner: PrincipalId,

    /// Airline registry
    pub(crate) airlines: BTreeMap<PrincipalId, Airline>,

    /// Registered flights
    pub(crate) flights: BTreeMap<FlightKey, Flight>,

    /// Insurance policies
    pub(crate) policies: BTreeMap<InsuranceKey, InsurancePolicy>,

    /// Policy keys per flight, for credit fan-out
    pub(crate) flight_policies: BTreeMap<FlightKey, Vec<InsuranceKey>>,

    /// Oracle index assignments
    pub(crate) oracles: BTreeMap<PrincipalId, OracleRegistration>,

    /// Status requests
    pub(crate) requests: BTreeMap<RequestKey, StatusRequest>,

    /// Airline funding ledger (kept separate from passenger premiums)
    pub(crate) airline_funding: BTreeMap<PrincipalId, Decimal>,

    /// Passenger premium ledger
    pub(crate) premiums_paid: BTreeMap<PrincipalId, Decimal>,

    /// Oracle registration fees collected
    pub(crate) oracle_fees: Decimal,

    /// Total withdrawn by passengers
    pub(crate) withdrawn_total: Decimal,

    /// Injected randomness source for index assignment and fan-out
    pub(crate) rng: StdRng,
}

impl LedgerState {
    /// Genesis state: gate open, founding airline registered
    pub fn new(config: &Config) -> Self {
        let mut airlines = BTreeMap::new();
        airlines.insert(config.founding_airline.clone(), Airline::registered());

        let rng = match config.rng_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self {
            operational: true,
            owner: config.owner.clone(),
            airlines,
            flights: BTreeMap::new(),
            policies: BTreeMap::new(),
            flight_policies: BTreeMap::new(),
            oracles: BTreeMap::new(),
            requests: BTreeMap::new(),
            airline_funding: BTreeMap::new(),
            premiums_paid: BTreeMap::new(),
            oracle_fees: Decimal::ZERO,
            withdrawn_total: Decimal::ZERO,
            rng,
        }
    }

    /// First check of every mutating operation
    pub fn ensure_operational(&self) -> Result<()> {
        if self.operational {
            Ok(())
        } else {
            Err(Error::NotOperational)
        }
    }

    /// Airline entry, if any
    pub fn airline(&self, id: &PrincipalId) -> Option<&Airline> {
        self.airlines.get(id)
    }

    /// Flight entry, if any
    pub fn flight(&self, key: &FlightKey) -> Option<&Flight> {
        self.flights.get(key)
    }

    /// Policy entry, if any
    pub fn policy(&self, key: &InsuranceKey) -> Option<&InsurancePolicy> {
        self.policies.get(key)
    }

    /// Oracle registration, if any
    pub fn oracle(&self, id: &PrincipalId) -> Option<&OracleRegistration> {
        self.oracles.get(id)
    }

    /// Status request entry, if any
    pub fn request(&self, key: &RequestKey) -> Option<&StatusRequest> {
        self.requests.get(key)
    }

    /// Number of funded participant airlines
    pub fn participant_count(&self) -> usize {
        self.airlines.values().filter(|a| a.is_participant()).count()
    }

    /// Number of registered airlines (pending candidates excluded)
    pub fn registered_count(&self) -> usize {
        self.airlines.values().filter(|a| a.is_registered()).count()
    }

    /// Funds currently held by the contract: airline funding, passenger
    /// premiums and oracle fees, less everything withdrawn.
    pub fn contract_held_funds(&self) -> Decimal {
        let funding: Decimal = self.airline_funding.values().copied().sum();
        let premiums: Decimal = self.premiums_paid.values().copied().sum();
        funding + premiums + self.oracle_fees - self.withdrawn_total
    }

    /// Credits owed but not yet claimed, summed over all policies
    pub fn outstanding_payouts(&self) -> Decimal {
        self.policies
            .values()
            .filter(|p| !p.claimed)
            .map(|p| p.payout_owed)
            .sum()
    }

    /// Global solvency invariant: owed-but-unclaimed credits never exceed
    /// the funds the contract holds.
    pub fn is_solvent(&self) -> bool {
        self.outstanding_payouts() <= self.contract_held_funds()
    }
}

/// Storage wrapper serializing access to the ledger state
pub struct Store {
    state: RwLock<LedgerState>,
}

impl Store {
    /// Create store at genesis
    pub fn new(config: &Config) -> Self {
        Self {
            state: RwLock::new(LedgerState::new(config)),
        }
    }

    /// Run a read-only query against the state
    pub fn read<R>(&self, f: impl FnOnce(&LedgerState) -> R) -> R {
        f(&self.state.read())
    }

    /// Run a mutating transaction against the state
    ///
    /// Callers outside the actor must not use this; the actor is the single
    /// writer and defines the total order of mutations.
    pub(crate) fn write<R>(&self, f: impl FnOnce(&mut LedgerState) -> R) -> R {
        f(&mut self.state.write())
    }
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.read();
        f.debug_struct("Store")
            .field("operational", &state.operational)
            .field("airlines", &state.airlines.len())
            .field("flights", &state.flights.len())
            .field("policies", &state.policies.len())
            .field("oracles", &state.oracles.len())
            .finish()
    }
}
