//! Oracle consensus
//!
//! Status oracles are partitioned into a small fixed index space at
//! registration; a status request selects one index and only oracles holding
//! it may respond. Once a fixed quorum of oracles agrees on one status code,
//! the flight resolves to that code permanently and a LateAirline outcome
//! triggers the escrow credit. Indexing bounds the fan-out of consensus and
//! makes single-principal flooding ineffective: an oracle's indexes are fixed
//! at registration, not chosen per request.

use crate::{
    config::Config,
    error::{Error, Result},
    escrow,
    events::SuretyEvent,
    store::LedgerState,
    types::{FlightKey, FlightStatus, OracleRegistration, PrincipalId, RequestKey, RequestState,
        StatusRequest},
};
use rand::Rng;
use rust_decimal::Decimal;

/// Register a status oracle, assigning three distinct pseudo-random indexes.
///
/// The three indexes of one oracle are distinct; two oracles may be assigned
/// identical index sets.
pub fn register_oracle(
    state: &mut LedgerState,
    config: &Config,
    caller: &PrincipalId,
    fee: Decimal,
) -> Result<[u8; 3]> {
    state.ensure_operational()?;

    if fee < config.oracle.registration_fee {
        return Err(Error::InsufficientFee {
            fee,
            required: config.oracle.registration_fee,
        });
    }

    if state.oracles.contains_key(caller) {
        return Err(Error::AlreadyRegistered(caller.to_string()));
    }

    let indexes = assign_indexes(state, config.oracle.index_space);
    state
        .oracles
        .insert(caller.clone(), OracleRegistration { indexes });
    state.oracle_fees += fee;

    tracing::info!(oracle = %caller, ?indexes, "Oracle registered");
    Ok(indexes)
}

/// Draw three distinct indexes from the index space
fn assign_indexes(state: &mut LedgerState, index_space: u8) -> [u8; 3] {
    let mut indexes = [0u8; 3];
    let mut count = 0;
    while count < 3 {
        let candidate = state.rng.gen_range(0..index_space);
        if !indexes[..count].contains(&candidate) {
            indexes[count] = candidate;
            count += 1;
        }
    }
    indexes
}

/// Open a status request for the flight at one pseudo-random index.
///
/// This is the fan-out trigger: the emitted event tells watching oracles
/// which index may respond. Re-requesting an open pair keeps accumulated
/// responses and re-emits the event. The returned flag is true only when
/// this call opened a request that did not exist before.
pub fn request_flight_status(
    state: &mut LedgerState,
    config: &Config,
    flight: &FlightKey,
) -> Result<(u8, bool, Vec<SuretyEvent>)> {
    state.ensure_operational()?;

    match state.flight(flight) {
        None => return Err(Error::FlightNotFound(flight.to_string())),
        Some(f) if f.is_resolved() => {
            return Err(Error::AlreadyResolved(
                flight.to_string(),
                f.status.to_string(),
            ))
        }
        Some(_) => {}
    }

    let index = state.rng.gen_range(0..config.oracle.index_space);
    let key = RequestKey {
        index,
        flight: flight.clone(),
    };
    let newly_opened = !state.requests.contains_key(&key);
    state.requests.entry(key).or_insert_with(StatusRequest::open);

    tracing::info!(flight = %flight, index, newly_opened, "Flight status requested");
    let events = vec![SuretyEvent::StatusRequested {
        index,
        flight: flight.clone(),
    }];
    Ok((index, newly_opened, events))
}

/// Submit an oracle's status report.
///
/// Counts only if the caller holds the index and an open request matches.
/// Reaching the quorum resolves the flight exactly once; responses arriving
/// after resolution are rejected so callers can detect staleness.
pub fn submit_oracle_response(
    state: &mut LedgerState,
    config: &Config,
    caller: &PrincipalId,
    index: u8,
    flight: &FlightKey,
    status: FlightStatus,
) -> Result<(Option<FlightStatus>, Vec<SuretyEvent>)> {
    state.ensure_operational()?;

    let holds_index = state
        .oracle(caller)
        .map(|r| r.holds_index(index))
        .unwrap_or(false);
    if !holds_index {
        return Err(Error::IndexNotOwned {
            caller: caller.to_string(),
            index,
        });
    }

    if status == FlightStatus::Unknown {
        return Err(Error::UnreportableStatus(status.code()));
    }

    if let Some(f) = state.flight(flight) {
        if f.is_resolved() {
            return Err(Error::AlreadyResolved(
                flight.to_string(),
                f.status.to_string(),
            ));
        }
    }

    let request_key = RequestKey {
        index,
        flight: flight.clone(),
    };
    let agreeing = match state.requests.get_mut(&request_key) {
        Some(request) if request.is_open() => request.record(caller.clone(), status),
        _ => {
            return Err(Error::NoSuchRequest {
                index,
                flight: flight.to_string(),
            })
        }
    };

    tracing::debug!(oracle = %caller, flight = %flight, %status, agreeing, "Oracle response recorded");

    if agreeing < config.oracle.quorum {
        return Ok((None, Vec::new()));
    }

    // Quorum reached: the flight transitions Unknown -> status exactly once.
    if let Some(f) = state.flights.get_mut(flight) {
        f.status = status;
    }
    if let Some(request) = state.requests.get_mut(&request_key) {
        request.state = RequestState::Resolved;
    }
    tracing::info!(flight = %flight, %status, "Flight status resolved");

    let mut events = Vec::new();
    if status == FlightStatus::LateAirline {
        let (policies_credited, total_credited) = escrow::credit_passengers(state, config, flight);
        events.push(SuretyEvent::FlightCredited {
            flight: flight.clone(),
            policies_credited,
            total_credited,
        });
    }

    Ok((Some(status), events))
}

/// Indexes assigned to a registered oracle
pub fn oracle_indexes(state: &LedgerState, id: &PrincipalId) -> Option<[u8; 3]> {
    state.oracle(id).map(|r| r.indexes)
}

/// The open status request at (index, flight), if one exists
pub fn open_request(state: &LedgerState, index: u8, flight: &FlightKey) -> Option<StatusRequest> {
    state
        .request(&RequestKey {
            index,
            flight: flight.clone(),
        })
        .filter(|r| r.is_open())
        .cloned()
}
