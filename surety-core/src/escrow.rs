//! Insurance escrow
//!
//! Flight definitions, passenger premium purchases, and credit/payout
//! bookkeeping. Payouts use a pull model: a qualifying resolution credits an
//! owed balance, and funds only move when the passenger withdraws.

use crate::{
    config::Config,
    error::{Error, Result},
    store::LedgerState,
    types::{Flight, FlightKey, InsuranceKey, InsurancePolicy, PrincipalId},
};
use rust_decimal::Decimal;

/// Register a flight at Unknown status. Caller must be a participant airline.
pub fn register_flight(state: &mut LedgerState, caller: &PrincipalId, key: FlightKey) -> Result<()> {
    state.ensure_operational()?;

    let caller_is_participant = state
        .airline(caller)
        .map(|a| a.is_participant())
        .unwrap_or(false);
    if !caller_is_participant {
        return Err(Error::NotParticipant(caller.to_string()));
    }

    if state.flights.contains_key(&key) {
        return Err(Error::DuplicateFlight(key.to_string()));
    }

    tracing::info!(flight = %key, "Flight registered");
    state.flights.insert(key.clone(), Flight::new(key));
    Ok(())
}

/// Buy insurance for a registered flight.
///
/// One policy per (passenger, flight); a second purchase for the same pair
/// is rejected. The premium lands in the passenger premium ledger, never in
/// the airline funding ledger.
pub fn buy_insurance(
    state: &mut LedgerState,
    config: &Config,
    passenger: &PrincipalId,
    flight: &FlightKey,
    amount: Decimal,
) -> Result<InsuranceKey> {
    state.ensure_operational()?;

    if !state.flights.contains_key(flight) {
        return Err(Error::FlightNotFound(flight.to_string()));
    }

    if amount <= Decimal::ZERO {
        return Err(Error::InvalidPremium(amount));
    }

    if amount > config.escrow.insurance_cap {
        return Err(Error::PaymentExceedsCap {
            amount,
            cap: config.escrow.insurance_cap,
        });
    }

    let key = InsuranceKey::derive(passenger, flight);
    if state.policies.contains_key(&key) {
        return Err(Error::DuplicatePolicy(passenger.to_string(), flight.to_string()));
    }

    state.policies.insert(
        key,
        InsurancePolicy::new(passenger.clone(), flight.clone(), amount),
    );
    state
        .flight_policies
        .entry(flight.clone())
        .or_default()
        .push(key);
    *state.premiums_paid.entry(passenger.clone()).or_default() += amount;

    tracing::info!(%passenger, flight = %flight, %amount, "Insurance purchased");
    Ok(key)
}

/// Credit every unclaimed, uncredited policy on the flight.
///
/// Invoked only by oracle consensus on a LateAirline resolution; never the
/// reverse direction. Returns (policies credited, total credited) for the
/// emitted event. Pull model: no funds move here.
pub(crate) fn credit_passengers(
    state: &mut LedgerState,
    config: &Config,
    flight: &FlightKey,
) -> (usize, Decimal) {
    let keys = state
        .flight_policies
        .get(flight)
        .cloned()
        .unwrap_or_default();

    let mut credited = 0usize;
    let mut total = Decimal::ZERO;

    for key in keys {
        if let Some(policy) = state.policies.get_mut(&key) {
            if policy.is_creditable() {
                policy.payout_owed = policy.amount_paid * config.escrow.payout_multiplier;
                total += policy.payout_owed;
                credited += 1;
            }
        }
    }

    tracing::info!(flight = %flight, credited, %total, "Passengers credited");
    (credited, total)
}

/// Withdraw all credited, unclaimed payouts for the passenger.
///
/// Marks the policies claimed and returns the transferred sum; fails
/// `NothingOwed` when nothing is credited.
pub fn withdraw(state: &mut LedgerState, passenger: &PrincipalId) -> Result<Decimal> {
    state.ensure_operational()?;

    let owed = payout_owed(state, passenger);
    if owed.is_zero() {
        return Err(Error::NothingOwed(passenger.to_string()));
    }

    for policy in state.policies.values_mut() {
        if &policy.passenger == passenger && !policy.claimed && !policy.payout_owed.is_zero() {
            policy.claimed = true;
        }
    }
    state.withdrawn_total += owed;

    tracing::info!(%passenger, amount = %owed, "Payout withdrawn");
    Ok(owed)
}

/// Status of a registered flight
pub fn flight_status(state: &LedgerState, key: &FlightKey) -> Result<crate::types::FlightStatus> {
    state
        .flight(key)
        .map(|f| f.status)
        .ok_or_else(|| Error::FlightNotFound(key.to_string()))
}

/// Credited, unclaimed payout total for a passenger
pub fn payout_owed(state: &LedgerState, passenger: &PrincipalId) -> Decimal {
    state
        .policies
        .values()
        .filter(|p| &p.passenger == passenger && !p.claimed)
        .map(|p| p.payout_owed)
        .sum()
}

/// Premiums the passenger has paid in total
pub fn premiums_paid(state: &LedgerState, passenger: &PrincipalId) -> Decimal {
    state
        .premiums_paid
        .get(passenger)
        .copied()
        .unwrap_or(Decimal::ZERO)
}
