//! Airline governance
//!
//! Admission control for airlines joining the network. Below the consensus
//! threshold a single participant admits a candidate directly; at and above
//! it, registration requires endorsements from half of the current
//! participants, evaluated at the moment of each vote.

use crate::{
    config::Config,
    error::{Error, Result},
    store::LedgerState,
    types::{Airline, AirlineStatus, PrincipalId},
};

/// Outcome of a registration call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Candidate reached Registered status with this call
    Registered,
    /// Vote recorded; candidate still pending
    VoteRecorded {
        /// Distinct endorsements so far
        votes: usize,
        /// Endorsements required at this vote
        needed: usize,
    },
}

/// Register an airline, or endorse a pending candidate.
///
/// A repeat vote by the same caller for a pending candidate is a no-op, so
/// retried requests never fail; voting for an already-registered candidate
/// is rejected.
pub fn register_airline(
    state: &mut LedgerState,
    config: &Config,
    caller: &PrincipalId,
    candidate: &PrincipalId,
) -> Result<RegistrationOutcome> {
    state.ensure_operational()?;

    let caller_is_participant = state
        .airline(caller)
        .map(Airline::is_participant)
        .unwrap_or(false);
    if !caller_is_participant {
        return Err(Error::NotParticipant(caller.to_string()));
    }

    if let Some(existing) = state.airline(candidate) {
        if existing.is_registered() {
            return Err(Error::AlreadyVoted(candidate.to_string()));
        }
    }

    // Single-party fast path while the registry is small
    if state.registered_count() < config.governance.consensus_airline_threshold {
        state
            .airlines
            .insert(candidate.clone(), Airline::registered());
        tracing::info!(%candidate, %caller, "Airline registered (fast path)");
        return Ok(RegistrationOutcome::Registered);
    }

    // Multi-party consensus: threshold against the participant count at
    // the moment of this vote.
    let participants = state.participant_count();
    let needed = participants.div_ceil(2);

    let entry = state
        .airlines
        .entry(candidate.clone())
        .or_insert_with(Airline::candidate);
    entry.votes_received.insert(caller.clone());
    let votes = entry.votes_received.len();

    if votes * 2 >= participants {
        entry.status = AirlineStatus::Registered;
        tracing::info!(%candidate, votes, participants, "Airline registered by consensus");
        Ok(RegistrationOutcome::Registered)
    } else {
        tracing::debug!(%candidate, %caller, votes, needed, "Registration vote recorded");
        Ok(RegistrationOutcome::VoteRecorded { votes, needed })
    }
}

/// Fund a registered airline, promoting it to Participant.
///
/// Duplicate funding is rejected rather than silently re-accepted, so an
/// airline is never double-charged.
pub fn fund_airline(
    state: &mut LedgerState,
    config: &Config,
    caller: &PrincipalId,
    amount: rust_decimal::Decimal,
) -> Result<()> {
    state.ensure_operational()?;

    let status = match state.airline(caller) {
        Some(airline) if airline.is_registered() => airline.status,
        _ => return Err(Error::NotRegistered(caller.to_string())),
    };

    if status == AirlineStatus::Participant {
        return Err(Error::AlreadyFunded(caller.to_string()));
    }

    if amount < config.governance.funding_minimum {
        return Err(Error::BelowMinimumFunding {
            amount,
            minimum: config.governance.funding_minimum,
        });
    }

    if let Some(airline) = state.airlines.get_mut(caller) {
        airline.status = AirlineStatus::Participant;
    }
    *state
        .airline_funding
        .entry(caller.clone())
        .or_default() += amount;

    tracing::info!(airline = %caller, %amount, "Airline funded");
    Ok(())
}

/// Whether the principal is a registered airline
pub fn is_registered(state: &LedgerState, id: &PrincipalId) -> bool {
    state.airline(id).map(Airline::is_registered).unwrap_or(false)
}

/// Whether the principal is a funded participant
pub fn is_participant(state: &LedgerState, id: &PrincipalId) -> bool {
    state.airline(id).map(Airline::is_participant).unwrap_or(false)
}

/// Number of registered airlines, pending candidates excluded
pub fn airline_count(state: &LedgerState) -> usize {
    state.registered_count()
}

/// Endorsements recorded for a pending candidate
pub fn votes_for(state: &LedgerState, id: &PrincipalId) -> usize {
    state
        .airline(id)
        .map(|a| a.votes_received.len())
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn setup() -> (Config, LedgerState) {
        let config = Config::default();
        let mut state = LedgerState::new(&config);
        fund_airline(&mut state, &config, &config.founding_airline.clone(), dec!(10)).unwrap();
        (config, state)
    }

    fn airline(n: usize) -> PrincipalId {
        PrincipalId::new(format!("airline-{}", n))
    }

    /// Register and fund airlines 1..=n, voting with as many existing
    /// participants as consensus requires; returns the new airlines
    fn grow_registry(config: &Config, state: &mut LedgerState, n: usize) -> Vec<PrincipalId> {
        let mut voters = vec![config.founding_airline.clone()];
        let mut out = Vec::new();
        for i in 1..=n {
            let id = airline(i);
            for voter in voters.clone() {
                let outcome = register_airline(state, config, &voter, &id).unwrap();
                if outcome == RegistrationOutcome::Registered {
                    break;
                }
            }
            assert!(is_registered(state, &id), "could not register {}", id);
            fund_airline(state, config, &id, dec!(10)).unwrap();
            voters.push(id.clone());
            out.push(id);
        }
        out
    }

    #[test]
    fn test_non_participant_cannot_register() {
        let config = Config::default();
        let mut state = LedgerState::new(&config);

        // Founder is registered but unfunded
        let err =
            register_airline(&mut state, &config, &config.founding_airline.clone(), &airline(1))
                .unwrap_err();
        assert!(matches!(err, Error::NotParticipant(_)));
        assert!(!is_registered(&state, &airline(1)));
    }

    #[test]
    fn test_fast_path_below_threshold() {
        let (config, mut state) = setup();
        let founder = config.founding_airline.clone();

        for i in 1..=3 {
            let outcome = register_airline(&mut state, &config, &founder, &airline(i)).unwrap();
            assert_eq!(outcome, RegistrationOutcome::Registered);
        }
        assert_eq!(state.registered_count(), 4);
    }

    #[test]
    fn test_consensus_required_at_threshold() {
        let (config, mut state) = setup();
        let voters = grow_registry(&config, &mut state, 3);
        assert_eq!(state.registered_count(), 4);
        assert_eq!(state.participant_count(), 4);

        // Fifth airline now needs 2 of 4 participants
        let candidate = airline(5);
        let founder = config.founding_airline.clone();

        let outcome = register_airline(&mut state, &config, &founder, &candidate).unwrap();
        assert_eq!(
            outcome,
            RegistrationOutcome::VoteRecorded { votes: 1, needed: 2 }
        );
        assert!(!is_registered(&state, &candidate));

        let outcome = register_airline(&mut state, &config, &voters[0], &candidate).unwrap();
        assert_eq!(outcome, RegistrationOutcome::Registered);
        assert!(is_registered(&state, &candidate));
    }

    #[test]
    fn test_duplicate_vote_is_noop() {
        let (config, mut state) = setup();
        grow_registry(&config, &mut state, 3);

        let candidate = airline(5);
        let founder = config.founding_airline.clone();

        register_airline(&mut state, &config, &founder, &candidate).unwrap();
        let outcome = register_airline(&mut state, &config, &founder, &candidate).unwrap();
        assert_eq!(
            outcome,
            RegistrationOutcome::VoteRecorded { votes: 1, needed: 2 }
        );
        assert_eq!(votes_for(&state, &candidate), 1);
    }

    #[test]
    fn test_vote_after_registered_rejected() {
        let (config, mut state) = setup();
        let founder = config.founding_airline.clone();

        register_airline(&mut state, &config, &founder, &airline(1)).unwrap();
        let err = register_airline(&mut state, &config, &founder, &airline(1)).unwrap_err();
        assert!(matches!(err, Error::AlreadyVoted(_)));
    }

    #[test]
    fn test_threshold_tracks_participants_at_vote_time() {
        let (config, mut state) = setup();
        let voters = grow_registry(&config, &mut state, 5);
        assert_eq!(state.participant_count(), 6);

        // 6 participants: 3 distinct endorsements needed
        let candidate = airline(9);
        let founder = config.founding_airline.clone();
        register_airline(&mut state, &config, &founder, &candidate).unwrap();
        register_airline(&mut state, &config, &voters[0], &candidate).unwrap();
        assert!(!is_registered(&state, &candidate));
        register_airline(&mut state, &config, &voters[1], &candidate).unwrap();
        assert!(is_registered(&state, &candidate));
    }

    #[test]
    fn test_funding_below_minimum_rejected() {
        let config = Config::default();
        let mut state = LedgerState::new(&config);
        let founder = config.founding_airline.clone();

        let err = fund_airline(&mut state, &config, &founder, dec!(9.99)).unwrap_err();
        assert!(matches!(err, Error::BelowMinimumFunding { .. }));
        assert!(!is_participant(&state, &founder));
        assert_eq!(state.contract_held_funds(), dec!(0));
    }

    #[test]
    fn test_double_funding_rejected() {
        let (config, mut state) = setup();
        let founder = config.founding_airline.clone();

        let err = fund_airline(&mut state, &config, &founder, dec!(10)).unwrap_err();
        assert!(matches!(err, Error::AlreadyFunded(_)));
        assert_eq!(state.airline_funding[&founder], dec!(10));
    }

    #[test]
    fn test_unregistered_cannot_fund() {
        let config = Config::default();
        let mut state = LedgerState::new(&config);

        let err = fund_airline(&mut state, &config, &airline(1), dec!(10)).unwrap_err();
        assert!(matches!(err, Error::NotRegistered(_)));
    }
}
