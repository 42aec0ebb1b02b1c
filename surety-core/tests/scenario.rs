//! End-to-end scenarios against the public `Surety` API
//!
//! Mirrors the acceptance flow of the system: multiparty airline admission,
//! insurance purchase, oracle consensus, credit and pull-model withdrawal,
//! and the operational gate.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use surety_core::{
    Config, ErrorKind, FlightKey, FlightStatus, PrincipalId, RegistrationOutcome, Surety,
};

fn test_config() -> Config {
    Config {
        rng_seed: Some(20),
        ..Config::default()
    }
}

fn airline(n: usize) -> PrincipalId {
    PrincipalId::new(format!("airline-{}", n))
}

fn oracle(n: usize) -> PrincipalId {
    PrincipalId::new(format!("oracle-{}", n))
}

/// Register `count` oracles and return those holding `index`
async fn register_holders(surety: &Surety, index: u8, count: usize) -> Vec<PrincipalId> {
    let mut holders = Vec::new();
    let mut n = 0;
    while holders.len() < count {
        n += 1;
        let id = oracle(n);
        let indexes = surety.register_oracle(id.clone(), dec!(1)).await.unwrap();
        if indexes.contains(&index) {
            holders.push(id);
        }
    }
    holders
}

#[tokio::test]
async fn multiparty_admission_fast_path_then_consensus() {
    let surety = Surety::open(test_config());
    let founder = surety.config().founding_airline.clone();
    surety.fund_airline(founder.clone(), dec!(10)).await.unwrap();

    // Fast path: founder alone admits airlines 1-3
    for n in 1..=3 {
        let outcome = surety
            .register_airline(founder.clone(), airline(n))
            .await
            .unwrap();
        assert_eq!(outcome, RegistrationOutcome::Registered);
        surety.fund_airline(airline(n), dec!(10)).await.unwrap();
    }
    assert_eq!(surety.participant_count(), 4);

    // Fifth airline needs 2 of 4 participants
    let candidate = airline(5);
    let outcome = surety
        .register_airline(founder.clone(), candidate.clone())
        .await
        .unwrap();
    assert!(matches!(outcome, RegistrationOutcome::VoteRecorded { votes: 1, needed: 2 }));
    assert!(!surety.is_registered(&candidate));

    let outcome = surety
        .register_airline(airline(1), candidate.clone())
        .await
        .unwrap();
    assert_eq!(outcome, RegistrationOutcome::Registered);
    assert!(surety.is_registered(&candidate));
    assert!(!surety.is_participant(&candidate));
    assert_eq!(surety.airline_count(), 5);

    surety.shutdown().await.unwrap();
}

#[tokio::test]
async fn end_to_end_late_airline_payout() {
    let surety = Surety::open(test_config());
    let founder = surety.config().founding_airline.clone();
    surety.fund_airline(founder.clone(), dec!(10)).await.unwrap();

    // Airline registers flight F
    let flight = FlightKey::new(founder.clone(), "ND1309", 1_700_000_000);
    surety
        .register_flight(founder.clone(), flight.clone())
        .await
        .unwrap();

    // Passenger P buys insurance paying 1 unit
    let passenger = PrincipalId::new("passenger-1");
    surety
        .buy_insurance(passenger.clone(), flight.clone(), dec!(1))
        .await
        .unwrap();
    assert_eq!(surety.premiums_paid(&passenger), dec!(1));

    // Three oracles holding index I each report LateAirline
    let index = surety.request_flight_status(flight.clone()).await.unwrap();
    let holders = register_holders(&surety, index, 3).await;

    let mut resolved = None;
    for holder in &holders {
        resolved = surety
            .submit_oracle_response(
                holder.clone(),
                index,
                flight.clone(),
                FlightStatus::LateAirline,
            )
            .await
            .unwrap();
    }
    assert_eq!(resolved, Some(FlightStatus::LateAirline));
    assert_eq!(
        surety.flight_status(&flight).unwrap(),
        FlightStatus::LateAirline
    );
    assert!(surety.open_request(index, &flight).is_none());

    // P's owed balance becomes 1.5
    assert_eq!(surety.payout_owed(&passenger), dec!(1.5));
    assert!(surety.check_escrow_solvency());

    // P withdraws; owed returns to 0; second withdrawal finds nothing
    let amount = surety.withdraw(passenger.clone()).await.unwrap();
    assert_eq!(amount, dec!(1.5));
    assert_eq!(surety.payout_owed(&passenger), Decimal::ZERO);

    let err = surety.withdraw(passenger.clone()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    // Policy is claimed exactly once
    let policy = surety.policy(&passenger, &flight).unwrap();
    assert!(policy.claimed);
    assert_eq!(policy.payout_owed, dec!(1.5));

    surety.shutdown().await.unwrap();
}

#[tokio::test]
async fn sub_quorum_responses_leave_flight_unknown() {
    let surety = Surety::open(test_config());
    let founder = surety.config().founding_airline.clone();
    surety.fund_airline(founder.clone(), dec!(10)).await.unwrap();

    let flight = FlightKey::new(founder.clone(), "ND1310", 1_700_000_000);
    surety
        .register_flight(founder.clone(), flight.clone())
        .await
        .unwrap();

    let index = surety.request_flight_status(flight.clone()).await.unwrap();
    let holders = register_holders(&surety, index, 2).await;
    assert!(surety.open_request(index, &flight).is_some());

    for holder in &holders {
        let resolved = surety
            .submit_oracle_response(
                holder.clone(),
                index,
                flight.clone(),
                FlightStatus::LateWeather,
            )
            .await
            .unwrap();
        assert!(resolved.is_none());
    }

    assert_eq!(surety.flight_status(&flight).unwrap(), FlightStatus::Unknown);
    assert_eq!(surety.payout_owed(&PrincipalId::new("nobody")), Decimal::ZERO);

    surety.shutdown().await.unwrap();
}

#[tokio::test]
async fn closed_gate_blocks_mutations_not_queries() {
    let surety = Surety::open(test_config());
    let owner = surety.config().owner.clone();
    let founder = surety.config().founding_airline.clone();
    surety.fund_airline(founder.clone(), dec!(10)).await.unwrap();

    let flight = FlightKey::new(founder.clone(), "ND1311", 1_700_000_000);
    surety
        .register_flight(founder.clone(), flight.clone())
        .await
        .unwrap();

    // Non-owner cannot close the gate
    let err = surety
        .set_operating_status(PrincipalId::new("stranger"), false)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    surety.set_operating_status(owner.clone(), false).await.unwrap();
    assert!(!surety.is_operational());

    // Every mutating operation is refused while closed
    let err = surety
        .register_airline(founder.clone(), airline(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety.fund_airline(airline(1), dec!(10)).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety
        .register_flight(
            founder.clone(),
            FlightKey::new(founder.clone(), "ND1399", 1_700_000_000),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety
        .buy_insurance(PrincipalId::new("p"), flight.clone(), dec!(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety
        .register_oracle(oracle(1), dec!(1))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety
        .request_flight_status(flight.clone())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety
        .submit_oracle_response(oracle(1), 0, flight.clone(), FlightStatus::OnTime)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    let err = surety.withdraw(PrincipalId::new("p")).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AccessDenied);

    // Queries keep working
    assert!(surety.is_participant(&founder));
    assert_eq!(surety.flight_status(&flight).unwrap(), FlightStatus::Unknown);
    assert_eq!(surety.participant_count(), 1);
    assert!(!surety.status_snapshot().operational);

    // Reopen and mutate again
    surety.set_operating_status(owner, true).await.unwrap();
    surety
        .register_airline(founder.clone(), airline(1))
        .await
        .unwrap();
    assert!(surety.is_registered(&airline(1)));

    surety.shutdown().await.unwrap();
}

#[tokio::test]
async fn flight_credited_event_published_on_resolution() {
    let surety = Surety::open(test_config());
    let founder = surety.config().founding_airline.clone();
    surety.fund_airline(founder.clone(), dec!(10)).await.unwrap();

    let flight = FlightKey::new(founder.clone(), "ND1312", 1_700_000_000);
    surety
        .register_flight(founder.clone(), flight.clone())
        .await
        .unwrap();
    surety
        .buy_insurance(PrincipalId::new("passenger-1"), flight.clone(), dec!(0.8))
        .await
        .unwrap();

    let index = surety.request_flight_status(flight.clone()).await.unwrap();
    let holders = register_holders(&surety, index, 3).await;

    let mut rx = surety.subscribe();
    for holder in &holders {
        surety
            .submit_oracle_response(
                holder.clone(),
                index,
                flight.clone(),
                FlightStatus::LateAirline,
            )
            .await
            .unwrap();
    }

    let envelope = rx.recv().await.unwrap();
    match envelope.event {
        surety_core::SuretyEvent::FlightCredited {
            flight: f,
            policies_credited,
            total_credited,
        } => {
            assert_eq!(f, flight);
            assert_eq!(policies_credited, 1);
            assert_eq!(total_credited, dec!(1.2));
        }
        other => panic!("unexpected event: {:?}", other),
    }

    surety.shutdown().await.unwrap();
}
