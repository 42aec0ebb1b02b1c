//! Core types for the insurance ledger
//!
//! All types are designed for:
//! - Deterministic serialization (serde)
//! - Memory safety (no unsafe code)
//! - Exact arithmetic (Decimal for money)

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// Opaque principal identity (airline, passenger or oracle account)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrincipalId(String);

impl PrincipalId {
    /// Create new principal ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Get as string
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PrincipalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Flight status code
///
/// Discriminants follow the wire codes reported by status oracles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum FlightStatus {
    /// No resolution yet (initial state)
    Unknown = 0,
    /// Flight departed on time
    OnTime = 10,
    /// Delay caused by the airline (triggers insurance credit)
    LateAirline = 20,
    /// Delay caused by weather
    LateWeather = 30,
    /// Delay caused by technical issues
    LateTechnical = 40,
    /// Delay for any other reason
    LateOther = 50,
}

impl FlightStatus {
    /// Numeric wire code
    pub fn code(&self) -> u8 {
        *self as u8
    }

    /// Parse from wire code
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FlightStatus::Unknown),
            10 => Some(FlightStatus::OnTime),
            20 => Some(FlightStatus::LateAirline),
            30 => Some(FlightStatus::LateWeather),
            40 => Some(FlightStatus::LateTechnical),
            50 => Some(FlightStatus::LateOther),
            _ => None,
        }
    }

    /// All terminal codes an oracle may report
    pub fn reportable() -> [FlightStatus; 5] {
        [
            FlightStatus::OnTime,
            FlightStatus::LateAirline,
            FlightStatus::LateWeather,
            FlightStatus::LateTechnical,
            FlightStatus::LateOther,
        ]
    }
}

impl fmt::Display for FlightStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FlightStatus::Unknown => "UNKNOWN",
            FlightStatus::OnTime => "ON_TIME",
            FlightStatus::LateAirline => "LATE_AIRLINE",
            FlightStatus::LateWeather => "LATE_WEATHER",
            FlightStatus::LateTechnical => "LATE_TECHNICAL",
            FlightStatus::LateOther => "LATE_OTHER",
        };
        write!(f, "{}", name)
    }
}

/// Airline participation status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AirlineStatus {
    /// Candidate accumulating registration votes; not yet admitted
    Unregistered,
    /// Admitted to the registry but not yet funded
    Registered,
    /// Registered and funded; may vote and register flights
    Participant,
}

/// Airline registry entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Airline {
    /// Current participation status
    pub status: AirlineStatus,
    /// Distinct participants that endorsed this airline's registration
    pub votes_received: BTreeSet<PrincipalId>,
}

impl Airline {
    /// New registered airline with no votes recorded
    pub fn registered() -> Self {
        Self {
            status: AirlineStatus::Registered,
            votes_received: BTreeSet::new(),
        }
    }

    /// New candidate awaiting multi-party endorsement
    pub fn candidate() -> Self {
        Self {
            status: AirlineStatus::Unregistered,
            votes_received: BTreeSet::new(),
        }
    }

    /// Registered or better
    pub fn is_registered(&self) -> bool {
        !matches!(self.status, AirlineStatus::Unregistered)
    }

    /// Funded participant
    pub fn is_participant(&self) -> bool {
        matches!(self.status, AirlineStatus::Participant)
    }
}

/// Flight identity: (airline, flight code, scheduled departure)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FlightKey {
    /// Operating airline
    pub airline: PrincipalId,
    /// Flight code, e.g. "ND1309"
    pub flight_code: String,
    /// Scheduled departure (seconds since Unix epoch)
    pub departs_at: i64,
}

impl FlightKey {
    /// Create new flight key
    pub fn new(airline: PrincipalId, flight_code: impl Into<String>, departs_at: i64) -> Self {
        Self {
            airline,
            flight_code: flight_code.into(),
            departs_at,
        }
    }
}

impl fmt::Display for FlightKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}@{}", self.airline, self.flight_code, self.departs_at)
    }
}

/// Registered flight
///
/// Status transitions Unknown → one terminal code exactly once, via
/// oracle consensus; immutable thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Flight {
    /// Flight identity
    pub key: FlightKey,
    /// Resolved status (Unknown until consensus)
    pub status: FlightStatus,
}

impl Flight {
    /// New flight at Unknown status
    pub fn new(key: FlightKey) -> Self {
        Self {
            key,
            status: FlightStatus::Unknown,
        }
    }

    /// True once the flight has left Unknown
    pub fn is_resolved(&self) -> bool {
        self.status != FlightStatus::Unknown
    }
}

/// Insurance policy key: blake3 digest of (passenger, flight key)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct InsuranceKey([u8; 32]);

impl InsuranceKey {
    /// Derive the policy key for a (passenger, flight) pair
    pub fn derive(passenger: &PrincipalId, flight: &FlightKey) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(passenger.as_str().as_bytes());
        hasher.update(flight.airline.as_str().as_bytes());
        hasher.update(flight.flight_code.as_bytes());
        hasher.update(&flight.departs_at.to_be_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Raw digest bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for InsuranceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Passenger insurance policy
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InsurancePolicy {
    /// Insured passenger
    pub passenger: PrincipalId,
    /// Covered flight
    pub flight: FlightKey,
    /// Premium paid at purchase (> 0, ≤ cap)
    pub amount_paid: Decimal,
    /// Credit owed after a qualifying resolution (0 until credited)
    pub payout_owed: Decimal,
    /// Set once the passenger withdraws the credit
    pub claimed: bool,
}

impl InsurancePolicy {
    /// New unclaimed, uncredited policy
    pub fn new(passenger: PrincipalId, flight: FlightKey, amount_paid: Decimal) -> Self {
        Self {
            passenger,
            flight,
            amount_paid,
            payout_owed: Decimal::ZERO,
            claimed: false,
        }
    }

    /// Eligible for credit: never credited, never claimed
    pub fn is_creditable(&self) -> bool {
        !self.claimed && self.payout_owed.is_zero()
    }
}

/// Oracle registration: three indexes assigned for the principal's lifetime
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleRegistration {
    /// Assigned index buckets, immutable after registration
    pub indexes: [u8; 3],
}

impl OracleRegistration {
    /// Whether this oracle holds the given index
    pub fn holds_index(&self, index: u8) -> bool {
        self.indexes.contains(&index)
    }
}

/// Status request key: (index, flight identity)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    /// Index bucket selected at request time
    pub index: u8,
    /// Flight the status is requested for
    pub flight: FlightKey,
}

/// Status request lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    /// Accumulating oracle reports
    Open,
    /// Quorum reached, status fixed
    Resolved,
}

/// Open status request accumulating oracle reports per status code
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusRequest {
    /// Lifecycle state
    pub state: RequestState,
    /// Reporting principals grouped by the status code they reported
    pub responses: BTreeMap<FlightStatus, BTreeSet<PrincipalId>>,
}

impl StatusRequest {
    /// New open request with no responses
    pub fn open() -> Self {
        Self {
            state: RequestState::Open,
            responses: BTreeMap::new(),
        }
    }

    /// Record a report; returns the agreeing-report count for that code.
    ///
    /// A principal re-reporting the same code counts once.
    pub fn record(&mut self, caller: PrincipalId, status: FlightStatus) -> usize {
        let set = self.responses.entry(status).or_default();
        set.insert(caller);
        set.len()
    }

    /// True while reports are still being accepted
    pub fn is_open(&self) -> bool {
        self.state == RequestState::Open
    }
}
