//! Configuration for the insurance ledger

use crate::types::PrincipalId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ledger configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Service name
    pub service_name: String,

    /// Service version
    pub service_version: String,

    /// Owner of the operational gate
    pub owner: PrincipalId,

    /// Airline registered at genesis
    pub founding_airline: PrincipalId,

    /// Governance parameters
    pub governance: GovernanceConfig,

    /// Escrow parameters
    pub escrow: EscrowConfig,

    /// Oracle consensus parameters
    pub oracle: OracleConfig,

    /// Actor mailbox capacity
    pub mailbox_capacity: usize,

    /// Event bus buffer size
    pub event_buffer: usize,

    /// Seed for index assignment and request fan-out; None draws from entropy.
    /// Tests inject a fixed seed for deterministic index assignment.
    pub rng_seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_name: "surety-core".to_string(),
            service_version: env!("CARGO_PKG_VERSION").to_string(),
            owner: PrincipalId::new("owner"),
            founding_airline: PrincipalId::new("airline-founder"),
            governance: GovernanceConfig::default(),
            escrow: EscrowConfig::default(),
            oracle: OracleConfig::default(),
            mailbox_capacity: 256,
            event_buffer: 256,
            rng_seed: None,
        }
    }
}

/// Airline governance parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// Minimum funding for participation (currency units)
    pub funding_minimum: Decimal,

    /// Registered-airline count at which multi-party consensus kicks in
    pub consensus_airline_threshold: usize,
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self {
            funding_minimum: Decimal::from(10),
            consensus_airline_threshold: 4,
        }
    }
}

/// Insurance escrow parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscrowConfig {
    /// Maximum premium per policy (currency units)
    pub insurance_cap: Decimal,

    /// Credit multiplier applied on a qualifying late resolution
    pub payout_multiplier: Decimal,
}

impl Default for EscrowConfig {
    fn default() -> Self {
        Self {
            insurance_cap: Decimal::ONE,
            payout_multiplier: Decimal::new(15, 1), // 1.5x
        }
    }
}

/// Oracle consensus parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OracleConfig {
    /// Fee required to register as an oracle
    pub registration_fee: Decimal,

    /// Matching responses required to resolve a flight status
    pub quorum: usize,

    /// Size of the index space (indexes are 0..index_space)
    pub index_space: u8,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            registration_fee: Decimal::ONE,
            quorum: 3,
            index_space: 10,
        }
    }
}

impl Config {
    /// Load from file
    pub fn from_file(path: impl AsRef<std::path::Path>) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::Error::Config(format!("Failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| crate::Error::Config(format!("Failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Load defaults with environment overrides
    pub fn from_env() -> crate::Result<Self> {
        let mut config = Config::default();

        if let Ok(owner) = std::env::var("SURETY_OWNER") {
            config.owner = PrincipalId::new(owner);
        }

        if let Ok(airline) = std::env::var("SURETY_FOUNDING_AIRLINE") {
            config.founding_airline = PrincipalId::new(airline);
        }

        if let Ok(seed) = std::env::var("SURETY_RNG_SEED") {
            let seed = seed
                .parse::<u64>()
                .map_err(|e| crate::Error::Config(format!("Invalid SURETY_RNG_SEED: {}", e)))?;
            config.rng_seed = Some(seed);
        }

        Ok(config)
    }
}
