//! Metrics collection for observability
//!
//! Prometheus metrics recorded by the actor on every mutating operation.
//!
//! # Metrics
//!
//! - `surety_operations_total` - Mutating operations processed
//! - `surety_rejections_total` - Operations rejected with an error
//! - `surety_oracle_responses_total` - Oracle responses accepted
//! - `surety_flights_resolved_total` - Flights resolved by consensus
//! - `surety_flights_credited_total` - LateAirline resolutions that credited policies
//! - `surety_open_requests` - Status requests currently open

use prometheus::{IntCounter, IntGauge, Registry};
use std::sync::Arc;

/// Metrics collector
#[derive(Clone)]
pub struct Metrics {
    /// Mutating operations processed
    pub operations_total: IntCounter,

    /// Operations rejected with an error
    pub rejections_total: IntCounter,

    /// Oracle responses accepted
    pub oracle_responses_total: IntCounter,

    /// Flights resolved by consensus
    pub flights_resolved_total: IntCounter,

    /// LateAirline resolutions that credited policies
    pub flights_credited_total: IntCounter,

    /// Status requests currently open
    pub open_requests: IntGauge,

    /// Prometheus registry
    pub registry: Arc<Registry>,
}

impl Metrics {
    /// Create new metrics collector
    pub fn new() -> prometheus::Result<Self> {
        let registry = Arc::new(Registry::new());

        let operations_total = IntCounter::new(
            "surety_operations_total",
            "Mutating operations processed",
        )?;
        registry.register(Box::new(operations_total.clone()))?;

        let rejections_total = IntCounter::new(
            "surety_rejections_total",
            "Operations rejected with an error",
        )?;
        registry.register(Box::new(rejections_total.clone()))?;

        let oracle_responses_total = IntCounter::new(
            "surety_oracle_responses_total",
            "Oracle responses accepted",
        )?;
        registry.register(Box::new(oracle_responses_total.clone()))?;

        let flights_resolved_total = IntCounter::new(
            "surety_flights_resolved_total",
            "Flights resolved by consensus",
        )?;
        registry.register(Box::new(flights_resolved_total.clone()))?;

        let flights_credited_total = IntCounter::new(
            "surety_flights_credited_total",
            "LateAirline resolutions that credited policies",
        )?;
        registry.register(Box::new(flights_credited_total.clone()))?;

        let open_requests = IntGauge::new(
            "surety_open_requests",
            "Status requests currently open",
        )?;
        registry.register(Box::new(open_requests.clone()))?;

        Ok(Self {
            operations_total,
            rejections_total,
            oracle_responses_total,
            flights_resolved_total,
            flights_credited_total,
            open_requests,
            registry,
        })
    }

    /// Record a processed operation and whether it was rejected
    pub fn record_operation(&self, rejected: bool) {
        self.operations_total.inc();
        if rejected {
            self.rejections_total.inc();
        }
    }

    /// Get metrics registry
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new().expect("Failed to create metrics")
    }
}
