//! Operational gate
//!
//! Global enable/disable switch held in the store and checked as the first
//! step of every mutating operation. Only the configured owner may toggle it;
//! queries are never gated.

use crate::{
    error::{Error, Result},
    store::LedgerState,
    types::PrincipalId,
};

/// Toggle the operational gate. Idempotent on the same mode.
pub fn set_operating_status(
    state: &mut LedgerState,
    caller: &PrincipalId,
    operational: bool,
) -> Result<()> {
    if caller != &state.owner {
        return Err(Error::NotOwner(caller.to_string()));
    }

    if state.operational != operational {
        tracing::info!(operational, "Operating status changed");
        state.operational = operational;
    }

    Ok(())
}

/// Whether mutating operations are currently accepted
pub fn is_operational(state: &LedgerState) -> bool {
    state.operational
}
