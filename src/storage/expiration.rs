//! Retention-to-TTL derivation.

use crate::core::{ProfileDefinition, ProwlError, Result};
use std::time::Duration;

/// Milliseconds in one whole day
const MILLIS_PER_DAY: u64 = 86_400_000;

/// Derives a store-compatible time-to-live from a profile's declared
/// retention policy.
///
/// The TTL is relative, a store-managed countdown from write time; this
/// layer never computes an absolute deadline.
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpirationResolver;

impl ExpirationResolver {
    /// Converts `expires_days` to the store's native millisecond TTL
    /// using exact integer arithmetic. A definition without a retention
    /// policy yields `None`, never a zero duration. A day count too
    /// large for the millisecond range is a configuration defect.
    pub fn resolve_ttl(&self, definition: &ProfileDefinition) -> Result<Option<Duration>> {
        match definition.expires_days {
            None => Ok(None),
            Some(days) => {
                let millis = days.checked_mul(MILLIS_PER_DAY).ok_or_else(|| {
                    ProwlError::config(format!(
                        "expires_days {} overflows the millisecond TTL range",
                        days
                    ))
                })?;
                Ok(Some(Duration::from_millis(millis)))
            },
        }
    }
}
