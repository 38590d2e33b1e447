//! Per-record orchestration of key construction and TTL derivation.
//!
//! One mapper instance is driven by the stream runtime, one record at a
//! time. It holds no cross-call state; every public operation is a pure
//! transformation of one record's fields, so instances may be pooled or
//! replicated freely by the runtime.

use crate::core::{Measurement, ProfileDefinition, ProwlError, Result};
use crate::expression::ExpressionEvaluator;
use crate::storage::expiration::ExpirationResolver;
use crate::storage::group_key::GroupKeyResolver;
use crate::storage::row_key::RowKeyBuilder;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Lookup surface of one incoming record from the stream runtime.
///
/// Records expose their payload by logical field name; the mapping layer
/// needs exactly two fields. Absence of either on an operation that
/// requires it is a caller contract violation, surfaced as
/// [`ProwlError::MissingField`].
pub trait StreamRecord {
    /// The completed measurement carried by this record
    fn measurement(&self) -> Option<&Measurement>;
    /// The profile definition that produced the measurement
    fn profile(&self) -> Option<&ProfileDefinition>;
}

/// Plain record holding both fields, for runtimes that deliver owned
/// payloads rather than a field-lookup view.
#[derive(Debug, Clone)]
pub struct ProfileRecord {
    /// The completed measurement, if delivered
    pub measurement: Option<Measurement>,
    /// The originating definition, if delivered; shared across records
    pub profile: Option<Arc<ProfileDefinition>>,
}

impl ProfileRecord {
    /// Creates a fully populated record
    pub fn new(measurement: Measurement, profile: Arc<ProfileDefinition>) -> Self {
        ProfileRecord {
            measurement: Some(measurement),
            profile: Some(profile),
        }
    }
}

impl StreamRecord for ProfileRecord {
    fn measurement(&self) -> Option<&Measurement> {
        self.measurement.as_ref()
    }

    fn profile(&self) -> Option<&ProfileDefinition> {
        self.profile.as_deref()
    }
}

/// Maps one profile measurement record to its storage row key and TTL.
///
/// The evaluator and profile definitions are shared read-only across
/// parallel mapper instances; all per-record state lives inside the
/// group-key resolver's per-call evaluation context.
pub struct ProfileStoreMapper {
    group_key: GroupKeyResolver,
    row_key: RowKeyBuilder,
    expiration: ExpirationResolver,
}

impl ProfileStoreMapper {
    /// Creates a mapper with the given evaluator and salt bucket count
    pub fn new(evaluator: Arc<dyn ExpressionEvaluator>, salt_buckets: u32) -> Result<Self> {
        Ok(ProfileStoreMapper {
            group_key: GroupKeyResolver::new(evaluator),
            row_key: RowKeyBuilder::new(salt_buckets)?,
            expiration: ExpirationResolver,
        })
    }

    /// The underlying key builder, for span reads that need to
    /// re-enumerate written keys
    pub fn key_builder(&self) -> &RowKeyBuilder {
        &self.row_key
    }

    /// Builds the storage row key for one record.
    ///
    /// Evaluates the definition's group-by expressions against the
    /// measurement, then composes the salted, byte-ordered key.
    /// Expression and encoding failures propagate unchanged; a malformed
    /// definition must surface rather than produce a degenerate key.
    pub fn row_key<R: StreamRecord>(&self, record: &R) -> Result<Vec<u8>> {
        let measurement = record
            .measurement()
            .ok_or_else(|| ProwlError::missing_field("measurement"))?;
        let profile = record
            .profile()
            .ok_or_else(|| ProwlError::missing_field("profile"))?;

        let group_values = self.group_key.resolve(profile, measurement)?;
        let key = self.row_key.build_key(profile, measurement, &group_values)?;

        debug!(
            profile = %measurement.profile_name,
            entity = %measurement.entity,
            period_start = measurement.period_start,
            groups = group_values.len(),
            key_len = key.len(),
            "built row key"
        );
        Ok(key)
    }

    /// Derives the store TTL for one record from its profile definition.
    ///
    /// A definition without a retention policy is a normal configuration,
    /// answered with `None`; a record lacking the definition entirely is a
    /// contract violation.
    pub fn ttl<R: StreamRecord>(&self, record: &R) -> Result<Option<Duration>> {
        let profile = record
            .profile()
            .ok_or_else(|| ProwlError::missing_field("profile"))?;

        let ttl = self.expiration.resolve_ttl(profile)?;
        debug!(profile = %profile.name, ttl_ms = ttl.map(|d| d.as_millis() as u64), "resolved TTL");
        Ok(ttl)
    }
}
