//! Row-key construction for the sorted key-value store.
//!
//! A naive key of `profile + entity + period` clusters all writes for one
//! profile/entity pair onto the same store node in time order, hotspotting
//! that node under streaming ingestion. Keys here are therefore prefixed
//! with a deterministic salt bucket derived from the logical identity, so
//! consecutive windows land on different nodes while every key remains
//! reconstructible for point lookups without a forward index.
//!
//! Layout, in order:
//!
//! ```text
//! salt(2, BE) | len(2) profile | len(2) entity | period_start(8, BE) | tagged group values
//! ```
//!
//! `period_start` is big-endian so byte-lexicographic order equals
//! chronological order within one salt bucket, which range scans over a
//! time span rely on. Each group value carries a one-byte type tag and a
//! fixed-width or length-prefixed payload, so distinct dimension-value
//! sequences never collide or form ambiguous prefixes.

use crate::core::{Entity, Measurement, ProfileDefinition, ProfileName, ProwlError, Result, WindowDuration};
use crate::expression::ExprValue;
use rustc_hash::FxHasher;
use std::hash::{Hash, Hasher};

/// Type tag preceding each encoded group value
const TAG_FLOAT: u8 = 0x01;
const TAG_INT: u8 = 0x02;
const TAG_STR: u8 = 0x03;
const TAG_BOOL: u8 = 0x04;

/// Builds byte-ordered, salted row keys.
///
/// Pure: the same inputs always produce byte-identical keys. The bucket
/// count is part of the storage schema; changing it invalidates every
/// existing key layout.
#[derive(Debug, Clone, Copy)]
pub struct RowKeyBuilder {
    salt_buckets: u32,
}

impl RowKeyBuilder {
    /// Creates a builder with the given salt bucket count.
    ///
    /// The salt is emitted as two bytes, so at most 65,536 buckets are
    /// representable.
    pub fn new(salt_buckets: u32) -> Result<Self> {
        if salt_buckets == 0 {
            return Err(ProwlError::config("salt_buckets must be greater than 0"));
        }
        if salt_buckets > 65_536 {
            return Err(ProwlError::config(format!(
                "salt_buckets cannot exceed 65536, got {}",
                salt_buckets
            )));
        }
        Ok(RowKeyBuilder { salt_buckets })
    }

    /// The configured bucket count
    pub fn salt_buckets(&self) -> u32 {
        self.salt_buckets
    }

    /// Builds the row key for one measurement and its resolved group
    /// dimension values.
    pub fn build_key(
        &self,
        definition: &ProfileDefinition,
        measurement: &Measurement,
        group_values: &[ExprValue],
    ) -> Result<Vec<u8>> {
        self.compose(
            &definition.name,
            measurement.entity.as_str(),
            measurement.period_start,
            group_values,
        )
    }

    /// Rebuilds every row key covering the closed time span
    /// `[start_millis, end_millis]` for a fixed profile, entity, and group
    /// dimension values, stepping period by period.
    ///
    /// Because the salt derives from `period_start`, each key is fully
    /// reconstructible, which is what makes salted keys usable for
    /// point lookups and span reads.
    pub fn scan_keys(
        &self,
        profile: &ProfileName,
        entity: &Entity,
        group_values: &[ExprValue],
        start_millis: u64,
        end_millis: u64,
        period: WindowDuration,
    ) -> Result<Vec<Vec<u8>>> {
        let period_millis = period.as_millis();
        let mut keys = Vec::new();

        // Align to the period boundary containing the span start.
        let mut period_start = start_millis - (start_millis % period_millis);
        while period_start <= end_millis {
            keys.push(self.compose(profile.as_str(), entity.as_str(), period_start, group_values)?);
            period_start += period_millis;
        }

        Ok(keys)
    }

    /// Salt bucket for one logical identity, reduced from a stable 64-bit
    /// hash. FxHash is deterministic across processes and releases, which
    /// key reconstruction depends on.
    pub fn salt(&self, profile: &str, entity: &str, period_start: u64) -> u16 {
        let mut hasher = FxHasher::default();
        profile.hash(&mut hasher);
        entity.hash(&mut hasher);
        period_start.hash(&mut hasher);
        (hasher.finish() % u64::from(self.salt_buckets)) as u16
    }

    fn compose(
        &self,
        profile: &str,
        entity: &str,
        period_start: u64,
        group_values: &[ExprValue],
    ) -> Result<Vec<u8>> {
        let mut key = Vec::with_capacity(2 + 4 + profile.len() + entity.len() + 8 + group_values.len() * 9);

        key.extend_from_slice(&self.salt(profile, entity, period_start).to_be_bytes());
        push_str(&mut key, profile)?;
        push_str(&mut key, entity)?;
        key.extend_from_slice(&period_start.to_be_bytes());

        for value in group_values {
            push_value(&mut key, value)?;
        }

        Ok(key)
    }
}

/// Appends a u16-length-prefixed UTF-8 string
fn push_str(key: &mut Vec<u8>, s: &str) -> Result<()> {
    let len = u16::try_from(s.len())
        .map_err(|_| ProwlError::encoding(format!("string exceeds {} bytes in key", u16::MAX)))?;
    key.extend_from_slice(&len.to_be_bytes());
    key.extend_from_slice(s.as_bytes());
    Ok(())
}

/// Appends one tagged group value with an order-preserving encoding
fn push_value(key: &mut Vec<u8>, value: &ExprValue) -> Result<()> {
    match value {
        ExprValue::Float(f) => {
            key.push(TAG_FLOAT);
            key.extend_from_slice(&encode_f64_ordered(*f));
        },
        ExprValue::Int(i) => {
            key.push(TAG_INT);
            key.extend_from_slice(&encode_i64_ordered(*i));
        },
        ExprValue::Str(s) => {
            key.push(TAG_STR);
            push_str(key, s)?;
        },
        ExprValue::Bool(b) => {
            key.push(TAG_BOOL);
            key.push(u8::from(*b));
        },
        ExprValue::List(_) => {
            return Err(ProwlError::encoding(
                "list values have no key encoding; group-by expressions must yield scalars",
            ));
        },
    }
    Ok(())
}

/// IEEE-754 total-order transform: negative values flip entirely,
/// non-negative values flip the sign bit. Byte comparison of the result
/// matches numeric comparison.
fn encode_f64_ordered(value: f64) -> [u8; 8] {
    let bits = value.to_bits();
    let ordered = if bits & (1 << 63) != 0 {
        !bits
    } else {
        bits ^ (1 << 63)
    };
    ordered.to_be_bytes()
}

/// Offset-binary transform so byte comparison matches signed comparison
fn encode_i64_ordered(value: i64) -> [u8; 8] {
    ((value as u64) ^ (1 << 63)).to_be_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::WindowUnit;
    use std::collections::HashSet;

    fn measurement(period_start: u64) -> Measurement {
        Measurement::builder()
            .profile_name(ProfileName::new("profile".to_string()).unwrap())
            .entity(Entity::new("10.0.0.1".to_string()).unwrap())
            .period_start(period_start)
            .period(WindowDuration::new(15, WindowUnit::Minutes).unwrap())
            .value(ExprValue::Int(22))
            .build()
            .unwrap()
    }

    fn definition() -> ProfileDefinition {
        ProfileDefinition::named("profile")
    }

    #[test]
    fn test_build_key_is_deterministic() {
        let builder = RowKeyBuilder::new(128).unwrap();
        let m = measurement(20_000);
        let groups = [ExprValue::Float(4.0), ExprValue::Str("weekday".to_string())];

        let first = builder.build_key(&definition(), &m, &groups).unwrap();
        let second = builder.build_key(&definition(), &m, &groups).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_salt_spreads_consecutive_periods() {
        let builder = RowKeyBuilder::new(16).unwrap();
        let period_millis = 15 * 60_000;

        let buckets: HashSet<u16> = (0..100)
            .map(|i| builder.salt("profile", "10.0.0.1", i * period_millis))
            .collect();

        // A constant salt would defeat the point of salting entirely.
        assert!(buckets.len() > 1, "salt must vary across periods, got {:?}", buckets);
    }

    #[test]
    fn test_salt_stays_in_bucket_range() {
        let builder = RowKeyBuilder::new(4).unwrap();
        for i in 0..1_000u64 {
            assert!(builder.salt("profile", "entity", i) < 4);
        }
    }

    #[test]
    fn test_lexicographic_order_matches_chronological() {
        // One bucket pins the salt so only the time portion orders keys.
        let builder = RowKeyBuilder::new(1).unwrap();

        let mut keys: Vec<Vec<u8>> = (0..50)
            .map(|i| builder.build_key(&definition(), &measurement(i * 900_000), &[]).unwrap())
            .collect();

        let chronological = keys.clone();
        keys.sort();
        assert_eq!(keys, chronological);
    }

    #[test]
    fn test_float_encoding_preserves_order() {
        let samples = [-1_000.5, -1.0, -0.0, 0.0, 0.5, 1.0, 4.0, 8.0, 1_000.25];
        for window in samples.windows(2) {
            assert!(
                encode_f64_ordered(window[0]) <= encode_f64_ordered(window[1]),
                "{} should sort before {}",
                window[0],
                window[1]
            );
        }
    }

    #[test]
    fn test_int_encoding_preserves_order() {
        let samples = [i64::MIN, -5, -1, 0, 1, 5, i64::MAX];
        for window in samples.windows(2) {
            assert!(encode_i64_ordered(window[0]) < encode_i64_ordered(window[1]));
        }
    }

    #[test]
    fn test_length_prefix_prevents_ambiguous_prefixes() {
        let builder = RowKeyBuilder::new(1).unwrap();
        let m = measurement(20_000);

        let ab_c = builder
            .build_key(
                &definition(),
                &m,
                &[ExprValue::Str("ab".to_string()), ExprValue::Str("c".to_string())],
            )
            .unwrap();
        let a_bc = builder
            .build_key(
                &definition(),
                &m,
                &[ExprValue::Str("a".to_string()), ExprValue::Str("bc".to_string())],
            )
            .unwrap();
        assert_ne!(ab_c, a_bc);
    }

    #[test]
    fn test_list_value_has_no_encoding() {
        let builder = RowKeyBuilder::new(128).unwrap();
        let err = builder
            .build_key(&definition(), &measurement(0), &[ExprValue::List(vec![])])
            .unwrap_err();
        assert!(matches!(err, ProwlError::Encoding(_)));
    }

    #[test]
    fn test_scan_keys_cover_span_and_match_build_key() {
        let builder = RowKeyBuilder::new(128).unwrap();
        let profile = ProfileName::new("profile".to_string()).unwrap();
        let entity = Entity::new("10.0.0.1".to_string()).unwrap();
        let period = WindowDuration::new(15, WindowUnit::Minutes).unwrap();

        // Span of exactly four 15-minute periods starting mid-period.
        let keys = builder
            .scan_keys(&profile, &entity, &[], 100_000, 3_600_000, period)
            .unwrap();
        assert_eq!(keys.len(), 5);

        // Each enumerated key equals the key written for that period.
        let written = builder.build_key(&definition(), &measurement(900_000), &[]).unwrap();
        assert!(keys.contains(&written));
    }

    #[test]
    fn test_bucket_count_limits() {
        assert!(RowKeyBuilder::new(0).is_err());
        assert!(RowKeyBuilder::new(65_537).is_err());
        assert!(RowKeyBuilder::new(65_536).is_ok());
    }
}
