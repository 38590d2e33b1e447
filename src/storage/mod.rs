//! Measurement-to-storage-key mapping.
//!
//! This module turns finished profile measurements into the physical
//! artifacts the sorted key-value store needs: a salted, byte-ordered
//! row key and an optional time-to-live. The store client itself lives
//! downstream; this layer owns only the mapping.

pub mod expiration;
pub mod group_key;
pub mod mapper;
pub mod row_key;

// Re-export commonly used types
pub use expiration::ExpirationResolver;
pub use group_key::{GroupKeyResolver, ResolvedKey};
pub use mapper::{ProfileRecord, ProfileStoreMapper, StreamRecord};
pub use row_key::RowKeyBuilder;
