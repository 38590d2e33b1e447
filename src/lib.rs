//! Prowl - profile measurement storage mapping.
//!
//! Prowl sits between a streaming profiler's windowed aggregation step
//! and a sorted key-value store. For every finished measurement it builds
//! a storage row key that avoids write hotspots while keeping range scans
//! and point lookups possible, and derives the store's time-to-live from
//! the profile's retention policy.
//!
//! # Architecture
//!
//! - `core`: measurement and profile-definition domain models
//! - `expression`: boundary to the embedded expression language
//! - `storage`: group-key resolution, row-key construction, TTL, and the
//!   per-record mapper
//!
//! # Example
//!
//! ```no_run
//! use prowl::storage::{ProfileRecord, ProfileStoreMapper};
//!
//! fn write_one(
//!     mapper: &ProfileStoreMapper,
//!     record: &ProfileRecord,
//! ) -> Result<(), Box<dyn std::error::Error>> {
//!     let _key = mapper.row_key(record)?;
//!     let _ttl = mapper.ttl(record)?;
//!     // hand key, ttl, and the value payload to the store client
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod core;
pub mod expression;
pub mod storage;

// Re-export core types for convenience
pub use crate::core::{ProwlError, Result};
