//! Core domain models for the profile storage-mapping layer.
//!
//! This module contains the measurement and profile-definition types that
//! flow from the upstream aggregation step into key construction.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod types;

// Re-export commonly used types
pub use config::{ProfileDefinition, ProfilerConfig, DEFAULT_SALT_BUCKETS};
pub use error::{ProwlError, Result};
pub use types::{Entity, Measurement, MeasurementBuilder, ProfileName, WindowDuration, WindowUnit};
