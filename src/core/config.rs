//! Profile definition configuration.
//!
//! Definitions are loaded once at startup, validated, and treated as
//! read-only for the lifetime of the process. They may be shared across
//! concurrently processed records, so nothing here mutates after load.

use crate::core::error::{ProwlError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

/// Default number of salt buckets when the configuration does not set one.
///
/// The bucket count is part of the storage schema: changing it invalidates
/// every previously written key layout.
pub const DEFAULT_SALT_BUCKETS: u32 = 128;

/// Static configuration describing how one profile is computed and stored
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileDefinition {
    /// Unique profile name
    pub name: String,
    /// Ordered group-by expressions; order defines dimension significance
    /// inside the row key, most significant first
    pub group_by: Vec<String>,
    /// Retention in whole days; absent means the profile never expires
    pub expires_days: Option<u64>,
}

impl Default for ProfileDefinition {
    fn default() -> Self {
        ProfileDefinition {
            name: String::new(),
            group_by: Vec::new(),
            expires_days: None,
        }
    }
}

impl ProfileDefinition {
    /// Creates a definition with just a name, no grouping, no expiration
    pub fn named<S: Into<String>>(name: S) -> Self {
        ProfileDefinition {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the group-by expressions
    pub fn with_group_by<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = expressions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the retention in days
    pub fn with_expires_days(mut self, days: u64) -> Self {
        self.expires_days = Some(days);
        self
    }
}

/// Complete profiler storage-mapping configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfilerConfig {
    /// Number of salt buckets used to spread writes across store nodes
    pub salt_buckets: u32,
    /// All known profile definitions
    pub profiles: Vec<ProfileDefinition>,
}

impl Default for ProfilerConfig {
    fn default() -> Self {
        ProfilerConfig {
            salt_buckets: DEFAULT_SALT_BUCKETS,
            profiles: Vec::new(),
        }
    }
}

impl ProfilerConfig {
    /// Load configuration from a YAML file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ProfilerConfig = serde_yaml::from_str(yaml)
            .map_err(|e| ProwlError::config(format!("Failed to parse YAML config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    ///
    /// Profile definitions are commonly distributed as JSON documents by
    /// the upstream pipeline's configuration store.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: ProfilerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.salt_buckets == 0 {
            return Err(ProwlError::config("salt_buckets must be greater than 0"));
        }

        let mut seen = HashSet::new();
        for profile in &self.profiles {
            if profile.name.is_empty() {
                return Err(ProwlError::config("profile name cannot be empty"));
            }
            if !seen.insert(profile.name.as_str()) {
                return Err(ProwlError::config(format!(
                    "duplicate profile name: '{}'",
                    profile.name
                )));
            }
            for expr in &profile.group_by {
                if expr.trim().is_empty() {
                    return Err(ProwlError::config(format!(
                        "profile '{}' has an empty group-by expression",
                        profile.name
                    )));
                }
            }
        }

        Ok(())
    }

    /// Look up a definition by profile name
    pub fn profile(&self, name: &str) -> Option<&ProfileDefinition> {
        self.profiles.iter().find(|p| p.name == name)
    }

    /// Wrap every definition in an `Arc` for sharing across parallel
    /// mapper instances
    pub fn shared_profiles(&self) -> Vec<Arc<ProfileDefinition>> {
        self.profiles.iter().cloned().map(Arc::new).collect()
    }
}
