use crate::core::error::{ProwlError, Result};
use crate::expression::ExprValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the profile definition that produced a measurement
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ProfileName(String);

/// The subject being profiled, e.g. an IP address or a host name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Entity(String);

impl ProfileName {
    /// Creates a new ProfileName after validation
    pub fn new(name: String) -> Result<Self> {
        if name.is_empty() {
            return Err(ProwlError::InvalidMeasurement(
                "ProfileName cannot be empty".to_string(),
            ));
        }
        if name.len() > 255 {
            return Err(ProwlError::InvalidMeasurement(
                "ProfileName cannot exceed 255 characters".to_string(),
            ));
        }
        Ok(ProfileName(name))
    }

    /// Returns the string representation of the profile name
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner string value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Entity {
    /// Creates a new Entity after validation
    pub fn new(entity: String) -> Result<Self> {
        if entity.is_empty() {
            return Err(ProwlError::InvalidMeasurement("Entity cannot be empty".to_string()));
        }
        if entity.len() > 255 {
            return Err(ProwlError::InvalidMeasurement(
                "Entity cannot exceed 255 characters".to_string(),
            ));
        }
        Ok(Entity(entity))
    }

    /// Returns the string representation of the entity
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns the inner string value
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Time unit for a measurement window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowUnit {
    /// Whole seconds
    Seconds,
    /// Whole minutes
    Minutes,
    /// Whole hours
    Hours,
    /// Whole days
    Days,
}

impl WindowUnit {
    /// Milliseconds in one unit
    pub fn millis(&self) -> u64 {
        match self {
            WindowUnit::Seconds => 1_000,
            WindowUnit::Minutes => 60_000,
            WindowUnit::Hours => 3_600_000,
            WindowUnit::Days => 86_400_000,
        }
    }
}

/// Length of a measurement window.
///
/// Fields stay private so every instance, including deserialized ones,
/// passes through `new()`'s positive-length check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawWindowDuration")]
pub struct WindowDuration {
    value: u64,
    unit: WindowUnit,
}

/// Wire shape of a window duration before validation
#[derive(Deserialize)]
struct RawWindowDuration {
    value: u64,
    unit: WindowUnit,
}

impl TryFrom<RawWindowDuration> for WindowDuration {
    type Error = ProwlError;

    fn try_from(raw: RawWindowDuration) -> Result<Self> {
        WindowDuration::new(raw.value, raw.unit)
    }
}

impl WindowDuration {
    /// Creates a new window duration; the value must be positive
    pub fn new(value: u64, unit: WindowUnit) -> Result<Self> {
        if value == 0 {
            return Err(ProwlError::InvalidMeasurement(
                "window duration must be greater than 0".to_string(),
            ));
        }
        Ok(WindowDuration { value, unit })
    }

    /// Number of units in the window, always positive
    pub fn value(&self) -> u64 {
        self.value
    }

    /// The unit the value is measured in
    pub fn unit(&self) -> WindowUnit {
        self.unit
    }

    /// Window length in milliseconds, always positive
    pub fn as_millis(&self) -> u64 {
        self.value * self.unit.millis()
    }
}

/// One completed time-window's aggregated result for a profile/entity pair.
///
/// Constructed once by the upstream aggregator when a window closes and
/// immutable thereafter; the mapping layer only reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    /// Which profile definition produced this measurement
    pub profile_name: ProfileName,
    /// The subject being profiled
    pub entity: Entity,
    /// Start of the window, epoch milliseconds
    pub period_start: u64,
    /// Length of the window
    pub period: WindowDuration,
    /// The aggregated result for the window
    pub value: ExprValue,
    /// Group-by expressions carried from the upstream computation step.
    /// The mapper groups by the definition attached to the record, not
    /// this copy; it is carried so evaluation context can be rebuilt
    /// downstream if needed.
    pub group_by: Vec<String>,
}

impl Measurement {
    /// Creates a new measurement builder
    pub fn builder() -> MeasurementBuilder {
        MeasurementBuilder::default()
    }

    /// End of the window, epoch milliseconds
    pub fn period_end(&self) -> u64 {
        self.period_start + self.period.as_millis()
    }
}

/// Builder for creating Measurement instances
#[derive(Default)]
pub struct MeasurementBuilder {
    profile_name: Option<ProfileName>,
    entity: Option<Entity>,
    period_start: Option<u64>,
    period: Option<WindowDuration>,
    value: Option<ExprValue>,
    group_by: Vec<String>,
}

impl MeasurementBuilder {
    pub fn profile_name(mut self, name: ProfileName) -> Self {
        self.profile_name = Some(name);
        self
    }

    pub fn entity(mut self, entity: Entity) -> Self {
        self.entity = Some(entity);
        self
    }

    pub fn period_start(mut self, start_millis: u64) -> Self {
        self.period_start = Some(start_millis);
        self
    }

    pub fn period(mut self, period: WindowDuration) -> Self {
        self.period = Some(period);
        self
    }

    pub fn value(mut self, value: ExprValue) -> Self {
        self.value = Some(value);
        self
    }

    pub fn group_by<I, S>(mut self, expressions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = expressions.into_iter().map(Into::into).collect();
        self
    }

    pub fn build(self) -> Result<Measurement> {
        Ok(Measurement {
            profile_name: self
                .profile_name
                .ok_or_else(|| ProwlError::InvalidMeasurement("profile_name is required".to_string()))?,
            entity: self
                .entity
                .ok_or_else(|| ProwlError::InvalidMeasurement("entity is required".to_string()))?,
            period_start: self
                .period_start
                .ok_or_else(|| ProwlError::InvalidMeasurement("period_start is required".to_string()))?,
            period: self
                .period
                .ok_or_else(|| ProwlError::InvalidMeasurement("period is required".to_string()))?,
            value: self.value.unwrap_or(ExprValue::Float(0.0)),
            group_by: self.group_by,
        })
    }
}
