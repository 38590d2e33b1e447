use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProwlError {
    #[error("Expression evaluation error: {0}")]
    Expression(String),

    #[error("Key encoding error: {0}")]
    Encoding(String),

    #[error("Missing required record field: {0}")]
    MissingField(String),

    #[error("Invalid measurement: {0}")]
    InvalidMeasurement(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type alias for prowl operations
pub type Result<T> = std::result::Result<T, ProwlError>;

impl ProwlError {
    /// Creates a new expression evaluation error
    pub fn expression<S: Into<String>>(msg: S) -> Self {
        Self::Expression(msg.into())
    }

    /// Creates a new key encoding error
    pub fn encoding<S: Into<String>>(msg: S) -> Self {
        Self::Encoding(msg.into())
    }

    /// Creates a new missing-field error
    pub fn missing_field<S: Into<String>>(field: S) -> Self {
        Self::MissingField(field.into())
    }

    /// Creates a new configuration error
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    /// Returns true if this error points at a profile definition defect
    /// rather than a transient record problem
    pub fn is_definition_defect(&self) -> bool {
        matches!(self, Self::Expression(_) | Self::Encoding(_) | Self::Config(_))
    }

    /// Returns the error category for metrics/logging
    pub fn category(&self) -> &'static str {
        match self {
            Self::Expression(_) => "expression",
            Self::Encoding(_) => "encoding",
            Self::MissingField(_) => "missing_field",
            Self::InvalidMeasurement(_) => "validation",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ProwlError::expression("unbound variable 'ip_dst'");
        assert_eq!(
            err.to_string(),
            "Expression evaluation error: unbound variable 'ip_dst'"
        );
        assert_eq!(err.category(), "expression");
    }

    #[test]
    fn test_definition_defect_classification() {
        assert!(ProwlError::encoding("no key encoding for map values").is_definition_defect());
        assert!(!ProwlError::missing_field("measurement").is_definition_defect());
    }

    #[test]
    fn test_missing_field_message() {
        let err = ProwlError::missing_field("profile");
        assert_eq!(err.to_string(), "Missing required record field: profile");
    }
}
