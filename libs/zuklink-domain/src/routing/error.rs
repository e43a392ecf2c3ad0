//! Domain errors for routing table construction
//!
//! Data-quality anomalies in the external view (malformed names, unknown
//! states, segments without a servable replica) are not errors: they are
//! logged and routing degrades. Only configuration problems and structural
//! violations surface here.

use thiserror::Error;

/// Errors that can occur while building routing tables
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RoutingError {
    /// A builder configuration value could not be used
    #[error("Invalid routing configuration for '{key}': {reason}")]
    InvalidConfig { key: String, reason: String },

    /// The external view describes a different table than the one requested
    #[error("External view is for table '{actual}', expected '{expected}'")]
    TableMismatch { expected: String, actual: String },

    /// A table generation worker did not complete
    #[error("Routing table build failed: {0}")]
    BuildFailed(String),
}

impl RoutingError {
    /// Create an invalid config error
    pub fn invalid_config(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a table mismatch error
    pub fn table_mismatch(expected: impl Into<String>, actual: impl Into<String>) -> Self {
        Self::TableMismatch {
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a build failure error
    pub fn build_failed(msg: impl Into<String>) -> Self {
        Self::BuildFailed(msg.into())
    }
}

/// Result type alias for routing operations
pub type Result<T> = std::result::Result<T, RoutingError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_error() {
        let err = RoutingError::invalid_config("routing.table.count", "must be at least 1");
        assert!(matches!(err, RoutingError::InvalidConfig { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid routing configuration for 'routing.table.count': must be at least 1"
        );
    }

    #[test]
    fn test_table_mismatch_error() {
        let err = RoutingError::table_mismatch("events_REALTIME", "clicks_REALTIME");
        assert!(err.to_string().contains("clicks_REALTIME"));
        assert!(err.to_string().contains("expected 'events_REALTIME'"));
    }

    #[test]
    fn test_build_failed_error() {
        let err = RoutingError::build_failed("worker panicked");
        assert_eq!(err.to_string(), "Routing table build failed: worker panicked");
    }
}
