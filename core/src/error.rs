//! Error types for esperf-core

use std::fmt;

/// Broad category of an engine-level error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchErrorKind {
    /// Invalid or incomplete configuration
    Config,
    /// Worker pool coordination failed
    Orchestration,
}

impl fmt::Display for BenchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BenchErrorKind::Config => "configuration error",
            BenchErrorKind::Orchestration => "orchestration error",
        };
        f.write_str(name)
    }
}

/// Error raised while building or running the engine
///
/// Per-request failures never surface here; they are captured in the
/// [`RequestRecord`](crate::metrics::RequestRecord) of the attempt instead.
#[derive(Debug, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct BenchError {
    /// Error category
    pub kind: BenchErrorKind,
    /// Human readable description
    pub message: String,
}

impl BenchError {
    fn new(kind: BenchErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// A required builder field was not set
    pub fn missing_config(field: &str) -> Self {
        Self::new(
            BenchErrorKind::Config,
            format!("missing required field `{field}`"),
        )
    }

    /// Configuration failed validation
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Config, message)
    }

    /// Worker pool failure
    pub fn orchestration(message: impl Into<String>) -> Self {
        Self::new(BenchErrorKind::Orchestration, message)
    }
}

impl From<crate::config::ConfigError> for BenchError {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::config(err.to_string())
    }
}

/// Result type alias
pub type BenchResult<T> = std::result::Result<T, BenchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_message() {
        let err = BenchError::missing_config("client");
        assert_eq!(err.kind, BenchErrorKind::Config);
        assert!(err.message.contains("client"));
        assert_eq!(
            err.to_string(),
            "configuration error: missing required field `client`"
        );
    }

    #[test]
    fn test_orchestration_display() {
        let err = BenchError::orchestration("all workers failed");
        assert_eq!(err.to_string(), "orchestration error: all workers failed");
    }
}
