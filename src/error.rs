//! # Error Types Module
//!
//! Error taxonomy for a batch run.
//!
//! ## Categories:
//! - `Discovery`: a directory or file could not be listed during the walk.
//!   The walker recovers from these locally by skipping the subtree.
//! - `Transformation`: the external tool failed for one item. Processors
//!   turn these into a failed `ProcessingResult` instead of returning them.
//! - `Configuration`: invalid run parameters. Fatal, reported before any
//!   work is dispatched.
//! - `MissingDependency`: the external tool is not installed. Fatal.
//! - `Io`: setup I/O (creating the output root, reading the ignore file).
//!
//! Application code passes these around inside `anyhow::Error`; callers that
//! need to tell a configuration error apart use `downcast_ref::<BatchError>()`.
//!
//! ## Example:
//! ```rust,ignore
//! if config.workers == 0 {
//!     return Err(BatchError::Configuration("workers must be at least 1".into()).into());
//! }
//! ```

use std::path::PathBuf;

/// Custom error types for batch processing
#[derive(thiserror::Error, Debug)]
pub enum BatchError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot read {path}: {message}")]
    Discovery { path: PathBuf, message: String },

    #[error("Transformation failed for {path}: {message}")]
    Transformation { path: PathBuf, message: String },

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Dependency missing: {0}")]
    MissingDependency(String),
}

impl BatchError {
    /// True for errors that must abort the run before dispatch
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            BatchError::Configuration(_) | BatchError::MissingDependency(_) | BatchError::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(BatchError::Configuration("bad".into()).is_fatal());
        assert!(BatchError::MissingDependency("gifsicle".into()).is_fatal());
        assert!(!BatchError::Discovery {
            path: PathBuf::from("/x"),
            message: "denied".into()
        }
        .is_fatal());
        assert!(!BatchError::Transformation {
            path: PathBuf::from("/x.gif"),
            message: "exit 1".into()
        }
        .is_fatal());
    }

    #[test]
    fn test_configuration_survives_anyhow_roundtrip() {
        let err: anyhow::Error = BatchError::Configuration("workers must be at least 1".into()).into();
        let inner = err.downcast_ref::<BatchError>().unwrap();
        assert!(matches!(inner, BatchError::Configuration(_)));
        assert_eq!(err.to_string(), "Configuration error: workers must be at least 1");
    }
}
