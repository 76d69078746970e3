//! Error types for the inference backend.
//!
//! This module defines the error taxonomy for the backend: fatal
//! initialization errors, per-request engine faults, input transform
//! failures and invalid input or configuration problems. Helper
//! constructors attach the stage and task context needed to log failures
//! meaningfully.

use thiserror::Error;

/// Enum identifying the engine stage a request-path fault occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Error occurred while binding the input tensor.
    InputBinding,
    /// Error occurred during the forward pass or output extraction.
    Extraction,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::InputBinding => write!(f, "input binding"),
            Stage::Extraction => write!(f, "extraction"),
        }
    }
}

/// Enum representing the errors that can occur in the backend.
///
/// Initialization failures leave the backend unusable. Engine faults fail
/// the single request they occurred in and are never retried. Input
/// transform errors originate in the preprocessing collaborator and are
/// propagated unchanged.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Fatal error while loading the topology or weights.
    #[error("initialization failed: {context}")]
    Initialization {
        /// Additional context about the failure.
        context: String,
        /// The underlying error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The inference engine signaled an internal fault.
    #[error("inference engine fault during {stage}: {context}")]
    InferenceEngine {
        /// The request stage the fault occurred in.
        stage: Stage,
        /// Additional context about the fault.
        context: String,
        /// The underlying engine error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The preprocessing collaborator failed to transform the input.
    #[error("input transform")]
    InputTransform(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Error indicating invalid input.
    #[error("invalid input: {message}")]
    InvalidInput {
        /// A message describing the invalid input.
        message: String,
    },

    /// Error indicating a configuration problem.
    #[error("configuration: {message}")]
    Config {
        /// A message describing the configuration error.
        message: String,
    },
}

/// Convenient result alias for backend operations.
pub type BackendResult<T> = Result<T, BackendError>;

impl BackendError {
    /// Creates a fatal initialization error with context.
    pub fn initialization(context: impl Into<String>) -> Self {
        Self::Initialization {
            context: context.into(),
            source: None,
        }
    }

    /// Creates a fatal initialization error wrapping an underlying cause.
    pub fn initialization_with_source(
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Initialization {
            context: context.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates an engine-fault error for the given request stage.
    pub fn engine_error(
        stage: Stage,
        context: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::InferenceEngine {
            stage,
            context: context.into(),
            source: Box::new(source),
        }
    }

    /// Wraps a preprocessing-collaborator failure for unchanged
    /// propagation.
    pub fn input_transform(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InputTransform(Box::new(source))
    }

    /// Creates an error for invalid input.
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Creates a configuration error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

/// A minimal string-backed error for wrapping plain messages as a source.
#[derive(Debug)]
pub struct SimpleError {
    message: String,
}

impl SimpleError {
    /// Creates a new SimpleError with the given message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for SimpleError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for SimpleError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_carries_stage() {
        let err = BackendError::engine_error(
            Stage::Extraction,
            "output blob 'prob' unavailable",
            SimpleError::new("engine internal error"),
        );
        let display = format!("{}", err);
        assert!(display.contains("extraction"));
        assert!(display.contains("prob"));
    }

    #[test]
    fn test_initialization_error_display() {
        let err = BackendError::initialization("topology file unreadable");
        assert!(format!("{}", err).contains("topology file unreadable"));
    }

    #[test]
    fn test_error_implements_error_trait() {
        fn assert_error<T: std::error::Error>(_: &T) {}
        assert_error(&BackendError::invalid_input("empty id list"));
    }

    #[test]
    fn test_input_transform_preserves_source() {
        use std::error::Error;
        let err = BackendError::input_transform(SimpleError::new("bad image dimensions"));
        let source = err.source().unwrap();
        assert_eq!(source.to_string(), "bad image dimensions");
    }
}
