//! The core module of the inference backend.
//!
//! This module contains the backend's fundamental components:
//! - Error handling
//! - Backend and per-request output configuration
//! - The execution session (thread policy and memory pools)
//! - The engine seam and per-request inference executor
//! - Task type classification for loaded topologies
//!
//! It also re-exports the commonly used types for convenience.

pub mod config;
pub mod errors;
pub mod inference;
pub mod session;
pub mod task;

pub use config::{BackendConfig, OutputConfig, PoolScope};
pub use errors::{BackendError, BackendResult, Stage};
pub use inference::{ExecutionContext, InferenceNetwork, Tensor2D, TensorD, run_forward};
pub use session::{ExecutionSession, PoolAllocator};
pub use task::{INPUT_BLOB, TaskType};

/// Initializes the tracing subscriber for logging.
///
/// Sets up the tracing subscriber with environment filter and formatting
/// layer. Typically called once at the start of an application.
pub fn init_tracing() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();
}
