//! Inference executor and the engine seam.
//!
//! The numeric forward pass is owned by an external inference engine,
//! consumed here through a narrow contract: load a topology and weights,
//! create an execution context, bind a named input, extract a named
//! output. [`run_forward`] drives one forward pass per request on a fresh,
//! isolated context bound to the session's thread count and shared pools;
//! the context is destroyed when the call returns, releasing its transient
//! memory back to the pools.

use crate::core::errors::{BackendError, BackendResult, Stage};
use crate::core::session::ExecutionSession;
use crate::core::task::{INPUT_BLOB, TaskType};
use std::path::Path;

/// A 2-D output tensor (rows x columns) from one forward pass.
pub type Tensor2D = ndarray::Array2<f32>;
/// A dynamically-shaped input tensor produced by the preprocessing
/// collaborator.
pub type TensorD = ndarray::ArrayD<f32>;

/// Per-call handle that runs one forward pass and exposes named output
/// tensors.
pub trait ExecutionContext {
    /// The engine's own error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Binds the input tensor under the given blob name.
    fn set_input(&mut self, name: &str, tensor: &TensorD) -> Result<(), Self::Error>;

    /// Runs the network as far as needed and extracts the named output.
    fn extract_output(&mut self, name: &str) -> Result<Tensor2D, Self::Error>;
}

/// Contract consumed from the wrapped inference engine.
///
/// Implementations wrap one loaded topology+weights pair and mint
/// short-lived execution contexts for it. Contexts must draw transient
/// memory from the session's pools and return it on drop.
pub trait InferenceNetwork: Send + Sync {
    /// The engine's own error type.
    type Error: std::error::Error + Send + Sync + 'static;
    /// The per-call execution context type.
    type Context: ExecutionContext<Error = Self::Error>;

    /// Loads the computation-graph description.
    fn load_topology(&mut self, path: &Path) -> Result<(), Self::Error>;

    /// Loads the learned weights.
    fn load_weights(&mut self, path: &Path) -> Result<(), Self::Error>;

    /// Creates a new, isolated execution context bound to the session's
    /// thread count and shared allocators.
    fn create_execution_context(&self, session: &ExecutionSession) -> Self::Context;
}

/// Runs one forward pass and extracts the output blob for the task type.
///
/// Extraction failures are surfaced as [`BackendError::InferenceEngine`]
/// and never retried; the request fails as a whole.
pub fn run_forward<N: InferenceNetwork>(
    net: &N,
    session: &ExecutionSession,
    task: TaskType,
    input: &TensorD,
) -> BackendResult<Tensor2D> {
    let mut context = net.create_execution_context(session);
    context.set_input(INPUT_BLOB, input).map_err(|e| {
        BackendError::engine_error(
            Stage::InputBinding,
            format!("failed to bind input blob '{}'", INPUT_BLOB),
            e,
        )
    })?;
    let blob = task.output_blob();
    context.extract_output(blob).map_err(|e| {
        BackendError::engine_error(
            Stage::Extraction,
            format!(
                "failed to extract output blob '{}' for {} task",
                blob,
                task.name()
            ),
            e,
        )
    })
}
