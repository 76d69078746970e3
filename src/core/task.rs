//! Task type classification for loaded topologies.
//!
//! A topology is assigned exactly one task type at model load by scanning
//! its textual form for engine layer markers, checked in fixed priority
//! order. The result is cached on the backend for the session's lifetime
//! and determines both the output blob requested from the engine and the
//! decoder that runs on it.

use crate::core::errors::{BackendError, BackendResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Layer marker identifying a detection topology.
const DETECTION_MARKER: &str = "DetectionOutput";
/// Layer marker identifying a CTC recognition topology.
const CTC_MARKER: &str = "ContinuationIndicator";

/// Name under which the input tensor is bound on every execution context.
pub const INPUT_BLOB: &str = "data";

/// Represents the task a loaded model performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskType {
    /// Flat score vector over classes; decoded with top-K selection.
    Classification,
    /// One row per candidate box; decoded with filter + denormalization.
    Detection,
    /// One row per timestep; decoded with greedy best-path CTC.
    SequenceCtc,
}

impl TaskType {
    /// Returns a human-readable name for the task type.
    pub fn name(&self) -> &'static str {
        match self {
            TaskType::Classification => "classification",
            TaskType::Detection => "detection",
            TaskType::SequenceCtc => "ctc",
        }
    }

    /// Returns the output blob name extracted for this task type.
    pub fn output_blob(&self) -> &'static str {
        match self {
            TaskType::Classification => "prob",
            TaskType::Detection => "detection_out",
            TaskType::SequenceCtc => "probs",
        }
    }

    /// Classifies a topology from its textual form.
    ///
    /// Markers are checked in fixed priority order and the first match
    /// wins: detection before CTC, classification as the default. There is
    /// no scoring or ambiguity resolution.
    pub fn from_topology(topology: &str) -> TaskType {
        if topology.contains(DETECTION_MARKER) {
            return TaskType::Detection;
        }
        if topology.contains(CTC_MARKER) {
            return TaskType::SequenceCtc;
        }
        TaskType::Classification
    }

    /// Classifies a topology read from a parameter file.
    ///
    /// An unreadable file is a fatal initialization error: the backend
    /// cannot decode anything without knowing its task type.
    pub fn from_topology_file(path: impl AsRef<Path>) -> BackendResult<TaskType> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackendError::initialization_with_source(
                format!("failed to read topology file '{}'", path.display()),
                e,
            )
        })?;
        let task = Self::from_topology(&content);
        tracing::debug!(
            topology = %path.display(),
            task = task.name(),
            "classified topology"
        );
        Ok(task)
    }
}
