//! Configuration types for the backend and its per-request output options.
//!
//! `BackendConfig` is accepted once at initialization and covers the
//! concurrency and memory-pool policy of the execution session.
//! `OutputConfig` travels with each request under the `output` parameter
//! group and steers the result decoder.

use serde::{Deserialize, Serialize};

/// Ownership scope of the execution session's memory pools.
///
/// `PerBackend` gives every backend instance its own pools, so unrelated
/// models never contend on the same free list. `Process` shares one
/// session across all instances of the backend type, trading isolation
/// for a smaller retained-memory footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PoolScope {
    /// One session per backend instance (default).
    #[default]
    PerBackend,
    /// One process-wide session shared by all instances.
    Process,
}

/// Configuration accepted at backend initialization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Declared number of classes, echoed on the response envelope.
    pub nclasses: Option<usize>,
    /// Threads per execution context. Defaults to the host's available
    /// hardware concurrency when not set.
    pub threads: Option<usize>,
    /// Memory-pool ownership scope.
    #[serde(default)]
    pub pool_scope: PoolScope,
}

impl BackendConfig {
    /// Creates a new BackendConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the declared number of classes.
    pub fn with_nclasses(mut self, nclasses: usize) -> Self {
        self.nclasses = Some(nclasses);
        self
    }

    /// Sets the thread count used by every execution context.
    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    /// Sets the memory-pool ownership scope.
    pub fn with_pool_scope(mut self, scope: PoolScope) -> Self {
        self.pool_scope = scope;
        self
    }

    /// Gets the effective thread count.
    ///
    /// Returns the configured value, or the host's available hardware
    /// concurrency when unspecified.
    pub fn effective_threads(&self) -> usize {
        self.threads.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}

fn default_best() -> usize {
    1
}

/// Per-request output options, under the `output` parameter group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Whether the caller expects bounding boxes.
    #[serde(default)]
    pub bbox: bool,
    /// Whether the caller expects CTC sequence decoding.
    #[serde(default)]
    pub ctc: bool,
    /// Reserved blank class index for CTC decoding. `None` means the
    /// model has no blank label.
    pub blank_label: Option<usize>,
    /// Minimum score for an entry to survive decoding.
    #[serde(default)]
    pub confidence_threshold: f32,
    /// How many top classification entries to return.
    #[serde(default = "default_best")]
    pub best: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            bbox: false,
            ctc: false,
            blank_label: None,
            confidence_threshold: 0.0,
            best: 1,
        }
    }
}

impl OutputConfig {
    /// Creates a new OutputConfig with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests bounding boxes in the output.
    pub fn with_bbox(mut self, bbox: bool) -> Self {
        self.bbox = bbox;
        self
    }

    /// Requests CTC sequence decoding.
    pub fn with_ctc(mut self, ctc: bool) -> Self {
        self.ctc = ctc;
        self
    }

    /// Sets the reserved blank label index.
    pub fn with_blank_label(mut self, blank_label: usize) -> Self {
        self.blank_label = Some(blank_label);
        self
    }

    /// Sets the confidence threshold.
    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    /// Sets how many top classification entries to return.
    pub fn with_best(mut self, best: usize) -> Self {
        self.best = best;
        self
    }

    /// Validates the output options.
    pub fn validate(&self) -> Result<(), crate::core::errors::BackendError> {
        if self.best == 0 {
            return Err(crate::core::errors::BackendError::config_error(
                "'best' must be greater than 0",
            ));
        }
        Ok(())
    }
}
