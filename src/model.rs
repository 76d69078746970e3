//! Model artifacts and the label table.
//!
//! A loaded model is three files: the topology (computation-graph
//! description), the learned weights, and an optional correspondence file
//! mapping class indices to human-readable labels. The label table is
//! read-only after load and queried by index during decoding.

use crate::core::errors::{BackendError, BackendResult};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Paths to the artifacts of one loaded model.
#[derive(Debug, Clone)]
pub struct ModelFiles {
    /// Computation-graph description.
    pub topology: PathBuf,
    /// Learned weights.
    pub weights: PathBuf,
    /// Optional class-index correspondence file.
    pub corresp: Option<PathBuf>,
}

impl ModelFiles {
    /// Creates model files from topology and weights paths.
    pub fn new(topology: impl Into<PathBuf>, weights: impl Into<PathBuf>) -> Self {
        Self {
            topology: topology.into(),
            weights: weights.into(),
            corresp: None,
        }
    }

    /// Sets the correspondence file path.
    pub fn with_corresp(mut self, corresp: impl Into<PathBuf>) -> Self {
        self.corresp = Some(corresp.into());
        self
    }
}

/// Read-only mapping from class index to human-readable label.
#[derive(Debug, Clone, Default)]
pub struct LabelTable {
    labels: HashMap<usize, String>,
}

impl LabelTable {
    /// Creates an empty label table.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Builds a label table from a vector; position is the class index.
    pub fn from_labels(labels: Vec<String>) -> Self {
        Self {
            labels: labels.into_iter().enumerate().collect(),
        }
    }

    /// Loads a correspondence file.
    ///
    /// Each line holds `<index> <label>`; the label is the remainder of
    /// the line, so labels may contain spaces. Blank lines are skipped;
    /// malformed lines are a fatal initialization error.
    pub fn from_file(path: impl AsRef<Path>) -> BackendResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BackendError::initialization_with_source(
                format!("failed to read correspondence file '{}'", path.display()),
                e,
            )
        })?;

        let mut labels = HashMap::new();
        for (lineno, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let (index, label) = line.split_once(char::is_whitespace).ok_or_else(|| {
                BackendError::initialization(format!(
                    "malformed correspondence line {} in '{}'",
                    lineno + 1,
                    path.display()
                ))
            })?;
            let index: usize = index.parse().map_err(|e| {
                BackendError::initialization_with_source(
                    format!(
                        "invalid class index on correspondence line {} in '{}'",
                        lineno + 1,
                        path.display()
                    ),
                    e,
                )
            })?;
            labels.insert(index, label.trim().to_string());
        }
        tracing::debug!(
            corresp = %path.display(),
            entries = labels.len(),
            "loaded label table"
        );
        Ok(Self { labels })
    }

    /// Looks up the label for a class index.
    pub fn label_for(&self, index: usize) -> Option<&str> {
        self.labels.get(&index).map(String::as_str)
    }

    /// Looks up a label and falls back to the index's decimal form.
    pub fn label_or_index(&self, index: usize) -> String {
        self.label_for(index)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string())
    }

    /// Interprets the label for `index` as a numeric character code.
    ///
    /// Sequence models store character codes in the correspondence file;
    /// a missing or non-numeric label is invalid input rather than a
    /// silent NUL character.
    pub fn character_for(&self, index: usize) -> BackendResult<char> {
        let label = self.label_for(index).ok_or_else(|| {
            BackendError::invalid_input(format!("no label for class index {}", index))
        })?;
        let code: u32 = label.parse().map_err(|_| {
            BackendError::invalid_input(format!(
                "label '{}' for class index {} is not a character code",
                label, index
            ))
        })?;
        char::from_u32(code).ok_or_else(|| {
            BackendError::invalid_input(format!(
                "character code {} for class index {} is not a valid scalar",
                code, index
            ))
        })
    }

    /// Returns the number of labels.
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true when the table holds no labels.
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
