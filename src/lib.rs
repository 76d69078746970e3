//! # lightnet-backend
//!
//! An inference backend for a multi-backend model-serving layer. Given a
//! loaded network topology and weights, it runs one forward pass per
//! request through an external inference engine and converts the raw
//! output tensor into a structured prediction: class labels, bounding
//! boxes, or a decoded character sequence.
//!
//! ## Components
//!
//! * [`core`] - Errors, configuration, the execution session and the
//!   engine seam
//! * [`processors`] - The three result-decoding algorithms
//! * [`model`] - Model artifacts and the label table
//! * [`domain`] - Request and response data types
//! * [`backend`] - The backend itself and its prediction contract
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use lightnet_backend::prelude::*;
//! # use lightnet_backend::core::InferenceNetwork;
//!
//! # fn run<E: InferenceNetwork>(engine_net: E) -> Result<(), BackendError> {
//! let model = ModelFiles::new("model.param", "model.bin").with_corresp("corresp.txt");
//! let config = BackendConfig::new().with_nclasses(21).with_threads(4);
//! let backend = NeuralBackend::init(engine_net, &model, &config)?;
//!
//! let input = ndarray::ArrayD::zeros(ndarray::IxDyn(&[1, 3, 300, 300]));
//! let request = PredictRequest::new("image-1", input)
//!     .with_image_size(480, 640)
//!     .with_output(OutputConfig::new().with_confidence_threshold(0.5));
//! let _response = backend.predict(&request)?;
//! # Ok(())
//! # }
//! ```
//!
//! The forward pass itself is owned by the wrapped engine, consumed
//! through the [`core::InferenceNetwork`] and [`core::ExecutionContext`]
//! traits; preprocessing and response formatting are likewise external
//! collaborators.

pub mod backend;
pub mod core;
pub mod domain;
pub mod model;
pub mod processors;

/// Prelude module for convenient imports.
///
/// Bring the essentials into scope with a single use statement:
///
/// ```rust
/// use lightnet_backend::prelude::*;
/// ```
pub mod prelude {
    pub use crate::backend::{ModelBackend, NeuralBackend};
    pub use crate::core::{
        BackendConfig, BackendError, BackendResult, OutputConfig, PoolScope, TaskType,
    };
    pub use crate::domain::{BBox, PredictRequest, PredictResponse, PredictionResult};
    pub use crate::model::{LabelTable, ModelFiles};
}
