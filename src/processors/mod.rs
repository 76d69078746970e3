//! Result decoders for the inference backend.
//!
//! Three mutually exclusive, pure decoding algorithms transform an output
//! tensor into domain-meaningful results; exactly one runs per request,
//! selected by the backend's cached task type.
//!
//! # Modules
//!
//! * `topk` - Top-K selection for classification outputs
//! * `detection` - Box filtering and coordinate denormalization
//! * `ctc_decode` - Greedy best-path CTC sequence decoding

pub mod ctc_decode;
pub mod detection;
pub mod topk;

pub use ctc_decode::{collapse, decode_sequence, greedy_path};
pub use detection::{BBox, Detection, decode_detections};
pub use topk::{ClassScore, decode_classification};
