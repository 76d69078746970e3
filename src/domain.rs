//! Request and response data types.
//!
//! A request carries the preprocessed input tensor together with the
//! metadata the preprocessing collaborator recorded: request identifiers
//! and original per-image dimensions. The response pairs the decoded
//! result record with backend-level envelope fields for the response
//! formatter.

use crate::core::config::OutputConfig;
use crate::core::inference::TensorD;
use serde::{Deserialize, Serialize};

pub use crate::processors::BBox;

/// One prediction request, fully transformed by the preprocessing
/// collaborator.
#[derive(Debug, Clone)]
pub struct PredictRequest {
    /// Request identifiers; the first one names the result record.
    pub ids: Vec<String>,
    /// The transformed input tensor, bound under the `data` blob.
    pub input: TensorD,
    /// Original `(height, width)` per input image, for coordinate
    /// denormalization.
    pub image_sizes: Vec<(u32, u32)>,
    /// Per-request output options.
    pub output: OutputConfig,
}

impl PredictRequest {
    /// Creates a request with default output options.
    pub fn new(id: impl Into<String>, input: TensorD) -> Self {
        Self {
            ids: vec![id.into()],
            input,
            image_sizes: Vec::new(),
            output: OutputConfig::default(),
        }
    }

    /// Records an original image size as `(height, width)`.
    pub fn with_image_size(mut self, height: u32, width: u32) -> Self {
        self.image_sizes.push((height, width));
        self
    }

    /// Sets the output options.
    pub fn with_output(mut self, output: OutputConfig) -> Self {
        self.output = output;
        self
    }
}

/// One decoded result record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Identifier of the request item this record answers.
    pub uri: String,
    /// Loss placeholder; always 0.0 for inference.
    pub loss: f64,
    /// Confidence scores, aligned with `cats`.
    pub probs: Vec<f32>,
    /// Decoded labels (class names, or the recognized string for
    /// sequence models).
    pub cats: Vec<String>,
    /// Bounding boxes, present for detection tasks only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bboxes: Option<Vec<BBox>>,
}

/// The outgoing structured response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    /// Decoded result records; one per request under the current
    /// single-item-per-request assumption.
    pub results: Vec<PredictionResult>,
    /// Declared class count from configuration, or the label-table size.
    pub nclasses: usize,
    /// True when the results carry bounding boxes.
    pub bbox: bool,
    /// Region-of-interest output; never produced by this backend.
    pub roi: bool,
    /// Multibox ROI output; never produced by this backend.
    pub multibox_rois: bool,
    /// Status code; 0 on success.
    pub status: i32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    #[test]
    fn test_request_builder() {
        let request = PredictRequest::new("img-1", ArrayD::zeros(IxDyn(&[1, 3, 4, 4])))
            .with_image_size(480, 640)
            .with_output(OutputConfig::new().with_best(5));
        assert_eq!(request.ids, vec!["img-1"]);
        assert_eq!(request.image_sizes, vec![(480, 640)]);
        assert_eq!(request.output.best, 5);
    }

    #[test]
    fn test_response_serialization_skips_absent_boxes() {
        let response = PredictResponse {
            results: vec![PredictionResult {
                uri: "img-1".to_string(),
                loss: 0.0,
                probs: vec![0.9],
                cats: vec!["cat".to_string()],
                bboxes: None,
            }],
            nclasses: 2,
            bbox: false,
            roi: false,
            multibox_rois: false,
            status: 0,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("bboxes"));
        assert!(json.contains("\"status\":0"));
    }
}
