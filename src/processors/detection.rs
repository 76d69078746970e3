//! Detection-box decoding.
//!
//! A pure filter and coordinate transform over the engine's detection
//! output matrix. Non-max suppression and detection caps are assumed to
//! have happened inside the network; nothing is re-filtered here beyond
//! the confidence threshold.

use crate::core::errors::{BackendError, BackendResult};
use ndarray::ArrayView2;
use serde::{Deserialize, Serialize};

/// Columns per detection row: class, confidence, four box coordinates.
const DETECTION_ROW_FIELDS: usize = 6;

/// A denormalized bounding box.
///
/// Field order follows the engine's raw output layout: xmin, ymax, xmax,
/// ymin. This is intentional and must not be "fixed" to the conventional
/// ordering.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BBox {
    pub xmin: f32,
    pub ymax: f32,
    pub xmax: f32,
    pub ymin: f32,
}

/// One decoded detection.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Index into the label table.
    pub class_index: usize,
    /// Raw confidence score.
    pub score: f32,
    /// Box in original-image pixel coordinates.
    pub bbox: BBox,
}

/// Decodes a detection output matrix.
///
/// Each row holds `[class, confidence, xmin, ymax, xmax, ymin]` with
/// normalized coordinates. Rows below `confidence_threshold` are skipped;
/// surviving coordinates are denormalized against `image_size`, given as
/// `(height, width)` of the original image. Horizontal fields scale by
/// width, vertical fields by height.
pub fn decode_detections(
    output: ArrayView2<f32>,
    confidence_threshold: f32,
    image_size: (u32, u32),
) -> BackendResult<Vec<Detection>> {
    if output.nrows() > 0 && output.ncols() < DETECTION_ROW_FIELDS {
        return Err(BackendError::invalid_input(format!(
            "detection output has {} columns, expected at least {}",
            output.ncols(),
            DETECTION_ROW_FIELDS
        )));
    }

    let (height, width) = image_size;
    let (height, width) = (height as f32, width as f32);

    let mut detections = Vec::new();
    for row in output.rows() {
        let score = row[1];
        if score < confidence_threshold {
            continue;
        }
        detections.push(Detection {
            class_index: row[0] as usize,
            score,
            bbox: BBox {
                xmin: row[2] * width,
                ymax: row[3] * height,
                xmax: row[4] * width,
                ymin: row[5] * height,
            },
        });
    }
    Ok(detections)
}
