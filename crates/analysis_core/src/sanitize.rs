//! Defensive clamping of model output
//!
//! The relay passes model output through untouched unless sanitizing is
//! switched on. When it is, the content must match [`AnalysisResult`] and
//! every numeric field is forced into its documented range.

use crate::types::{AnalysisResult, FaceBox, NO_TIMESTAMP};
use thiserror::Error;

/// Errors raised while sanitizing model output
#[derive(Debug, Error)]
pub enum SanitizeError {
    #[error("analysis does not match the expected schema: {0}")]
    Schema(#[from] serde_json::Error),
}

/// Parse model content as an [`AnalysisResult`], clamp it and re-encode it
pub fn sanitize(value: serde_json::Value) -> Result<serde_json::Value, SanitizeError> {
    let result: AnalysisResult = serde_json::from_value(value)?;
    Ok(serde_json::to_value(result.sanitized())?)
}

impl AnalysisResult {
    /// Return a copy with every numeric field in range
    pub fn sanitized(mut self) -> Self {
        self.estimated_length_meters = non_negative(self.estimated_length_meters);
        self.estimated_breadth_meters = non_negative(self.estimated_breadth_meters);
        self.confidence_score = unit(self.confidence_score);
        if self.image_timestamp.trim().is_empty() {
            self.image_timestamp = NO_TIMESTAMP.to_string();
        }
        self.face_boxes = self.face_boxes.into_iter().map(FaceBox::clamped).collect();
        self
    }
}

impl FaceBox {
    /// Clamp every coordinate to [0,1] and order each min/max pair
    pub fn clamped(self) -> Self {
        if self.is_normalized() {
            return self;
        }

        let (ymin, ymax) = ordered(unit(self.ymin), unit(self.ymax));
        let (xmin, xmax) = ordered(unit(self.xmin), unit(self.xmax));
        Self {
            ymin,
            xmin,
            ymax,
            xmax,
        }
    }
}

fn unit(value: f64) -> f64 {
    if value.is_finite() {
        value.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        0.0
    }
}

fn ordered(a: f64, b: f64) -> (f64, f64) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}
