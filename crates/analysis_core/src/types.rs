//! Core types for the pavement analysis relay
//!
//! These mirror the JSON object the vision model is asked to return, plus
//! the request body the browser submits.

use serde::{Deserialize, Deserializer, Serialize};

/// Literal the model uses when no timestamp is printed on the image
pub const NO_TIMESTAMP: &str = "null";

/// Body of `POST /api/analyze-image`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    /// Raw base64 image payload, without a `data:` prefix
    pub image_base64: String,
}

impl AnalysisRequest {
    /// Extract a request from an arbitrary request body.
    ///
    /// Returns `None` when the body is not JSON, or when `image_base64` is
    /// absent, null, empty or not a string. All of those are the same client
    /// error as far as callers are concerned.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let value: serde_json::Value = serde_json::from_slice(body).ok()?;
        let image = value.get("image_base64")?.as_str()?;
        if image.is_empty() {
            return None;
        }

        Some(Self {
            image_base64: image.to_string(),
        })
    }

    /// Rebuild the data URL the model provider expects
    pub fn data_url(&self) -> String {
        format!("data:image/jpeg;base64,{}", self.image_base64)
    }
}

/// A face bounding box, coordinates normalized to image height/width
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FaceBox {
    pub ymin: f64,
    pub xmin: f64,
    pub ymax: f64,
    pub xmax: f64,
}

impl FaceBox {
    /// True if every coordinate lies in [0,1] and min <= max on both axes
    pub fn is_normalized(&self) -> bool {
        [self.ymin, self.xmin, self.ymax, self.xmax]
            .iter()
            .all(|c| (0.0..=1.0).contains(c))
            && self.ymin <= self.ymax
            && self.xmin <= self.xmax
    }
}

/// Pavement analysis produced by the vision model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    /// Short description of the main pavement issue
    pub issue_type: String,
    /// Rough defect length, 0 if unclear
    pub estimated_length_meters: f64,
    /// Rough defect breadth, 0 if unclear
    pub estimated_breadth_meters: f64,
    /// Timestamp printed on the image, or the literal `"null"`
    #[serde(default = "no_timestamp", deserialize_with = "timestamp_or_null")]
    pub image_timestamp: String,
    /// Model confidence (0.0-1.0)
    pub confidence_score: f64,
    /// Brief explanation from the model
    #[serde(default)]
    pub analysis_notes: String,
    /// Bounding boxes for human faces only
    #[serde(default)]
    pub face_boxes: Vec<FaceBox>,
}

fn no_timestamp() -> String {
    NO_TIMESTAMP.to_string()
}

// Models sometimes emit a JSON null instead of the "null" string.
fn timestamp_or_null<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(no_timestamp))
}
