//! Vision model integration for pavement photos

use crate::error::RelayError;
use crate::groq::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ContentPart, GroqClient,
    GroqConfig, ImageUrl, ResponseFormat,
};
use analysis_core::AnalysisRequest;
use anyhow::Result;
use async_trait::async_trait;

/// Output schema the model must follow
pub const SYSTEM_PROMPT: &str = r#"You are a pavement accessibility expert AND privacy assistant.

Return exactly ONE JSON object with the following fields:
- issueType: short description of the main pavement issue (string).
- estimatedLengthMeters: number (0 if unclear).
- estimatedBreadthMeters: number (0 if unclear).
- imageTimestamp: string timestamp if visible in the image, otherwise "null".
- confidenceScore: number from 0.0 to 1.0.
- analysisNotes: brief explanation (string).
- faceBoxes: array of bounding boxes ONLY for human faces.
  Each box is an object { "ymin": number, "xmin": number, "ymax": number, "xmax": number }
  with ALL coordinates NORMALIZED to the range [0,1] relative to image height/width.

IMPORTANT:
- Do NOT include license plates in faceBoxes.
- Do NOT mention GPS, plates, or other privacy-sensitive text, only return faceBoxes for human faces."#;

/// Analysis task sent alongside the image
pub const USER_PROMPT: &str = r#"Analyze this pavement photo.

1) Describe any accessibility issues (e.g. cracks, obstacles, blocked ramps) and give rough length and breadth in meters.
2) If any timestamp is printed in the image (e.g. camera overlay), extract it as a string.
3) Detect ALL HUMAN FACES and return tight bounding boxes around the faces as "faceBoxes" (normalized 0-1)."#;

/// Anything that can turn a base64 image into an analysis object
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    /// Analyze one image. The returned value is the model's JSON content.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<serde_json::Value, RelayError>;
}

/// Pavement defect and face-box analysis backed by a Groq vision model
pub struct PavementAnalyzer {
    client: GroqClient,
    sanitize: bool,
}

impl PavementAnalyzer {
    /// Create a new analyzer; model output is passed through untouched
    pub fn new(client: GroqClient) -> Self {
        Self {
            client,
            sanitize: false,
        }
    }

    /// Create an analyzer from a Groq configuration
    pub fn from_config(config: GroqConfig) -> Result<Self> {
        Ok(Self::new(GroqClient::new(config)?))
    }

    /// Clamp model output into documented ranges before returning it
    pub fn with_sanitize(mut self, sanitize: bool) -> Self {
        self.sanitize = sanitize;
        self
    }

    /// Build the chat-completion request for one image
    pub fn build_request(&self, request: &AnalysisRequest) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.client.model().to_string(),
            response_format: Some(ResponseFormat::json_object()),
            messages: vec![
                ChatMessage::system(SYSTEM_PROMPT),
                ChatMessage::user(vec![
                    ContentPart::Text {
                        text: USER_PROMPT.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: request.data_url(),
                        },
                    },
                ]),
            ],
        }
    }
}

#[async_trait]
impl ImageAnalyzer for PavementAnalyzer {
    async fn analyze(&self, request: &AnalysisRequest) -> Result<serde_json::Value, RelayError> {
        tracing::debug!(
            payload_bytes = request.image_base64.len(),
            "Sending image to vision model"
        );

        let completion = self.client.chat(&self.build_request(request)).await?;
        let analysis = parse_content(&completion)?;

        if self.sanitize {
            return analysis_core::sanitize(analysis)
                .map_err(|e| RelayError::Malformed(e.to_string()));
        }
        Ok(analysis)
    }
}

/// Extract the first choice's content and parse it as JSON
pub fn parse_content(completion: &ChatCompletionResponse) -> Result<serde_json::Value, RelayError> {
    let content = completion
        .first_content()
        .ok_or_else(|| RelayError::Malformed("response contained no message content".to_string()))?;

    serde_json::from_str(content).map_err(|e| RelayError::Malformed(e.to_string()))
}
