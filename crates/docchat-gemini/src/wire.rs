//! Wire types for the Gemini REST API

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

#[derive(Serialize)]
pub(crate) struct GenerateContentRequest {
    pub contents: Vec<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationParams>,
}

#[derive(Serialize)]
pub(crate) struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

#[derive(Serialize)]
pub(crate) struct Part {
    pub text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GenerationParams {
    pub max_output_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Deserialize)]
pub(crate) struct GenerateContentResponse {
    pub candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
pub(crate) struct Candidate {
    pub content: Option<CandidateContent>,
}

#[derive(Deserialize)]
pub(crate) struct CandidateContent {
    pub parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
pub(crate) struct CandidatePart {
    pub text: Option<String>,
}

#[derive(Serialize)]
pub(crate) struct BatchEmbedRequest {
    pub requests: Vec<EmbedContentRequest>,
}

#[derive(Serialize)]
pub(crate) struct EmbedContentRequest {
    pub model: String,
    pub content: EmbedContent,
}

#[derive(Serialize)]
pub(crate) struct EmbedContent {
    pub parts: Vec<Part>,
}

#[derive(Deserialize)]
pub(crate) struct BatchEmbedResponse {
    pub embeddings: Vec<EmbeddingValues>,
}

#[derive(Deserialize)]
pub(crate) struct EmbeddingValues {
    pub values: Vec<f32>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

/// Pull a readable message out of a Gemini error body, falling back to the
/// raw text when it is not the documented JSON shape.
pub(crate) fn parse_error_body(body: &str) -> String {
    serde_json::from_str::<ErrorWrapper>(body)
        .map(|wrapper| {
            let status = wrapper.error.status.unwrap_or_default();
            let message = wrapper.error.message.unwrap_or_else(|| body.to_string());
            if status.is_empty() {
                message
            } else {
                format!("{}: {}", status, message)
            }
        })
        .unwrap_or_else(|_| body.to_string())
}

/// Whether an API failure means the credential itself was rejected
pub(crate) fn is_credential_rejection(status: StatusCode, message: &str) -> bool {
    matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || message.contains("API_KEY_INVALID")
        || message.contains("API key not valid")
}
