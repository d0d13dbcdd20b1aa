//! Gemini OCR gateway.
//!
//! One blocking `generateContent` call per image, no retries. An empty answer
//! is reported as its own error so the caller can say "no text" rather than
//! "request failed".

use std::time::Instant;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};

use crate::config::Config;

pub const OCR_INSTRUCTION: &str = "Extract all text from this image. Return ONLY the text, preserving layout if possible. Do not add markdown formatting or explanations.";

const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("OCR request was rejected, check GEMINI_API_KEY ({status}): {message}")]
    Auth { status: u16, message: String },

    #[error("No text detected in the selection.")]
    EmptyResult,

    #[error("OCR service returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("OCR request failed")]
    Transport(#[from] reqwest::Error),
}

/// Turns PNG bytes into text.
pub trait OcrGateway {
    fn extract_text(&self, png: &[u8]) -> Result<String, GatewayError>;
}

// --- wire types -----------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
    Text { text: &'a str },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: &'static str,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Default, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    details: Vec<serde_json::Value>,
}

/// A model as listed by the API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub display_name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListModelsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
    #[serde(default)]
    next_page_token: Option<String>,
}

// --- gateway --------------------------------------------------------------

/// Talks to the Gemini REST API.
pub struct GeminiGateway {
    client: Client,
    config: Config,
}

impl GeminiGateway {
    pub fn new(config: Config) -> Result<Self, GatewayError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(GeminiGateway { client, config })
    }

    fn generate_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url,
            model_path(&self.config.model)
        )
    }

    /// All models visible to the configured key, following pagination.
    pub fn list_models(&self) -> Result<Vec<ModelInfo>, GatewayError> {
        let url = format!("{}/v1beta/models", self.config.base_url);
        let mut models = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut request = self
                .client
                .get(&url)
                .header(API_KEY_HEADER, &self.config.api_key);
            if let Some(token) = &page_token {
                request = request.query(&[("pageToken", token)]);
            }
            let response = request.send()?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().unwrap_or_default();
                return Err(classify_failure(status, &body));
            }

            let page: ListModelsResponse = response.json()?;
            models.extend(page.models);
            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(models)
    }
}

impl OcrGateway for GeminiGateway {
    fn extract_text(&self, png: &[u8]) -> Result<String, GatewayError> {
        log::info!("[OCR] Model: {}", self.config.model);
        let start = Instant::now();

        let body = build_request(png, self.config.deterministic);
        let response = self
            .client
            .post(self.generate_url())
            .header(API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .inspect_err(|e| log::error!("[OCR] HTTP request failed: {e}"))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            log::error!("[OCR] API returned {status}: {body}");
            return Err(classify_failure(status, &body));
        }

        let parsed: GenerateContentResponse = response.json()?;
        let text = collect_text(parsed)?;
        log::info!(
            "[OCR] {} chars in {}ms",
            text.chars().count(),
            start.elapsed().as_millis()
        );
        Ok(text)
    }
}

/// `models/foo` and `foo` both name the same model in the URL.
fn model_path(model: &str) -> &str {
    model.strip_prefix("models/").unwrap_or(model)
}

fn build_request(png: &[u8], deterministic: bool) -> GenerateContentRequest<'static> {
    GenerateContentRequest {
        contents: vec![Content {
            role: "user",
            parts: vec![
                RequestPart::InlineData {
                    inline_data: Blob {
                        mime_type: "image/png",
                        data: STANDARD.encode(png),
                    },
                },
                RequestPart::Text { text: OCR_INSTRUCTION },
            ],
        }],
        generation_config: deterministic.then_some(GenerationConfig { temperature: 0.0 }),
    }
}

/// Text parts of the first candidate, concatenated in order.
fn collect_text(response: GenerateContentResponse) -> Result<String, GatewayError> {
    let text: String = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|c| c.parts.into_iter().filter_map(|p| p.text).collect())
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(GatewayError::EmptyResult);
    }
    Ok(text)
}

fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    let (message, key_invalid) = match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let key_invalid = envelope
                .error
                .details
                .iter()
                .any(|d| d.get("reason").and_then(|r| r.as_str()) == Some("API_KEY_INVALID"));
            (envelope.error.message, key_invalid)
        }
        Err(_) => (body.to_string(), body.contains("API_KEY_INVALID")),
    };

    let status_code = status.as_u16();
    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN)
        || (status == StatusCode::BAD_REQUEST && key_invalid)
    {
        GatewayError::Auth { status: status_code, message }
    } else {
        GatewayError::Api { status: status_code, message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn response(value: serde_json::Value) -> GenerateContentResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn request_carries_image_instruction_and_temperature() {
        let body = serde_json::to_value(build_request(b"\x89PNG", true)).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "iVBORw==" } },
                        { "text": OCR_INSTRUCTION }
                    ]
                }],
                "generationConfig": { "temperature": 0.0 }
            })
        );
    }

    #[test]
    fn non_deterministic_request_omits_generation_config() {
        let body = serde_json::to_value(build_request(b"x", false)).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn text_parts_are_joined_in_order() {
        let parsed = response(json!({
            "candidates": [
                { "content": { "parts": [
                    { "text": "Hello\n" },
                    { "inlineData": { "mimeType": "image/png", "data": "" } },
                    { "text": "world" }
                ] } },
                { "content": { "parts": [{ "text": "ignored" }] } }
            ]
        }));
        assert_eq!(collect_text(parsed).unwrap(), "Hello\nworld");
    }

    #[test]
    fn missing_or_blank_text_is_empty_result() {
        for value in [
            json!({}),
            json!({ "candidates": [] }),
            json!({ "candidates": [{ "finishReason": "SAFETY" }] }),
            json!({ "candidates": [{ "content": { "parts": [] } }] }),
            json!({ "candidates": [{ "content": { "parts": [{ "text": "  \n" }] } }] }),
        ] {
            assert!(matches!(collect_text(response(value)), Err(GatewayError::EmptyResult)));
        }
    }

    #[test]
    fn empty_result_message_is_distinct() {
        assert_eq!(
            GatewayError::EmptyResult.to_string(),
            "No text detected in the selection."
        );
    }

    #[test]
    fn invalid_key_is_an_auth_error() {
        let body = json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "status": "INVALID_ARGUMENT",
                "details": [{ "@type": "type.googleapis.com/google.rpc.ErrorInfo", "reason": "API_KEY_INVALID" }]
            }
        })
        .to_string();
        match classify_failure(StatusCode::BAD_REQUEST, &body) {
            GatewayError::Auth { status, message } => {
                assert_eq!(status, 400);
                assert!(message.starts_with("API key not valid"));
            }
            other => panic!("expected auth error, got {other:?}"),
        }
        assert!(matches!(
            classify_failure(StatusCode::FORBIDDEN, "denied"),
            GatewayError::Auth { status: 403, .. }
        ));
    }

    #[test]
    fn other_failures_are_api_errors() {
        let body = r#"{"error":{"code":404,"message":"models/nope is not found"}}"#;
        match classify_failure(StatusCode::NOT_FOUND, body) {
            GatewayError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "models/nope is not found");
            }
            other => panic!("expected api error, got {other:?}"),
        }
        assert!(matches!(
            classify_failure(StatusCode::BAD_REQUEST, "plain text"),
            GatewayError::Api { status: 400, .. }
        ));
    }

    #[test]
    fn model_prefix_is_optional() {
        assert_eq!(model_path("models/gemini-2.5-flash"), "gemini-2.5-flash");
        assert_eq!(model_path("gemini-2.5-flash"), "gemini-2.5-flash");
    }

    #[test]
    fn model_listing_parses_pages() {
        let page: ListModelsResponse = serde_json::from_value(json!({
            "models": [{ "name": "models/gemini-2.5-flash", "displayName": "Gemini 2.5 Flash" }],
            "nextPageToken": "abc"
        }))
        .unwrap();
        assert_eq!(page.models[0].display_name, "Gemini 2.5 Flash");
        assert_eq!(page.next_page_token.as_deref(), Some("abc"));
    }
}
