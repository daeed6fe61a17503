//! Gemini image-generation client
//!
//! Thin REST client for the `generateContent` endpoint: reference images go
//! in as inline base64 parts, the first inline-data part of the response
//! comes back out as raw image bytes.

use crate::error::{Error, Result};
use crate::genai::refs::ReferenceImage;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

/// Model used when no override is given.
pub const DEFAULT_MODEL: &str = "gemini-3-pro-image-preview";

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One content part: either prose or an inline binary blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

/// Image bytes returned by the model.
#[derive(Debug)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl GeneratedImage {
    /// File extension derived from the MIME subtype, defaulting to png.
    pub fn extension(&self) -> &str {
        self.mime_type.split('/').nth(1).unwrap_or("png")
    }
}

/// Client for the hosted image-generation API.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    base_url: Url,
    model: String,
}

impl GeminiClient {
    /// Build a client from `GEMINI_API_KEY` (required) and `GEMINI_BASE_URL`
    /// (optional endpoint override, useful against proxies).
    pub fn from_env(model: Option<String>) -> Result<Self> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .ok()
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingConfig {
                name: "GEMINI_API_KEY",
            })?;
        let base_url = std::env::var("GEMINI_BASE_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, &base_url, model)
    }

    /// Build a client with explicit credentials and endpoint.
    pub fn new(api_key: String, base_url: &str, model: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url).map_err(|e| Error::InvalidInput {
            reason: format!("Invalid API base URL \"{base_url}\": {e}"),
        })?;

        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_key,
            base_url,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.as_str().trim_end_matches('/'),
            self.model
        )
    }

    /// Generate an image from a prompt, optionally conditioned on reference
    /// images. Returns the first inline image part of the response.
    pub async fn generate_image(
        &self,
        prompt: &str,
        references: &[ReferenceImage],
    ) -> Result<GeneratedImage> {
        let request = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: build_parts(prompt, references)?,
            }],
        };

        tracing::info!(
            model = %self.model,
            references = references.len(),
            "requesting image generation"
        );

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .ok()
                .and_then(|e| e.error)
                .and_then(|e| e.message)
                .unwrap_or(body);
            return Err(Error::ApiRejected {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_image(parsed)
    }
}

/// Assemble the request parts: inline reference images first, prompt last.
fn build_parts(prompt: &str, references: &[ReferenceImage]) -> Result<Vec<Part>> {
    let engine = base64::engine::general_purpose::STANDARD;
    let mut parts = Vec::with_capacity(references.len() + 1);

    for reference in references {
        let bytes = std::fs::read(&reference.path)?;
        parts.push(Part {
            text: None,
            inline_data: Some(InlineData {
                mime_type: reference.mime_type.to_string(),
                data: engine.encode(bytes),
            }),
        });
    }

    parts.push(Part {
        text: Some(prompt.to_string()),
        inline_data: None,
    });

    Ok(parts)
}

/// Pull the first inline image out of a response.
fn extract_image(response: GenerateResponse) -> Result<GeneratedImage> {
    let engine = base64::engine::general_purpose::STANDARD;

    for candidate in response.candidates {
        let Some(content) = candidate.content else {
            continue;
        };
        for part in content.parts {
            if let Some(inline) = part.inline_data {
                return Ok(GeneratedImage {
                    mime_type: inline.mime_type,
                    data: engine.decode(inline.data)?,
                });
            }
        }
    }

    Err(Error::NoImageReturned)
}
