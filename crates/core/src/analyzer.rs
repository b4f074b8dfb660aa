//! External analysis service client.
//!
//! The service is asked to research a video (with Google Search grounding) and answer
//! with one JSON object describing viral clips. Its answer is returned as untrusted text;
//! validation happens in [`crate::response`].

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ExternalServiceError, KesitError, Result},
    prompt::{ANALYSIS_SYSTEM_PROMPT, build_user_prompt},
    provider::{API_KEY_ENV, ProviderConfig},
    types::VideoReference,
};

/// Produces free-form model text for a video.
#[async_trait]
pub trait ClipAnalyzer: Send + Sync {
    async fn analyze(&self, video: &VideoReference) -> Result<String>;
}

pub struct GeminiAnalyzer {
    config: ProviderConfig,
    client: Client,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    system_instruction: Content<'a>,
    contents: Vec<Content<'a>>,
    // No responseMimeType/responseSchema: the service rejects them together with search.
    tools: Vec<Tool>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<&'a str>,
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool {
    google_search: GoogleSearch,
}

#[derive(Debug, Serialize)]
struct GoogleSearch {}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebSource>,
}

#[derive(Debug, Deserialize)]
struct WebSource {
    uri: Option<String>,
    title: Option<String>,
}

impl GenerateContentResponse {
    /// Text parts of the first candidate, concatenated.
    fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        Some(text)
    }

    fn grounding_sources(&self) -> impl Iterator<Item = &WebSource> {
        self.candidates
            .first()
            .and_then(|c| c.grounding_metadata.as_ref())
            .into_iter()
            .flat_map(|m| m.grounding_chunks.iter())
            .filter_map(|chunk| chunk.web.as_ref())
    }
}

impl GeminiAnalyzer {
    pub fn new(config: ProviderConfig) -> Result<Self> {
        if config.api_key.trim().is_empty() {
            return Err(KesitError::CredentialMissing {
                env_var: API_KEY_ENV.to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| ExternalServiceError::Failed {
                message: format!("Failed to build HTTP client: {e}"),
            })?;

        Ok(Self { config, client })
    }

    pub fn from_env() -> Result<Self> {
        Self::new(ProviderConfig::from_env()?)
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

#[async_trait]
impl ClipAnalyzer for GeminiAnalyzer {
    async fn analyze(&self, video: &VideoReference) -> Result<String> {
        let user_prompt = build_user_prompt(video);
        let request = GenerateContentRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: ANALYSIS_SYSTEM_PROMPT,
                }],
            },
            contents: vec![Content {
                role: Some("user"),
                parts: vec![Part { text: &user_prompt }],
            }],
            tools: vec![Tool {
                google_search: GoogleSearch {},
            }],
        };

        debug!(model = %self.config.model, video_id = %video.id, "sending analysis request");

        let response = self
            .client
            .post(self.config.generate_content_url())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        debug!(%status, "analysis service responded");

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &body, &self.config.model).into());
        }

        let body: GenerateContentResponse =
            response
                .json()
                .await
                .map_err(|e| ExternalServiceError::Failed {
                    message: format!("Failed to decode service response: {e}"),
                })?;

        for source in body.grounding_sources() {
            debug!(
                uri = source.uri.as_deref().unwrap_or_default(),
                title = source.title.as_deref().unwrap_or_default(),
                "grounding source"
            );
        }

        let text = body
            .text()
            .filter(|text| !text.trim().is_empty())
            .ok_or(ExternalServiceError::EmptyResponse)?;

        Ok(text)
    }
}

fn classify_transport_error(error: reqwest::Error) -> ExternalServiceError {
    if error.is_connect() || error.is_timeout() {
        ExternalServiceError::Unreachable {
            reason: error.to_string(),
        }
    } else {
        ExternalServiceError::Failed {
            message: error.to_string(),
        }
    }
}

fn classify_status(status: StatusCode, body: &str, model: &str) -> ExternalServiceError {
    if status == StatusCode::NOT_FOUND {
        return ExternalServiceError::ModelNotFound {
            model: model.to_string(),
        };
    }

    if body.to_ascii_lowercase().contains("controlled generation") {
        return ExternalServiceError::ConfigConflict;
    }

    ExternalServiceError::Failed {
        message: format!("{status}: {}", body.trim()),
    }
}
