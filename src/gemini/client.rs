// Gemini API client for label interpretation
// Author: kelexine (https://github.com/kelexine)

use super::LabelInterpreter;
use crate::config::{ApiKey, GeminiConfig};
use crate::error::{LabelError, Result};
use crate::models::gemini::{GenerateContentRequest, GenerateContentResponse, InlineData};
use crate::utils::logging::sanitize;
use crate::vision::NormalizedImage;
use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

/// Client for the public Google Gemini API.
///
/// Sends a single blocking `generateContent` call per label. The API key is
/// passed as the `key` query parameter. Failures are returned immediately;
/// nothing is retried.
pub struct GeminiClient {
    http_client: Client,
    config: GeminiConfig,
}

impl GeminiClient {
    /// Create a new Gemini client with a bounded request timeout.
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(LabelError::Config("Gemini API key is empty".to_string()));
        }

        let http_client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .use_rustls_tls()
            .build()
            .map_err(|e| LabelError::Internal(format!("Failed to create HTTP client: {}", e)))?;

        debug!("Created Gemini HTTP client (timeout {}s)", config.timeout_seconds);

        Ok(Self {
            http_client,
            config: config.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn api_key(&self) -> &ApiKey {
        &self.config.api_key
    }

    /// Call Gemini `generateContent`.
    ///
    /// Non-200 statuses become [`LabelError::InterpreterRequestFailed`] with the
    /// raw body; a 200 whose body does not parse becomes
    /// [`LabelError::MalformedResponse`].
    pub async fn generate_content(
        &self,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = self.endpoint();
        debug!("Calling generateContent API: {}", url);

        let start = Instant::now();
        let response = self
            .http_client
            .post(&url)
            .query(&[("key", self.api_key().expose())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                let msg = sanitize(&e.to_string());
                error!("Gemini API unreachable: {}", msg);
                LabelError::InterpreterUnreachable(msg)
            })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| {
            LabelError::InterpreterUnreachable(format!(
                "Failed to read response body: {}",
                sanitize(&e.to_string())
            ))
        })?;

        crate::metrics::record_gemini_call(
            &self.config.model,
            status.as_u16(),
            start.elapsed().as_secs_f64(),
        );

        if status != reqwest::StatusCode::OK {
            error!(
                "Gemini API error: HTTP {} - Response body: {}",
                status,
                sanitize(&response_text)
            );
            return Err(LabelError::InterpreterRequestFailed {
                status: status.as_u16(),
                body: response_text,
            });
        }

        debug!(
            "Raw Gemini response (first 500 chars): {}",
            response_text.chars().take(500).collect::<String>()
        );

        serde_json::from_str(&response_text).map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            LabelError::MalformedResponse(format!("Response parsing error: {}", e))
        })
    }
}

#[async_trait]
impl LabelInterpreter for GeminiClient {
    async fn interpret(&self, image: &NormalizedImage, prompt: &str) -> Result<String> {
        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);
        debug!(
            "Encoded {} image bytes as {} base64 chars",
            image.bytes.len(),
            data.len()
        );

        let request = GenerateContentRequest::for_image(
            prompt,
            InlineData {
                mime_type: image.mime_type.clone(),
                data,
            },
        );

        let response = self.generate_content(&request).await?;
        if let Some(usage) = &response.usage_metadata {
            info!(
                "Gemini usage: prompt={:?} output={:?} total={:?}",
                usage.prompt_token_count, usage.candidates_token_count, usage.total_token_count
            );
        }

        extract_text(response)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Pull the answer text out of a successful response.
///
/// Takes the first text part of the first candidate. Empty or blocked
/// responses become a descriptive [`LabelError::MalformedResponse`].
pub fn extract_text(response: GenerateContentResponse) -> Result<String> {
    let candidate = match response.candidates.into_iter().next() {
        Some(candidate) => candidate,
        None => {
            let reason = response
                .prompt_feedback
                .and_then(|f| f.block_reason)
                .map(|r| format!(" (prompt blocked: {})", r))
                .unwrap_or_default();
            return Err(LabelError::MalformedResponse(format!(
                "no candidates in response{}",
                reason
            )));
        }
    };

    match candidate.first_text() {
        Some(text) => Ok(text.to_string()),
        None => Err(LabelError::MalformedResponse(format!(
            "candidate has no text part (finish reason: {})",
            candidate.finish_reason.as_deref().unwrap_or("unknown")
        ))),
    }
}
