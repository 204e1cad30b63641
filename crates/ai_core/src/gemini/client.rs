//! Gemini REST client implementation

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use super::models::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig,
};
use crate::config::InferenceConfig;
use crate::error::InferenceError;
use crate::ports::{InferenceEngine, InferenceRequest, InferenceResponse, TokenUsage};

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini inference engine
pub struct GeminiInferenceEngine {
    client: Client,
    config: InferenceConfig,
}

impl std::fmt::Debug for GeminiInferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiInferenceEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeminiInferenceEngine {
    /// Create a new Gemini inference engine
    pub fn new(config: InferenceConfig) -> Result<Self, InferenceError> {
        let client = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .map_err(|e| InferenceError::ConnectionFailed(e.to_string()))?;

        if config.api_key().is_none() {
            warn!("No Gemini API key configured; requests will be rejected");
        }

        info!(
            base_url = %config.base_url,
            model = %config.default_model,
            "Initialized Gemini inference engine"
        );

        Ok(Self { client, config })
    }

    /// URL of a model resource, optionally with a method suffix
    fn model_url(&self, model: &str, method: Option<&str>) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        match method {
            Some(method) => format!("{base}/v1beta/models/{model}:{method}"),
            None => format!("{base}/v1beta/models/{model}"),
        }
    }

    fn build_body(&self, request: &InferenceRequest) -> GenerateContentRequest {
        let system = request
            .system
            .as_deref()
            .or(self.config.system_prompt.as_deref());

        GenerateContentRequest {
            contents: vec![Content::user(request.prompt.as_str())],
            system_instruction: system.map(Content::instruction),
            generation_config: GenerationConfig {
                temperature: self.config.temperature,
                top_p: self.config.top_p,
                max_output_tokens: self.config.max_tokens,
            },
        }
    }

    fn api_key(&self) -> Result<&str, InferenceError> {
        self.config
            .api_key()
            .ok_or_else(|| InferenceError::Unauthorized("no API key configured".to_string()))
    }

    fn transport_error(&self, err: &reqwest::Error) -> InferenceError {
        InferenceError::from_transport(err, self.config.timeout_ms)
    }
}

/// Map a non-success status to an error
async fn status_error(response: Response, model: &str) -> InferenceError {
    let status = response.status();
    let body = response.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "Gemini request failed");

    match status {
        StatusCode::TOO_MANY_REQUESTS => InferenceError::RateLimited,
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            InferenceError::Unauthorized(format!("Status {status}"))
        },
        StatusCode::NOT_FOUND => InferenceError::ModelNotAvailable(model.to_string()),
        _ => InferenceError::ServerError(format!("Status {status}: {body}")),
    }
}

#[async_trait]
impl InferenceEngine for GeminiInferenceEngine {
    #[instrument(skip(self, request), fields(model = %self.config.default_model))]
    async fn generate(
        &self,
        request: InferenceRequest,
    ) -> Result<InferenceResponse, InferenceError> {
        let model = self.config.default_model.as_str();
        let body = self.build_body(&request);

        debug!(prompt_len = request.prompt.len(), "Sending generateContent request");

        let response = self
            .client
            .post(self.model_url(model, Some("generateContent")))
            .header(API_KEY_HEADER, self.api_key()?)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(&e))?;

        if !response.status().is_success() {
            return Err(status_error(response, model).await);
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::InvalidResponse(e.to_string()))?;

        let candidate = payload
            .candidates
            .first()
            .ok_or_else(|| InferenceError::InvalidResponse("no candidates".to_string()))?;
        let content = candidate
            .text()
            .ok_or_else(|| InferenceError::InvalidResponse("candidate has no text".to_string()))?;

        let usage = payload.usage_metadata.map(|u| TokenUsage {
            prompt_tokens: u.prompt_token_count,
            completion_tokens: u.candidates_token_count,
            total_tokens: u.total_token_count,
        });

        debug!(
            tokens = ?usage,
            finish_reason = candidate.finish_reason.as_deref().unwrap_or("unknown"),
            "Inference completed"
        );

        Ok(InferenceResponse {
            content,
            model: payload.model_version.unwrap_or_else(|| model.to_string()),
            usage,
        })
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> Result<bool, InferenceError> {
        let Some(key) = self.config.api_key() else {
            return Ok(false);
        };

        let response = self
            .client
            .get(self.model_url(&self.config.default_model, None))
            .header(API_KEY_HEADER, key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        match response {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(e) if e.is_timeout() || e.is_connect() => Ok(false),
            Err(e) => Err(InferenceError::RequestFailed(e.to_string())),
        }
    }

    fn default_model(&self) -> &str {
        &self.config.default_model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(config: InferenceConfig) -> GeminiInferenceEngine {
        GeminiInferenceEngine::new(config).unwrap()
    }

    #[test]
    fn builds_model_urls() {
        let engine = engine(InferenceConfig {
            base_url: "http://localhost:9000/".to_string(),
            ..InferenceConfig::default()
        });

        assert_eq!(
            engine.model_url("gemini-2.5-flash", Some("generateContent")),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash:generateContent"
        );
        assert_eq!(
            engine.model_url("gemini-2.5-flash", None),
            "http://localhost:9000/v1beta/models/gemini-2.5-flash"
        );
    }

    #[test]
    fn body_uses_configured_generation_settings() {
        let engine = engine(InferenceConfig {
            system_prompt: Some("default system".to_string()),
            temperature: 0.2,
            max_tokens: 256,
            ..InferenceConfig::default()
        });

        let body = engine.build_body(&InferenceRequest::simple("hi"));
        assert!((body.generation_config.temperature - 0.2).abs() < f32::EPSILON);
        assert_eq!(body.generation_config.max_output_tokens, 256);
        assert_eq!(
            body.system_instruction.and_then(|c| c.parts[0].text.clone()).as_deref(),
            Some("default system")
        );

        let body = engine.build_body(&InferenceRequest::with_system("custom", "hi"));
        assert_eq!(
            body.system_instruction.and_then(|c| c.parts[0].text.clone()).as_deref(),
            Some("custom")
        );
    }

    #[test]
    fn default_model_comes_from_config() {
        let engine = engine(InferenceConfig::default());
        assert_eq!(engine.default_model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn missing_key_fails_fast() {
        let engine = engine(InferenceConfig::default());
        let err = engine
            .generate(InferenceRequest::simple("hi"))
            .await
            .unwrap_err();
        assert!(matches!(err, InferenceError::Unauthorized(_)));
        assert!(!engine.health_check().await.unwrap());
    }
}
