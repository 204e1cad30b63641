//! Gemini inference adapter - Implements InferencePort using ai_core

use std::time::Instant;

use ai_core::{
    GeminiInferenceEngine, InferenceConfig, InferenceEngine, InferenceError, InferenceRequest,
};
use application::{
    error::ApplicationError,
    ports::{InferencePort, InferenceResult},
};
use async_trait::async_trait;
use tracing::{debug, instrument, warn};

/// Adapter for hosted Gemini inference
pub struct GeminiInferenceAdapter {
    engine: Box<dyn InferenceEngine>,
    system_prompt: Option<String>,
}

impl std::fmt::Debug for GeminiInferenceAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiInferenceAdapter")
            .field("model", &self.engine.default_model())
            .field("system_prompt", &self.system_prompt.is_some())
            .finish()
    }
}

impl GeminiInferenceAdapter {
    /// Create a new adapter with the given configuration
    ///
    /// A configured `system_prompt` is applied by the engine itself.
    pub fn new(config: InferenceConfig) -> Result<Self, ApplicationError> {
        let engine = GeminiInferenceEngine::new(config).map_err(Self::map_error)?;
        Ok(Self::with_engine(Box::new(engine)))
    }

    /// Wrap any inference engine
    pub fn with_engine(engine: Box<dyn InferenceEngine>) -> Self {
        Self {
            engine,
            system_prompt: None,
        }
    }

    /// Override the system prompt on every request
    #[must_use]
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    /// Convert ai_core error to application error
    fn map_error(e: InferenceError) -> ApplicationError {
        match e {
            InferenceError::ConnectionFailed(msg) => {
                ApplicationError::ExternalService(format!("Gemini connection failed: {msg}"))
            },
            InferenceError::Timeout(ms) => {
                ApplicationError::ExternalService(format!("Inference timeout after {ms}ms"))
            },
            InferenceError::RateLimited => {
                ApplicationError::ExternalService("Gemini rate limit exceeded".into())
            },
            InferenceError::Unauthorized(msg) => {
                ApplicationError::Configuration(format!("Gemini rejected the API key: {msg}"))
            },
            other => ApplicationError::Generation(other.to_string()),
        }
    }
}

#[async_trait]
impl InferencePort for GeminiInferenceAdapter {
    #[instrument(skip(self, prompt), fields(prompt_len = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<InferenceResult, ApplicationError> {
        let start = Instant::now();

        let request = match &self.system_prompt {
            Some(system) => InferenceRequest::with_system(system, prompt),
            None => InferenceRequest::simple(prompt),
        };

        let response = self
            .engine
            .generate(request)
            .await
            .map_err(Self::map_error)?;

        let latency_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        debug!(
            model = %response.model,
            tokens = ?response.usage.as_ref().map(|u| u.total_tokens),
            latency_ms = latency_ms,
            "Inference completed"
        );

        Ok(InferenceResult {
            content: response.content,
            model: response.model,
            tokens_used: response.usage.map(|u| u.total_tokens),
            latency_ms,
        })
    }

    async fn is_healthy(&self) -> bool {
        match self.engine.health_check().await {
            Ok(healthy) => healthy,
            Err(e) => {
                warn!(error = %e, "Inference health check failed");
                false
            },
        }
    }

    fn current_model(&self) -> String {
        self.engine.default_model().to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use ai_core::{InferenceResponse, TokenUsage};

    use super::*;

    struct ScriptedEngine {
        reply: Mutex<Option<Result<InferenceResponse, InferenceError>>>,
        expected_system: Option<&'static str>,
    }

    impl ScriptedEngine {
        fn replying(reply: Result<InferenceResponse, InferenceError>) -> Self {
            Self {
                reply: Mutex::new(Some(reply)),
                expected_system: None,
            }
        }

        fn expecting_system(mut self, system: &'static str) -> Self {
            self.expected_system = Some(system);
            self
        }
    }

    #[async_trait]
    impl InferenceEngine for ScriptedEngine {
        async fn generate(
            &self,
            request: InferenceRequest,
        ) -> Result<InferenceResponse, InferenceError> {
            assert_eq!(request.system.as_deref(), self.expected_system);
            self.reply.lock().unwrap().take().unwrap()
        }

        async fn health_check(&self) -> Result<bool, InferenceError> {
            Err(InferenceError::ConnectionFailed("offline".into()))
        }

        fn default_model(&self) -> &str {
            "gemini-2.5-flash"
        }
    }

    fn response(content: &str) -> InferenceResponse {
        InferenceResponse {
            content: content.to_string(),
            model: "gemini-2.5-flash-001".to_string(),
            usage: Some(TokenUsage {
                prompt_tokens: 40,
                completion_tokens: 12,
                total_tokens: 52,
            }),
        }
    }

    #[tokio::test]
    async fn generate_maps_response() {
        let adapter = GeminiInferenceAdapter::with_engine(Box::new(ScriptedEngine::replying(Ok(
            response("Tarde quente e seca."),
        ))));

        let result = adapter.generate("prompt").await.unwrap();
        assert_eq!(result.content, "Tarde quente e seca.");
        assert_eq!(result.model, "gemini-2.5-flash-001");
        assert_eq!(result.tokens_used, Some(52));
        assert_eq!(adapter.current_model(), "gemini-2.5-flash");
    }

    #[tokio::test]
    async fn generate_sends_system_prompt() {
        let engine =
            ScriptedEngine::replying(Ok(response("ok"))).expecting_system("Responda em português");
        let adapter = GeminiInferenceAdapter::with_engine(Box::new(engine))
            .with_system_prompt("Responda em português");

        adapter.generate("prompt").await.unwrap();
        assert!(format!("{adapter:?}").contains("system_prompt: true"));
    }

    #[tokio::test]
    async fn generate_maps_errors() {
        let adapter = GeminiInferenceAdapter::with_engine(Box::new(ScriptedEngine::replying(
            Err(InferenceError::ServerError("500".into())),
        )));
        assert!(matches!(
            adapter.generate("prompt").await.unwrap_err(),
            ApplicationError::Generation(_)
        ));

        let adapter = GeminiInferenceAdapter::with_engine(Box::new(ScriptedEngine::replying(
            Err(InferenceError::Timeout(60_000)),
        )));
        assert!(matches!(
            adapter.generate("prompt").await.unwrap_err(),
            ApplicationError::ExternalService(_)
        ));
    }

    #[tokio::test]
    async fn failed_health_check_is_unhealthy() {
        let adapter = GeminiInferenceAdapter::with_engine(Box::new(ScriptedEngine::replying(Ok(
            response("ok"),
        ))));
        assert!(!adapter.is_healthy().await);
    }

    #[test]
    fn map_error_unauthorized_is_configuration() {
        assert!(matches!(
            GeminiInferenceAdapter::map_error(InferenceError::Unauthorized("bad key".into())),
            ApplicationError::Configuration(_)
        ));
    }
}
