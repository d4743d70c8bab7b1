use crate::llm::config::{ProviderConfig, ProviderKind};
use crate::llm::prompts::SYSTEM_PROMPT_BASE;
use crate::llm::provider::{GenerationParams, Provider, ProviderError, ProviderOutput};
use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::{Duration, Instant};

/// Client for one OpenAI-compatible chat completion endpoint
pub struct LlmService {
    client: Client<OpenAIConfig>,
    config: ProviderConfig,
}

impl LlmService {
    /// Create a new client; a missing credential fails here, before any call
    pub fn new(config: ProviderConfig) -> Result<Self, ProviderError> {
        config.validate().map_err(ProviderError::Configuration)?;

        let mut openai_config = OpenAIConfig::new().with_api_key(&config.api_key);

        if let Some(api_base) = &config.api_base {
            openai_config = openai_config.with_api_base(api_base);
        }

        let http_client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ProviderError::Configuration(e.to_string()))?;

        // One attempt is one HTTP call; falling through to the next provider replaces retries
        let no_retry = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::ZERO),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(no_retry);

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Send a chat completion request
    pub async fn chat(
        &self,
        messages: Vec<ChatMessage>,
        params: &GenerationParams,
    ) -> Result<ProviderOutput, ProviderError> {
        let openai_messages = messages
            .into_iter()
            .map(|msg| msg.into_openai_message())
            .collect::<Result<Vec<_>, _>>()
            .map_err(ProviderError::Api)?;

        let mut request_builder = CreateChatCompletionRequestArgs::default();
        request_builder
            .model(&self.config.model)
            .messages(openai_messages);

        if uses_legacy_max_tokens(self.config.kind) {
            #[allow(deprecated)]
            request_builder.max_tokens(params.max_tokens);
        } else {
            request_builder.max_completion_tokens(params.max_tokens);
        }

        // Reasoning models reject anything but the default temperature
        if supports_temperature(&self.config.model) {
            request_builder.temperature(params.temperature);
            if self.config.debug {
                tracing::debug!("Setting temperature to {}", params.temperature);
            }
        } else if self.config.debug {
            tracing::debug!("Skipping temperature parameter for model {}", self.config.model);
        }

        let request = request_builder
            .build()
            .map_err(|e| ProviderError::Api(e.to_string()))?;

        if self.config.debug {
            tracing::debug!(
                "Sending request to {}: model={}, messages_count={}",
                self.config.kind,
                self.config.model,
                request.messages.len()
            );
        }

        let timeout = Duration::from_secs(self.config.timeout_secs);
        let started = Instant::now();

        let response = tokio::time::timeout(timeout, self.client.chat().create(request))
            .await
            .map_err(|_| ProviderError::Timeout(timeout))?
            .map_err(classify_error)?;

        let latency = started.elapsed();

        // An empty reply is still a well-formed reply
        let text = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .unwrap_or_default();

        let tokens_used = response.usage.as_ref().map(|u| u.total_tokens).unwrap_or(0);

        if self.config.debug {
            tracing::debug!(
                "Received response from {}: {} chars, {} tokens in {:?}",
                self.config.kind,
                text.len(),
                tokens_used,
                latency
            );
        }

        Ok(ProviderOutput {
            text,
            model: self.config.model.clone(),
            tokens_used,
        })
    }
}

#[async_trait]
impl Provider for LlmService {
    async fn attempt(&self, prompt: &str, params: &GenerationParams) -> Result<ProviderOutput, ProviderError> {
        self.chat(
            vec![ChatMessage::system(SYSTEM_PROMPT_BASE), ChatMessage::user(prompt)],
            params,
        )
        .await
    }

    fn name(&self) -> &str {
        self.config.kind.name()
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

fn classify_error(error: OpenAIError) -> ProviderError {
    match error {
        OpenAIError::ApiError(api) if is_rate_limit(&api) => ProviderError::RateLimitExceeded,
        other => ProviderError::Api(other.to_string()),
    }
}

/// Rate-limit replies carry `rate_limit_exceeded` as their code or type
fn is_rate_limit(error: &ApiError) -> bool {
    const RATE_LIMIT: &[&str] = &["rate_limit_exceeded", "rate_limit_error"];

    [error.code.as_deref(), error.r#type.as_deref()]
        .into_iter()
        .flatten()
        .any(|value| RATE_LIMIT.contains(&value))
}

/// DeepSeek only understands the original `max_tokens` field
fn uses_legacy_max_tokens(kind: ProviderKind) -> bool {
    matches!(kind, ProviderKind::DeepSeek)
}

/// Whether the model accepts a custom sampling temperature
fn supports_temperature(model: &str) -> bool {
    let model_lower = model.to_lowercase();
    !(model_lower.starts_with("o1")
        || model_lower.starts_with("o3")
        || model_lower.starts_with("o4")
        || model_lower.contains("gpt-5"))
}

/// Chat message for LLM interactions
#[derive(Debug, Clone)]
pub enum ChatMessage {
    System(String),
    User(String),
}

impl ChatMessage {
    pub fn system(content: &str) -> Self {
        Self::System(content.to_string())
    }

    pub fn user(content: &str) -> Self {
        Self::User(content.to_string())
    }

    fn into_openai_message(self) -> Result<ChatCompletionRequestMessage, String> {
        match self {
            ChatMessage::System(content) => ChatCompletionRequestSystemMessageArgs::default()
                .content(content)
                .build()
                .map(ChatCompletionRequestMessage::System)
                .map_err(|e| e.to_string()),
            ChatMessage::User(content) => ChatCompletionRequestUserMessageArgs::default()
                .content(content)
                .build()
                .map(ChatCompletionRequestMessage::User)
                .map_err(|e| e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    /// Local chat-completions endpoint that always answers with one canned reply
    #[derive(Clone)]
    struct Endpoint {
        status: StatusCode,
        body: Value,
        hits: Arc<AtomicUsize>,
        last_request: Arc<Mutex<Option<Value>>>,
    }

    impl Endpoint {
        fn new(status: StatusCode, body: Value) -> Self {
            Self {
                status,
                body,
                hits: Arc::new(AtomicUsize::new(0)),
                last_request: Arc::new(Mutex::new(None)),
            }
        }

        fn hits(&self) -> usize {
            self.hits.load(Ordering::SeqCst)
        }

        fn last_request(&self) -> Value {
            self.last_request.lock().unwrap().clone().expect("no request received")
        }

        /// Serve on an ephemeral port and return the API base URL
        async fn serve(&self) -> String {
            let app = Router::new()
                .route("/v1/chat/completions", post(completions))
                .with_state(self.clone());

            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            let addr = listener.local_addr().unwrap();
            tokio::spawn(async move {
                let _ = axum::serve(listener, app).await;
            });

            format!("http://{}/v1", addr)
        }
    }

    async fn completions(State(endpoint): State<Endpoint>, Json(request): Json<Value>) -> (StatusCode, Json<Value>) {
        endpoint.hits.fetch_add(1, Ordering::SeqCst);
        *endpoint.last_request.lock().unwrap() = Some(request);
        (endpoint.status, Json(endpoint.body.clone()))
    }

    fn completion(content: Value) -> Value {
        json!({
            "id": "chatcmpl-1",
            "object": "chat.completion",
            "created": 1700000000,
            "model": "stub-model",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 120, "completion_tokens": 35, "total_tokens": 155 }
        })
    }

    async fn service_for(kind: ProviderKind, endpoint: &Endpoint) -> LlmService {
        let mut config = ProviderConfig::new(kind, "test-key");
        config.api_base = Some(endpoint.serve().await);
        config.timeout_secs = 3;
        LlmService::new(config).unwrap()
    }

    #[test]
    fn test_missing_credential_fails_fast() {
        let result = LlmService::new(ProviderConfig::new(ProviderKind::Groq, ""));
        assert!(matches!(result, Err(ProviderError::Configuration(_))));
    }

    #[test]
    fn test_new_exposes_vendor_identity() {
        let service = LlmService::new(ProviderConfig::new(ProviderKind::DeepSeek, "ds-key")).unwrap();
        assert_eq!(service.name(), "deepseek");
        assert_eq!(service.model(), "deepseek-chat");
        assert_eq!(service.config().api_base.as_deref(), Some("https://api.deepseek.com/v1"));
    }

    #[test]
    fn test_supports_temperature() {
        assert!(supports_temperature("llama-3.1-8b-instant"));
        assert!(supports_temperature("gpt-4o-mini"));
        assert!(!supports_temperature("o1-mini"));
        assert!(!supports_temperature("gpt-5"));
    }

    #[test]
    fn test_chat_messages_convert() {
        assert!(ChatMessage::system("sys").into_openai_message().is_ok());
        assert!(ChatMessage::user("hello").into_openai_message().is_ok());
    }

    #[tokio::test]
    async fn test_reply_text_and_usage_are_returned() {
        let endpoint = Endpoint::new(StatusCode::OK, completion(json!("{\"sentiment_score\": 0.4}")));
        let service = service_for(ProviderKind::Groq, &endpoint).await;

        let output = service.attempt("standup", &GenerationParams::ANALYSIS).await.unwrap();

        assert_eq!(output.text, r#"{"sentiment_score": 0.4}"#);
        assert_eq!(output.tokens_used, 155);
        assert_eq!(output.model, "llama-3.1-8b-instant");
        assert_eq!(endpoint.hits(), 1);

        let request = endpoint.last_request();
        assert_eq!(request["messages"][0]["role"], "system");
        assert_eq!(request["messages"][1]["content"], "standup");
    }

    #[tokio::test]
    async fn test_empty_reply_is_success() {
        let endpoint = Endpoint::new(StatusCode::OK, completion(Value::Null));
        let service = service_for(ProviderKind::OpenAi, &endpoint).await;

        let output = service.attempt("standup", &GenerationParams::ANALYSIS).await.unwrap();

        assert_eq!(output.text, "");
        assert_eq!(output.tokens_used, 155);
    }

    #[tokio::test]
    async fn test_server_error_is_not_retried() {
        let endpoint = Endpoint::new(StatusCode::SERVICE_UNAVAILABLE, json!({ "detail": "overloaded" }));
        let service = service_for(ProviderKind::DeepSeek, &endpoint).await;

        let result = service.attempt("standup", &GenerationParams::ANALYSIS).await;

        assert!(matches!(result, Err(ProviderError::Api(_))), "got {:?}", result);
        assert_eq!(endpoint.hits(), 1);
    }

    #[tokio::test]
    async fn test_rate_limit_is_reported_without_retry() {
        let endpoint = Endpoint::new(
            StatusCode::TOO_MANY_REQUESTS,
            json!({ "error": {
                "message": "Rate limit reached for requests",
                "type": "requests",
                "param": null,
                "code": "rate_limit_exceeded"
            }}),
        );
        let service = service_for(ProviderKind::OpenAi, &endpoint).await;

        let result = service.attempt("standup", &GenerationParams::ANALYSIS).await;

        assert!(matches!(result, Err(ProviderError::RateLimitExceeded)), "got {:?}", result);
        assert_eq!(endpoint.hits(), 1);
    }

    #[tokio::test]
    async fn test_client_error_maps_to_api_error() {
        let endpoint = Endpoint::new(
            StatusCode::BAD_REQUEST,
            json!({ "error": {
                "message": "Model 429-preview does not exist",
                "type": "invalid_request_error",
                "param": "model",
                "code": "model_not_found"
            }}),
        );
        let service = service_for(ProviderKind::Groq, &endpoint).await;

        let result = service.attempt("standup", &GenerationParams::SUMMARY).await;

        match result {
            Err(ProviderError::Api(message)) => assert!(message.contains("does not exist")),
            other => panic!("expected API error, got {:?}", other),
        }
        assert_eq!(endpoint.hits(), 1);
    }

    #[tokio::test]
    async fn test_token_limit_field_follows_vendor() {
        let deepseek = Endpoint::new(StatusCode::OK, completion(json!("ok")));
        service_for(ProviderKind::DeepSeek, &deepseek)
            .await
            .attempt("standup", &GenerationParams::ANALYSIS)
            .await
            .unwrap();
        let request = deepseek.last_request();
        assert_eq!(request["max_tokens"], 500);
        assert!(request.get("max_completion_tokens").is_none());
        assert_eq!(request["temperature"].as_f64().map(|t| (t * 10.0).round()), Some(7.0));

        let openai = Endpoint::new(StatusCode::OK, completion(json!("ok")));
        service_for(ProviderKind::OpenAi, &openai)
            .await
            .attempt("summary", &GenerationParams::SUMMARY)
            .await
            .unwrap();
        let request = openai.last_request();
        assert_eq!(request["max_completion_tokens"], 800);
        assert!(request.get("max_tokens").is_none());
    }

    #[test]
    fn test_rate_limit_detection_uses_error_fields() {
        let api = |code: Option<&str>, kind: Option<&str>, message: &str| ApiError {
            message: message.to_string(),
            r#type: kind.map(str::to_string),
            param: None,
            code: code.map(str::to_string),
        };

        assert!(is_rate_limit(&api(Some("rate_limit_exceeded"), Some("tokens"), "slow down")));
        assert!(is_rate_limit(&api(None, Some("rate_limit_error"), "slow down")));
        assert!(!is_rate_limit(&api(None, None, "error 429 while loading")));
        assert!(!is_rate_limit(&api(Some("insufficient_quota"), Some("insufficient_quota"), "quota")));

        assert!(matches!(
            classify_error(OpenAIError::ApiError(api(Some("rate_limit_exceeded"), None, "x"))),
            ProviderError::RateLimitExceeded
        ));
        assert!(matches!(
            classify_error(OpenAIError::InvalidArgument("429".to_string())),
            ProviderError::Api(_)
        ));
    }
}
