use crate::llm_provider::*;
use crate::retry::{AttemptError, FailureClass, RetryPolicy};
use anyhow::{anyhow, Context};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use venturelens_core::{Result, VentureLensError};

/// Configuration for OpenAI and OpenAI-compatible chat completion endpoints
#[derive(Debug, Clone)]
pub struct OpenAICompatibleConfig {
    /// Base URL for the API (e.g., "https://api.openai.com/v1")
    pub base_url: String,
    /// Model to use
    pub model: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// API key, sent as a bearer token
    pub api_key: Option<SecretString>,
    /// Local servers (LM Studio, Ollama) accept requests without a key
    pub require_api_key: bool,
    /// Provider name for display purposes and error messages
    pub provider_name: String,
    pub retry: RetryPolicy,
}

impl Default for OpenAICompatibleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout_secs: 120,
            api_key: None,
            require_api_key: true,
            provider_name: "openai".to_string(),
            retry: RetryPolicy::single_attempt(),
        }
    }
}

impl OpenAICompatibleConfig {
    /// Create config for LM Studio
    pub fn lm_studio(model: String) -> Self {
        Self {
            base_url: "http://localhost:1234/v1".to_string(),
            model,
            require_api_key: false,
            provider_name: "lmstudio".to_string(),
            ..Default::default()
        }
    }

    /// Create config for Ollama (OpenAI-compatible endpoint)
    pub fn ollama(model: String) -> Self {
        Self {
            base_url: "http://localhost:11434/v1".to_string(),
            model,
            require_api_key: false,
            provider_name: "ollama".to_string(),
            ..Default::default()
        }
    }

    /// Create config for custom endpoint
    pub fn custom(base_url: String, model: String, provider_name: String) -> Self {
        Self {
            base_url,
            model,
            provider_name,
            ..Default::default()
        }
    }

    fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
    }
}

/// OpenAI-compatible chat completion provider
pub struct OpenAICompatibleProvider {
    config: OpenAICompatibleConfig,
    client: Client,
}

impl OpenAICompatibleProvider {
    pub fn new(config: OpenAICompatibleConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent("VentureLens/1.0")
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { config, client })
    }

    /// Create for LM Studio
    pub fn lm_studio(model: String) -> anyhow::Result<Self> {
        Self::new(OpenAICompatibleConfig::lm_studio(model))
    }

    /// Create for Ollama
    pub fn ollama(model: String) -> anyhow::Result<Self> {
        Self::new(OpenAICompatibleConfig::ollama(model))
    }

    /// Try a single request against the Chat Completions API
    async fn try_chat_completions_request(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> std::result::Result<ChatCompletionsResponse, AttemptError> {
        let request = ChatCompletionsRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: m.role.to_string(),
                    content: m.content.clone(),
                })
                .collect(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            top_p: config.top_p,
            stop: config.stop.clone(),
        };

        let mut request_builder = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.config.base_url.trim_end_matches('/')
            ))
            .json(&request);

        if let Some(api_key) = self.config.api_key() {
            request_builder = request_builder.bearer_auth(api_key);
        }

        let response = request_builder.send().await.map_err(|e| {
            AttemptError::new(
                FailureClass::from_reqwest(&e),
                anyhow!(e).context(format!(
                    "Failed to send request to {} at {}",
                    self.config.provider_name, self.config.base_url
                )),
            )
        })?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(AttemptError::new(
                FailureClass::from_status(status),
                anyhow!("{} API error ({}): {}", self.config.provider_name, status, error_text),
            ));
        }

        response.json::<ChatCompletionsResponse>().await.map_err(|e| {
            AttemptError::new(
                FailureClass::Decode,
                anyhow!(e).context(format!(
                    "Failed to parse {} Chat Completions API response",
                    self.config.provider_name
                )),
            )
        })
    }
}

#[async_trait]
impl LLMProvider for OpenAICompatibleProvider {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<LLMResponse> {
        self.ensure_ready()?;

        let started = Instant::now();
        let response = self
            .config
            .retry
            .run(&self.config.provider_name, || {
                self.try_chat_completions_request(messages, config)
            })
            .await
            .map_err(|e| {
                VentureLensError::upstream(&self.config.provider_name, format!("{:#}", e.error))
            })?;

        // A missing choice or content is not an error here; the sanitizer rejects it
        let choice = response.choices.into_iter().next();
        let finish_reason = choice.as_ref().and_then(|c| c.finish_reason.clone());
        let content = choice
            .and_then(|c| c.message)
            .and_then(|m| m.content)
            .unwrap_or_default();

        tracing::debug!(
            provider = %self.config.provider_name,
            model = %self.config.model,
            elapsed_ms = started.elapsed().as_millis() as u64,
            chars = content.len(),
            "Completion received"
        );

        Ok(LLMResponse {
            content,
            total_tokens: response.usage.map(|u| u.total_tokens),
            finish_reason,
            model: response.model.unwrap_or_else(|| self.config.model.clone()),
        })
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.config.require_api_key && self.config.api_key().is_none() {
            return Err(VentureLensError::missing_credential(
                &self.config.provider_name,
            ));
        }
        Ok(())
    }

    fn provider_name(&self) -> &str {
        &self.config.provider_name
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

// API request/response types for Chat Completions API

#[derive(Debug, Serialize)]
struct ChatCompletionsRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionsResponse {
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChoiceMessage>,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    total_tokens: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::HeaderMap, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Recorded {
        calls: Arc<AtomicUsize>,
        last_body: Arc<Mutex<Option<Value>>>,
        last_auth: Arc<Mutex<Option<String>>>,
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/v1", addr)
    }

    fn provider(base_url: String, api_key: Option<&str>) -> OpenAICompatibleProvider {
        OpenAICompatibleProvider::new(OpenAICompatibleConfig {
            base_url,
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            ..Default::default()
        })
        .unwrap()
    }

    fn messages() -> Vec<Message> {
        vec![Message::system("rules"), Message::user("idea")]
    }

    #[test]
    fn test_lm_studio_config() {
        let config = OpenAICompatibleConfig::lm_studio("test-model".to_string());
        assert_eq!(config.base_url, "http://localhost:1234/v1");
        assert_eq!(config.provider_name, "lmstudio");
        assert!(!config.require_api_key);
    }

    #[test]
    fn test_ollama_config() {
        let config = OpenAICompatibleConfig::ollama("llama3".to_string());
        assert_eq!(config.base_url, "http://localhost:11434/v1");
        assert_eq!(config.provider_name, "ollama");
    }

    #[tokio::test]
    async fn sends_chat_request_and_reads_first_choice() {
        let recorded = Recorded::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(
                    |State(rec): State<Recorded>, headers: HeaderMap, Json(body): Json<Value>| async move {
                        rec.calls.fetch_add(1, Ordering::SeqCst);
                        *rec.last_body.lock().unwrap() = Some(body);
                        *rec.last_auth.lock().unwrap() = headers
                            .get("authorization")
                            .and_then(|v| v.to_str().ok())
                            .map(str::to_string);
                        Json(json!({
                            "model": "gpt-4o-mini",
                            "choices": [{"message": {"role": "assistant", "content": "{\"ok\":true}"}, "finish_reason": "stop"}],
                            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
                        }))
                    },
                ),
            )
            .with_state(recorded.clone());
        let base_url = spawn(router).await;

        let response = provider(base_url, Some("sk-test"))
            .generate_chat(&messages(), &GenerationConfig::new(0.2, 256))
            .await
            .unwrap();

        assert_eq!(response.content, "{\"ok\":true}");
        assert_eq!(response.total_tokens, Some(15));
        assert_eq!(response.finish_reason.as_deref(), Some("stop"));

        let body = recorded.last_body.lock().unwrap().clone().unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "idea");
        assert_eq!(body["max_tokens"], 256);
        assert_eq!(
            recorded.last_auth.lock().unwrap().as_deref(),
            Some("Bearer sk-test")
        );
    }

    #[tokio::test]
    async fn missing_choices_yield_empty_content() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { Json(json!({"choices": []})) }),
        );
        let base_url = spawn(router).await;

        let response = provider(base_url, Some("sk-test"))
            .generate_chat(&messages(), &GenerationConfig::default())
            .await
            .unwrap();
        assert_eq!(response.content, "");
    }

    #[tokio::test]
    async fn http_errors_become_upstream_errors_with_body() {
        let router = Router::new().route(
            "/v1/chat/completions",
            post(|| async { (StatusCode::UNAUTHORIZED, "invalid api key") }),
        );
        let base_url = spawn(router).await;

        let err = provider(base_url, Some("sk-bad"))
            .generate_chat(&messages(), &GenerationConfig::default())
            .await
            .unwrap_err();

        match err {
            VentureLensError::Upstream { provider, message } => {
                assert_eq!(provider, "openai");
                assert!(message.contains("invalid api key"), "{}", message);
            }
            other => panic!("expected upstream error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_key_fails_before_any_request() {
        let recorded = Recorded::default();
        let router = Router::new()
            .route(
                "/v1/chat/completions",
                post(|State(rec): State<Recorded>| async move {
                    rec.calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"choices": []}))
                }),
            )
            .with_state(recorded.clone());
        let base_url = spawn(router).await;

        let llm = provider(base_url, None);
        assert!(matches!(
            llm.ensure_ready(),
            Err(VentureLensError::MissingCredential { .. })
        ));
        let err = llm
            .generate_chat(&messages(), &GenerationConfig::default())
            .await
            .unwrap_err();

        assert!(matches!(err, VentureLensError::MissingCredential { .. }));
        assert_eq!(recorded.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn local_providers_do_not_need_a_key() {
        let llm = OpenAICompatibleProvider::ollama("llama3".to_string()).unwrap();
        assert!(llm.ensure_ready().is_ok());
    }

    #[tokio::test]
    async fn unreachable_host_is_an_upstream_error() {
        // Port 9 (discard) is closed on test machines
        let err = provider("http://127.0.0.1:9/v1".to_string(), Some("sk-test"))
            .generate_chat(&messages(), &GenerationConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, VentureLensError::Upstream { .. }));
    }
}
