use crate::retry::{AttemptError, FailureClass, RetryPolicy};
use crate::search_provider::SearchProvider;
use anyhow::anyhow;
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};
use venturelens_core::SearchResult;

/// Configuration for the Tavily search API
#[derive(Debug, Clone)]
pub struct TavilyConfig {
    pub api_key: Option<SecretString>,
    pub api_base: String,
    pub max_results: usize,
    pub search_depth: String,
    pub include_answer: bool,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: "https://api.tavily.com".to_string(),
            max_results: 5,
            search_depth: "basic".to_string(),
            include_answer: false,
            timeout: Duration::from_secs(20),
            retry: RetryPolicy::single_attempt(),
        }
    }
}

#[derive(Debug, Serialize)]
struct TavilySearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'a str,
    include_answer: bool,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilySearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

/// Tavily web search provider
#[derive(Clone)]
pub struct TavilySearchProvider {
    config: TavilyConfig,
    client: Client,
}

impl TavilySearchProvider {
    pub fn new(config: TavilyConfig) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent("VentureLens/1.0")
            .build()?;
        Ok(Self { config, client })
    }

    fn api_key(&self) -> Option<&str> {
        self.config
            .api_key
            .as_ref()
            .map(|key| key.expose_secret())
            .filter(|key| !key.trim().is_empty())
    }

    async fn try_search(
        &self,
        api_key: &str,
        query: &str,
    ) -> Result<Vec<SearchResult>, AttemptError> {
        let request = TavilySearchRequest {
            api_key,
            query,
            search_depth: &self.config.search_depth,
            include_answer: self.config.include_answer,
            max_results: self.config.max_results,
        };

        let response = self
            .client
            .post(format!("{}/search", self.config.api_base.trim_end_matches('/')))
            .json(&request)
            .send()
            .await
            .map_err(|e| AttemptError::new(FailureClass::from_reqwest(&e), anyhow!(e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(AttemptError::new(
                FailureClass::from_status(status),
                anyhow!("Tavily API error ({}): {}", status, error_text),
            ));
        }

        let body: TavilySearchResponse = response
            .json()
            .await
            .map_err(|e| AttemptError::new(FailureClass::Decode, anyhow!(e)))?;
        Ok(body.results)
    }
}

#[async_trait]
impl SearchProvider for TavilySearchProvider {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        let Some(api_key) = self.api_key() else {
            debug!("No search API key configured, skipping search");
            return Vec::new();
        };

        match self
            .config
            .retry
            .run("tavily", || self.try_search(api_key, query))
            .await
        {
            Ok(mut results) => {
                results.truncate(self.config.max_results);
                debug!(query, count = results.len(), "Search completed");
                results
            }
            Err(e) => {
                warn!(query, error = %format!("{:#}", e.error), "Search failed, continuing without context");
                Vec::new()
            }
        }
    }

    fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    fn provider_name(&self) -> &str {
        "tavily"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn provider(api_base: String, api_key: Option<&str>) -> TavilySearchProvider {
        TavilySearchProvider::new(TavilyConfig {
            api_key: api_key.map(|k| SecretString::from(k.to_string())),
            api_base,
            max_results: 2,
            ..Default::default()
        })
        .unwrap()
    }

    #[tokio::test]
    async fn returns_results_in_order_capped_at_max_results() {
        let seen: Arc<Mutex<Option<Value>>> = Arc::default();
        let router = Router::new()
            .route(
                "/search",
                post(
                    |State(seen): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                        *seen.lock().unwrap() = Some(body);
                        Json(json!({
                            "query": "q",
                            "results": [
                                {"title": "A", "url": "u1", "content": "first", "score": 0.9},
                                {"title": "B", "url": "u2", "content": "second", "score": 0.8},
                                {"title": "C", "url": "u3", "content": "third", "score": 0.7}
                            ]
                        }))
                    },
                ),
            )
            .with_state(seen.clone());
        let base = spawn(router).await;

        let results = provider(base, Some("tvly-key")).search("scissors").await;

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "A");
        assert_eq!(results[1].url, "u2");

        let body = seen.lock().unwrap().clone().unwrap();
        assert_eq!(body["query"], "scissors");
        assert_eq!(body["search_depth"], "basic");
        assert_eq!(body["include_answer"], false);
        assert_eq!(body["max_results"], 2);
    }

    #[tokio::test]
    async fn http_failure_yields_empty_list() {
        let router = Router::new().route(
            "/search",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let base = spawn(router).await;

        assert!(provider(base, Some("tvly-key")).search("q").await.is_empty());
    }

    #[tokio::test]
    async fn missing_key_skips_the_network() {
        let calls = Arc::new(AtomicUsize::new(0));
        let router = Router::new()
            .route(
                "/search",
                post(|State(calls): State<Arc<AtomicUsize>>| async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Json(json!({"results": []}))
                }),
            )
            .with_state(calls.clone());
        let base = spawn(router).await;

        let search = provider(base, None);
        assert!(!search.is_configured());
        assert!(search.search("q").await.is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unreachable_host_yields_empty_list() {
        let search = provider("http://127.0.0.1:9".to_string(), Some("tvly-key"));
        assert!(search.search("q").await.is_empty());
    }
}
