use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use venturelens_ai::{GenerationConfig, LLMProvider, LLMResponse, Message, SearchProvider};
use venturelens_core::{Result, SearchResult, VentureLensError};

/// What the mock model does on its next call
#[derive(Debug, Clone)]
pub enum Reply {
    Text(String),
    Fail(String),
    Hang,
}

pub struct MockLLM {
    replies: Mutex<VecDeque<Reply>>,
    ready: bool,
    pub calls: Mutex<Vec<(Vec<Message>, GenerationConfig)>>,
}

impl MockLLM {
    pub fn replying(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ready: true,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn text(raw: &str) -> Self {
        Self::replying(vec![Reply::Text(raw.to_string())])
    }

    /// Answers every call with an empty completion
    pub fn empty_reply() -> Self {
        Self::replying(vec![])
    }

    pub fn failing() -> Self {
        Self::replying(vec![Reply::Fail("500 Internal Server Error".to_string())])
    }

    pub fn without_key() -> Self {
        Self {
            ready: false,
            ..Self::replying(vec![])
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn last_call(&self) -> Option<(Vec<Message>, GenerationConfig)> {
        self.calls.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl LLMProvider for MockLLM {
    async fn generate_chat(
        &self,
        messages: &[Message],
        config: &GenerationConfig,
    ) -> Result<LLMResponse> {
        self.ensure_ready()?;
        self.calls
            .lock()
            .unwrap()
            .push((messages.to_vec(), config.clone()));

        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::Text(String::new()));

        match reply {
            Reply::Text(content) => Ok(LLMResponse {
                content,
                total_tokens: None,
                finish_reason: Some("stop".to_string()),
                model: "mock".to_string(),
            }),
            Reply::Fail(message) => Err(VentureLensError::upstream("mock", message)),
            Reply::Hang => std::future::pending().await,
        }
    }

    fn ensure_ready(&self) -> Result<()> {
        if self.ready {
            Ok(())
        } else {
            Err(VentureLensError::missing_credential("mock"))
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}

/// Returns canned results per query, recording every query it sees
pub struct MockSearch {
    results: Vec<(String, Vec<SearchResult>)>,
    default: Vec<SearchResult>,
    hang: bool,
    pub queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn returning(results: Vec<SearchResult>) -> Self {
        Self {
            results: Vec::new(),
            default: results,
            hang: false,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn empty() -> Self {
        Self::returning(Vec::new())
    }

    pub fn hanging() -> Self {
        Self {
            hang: true,
            ..Self::empty()
        }
    }

    /// Results for queries containing `needle`
    pub fn with(mut self, needle: &str, results: Vec<SearchResult>) -> Self {
        self.results.push((needle.to_string(), results));
        self
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl SearchProvider for MockSearch {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.queries.lock().unwrap().push(query.to_string());
        if self.hang {
            std::future::pending::<()>().await;
        }
        self.results
            .iter()
            .find(|(needle, _)| query.contains(needle.as_str()))
            .map(|(_, results)| results.clone())
            .unwrap_or_else(|| self.default.clone())
    }

    fn is_configured(&self) -> bool {
        true
    }

    fn provider_name(&self) -> &str {
        "mock-search"
    }
}
