use crate::composer::{ComposedPrompt, PromptComposer};
use crate::policy::FailurePolicy;
use crate::query_builder::{search_purposes, QueryBuilder};
use crate::sanitizer::{parse_report, EmptyCheck};
use futures::future::join_all;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use venturelens_ai::{GenerationConfig, LLMProvider, SearchProvider};
use venturelens_core::{
    FlowKind, IdeaText, Mode, Result, SearchResult, SearchStrategy, VentureLensError,
};

/// Race `fut` against the token. Cancellation wins ties.
pub async fn cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T>
where
    F: Future<Output = T>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(VentureLensError::Cancelled),
        value = fut => Ok(value),
    }
}

/// Everything the executor needs to know about one flow invocation
#[derive(Debug, Clone)]
pub struct FlowRequest<'a> {
    pub flow: FlowKind,
    pub mode: Mode,
    pub idea: &'a IdeaText,
    pub generation: GenerationConfig,
    pub empty_check: EmptyCheck,
}

/// Result of a flow together with the search context it was built from
#[derive(Debug, Clone)]
pub struct FlowOutcome<T> {
    pub value: T,
    pub context: Vec<SearchResult>,
    pub fell_back: bool,
}

/// Shared search, compose, complete and parse sequence for every flow
pub struct PipelineExecutor {
    llm: Arc<dyn LLMProvider>,
    search: Arc<dyn SearchProvider>,
    queries: QueryBuilder,
    composer: PromptComposer,
    strategy: SearchStrategy,
}

impl PipelineExecutor {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        search: Arc<dyn SearchProvider>,
        queries: QueryBuilder,
        composer: PromptComposer,
        strategy: SearchStrategy,
    ) -> Self {
        Self {
            llm,
            search,
            queries,
            composer,
            strategy,
        }
    }

    pub fn llm(&self) -> &Arc<dyn LLMProvider> {
        &self.llm
    }

    pub fn search_provider(&self) -> &Arc<dyn SearchProvider> {
        &self.search
    }

    /// Search results for the flow, in query order. Never fails.
    pub async fn gather_context(&self, flow: FlowKind, idea: &IdeaText) -> Vec<SearchResult> {
        let purposes = search_purposes(flow);
        let Some(primary) = purposes.first() else {
            return Vec::new();
        };

        match self.strategy {
            SearchStrategy::Single => {
                let query = self.queries.build(idea, *primary);
                self.search.search(&query).await
            }
            SearchStrategy::FanOut => {
                let queries = self.queries.queries_for(idea, purposes);
                let batches = join_all(queries.iter().map(|q| self.search.search(q))).await;
                dedup_by_url(batches.into_iter().flatten())
            }
        }
    }

    /// Raw completion text for a composed prompt
    pub async fn complete(
        &self,
        prompt: &ComposedPrompt,
        generation: &GenerationConfig,
    ) -> Result<String> {
        let response = self.llm.generate_chat(&prompt.messages(), generation).await?;
        Ok(response.content)
    }

    /// Run one flow end to end and apply its failure policy.
    pub async fn execute<T: DeserializeOwned>(
        &self,
        request: FlowRequest<'_>,
        policy: FailurePolicy<T>,
        cancel: &CancellationToken,
    ) -> Result<FlowOutcome<T>> {
        let started = Instant::now();
        info!(flow = %request.flow, mode = %request.mode, "Flow started");

        self.llm.ensure_ready()?;

        let context = cancellable(cancel, self.gather_context(request.flow, request.idea)).await?;
        let prompt = self
            .composer
            .compose(request.flow, request.mode, request.idea, &context);
        debug!(
            flow = %request.flow,
            results = context.len(),
            prompt_chars = prompt.char_len(),
            "Prompt composed"
        );

        let attempt = cancellable(cancel, async {
            let raw = self.complete(&prompt, &request.generation).await?;
            parse_report::<T>(&raw, request.empty_check)
        })
        .await
        .and_then(|parsed| parsed);

        let (value, fell_back) = match attempt {
            Ok(value) => (value, false),
            Err(err) => (policy.resolve(request.flow, err)?, true),
        };

        info!(
            flow = %request.flow,
            fell_back,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Flow finished"
        );

        Ok(FlowOutcome {
            value,
            context,
            fell_back,
        })
    }
}

fn dedup_by_url(results: impl IntoIterator<Item = SearchResult>) -> Vec<SearchResult> {
    let mut seen = HashSet::new();
    results
        .into_iter()
        .filter(|r| seen.insert(r.url.clone()))
        .collect()
}
