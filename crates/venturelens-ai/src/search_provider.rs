use async_trait::async_trait;
use venturelens_core::SearchResult;

/// Web search collaborator.
///
/// Implementations never fail: a missing credential or any transport error
/// yields an empty list so the pipeline can continue with degraded context.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Search for `query`, returning results in relevance order
    async fn search(&self, query: &str) -> Vec<SearchResult>;

    /// Whether a search would actually reach the network
    fn is_configured(&self) -> bool;

    /// Get the name of this provider
    fn provider_name(&self) -> &str;
}

/// Provider used when search is switched off entirely
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledSearchProvider;

#[async_trait]
impl SearchProvider for DisabledSearchProvider {
    async fn search(&self, query: &str) -> Vec<SearchResult> {
        tracing::debug!(query, "Search disabled, returning no results");
        Vec::new()
    }

    fn is_configured(&self) -> bool {
        false
    }

    fn provider_name(&self) -> &str {
        "disabled"
    }
}
