pub mod llm_factory;
pub mod llm_provider;
pub mod retry;
pub mod search_provider;

// Cloud providers
#[cfg(feature = "openai-compatible")]
pub mod openai_compatible_provider;
#[cfg(feature = "tavily")]
pub mod tavily_provider;

pub use llm_factory::{LLMProviderFactory, SearchProviderFactory};
pub use llm_provider::*;
pub use retry::{FailureClass, RetryPolicy};
pub use search_provider::{DisabledSearchProvider, SearchProvider};
