use crate::llm_provider::*;
use crate::retry::RetryPolicy;
use crate::search_provider::{DisabledSearchProvider, SearchProvider};
use anyhow::{anyhow, Result};
use std::sync::Arc;
use venturelens_core::{LLMConfig, SearchConfig};

#[cfg(feature = "openai-compatible")]
use crate::openai_compatible_provider::{OpenAICompatibleConfig, OpenAICompatibleProvider};

#[cfg(feature = "tavily")]
use crate::tavily_provider::{TavilyConfig, TavilySearchProvider};

/// Factory for creating LLM providers based on configuration
pub struct LLMProviderFactory;

impl LLMProviderFactory {
    /// Create an LLM provider from configuration
    pub fn create_from_config(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let provider_name = config.provider.to_lowercase();

        match provider_name.as_str() {
            #[cfg(feature = "openai-compatible")]
            "openai" | "openai-compatible" => Self::create_openai_compatible_provider(config),
            #[cfg(feature = "openai-compatible")]
            "lmstudio" | "ollama" => Self::create_local_provider(config, &provider_name),
            _ => Err(anyhow!(
                "Unsupported LLM provider: {}. Available providers: {}",
                provider_name,
                Self::supported_providers().join(", ")
            )),
        }
    }

    /// Provider names accepted by `create_from_config`
    pub fn supported_providers() -> Vec<&'static str> {
        let mut providers = Vec::new();
        if cfg!(feature = "openai-compatible") {
            providers.extend(["openai", "openai-compatible", "lmstudio", "ollama"]);
        }
        providers
    }

    /// Hosted endpoints. A missing key is reported per request as
    /// `MissingCredential`, so construction still succeeds without one.
    #[cfg(feature = "openai-compatible")]
    fn create_openai_compatible_provider(config: &LLMConfig) -> Result<Arc<dyn LLMProvider>> {
        let compat_config = OpenAICompatibleConfig {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            timeout_secs: config.timeout_secs,
            api_key: config.api_key.clone(),
            require_api_key: true,
            provider_name: config.provider.to_lowercase(),
            retry: RetryPolicy::from(&config.retry),
        };

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }

    /// LM Studio and Ollama speak the same protocol without a key
    #[cfg(feature = "openai-compatible")]
    fn create_local_provider(config: &LLMConfig, name: &str) -> Result<Arc<dyn LLMProvider>> {
        let mut compat_config = if name == "ollama" {
            OpenAICompatibleConfig::ollama(config.model.clone())
        } else {
            OpenAICompatibleConfig::lm_studio(config.model.clone())
        };

        // Keep the local default unless the hosted default was overridden
        if config.base_url != LLMConfig::default().base_url {
            compat_config.base_url = config.base_url.trim_end_matches('/').to_string();
        }
        compat_config.timeout_secs = config.timeout_secs;
        compat_config.api_key = config.api_key.clone();
        compat_config.retry = RetryPolicy::from(&config.retry);

        Ok(Arc::new(OpenAICompatibleProvider::new(compat_config)?))
    }
}

/// Factory for the web search collaborator
pub struct SearchProviderFactory;

impl SearchProviderFactory {
    pub fn create_from_config(config: &SearchConfig) -> Result<Arc<dyn SearchProvider>> {
        #[cfg(feature = "tavily")]
        {
            let tavily = TavilyConfig {
                api_key: config.api_key.clone(),
                api_base: config.base_url.trim_end_matches('/').to_string(),
                max_results: config.max_results,
                search_depth: config.search_depth.clone(),
                include_answer: false,
                timeout: std::time::Duration::from_secs(config.timeout_secs),
                retry: RetryPolicy::from(&config.retry),
            };
            Ok(Arc::new(TavilySearchProvider::new(tavily)?))
        }

        #[cfg(not(feature = "tavily"))]
        {
            let _ = config;
            tracing::warn!("Built without the 'tavily' feature, web search is disabled");
            Ok(Arc::new(DisabledSearchProvider))
        }
    }

    /// A provider that never searches
    pub fn disabled() -> Arc<dyn SearchProvider> {
        Arc::new(DisabledSearchProvider)
    }
}
