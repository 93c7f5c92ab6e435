pub mod config_manager;
pub mod error;
pub mod types;

pub use config_manager::{
    ConfigError, ConfigManager, LLMConfig, LoggingConfig, PipelineConfig, RetryConfig,
    SearchConfig, SearchStrategy, ServerConfig, VentureLensConfig,
};
pub use error::*;
pub use types::*;
