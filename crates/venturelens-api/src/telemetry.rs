use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use venturelens_core::LoggingConfig;

/// Output shape of the fmt layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Pretty,
    Json,
    Compact,
}

impl LogFormat {
    /// Unknown names fall back to `Pretty`; `ConfigManager` rejects them earlier.
    pub fn from_config(format: &str) -> Self {
        match format.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "compact" => LogFormat::Compact,
            _ => LogFormat::Pretty,
        }
    }
}

/// Directives used when `RUST_LOG` is unset. A bare level applies to the
/// VentureLens crates and the HTTP trace layer; anything else is a full
/// filter and is used as written.
pub fn default_filter(config: &LoggingConfig) -> String {
    let level = config.level.trim();
    match level.parse::<LevelFilter>() {
        Ok(level) => {
            let level = level.to_string().to_lowercase();
            format!("venturelens={},tower_http={}", level, level)
        }
        Err(_) => level.to_string(),
    }
}

/// Install the global subscriber, writing to stderr. `RUST_LOG` wins over
/// the configured level.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter(config)))?;
    let format = LogFormat::from_config(&config.format);

    tracing_subscriber::registry()
        .with(filter)
        .with((format == LogFormat::Json).then(|| fmt::layer().json().with_writer(std::io::stderr)))
        .with(
            (format == LogFormat::Compact)
                .then(|| fmt::layer().compact().with_writer(std::io::stderr)),
        )
        .with((format == LogFormat::Pretty).then(|| fmt::layer().with_writer(std::io::stderr)))
        .try_init()?;

    Ok(())
}
