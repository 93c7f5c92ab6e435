use venturelens_api::{init_tracing, AppState, Server};
use venturelens_core::ConfigManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let manager = ConfigManager::load()?;
    let config = manager.config();
    init_tracing(&config.logging)?;
    manager.log_summary();

    let state = AppState::from_config(config)?;
    Server::new(state, &config.server).run().await
}
