use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use venturelens_core::{Entitlement, VentureLensConfig};
use venturelens_pipeline::IdeaPipeline;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<IdeaPipeline>,
    /// Plan every request runs under, fixed by the operator's config
    pub entitlement: Entitlement,
    /// Cancelled when the server shuts down; every request gets a child token
    pub shutdown: CancellationToken,
}

impl AppState {
    pub fn new(pipeline: Arc<IdeaPipeline>, entitlement: Entitlement) -> Self {
        Self {
            pipeline,
            entitlement,
            shutdown: CancellationToken::new(),
        }
    }

    /// Build the pipeline with real providers from configuration
    pub fn from_config(config: &VentureLensConfig) -> anyhow::Result<Self> {
        let pipeline = IdeaPipeline::from_config(config)?;
        Ok(Self::new(Arc::new(pipeline), config.pipeline.entitlement()))
    }

    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}
