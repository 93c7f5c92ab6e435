use crate::composer::PromptComposer;
use crate::enricher::enrich_sources;
use crate::executor::{FlowOutcome, FlowRequest, PipelineExecutor};
use crate::policy::FailurePolicy;
use crate::query_builder::{QueryBuilder, YearWindow};
use crate::sanitizer::EmptyCheck;
use crate::schemas::*;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use venturelens_ai::{
    GenerationConfig, LLMProvider, LLMProviderFactory, SearchProvider, SearchProviderFactory,
};
use venturelens_core::{Entitlement, FlowKind, IdeaText, Mode, Result, VentureLensConfig};

/// One async entry point per user-facing flow.
///
/// Every method checks the caller's entitlement and the completion
/// credential before any network call, and honours `cancel` throughout.
pub struct IdeaPipeline {
    executor: PipelineExecutor,
    analysis: GenerationConfig,
    sources_cap: usize,
}

impl IdeaPipeline {
    pub fn new(
        llm: Arc<dyn LLMProvider>,
        search: Arc<dyn SearchProvider>,
        config: &VentureLensConfig,
    ) -> Self {
        Self::with_year_window(llm, search, config, YearWindow::from_clock())
    }

    pub fn with_year_window(
        llm: Arc<dyn LLMProvider>,
        search: Arc<dyn SearchProvider>,
        config: &VentureLensConfig,
        years: YearWindow,
    ) -> Self {
        let executor = PipelineExecutor::new(
            llm,
            search,
            QueryBuilder::new(years),
            PromptComposer::new(config.pipeline.snippet_chars, years),
            config.search.strategy,
        );

        Self {
            executor,
            analysis: GenerationConfig::new(config.llm.temperature, config.llm.max_tokens),
            sources_cap: config.pipeline.sources_cap,
        }
    }

    /// Build real providers from configuration
    pub fn from_config(config: &VentureLensConfig) -> anyhow::Result<Self> {
        let llm = LLMProviderFactory::create_from_config(&config.llm)?;
        let search = SearchProviderFactory::create_from_config(&config.search)?;
        tracing::info!(
            provider = llm.provider_name(),
            model = llm.model_name(),
            search = search.provider_name(),
            search_configured = search.is_configured(),
            "Pipeline providers ready"
        );
        Ok(Self::new(llm, search, config))
    }

    pub fn executor(&self) -> &PipelineExecutor {
        &self.executor
    }

    /// Sampling settings for a flow. Analysis flows use the configured
    /// values; the short generative flows use fixed ones.
    pub fn generation_for(&self, flow: FlowKind) -> GenerationConfig {
        match flow {
            FlowKind::Roast => GenerationConfig::new(0.9, 150),
            FlowKind::BrandVibe => GenerationConfig::new(0.8, 800),
            FlowKind::DomainCheck => GenerationConfig::new(0.0, 50),
            _ => self.analysis.clone(),
        }
    }

    #[allow(clippy::too_many_arguments)]
    async fn run<T: DeserializeOwned>(
        &self,
        flow: FlowKind,
        mode: Mode,
        idea: &IdeaText,
        entitlement: Entitlement,
        empty_check: EmptyCheck,
        policy: FailurePolicy<T>,
        cancel: &CancellationToken,
    ) -> Result<FlowOutcome<T>> {
        entitlement.check(flow, mode)?;

        let request = FlowRequest {
            flow,
            mode,
            idea,
            generation: self.generation_for(flow),
            empty_check,
        };
        self.executor.execute(request, policy, cancel).await
    }

    pub async fn validate(
        &self,
        idea: &IdeaText,
        mode: Mode,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<ValidationReport> {
        let outcome = self
            .run::<ValidationReport>(
                FlowKind::Validate,
                mode,
                idea,
                entitlement,
                EmptyCheck::RejectEmpty,
                FailurePolicy::propagate_with_cause("Failed to validate idea"),
                cancel,
            )
            .await?;

        let mut report = outcome.value;
        enrich_sources(&mut report, &outcome.context, self.sources_cap);
        Ok(report)
    }

    pub async fn pivot(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<PivotStrategy> {
        self.run::<PivotStrategy>(
            FlowKind::Pivot,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::propagate("Failed to generate pivot"),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    pub async fn roadmap(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<Vec<RoadmapPhase>> {
        self.run::<Vec<RoadmapPhase>>(
            FlowKind::Roadmap,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::propagate("Failed to generate roadmap"),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    pub async fn competitors(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<CompetitiveAnalysis> {
        self.run::<CompetitiveAnalysis>(
            FlowKind::Competitors,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::propagate("Failed to analyze competitors"),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    pub async fn market_size(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<MarketSize> {
        self.run::<MarketSize>(
            FlowKind::MarketSize,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::propagate("Failed to calculate market size"),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    pub async fn tech_stack(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<TechStack> {
        self.run::<TechStack>(
            FlowKind::TechStack,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::propagate("Failed to recommend tech stack"),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    /// One-line roast. Falls back to a canned apology.
    pub async fn roast(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<String> {
        self.run(
            FlowKind::Roast,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::fallback(RoastLine::apology()),
            cancel,
        )
        .await
        .map(|outcome| outcome.value.roast)
    }

    /// Brand kit. Falls back to a neutral palette and slogan.
    pub async fn brand_vibe(
        &self,
        idea: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<BrandVibe> {
        self.run(
            FlowKind::BrandVibe,
            Mode::Default,
            idea,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::fallback(BrandVibe::neutral()),
            cancel,
        )
        .await
        .map(|outcome| outcome.value)
    }

    /// Whether `domain` looks registrable. Fails closed to `false`.
    pub async fn domain_check(
        &self,
        domain: &IdeaText,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<bool> {
        self.run(
            FlowKind::DomainCheck,
            Mode::Default,
            domain,
            entitlement,
            EmptyCheck::Skip,
            FailurePolicy::fallback(DomainVerdict::Flag(false)),
            cancel,
        )
        .await
        .map(|outcome| outcome.value.is_available())
    }

    /// Dispatch by flow name. `mode` only affects `validate`.
    pub async fn run_flow(
        &self,
        flow: FlowKind,
        idea: &IdeaText,
        mode: Mode,
        entitlement: Entitlement,
        cancel: &CancellationToken,
    ) -> Result<StructuredReport> {
        Ok(match flow {
            FlowKind::Validate => {
                StructuredReport::Validation(self.validate(idea, mode, entitlement, cancel).await?)
            }
            FlowKind::Pivot => StructuredReport::Pivot(self.pivot(idea, entitlement, cancel).await?),
            FlowKind::Roadmap => {
                StructuredReport::Roadmap(self.roadmap(idea, entitlement, cancel).await?)
            }
            FlowKind::Competitors => {
                StructuredReport::Competitors(self.competitors(idea, entitlement, cancel).await?)
            }
            FlowKind::MarketSize => {
                StructuredReport::MarketSize(self.market_size(idea, entitlement, cancel).await?)
            }
            FlowKind::TechStack => {
                StructuredReport::TechStack(self.tech_stack(idea, entitlement, cancel).await?)
            }
            FlowKind::BrandVibe => {
                StructuredReport::BrandVibe(self.brand_vibe(idea, entitlement, cancel).await?)
            }
            FlowKind::Roast => StructuredReport::Roast(self.roast(idea, entitlement, cancel).await?),
            FlowKind::DomainCheck => StructuredReport::DomainAvailability(
                self.domain_check(idea, entitlement, cancel).await?,
            ),
        })
    }
}
