use crate::{ApiError, ApiResult, AppState};
use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::{info_span, Instrument, Span};
use uuid::Uuid;
use venturelens_core::{Entitlement, FlowKind, IdeaText, Mode};
use venturelens_pipeline::{
    BrandVibe, CompetitiveAnalysis, MarketSize, PivotStrategy, RoadmapPhase, TechStack,
    ValidationReport,
};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub llm_provider: String,
    pub model: String,
    pub search_configured: bool,
}

/// Body shared by every flow endpoint. The plan is not part of it; it comes
/// from `AppState`.
#[derive(Debug, Clone, Deserialize)]
pub struct FlowBody {
    pub idea: String,
    #[serde(default)]
    pub mode: Option<Mode>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RoastResponse {
    pub roast: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DomainCheckResponse {
    pub domain: String,
    pub available: bool,
}

/// A validated flow request with its tracing span
struct FlowInput {
    idea: IdeaText,
    mode: Mode,
    entitlement: Entitlement,
    span: Span,
}

impl FlowInput {
    fn parse(
        state: &AppState,
        flow: FlowKind,
        payload: Result<Json<FlowBody>, JsonRejection>,
    ) -> ApiResult<Self> {
        let Json(body) = payload?;
        let idea = IdeaText::new(body.idea)?;
        let mode = body.mode.unwrap_or_default();
        let entitlement = state.entitlement;
        let span = info_span!(
            "flow_request",
            request_id = %Uuid::new_v4(),
            flow = %flow,
            %mode,
            tier = %entitlement.tier
        );

        Ok(Self {
            idea,
            mode,
            entitlement,
            span,
        })
    }
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let executor = state.pipeline.executor();
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        llm_provider: executor.llm().provider_name().to_string(),
        model: executor.llm().model_name().to_string(),
        search_configured: executor.search_provider().is_configured(),
    })
}

pub async fn validate(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<ValidationReport>> {
    let input = FlowInput::parse(&state, FlowKind::Validate, payload)?;
    let cancel = state.request_token();
    let report = state
        .pipeline
        .validate(&input.idea, input.mode, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(report))
}

pub async fn pivot(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<PivotStrategy>> {
    let input = FlowInput::parse(&state, FlowKind::Pivot, payload)?;
    let cancel = state.request_token();
    let strategy = state
        .pipeline
        .pivot(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(strategy))
}

pub async fn roadmap(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<Vec<RoadmapPhase>>> {
    let input = FlowInput::parse(&state, FlowKind::Roadmap, payload)?;
    let cancel = state.request_token();
    let phases = state
        .pipeline
        .roadmap(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(phases))
}

pub async fn competitors(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<CompetitiveAnalysis>> {
    let input = FlowInput::parse(&state, FlowKind::Competitors, payload)?;
    let cancel = state.request_token();
    let analysis = state
        .pipeline
        .competitors(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(analysis))
}

pub async fn market_size(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<MarketSize>> {
    let input = FlowInput::parse(&state, FlowKind::MarketSize, payload)?;
    let cancel = state.request_token();
    let sizing = state
        .pipeline
        .market_size(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(sizing))
}

pub async fn tech_stack(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<TechStack>> {
    let input = FlowInput::parse(&state, FlowKind::TechStack, payload)?;
    let cancel = state.request_token();
    let stack = state
        .pipeline
        .tech_stack(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(stack))
}

pub async fn brand_vibe(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<BrandVibe>> {
    let input = FlowInput::parse(&state, FlowKind::BrandVibe, payload)?;
    let cancel = state.request_token();
    let vibe = state
        .pipeline
        .brand_vibe(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(vibe))
}

pub async fn roast(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<RoastResponse>> {
    let input = FlowInput::parse(&state, FlowKind::Roast, payload)?;
    let cancel = state.request_token();
    let roast = state
        .pipeline
        .roast(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(RoastResponse { roast }))
}

/// The `idea` field carries the domain name for this endpoint
pub async fn domain_check(
    State(state): State<AppState>,
    payload: Result<Json<FlowBody>, JsonRejection>,
) -> ApiResult<Json<DomainCheckResponse>> {
    let input = FlowInput::parse(&state, FlowKind::DomainCheck, payload)?;
    let cancel = state.request_token();
    let available = state
        .pipeline
        .domain_check(&input.idea, input.entitlement, &cancel)
        .instrument(input.span)
        .await?;
    Ok(Json(DomainCheckResponse {
        domain: input.idea.to_string(),
        available,
    }))
}

pub async fn not_found() -> ApiError {
    ApiError::NotFound(format!(
        "Unknown endpoint. Available flows: {}",
        FlowKind::ALL
            .iter()
            .map(|f| f.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ))
}
