use venturelens_core::{FlowKind, Mode};

/// Fixed text blocks for one flow's prompt
#[derive(Debug, Clone, Copy)]
pub(crate) struct FlowTemplate {
    pub role: &'static str,
    pub tone: &'static str,
    pub schema: &'static str,
    pub task: &'static str,
}

pub(crate) const NO_CONTEXT_FALLBACK: &str = "No real-time search context is available. Rely on your general knowledge and state clearly when figures are estimates.";

pub(crate) const BASE_RULES: &str = "RULES:
- Be specific and evidence-based. Do not use hype language (\"revolutionary\", \"game-changing\", \"disruptive\").
- Prefer concrete numbers, names and timeframes over generalities.";

/// Only added for flows that carry a context block
pub(crate) const CONTEXT_RULE: &str =
    "- Ground your claims in the REAL-TIME CONTEXT above and cite the sources you used.";

pub(crate) const OUTPUT_RULE: &str =
    "- Output ONLY a JSON value matching the schema below. No markdown, no commentary before or after.";

const ANALYST_ROLE: &str = "You are a seasoned venture analyst who has evaluated thousands of early-stage startups.";
const STRATEGIST_ROLE: &str = "You are a startup strategist who helps founders find stronger positions in their market.";
const OPERATOR_ROLE: &str = "You are an experienced startup operator who turns ideas into executable plans.";
const ARCHITECT_ROLE: &str = "You are a pragmatic CTO who picks proven technology for small teams.";
const BRAND_ROLE: &str = "You are a brand designer who creates memorable identities for new companies.";
const COMEDIAN_ROLE: &str = "You are a sharp-witted comedian who roasts startup ideas.";
const REGISTRAR_ROLE: &str = "You are a domain name expert familiar with registration patterns across TLDs.";

const PROFESSIONAL_TONE: &str =
    "TONE: Direct, balanced and professional. Name real risks as clearly as real strengths.";

const ROAST_TONE: &str = "TONE: Brutally honest and sarcastic. Use internet slang and meme references, \
but keep every burn tied to a real weakness of the idea. End on a genuinely useful note.";

const VALIDATION_SCHEMA: &str = r#"{
  "viabilityScore": number (0-100),
  "verdict": string,
  "summary": string,
  "strengths": string[],
  "risks": string[],
  "competitors": string[],
  "targetAudience": string,
  "monetization": string[],
  "nextSteps": string[],
  "sources": string[]
}"#;

const VALIDATION_ROAST_SCHEMA: &str = r#"{
  "viabilityScore": number (0-100),
  "verdict": string,
  "summary": string,
  "strengths": string[],
  "risks": string[],
  "competitors": string[],
  "targetAudience": string,
  "monetization": string[],
  "nextSteps": string[],
  "sources": string[],
  "roast": {
    "headline": string,
    "burns": string[],
    "redemption": string
  }
}"#;

const PIVOT_SCHEMA: &str = r#"{
  "pivots": [
    { "title": string, "description": string, "rationale": string, "targetMarket": string }
  ],
  "recommendation": string
}"#;

const ROADMAP_SCHEMA: &str = r#"[
  { "phase": string, "timeframe": string, "goals": string[], "milestones": string[] }
]"#;

const COMPETITORS_SCHEMA: &str = r#"{
  "competitors": [
    { "name": string, "description": string, "strengths": string[], "weaknesses": string[], "url": string }
  ],
  "marketGaps": string[],
  "differentiation": string
}"#;

const MARKET_SIZE_SCHEMA: &str = r#"{
  "tam": string,
  "sam": string,
  "som": string,
  "growthRate": string,
  "assumptions": string[],
  "sources": string[]
}"#;

const TECH_STACK_SCHEMA: &str = r#"{
  "frontend": string[],
  "backend": string[],
  "database": string[],
  "infrastructure": string[],
  "aiServices": string[],
  "rationale": string
}"#;

const BRAND_VIBE_SCHEMA: &str = r##"{
  "palette": string[] (5 hex colors, e.g. "#1E293B"),
  "slogan": string,
  "style": string,
  "nameIdeas": string[]
}"##;

const ROAST_LINE_SCHEMA: &str = r#"{ "roast": string (one sentence, under 30 words) }"#;

const DOMAIN_SCHEMA: &str = r#"{ "available": boolean }"#;

pub(crate) fn template_for(flow: FlowKind, mode: Mode) -> FlowTemplate {
    match (flow, mode) {
        (FlowKind::Validate, Mode::Roast) => FlowTemplate {
            role: ANALYST_ROLE,
            tone: ROAST_TONE,
            schema: VALIDATION_ROAST_SCHEMA,
            task: "Validate and roast this startup idea.",
        },
        (FlowKind::Validate, Mode::Default) => FlowTemplate {
            role: ANALYST_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: VALIDATION_SCHEMA,
            task: "Validate this startup idea.",
        },
        (FlowKind::Pivot, _) => FlowTemplate {
            role: STRATEGIST_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: PIVOT_SCHEMA,
            task: "Suggest three pivots for this startup idea and recommend one.",
        },
        (FlowKind::Roadmap, _) => FlowTemplate {
            role: OPERATOR_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: ROADMAP_SCHEMA,
            task: "Create a phased launch roadmap for this startup idea.",
        },
        (FlowKind::Competitors, _) => FlowTemplate {
            role: ANALYST_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: COMPETITORS_SCHEMA,
            task: "Analyze the competitive landscape for this startup idea.",
        },
        (FlowKind::MarketSize, _) => FlowTemplate {
            role: ANALYST_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: MARKET_SIZE_SCHEMA,
            task: "Estimate TAM, SAM and SOM for this startup idea.",
        },
        (FlowKind::TechStack, _) => FlowTemplate {
            role: ARCHITECT_ROLE,
            tone: PROFESSIONAL_TONE,
            schema: TECH_STACK_SCHEMA,
            task: "Recommend a tech stack for building this startup idea.",
        },
        (FlowKind::BrandVibe, _) => FlowTemplate {
            role: BRAND_ROLE,
            tone: "TONE: Creative but credible.",
            schema: BRAND_VIBE_SCHEMA,
            task: "Create a brand identity for this startup idea.",
        },
        (FlowKind::Roast, _) => FlowTemplate {
            role: COMEDIAN_ROLE,
            tone: ROAST_TONE,
            schema: ROAST_LINE_SCHEMA,
            task: "Roast this startup idea in a single line.",
        },
        (FlowKind::DomainCheck, _) => FlowTemplate {
            role: REGISTRAR_ROLE,
            tone: "TONE: Conservative. When unsure, answer false.",
            schema: DOMAIN_SCHEMA,
            task: "Is this domain name likely still available for registration?",
        },
    }
}
