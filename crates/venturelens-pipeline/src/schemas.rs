//! Typed shapes of every structured report the model is asked to produce.
//!
//! Required fields are the ones the UI cannot render without; list fields
//! default to empty so a terse but well-formed answer still validates.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub viability_score: f64,
    pub verdict: String,
    pub summary: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
    #[serde(default)]
    pub competitors: Vec<String>,
    #[serde(default)]
    pub target_audience: String,
    #[serde(default)]
    pub monetization: Vec<String>,
    #[serde(default)]
    pub next_steps: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roast: Option<Roast>,
    /// Fields the model added beyond the schema, passed through untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Roast-mode extension of the validation report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Roast {
    pub headline: String,
    #[serde(default)]
    pub burns: Vec<String>,
    #[serde(default)]
    pub redemption: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotStrategy {
    pub pivots: Vec<PivotOption>,
    #[serde(default)]
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PivotOption {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub rationale: String,
    #[serde(default)]
    pub target_market: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoadmapPhase {
    pub phase: String,
    pub timeframe: String,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default)]
    pub milestones: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitiveAnalysis {
    pub competitors: Vec<Competitor>,
    #[serde(default)]
    pub market_gaps: Vec<String>,
    #[serde(default)]
    pub differentiation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Competitor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub strengths: Vec<String>,
    #[serde(default)]
    pub weaknesses: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSize {
    pub tam: String,
    pub sam: String,
    pub som: String,
    #[serde(default)]
    pub growth_rate: String,
    #[serde(default)]
    pub assumptions: Vec<String>,
    #[serde(default)]
    pub sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TechStack {
    pub frontend: Vec<String>,
    pub backend: Vec<String>,
    #[serde(default)]
    pub database: Vec<String>,
    #[serde(default)]
    pub infrastructure: Vec<String>,
    #[serde(default)]
    pub ai_services: Vec<String>,
    #[serde(default)]
    pub rationale: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandVibe {
    pub palette: Vec<String>,
    pub slogan: String,
    pub style: String,
    #[serde(default)]
    pub name_ideas: Vec<String>,
}

impl BrandVibe {
    /// Brand kit returned when generation fails
    pub fn neutral() -> Self {
        Self {
            palette: ["#0F172A", "#334155", "#64748B", "#E2E8F0", "#F8FAFC"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            slogan: "Built for what comes next.".to_string(),
            style: "Clean, minimal and professional".to_string(),
            name_ideas: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoastLine {
    pub roast: String,
}

impl RoastLine {
    pub const APOLOGY: &'static str =
        "Our roast machine overheated. Your idea survives unscathed, for now.";

    pub fn apology() -> Self {
        Self {
            roast: Self::APOLOGY.to_string(),
        }
    }
}

/// The model may answer a bare boolean or `{"available": bool}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DomainVerdict {
    Flag(bool),
    Object { available: bool },
}

impl DomainVerdict {
    pub fn is_available(&self) -> bool {
        match self {
            DomainVerdict::Flag(available) | DomainVerdict::Object { available } => *available,
        }
    }
}

/// Any flow's final value, serialized without a wrapper tag
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum StructuredReport {
    Validation(ValidationReport),
    Pivot(PivotStrategy),
    Roadmap(Vec<RoadmapPhase>),
    Competitors(CompetitiveAnalysis),
    MarketSize(MarketSize),
    TechStack(TechStack),
    BrandVibe(BrandVibe),
    Roast(String),
    DomainAvailability(bool),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn validation_report_keeps_unknown_fields() {
        let report: ValidationReport = serde_json::from_value(json!({
            "viabilityScore": 72,
            "verdict": "Promising",
            "summary": "Niche but real demand.",
            "sources": [],
            "moat": "community"
        }))
        .unwrap();

        assert_eq!(report.viability_score, 72.0);
        assert!(report.risks.is_empty());
        assert_eq!(report.extra.get("moat"), Some(&json!("community")));

        let back = serde_json::to_value(&report).unwrap();
        assert_eq!(back["moat"], "community");
        assert_eq!(back["viabilityScore"], 72.0);
        assert!(back.get("roast").is_none());
    }

    #[test]
    fn validation_report_requires_score() {
        let err = serde_json::from_value::<ValidationReport>(json!({
            "verdict": "Promising",
            "summary": "ok"
        }))
        .unwrap_err();
        assert!(err.to_string().contains("viabilityScore"));
    }

    #[test]
    fn domain_verdict_accepts_both_forms() {
        let flag: DomainVerdict = serde_json::from_str("true").unwrap();
        let object: DomainVerdict = serde_json::from_str(r#"{"available": false}"#).unwrap();
        assert!(flag.is_available());
        assert!(!object.is_available());
    }

    #[test]
    fn structured_report_serializes_untagged() {
        let value = serde_json::to_value(StructuredReport::DomainAvailability(true)).unwrap();
        assert_eq!(value, json!(true));
        let value = serde_json::to_value(StructuredReport::BrandVibe(BrandVibe::neutral())).unwrap();
        assert_eq!(value["slogan"], "Built for what comes next.");
        assert_eq!(value["palette"].as_array().unwrap().len(), 5);
    }
}
