use crate::error::{Result, VentureLensError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Free-form startup idea supplied by the user. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IdeaText(String);

impl IdeaText {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(VentureLensError::InvalidInput(
                "idea text must not be empty".to_string(),
            ));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdeaText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for IdeaText {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        IdeaText::new(raw).map_err(serde::de::Error::custom)
    }
}

/// Template variant for the validate flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Default,
    Roast,
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Default => write!(f, "default"),
            Mode::Roast => write!(f, "roast"),
        }
    }
}

impl FromStr for Mode {
    type Err = VentureLensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "default" => Ok(Mode::Default),
            "roast" => Ok(Mode::Roast),
            other => Err(VentureLensError::InvalidInput(format!(
                "unknown mode '{}'. Must be one of: default, roast",
                other
            ))),
        }
    }
}

/// A single ranked snippet returned by the search collaborator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub score: f64,
}

impl SearchResult {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        content: impl Into<String>,
        score: f64,
    ) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            content: content.into(),
            score,
        }
    }

    /// `"<title>: <url>"`, the citation format used in report sources
    pub fn citation(&self) -> String {
        format!("{}: {}", self.title, self.url)
    }
}

/// Every user-facing action the pipeline exposes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlowKind {
    Validate,
    Pivot,
    Roadmap,
    Competitors,
    MarketSize,
    Roast,
    BrandVibe,
    TechStack,
    DomainCheck,
}

impl FlowKind {
    pub const ALL: [FlowKind; 9] = [
        FlowKind::Validate,
        FlowKind::Pivot,
        FlowKind::Roadmap,
        FlowKind::Competitors,
        FlowKind::MarketSize,
        FlowKind::Roast,
        FlowKind::BrandVibe,
        FlowKind::TechStack,
        FlowKind::DomainCheck,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowKind::Validate => "validate",
            FlowKind::Pivot => "pivot",
            FlowKind::Roadmap => "roadmap",
            FlowKind::Competitors => "competitors",
            FlowKind::MarketSize => "market-size",
            FlowKind::Roast => "roast",
            FlowKind::BrandVibe => "brand-vibe",
            FlowKind::TechStack => "tech-stack",
            FlowKind::DomainCheck => "domain-check",
        }
    }
}

impl fmt::Display for FlowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlowKind {
    type Err = VentureLensError;

    fn from_str(s: &str) -> Result<Self> {
        FlowKind::ALL
            .into_iter()
            .find(|flow| flow.as_str() == s)
            .ok_or_else(|| VentureLensError::InvalidInput(format!("unknown flow '{}'", s)))
    }
}

/// Subscription tier of the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
    Enterprise,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
            Tier::Enterprise => write!(f, "enterprise"),
        }
    }
}

impl FromStr for Tier {
    type Err = VentureLensError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            "enterprise" => Ok(Tier::Enterprise),
            other => Err(VentureLensError::InvalidInput(format!(
                "unknown tier '{}'. Must be one of: free, pro, enterprise",
                other
            ))),
        }
    }
}

/// Capabilities of the caller, resolved once per request and passed into every flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Entitlement {
    pub tier: Tier,
}

impl Entitlement {
    pub fn new(tier: Tier) -> Self {
        Self { tier }
    }

    pub fn allows(&self, flow: FlowKind, mode: Mode) -> bool {
        match self.tier {
            Tier::Pro | Tier::Enterprise => true,
            Tier::Free => matches!(
                (flow, mode),
                (FlowKind::Validate, Mode::Default) | (FlowKind::Roast, _) | (FlowKind::DomainCheck, _)
            ),
        }
    }

    pub fn check(&self, flow: FlowKind, mode: Mode) -> Result<()> {
        if self.allows(flow, mode) {
            Ok(())
        } else {
            Err(VentureLensError::NotEntitled {
                flow,
                tier: self.tier,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idea_text_rejects_blank_input() {
        assert!(IdeaText::new("   \n").is_err());
        let idea = IdeaText::new("  Uber for dog walkers ").unwrap();
        assert_eq!(idea.as_str(), "Uber for dog walkers");
    }

    #[test]
    fn idea_text_deserializes_with_validation() {
        let ok: IdeaText = serde_json::from_str("\"a marketplace\"").unwrap();
        assert_eq!(ok.as_str(), "a marketplace");
        assert!(serde_json::from_str::<IdeaText>("\"\"").is_err());
    }

    #[test]
    fn flow_kind_round_trips_through_its_name() {
        for flow in FlowKind::ALL {
            assert_eq!(flow.as_str().parse::<FlowKind>().unwrap(), flow);
        }
        assert!("launch".parse::<FlowKind>().is_err());
    }

    #[test]
    fn free_tier_is_limited() {
        let free = Entitlement::new(Tier::Free);
        assert!(free.allows(FlowKind::Validate, Mode::Default));
        assert!(!free.allows(FlowKind::Validate, Mode::Roast));
        assert!(free.allows(FlowKind::DomainCheck, Mode::Default));
        assert!(matches!(
            free.check(FlowKind::TechStack, Mode::Default),
            Err(VentureLensError::NotEntitled {
                flow: FlowKind::TechStack,
                tier: Tier::Free
            })
        ));

        let pro = Entitlement::new(Tier::Pro);
        for flow in FlowKind::ALL {
            assert!(pro.allows(flow, Mode::Roast));
        }
    }

    #[test]
    fn citation_format() {
        let result = SearchResult::new("A", "u1", "", 0.0);
        assert_eq!(result.citation(), "A: u1");
    }
}
