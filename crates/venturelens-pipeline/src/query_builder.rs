use chrono::Datelike;
use venturelens_core::{FlowKind, IdeaText};

/// What a search query is meant to surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SearchPurpose {
    IndustryNews,
    Competitors,
    MarketSize,
}

impl SearchPurpose {
    pub fn suffix(&self) -> &'static str {
        match self {
            SearchPurpose::IndustryNews => "industry news trends",
            SearchPurpose::Competitors => "competitors alternatives market share",
            SearchPurpose::MarketSize => "market size TAM SAM SOM growth rate",
        }
    }
}

/// The two-year window appended to every query and quoted in prompts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearWindow {
    pub current: i32,
}

impl YearWindow {
    pub fn new(current: i32) -> Self {
        Self { current }
    }

    /// Window starting at the current UTC year
    pub fn from_clock() -> Self {
        Self::new(chrono::Utc::now().year())
    }

    pub fn next(&self) -> i32 {
        self.current + 1
    }
}

impl Default for YearWindow {
    fn default() -> Self {
        Self::from_clock()
    }
}

/// Candidate search purposes for a flow, primary first. Flows that do not
/// search return an empty slice.
pub fn search_purposes(flow: FlowKind) -> &'static [SearchPurpose] {
    match flow {
        FlowKind::Validate => &[
            SearchPurpose::IndustryNews,
            SearchPurpose::Competitors,
            SearchPurpose::MarketSize,
        ],
        FlowKind::Pivot => &[SearchPurpose::IndustryNews],
        FlowKind::Competitors => &[SearchPurpose::Competitors],
        FlowKind::MarketSize => &[SearchPurpose::MarketSize],
        FlowKind::Roadmap
        | FlowKind::Roast
        | FlowKind::BrandVibe
        | FlowKind::TechStack
        | FlowKind::DomainCheck => &[],
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct QueryBuilder {
    years: YearWindow,
}

impl QueryBuilder {
    pub fn new(years: YearWindow) -> Self {
        Self { years }
    }

    pub fn years(&self) -> YearWindow {
        self.years
    }

    /// `"<idea> <suffix> <year> <year+1>"`
    pub fn build(&self, idea: &IdeaText, purpose: SearchPurpose) -> String {
        format!(
            "{} {} {} {}",
            idea.as_str(),
            purpose.suffix(),
            self.years.current,
            self.years.next()
        )
    }

    pub fn queries_for(&self, idea: &IdeaText, purposes: &[SearchPurpose]) -> Vec<String> {
        purposes
            .iter()
            .map(|purpose| self.build(idea, *purpose))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn idea() -> IdeaText {
        IdeaText::new("AI meal planner").unwrap()
    }

    #[test]
    fn query_appends_suffix_and_year_window() {
        let builder = QueryBuilder::new(YearWindow::new(2030));
        assert_eq!(
            builder.build(&idea(), SearchPurpose::Competitors),
            "AI meal planner competitors alternatives market share 2030 2031"
        );
    }

    #[test]
    fn validate_has_three_candidates_in_order() {
        let builder = QueryBuilder::new(YearWindow::new(2025));
        let queries = builder.queries_for(&idea(), search_purposes(FlowKind::Validate));
        assert_eq!(
            queries,
            vec![
                "AI meal planner industry news trends 2025 2026",
                "AI meal planner competitors alternatives market share 2025 2026",
                "AI meal planner market size TAM SAM SOM growth rate 2025 2026",
            ]
        );
    }

    #[test]
    fn generative_flows_do_not_search() {
        for flow in [
            FlowKind::Roadmap,
            FlowKind::Roast,
            FlowKind::BrandVibe,
            FlowKind::TechStack,
            FlowKind::DomainCheck,
        ] {
            assert!(search_purposes(flow).is_empty(), "{flow} should not search");
        }
    }

    #[test]
    fn clock_window_is_consecutive() {
        let years = YearWindow::from_clock();
        assert!(years.current >= 2024);
        assert_eq!(years.next(), years.current + 1);
    }
}
