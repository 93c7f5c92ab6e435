use crate::schemas::ValidationReport;
use venturelens_core::SearchResult;

/// Backfill `sources` from the search results when the model left it empty.
///
/// Returns true when the report was changed. A non-empty `sources` list is
/// never touched.
pub fn enrich_sources(report: &mut ValidationReport, results: &[SearchResult], cap: usize) -> bool {
    if !report.sources.is_empty() || results.is_empty() {
        return false;
    }

    report.sources = results.iter().take(cap).map(SearchResult::citation).collect();
    tracing::debug!(count = report.sources.len(), "Backfilled report sources from search");
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Map;

    fn report(sources: Vec<String>) -> ValidationReport {
        ValidationReport {
            viability_score: 50.0,
            verdict: "Maybe".to_string(),
            summary: "Needs work.".to_string(),
            strengths: vec![],
            risks: vec![],
            competitors: vec![],
            target_audience: String::new(),
            monetization: vec![],
            next_steps: vec![],
            sources,
            roast: None,
            extra: Map::new(),
        }
    }

    fn results(n: usize) -> Vec<SearchResult> {
        ["A", "B", "C", "D"]
            .iter()
            .enumerate()
            .take(n)
            .map(|(i, title)| SearchResult::new(*title, format!("u{}", i + 1), "", 0.5))
            .collect()
    }

    #[test]
    fn fills_empty_sources_in_order_capped() {
        let mut r = report(vec![]);
        assert!(enrich_sources(&mut r, &results(4), 3));
        assert_eq!(r.sources, vec!["A: u1", "B: u2", "C: u3"]);
    }

    #[test]
    fn existing_sources_are_left_alone() {
        let mut r = report(vec!["Model cited: x".to_string()]);
        assert!(!enrich_sources(&mut r, &results(3), 3));
        assert_eq!(r.sources, vec!["Model cited: x"]);
    }

    #[test]
    fn no_results_no_change() {
        let mut r = report(vec![]);
        assert!(!enrich_sources(&mut r, &[], 3));
        assert!(r.sources.is_empty());
    }

    #[test]
    fn only_sources_changes() {
        let mut r = report(vec![]);
        let before = r.clone();
        enrich_sources(&mut r, &results(1), 3);
        r.sources.clear();
        assert_eq!(r, before);
    }
}
