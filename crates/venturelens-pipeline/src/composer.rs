use crate::query_builder::{search_purposes, YearWindow};
use crate::templates::{template_for, BASE_RULES, CONTEXT_RULE, NO_CONTEXT_FALLBACK, OUTPUT_RULE};
use venturelens_ai::Message;
use venturelens_core::{FlowKind, IdeaText, Mode, SearchResult};

const CONTEXT_HEADER: &str = "REAL-TIME CONTEXT:\n";

/// System and user prompt for one completion call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

impl ComposedPrompt {
    pub fn messages(&self) -> Vec<Message> {
        vec![
            Message::system(self.system.clone()),
            Message::user(self.user.clone()),
        ]
    }

    /// Total prompt size in characters
    pub fn char_len(&self) -> usize {
        self.system.chars().count() + self.user.chars().count()
    }
}

/// Builds the exact instruction text sent to the model. Pure.
#[derive(Debug, Clone, Copy)]
pub struct PromptComposer {
    snippet_chars: usize,
    years: YearWindow,
}

impl Default for PromptComposer {
    fn default() -> Self {
        Self::new(200, YearWindow::default())
    }
}

impl PromptComposer {
    pub fn new(snippet_chars: usize, years: YearWindow) -> Self {
        Self {
            snippet_chars,
            years,
        }
    }

    /// One `- [title](url): snippet` line per result, or the fallback sentence.
    pub fn render_context(&self, results: &[SearchResult]) -> String {
        if results.is_empty() {
            return NO_CONTEXT_FALLBACK.to_string();
        }

        results
            .iter()
            .map(|r| format!("- [{}]({}): {}", r.title, r.url, self.snippet(&r.content)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn snippet(&self, content: &str) -> String {
        let truncated: String = content.chars().take(self.snippet_chars).collect();
        truncated.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn compose(
        &self,
        flow: FlowKind,
        mode: Mode,
        idea: &IdeaText,
        results: &[SearchResult],
    ) -> ComposedPrompt {
        let template = template_for(flow, mode);

        let mut system = String::with_capacity(2048);
        system.push_str(template.role);
        system.push_str(&format!(
            "\nThe current year is {}. Consider the {}-{} window when judging timing and trends.\n\n",
            self.years.current,
            self.years.current,
            self.years.next()
        ));

        let searches = !search_purposes(flow).is_empty();
        if searches {
            system.push_str(CONTEXT_HEADER);
            system.push_str(&self.render_context(results));
            system.push_str("\n\n");
        }

        system.push_str(template.tone);
        system.push_str("\n\n");
        system.push_str(BASE_RULES);
        if searches {
            system.push('\n');
            system.push_str(CONTEXT_RULE);
        }
        system.push('\n');
        system.push_str(OUTPUT_RULE);
        system.push_str("\n\nJSON SCHEMA:\n");
        system.push_str(template.schema);

        let user = format!("{}\n\nIdea: {}", template.task, idea.as_str());

        ComposedPrompt { system, user }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn composer() -> PromptComposer {
        PromptComposer::new(200, YearWindow::new(2031))
    }

    fn idea() -> IdeaText {
        IdeaText::new("A subscription box for left-handed scissors").unwrap()
    }

    fn results() -> Vec<SearchResult> {
        vec![
            SearchResult::new("Report A", "https://a.example", "Alpha insight", 0.9),
            SearchResult::new("Report B", "https://b.example", "Beta insight", 0.7),
        ]
    }

    #[test]
    fn idea_appears_exactly_once() {
        for flow in FlowKind::ALL {
            for mode in [Mode::Default, Mode::Roast] {
                let prompt = composer().compose(flow, mode, &idea(), &results());
                let all = format!("{}\n{}", prompt.system, prompt.user);
                assert_eq!(all.matches(idea().as_str()).count(), 1, "{flow}/{mode}");
            }
        }
    }

    #[test]
    fn context_lists_every_result() {
        let prompt = composer().compose(FlowKind::Validate, Mode::Default, &idea(), &results());
        assert!(prompt.system.contains(CONTEXT_HEADER));
        assert!(prompt.system.contains(CONTEXT_RULE));
        assert!(prompt
            .system
            .contains("- [Report A](https://a.example): Alpha insight\n- [Report B](https://b.example): Beta insight"));
        assert!(!prompt.system.contains(NO_CONTEXT_FALLBACK));
    }

    #[test]
    fn empty_results_use_fallback_sentence() {
        let prompt = composer().compose(FlowKind::Competitors, Mode::Default, &idea(), &[]);
        assert!(prompt
            .system
            .contains(&format!("REAL-TIME CONTEXT:\n{}", NO_CONTEXT_FALLBACK)));
    }

    #[test]
    fn flows_without_search_omit_context() {
        for flow in [
            FlowKind::Roadmap,
            FlowKind::TechStack,
            FlowKind::BrandVibe,
            FlowKind::Roast,
            FlowKind::DomainCheck,
        ] {
            let prompt = composer().compose(flow, Mode::Default, &idea(), &results());
            assert!(!prompt.system.contains("REAL-TIME CONTEXT"), "{flow}");
            assert!(!prompt.system.contains(NO_CONTEXT_FALLBACK), "{flow}");
            assert!(!prompt.system.contains("Report A"), "{flow}");
            assert!(prompt.system.contains(OUTPUT_RULE), "{flow}");
        }
    }

    #[test]
    fn snippets_truncate_on_char_boundaries() {
        let composer = PromptComposer::new(5, YearWindow::new(2031));
        let rendered = composer.render_context(&[SearchResult::new("T", "u", "héllo wörld", 0.1)]);
        assert_eq!(rendered, "- [T](u): héllo");
    }

    #[test]
    fn roast_mode_swaps_tone_and_schema() {
        let default = composer().compose(FlowKind::Validate, Mode::Default, &idea(), &[]);
        let roast = composer().compose(FlowKind::Validate, Mode::Roast, &idea(), &[]);

        assert!(!default.system.contains("\"burns\""));
        assert!(roast.system.contains("\"roast\": {"));
        assert!(roast.system.contains("\"burns\": string[]"));
        assert!(roast.system.contains("sarcastic"));
        assert!(!default.system.contains("sarcastic"));
    }

    #[test]
    fn year_window_is_quoted() {
        let prompt = composer().compose(FlowKind::MarketSize, Mode::Default, &idea(), &[]);
        assert!(prompt.system.contains("2031-2032"));
    }

    #[test]
    fn messages_are_system_then_user() {
        let prompt = composer().compose(FlowKind::Roast, Mode::Default, &idea(), &[]);
        let messages = prompt.messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].content, prompt.system);
        assert_eq!(messages[1].content, prompt.user);
    }
}
