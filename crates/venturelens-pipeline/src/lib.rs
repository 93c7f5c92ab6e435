pub mod composer;
pub mod enricher;
pub mod executor;
pub mod flows;
pub mod policy;
pub mod query_builder;
pub mod sanitizer;
pub mod schemas;
mod templates;

#[cfg(test)]
mod test_support;

pub use composer::{ComposedPrompt, PromptComposer};
pub use enricher::enrich_sources;
pub use executor::{cancellable, FlowOutcome, FlowRequest, PipelineExecutor};
pub use flows::IdeaPipeline;
pub use policy::FailurePolicy;
pub use query_builder::{search_purposes, QueryBuilder, SearchPurpose, YearWindow};
pub use sanitizer::{parse_report, strip_fences, EmptyCheck};
pub use schemas::*;
