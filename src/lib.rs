/// actionable - Rule-driven aggregation runner
///
/// This library loads declarative rules (a test pipeline plus success and
/// failed pipelines), runs the test against a document database and then
/// runs whichever follow-up pipeline its result selects.

pub mod config;
pub mod executor;
pub mod mongo;
pub mod pipeline;
pub mod runner;
pub mod store;

// Re-export commonly used types
pub use config::{ConnectionConfig, Operation, Rule};
pub use executor::{Branch, Outcome, PipelineExecutor, RuleEvaluator};
pub use pipeline::{ExpressionPolicy, RuleError, SourceError};
pub use runner::{run, run_with_source};
pub use store::{FileRuleStore, RuleStore};
