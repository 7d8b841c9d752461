use std::fmt;

use super::PipelineExecutor;
use crate::config::Rule;
use crate::pipeline::{ResultSet, RuleError};

/// The follow-up operation a rule evaluation ran
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    /// The test returned at least one document
    Success,
    /// The test returned no documents
    Failed,
}

impl fmt::Display for Branch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Branch::Success => write!(f, "success"),
            Branch::Failed => write!(f, "failed"),
        }
    }
}

/// Result of one rule evaluation
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Branch that ran
    pub branch: Branch,
    /// Number of documents the test operation returned
    pub test_matches: usize,
    /// Documents returned by the branch
    pub results: ResultSet,
}

/// Runs a rule's test operation and then exactly one of its branches
pub struct RuleEvaluator<'a> {
    executor: PipelineExecutor<'a>,
}

impl<'a> RuleEvaluator<'a> {
    pub fn new(executor: PipelineExecutor<'a>) -> Self {
        Self { executor }
    }

    /// Evaluate a rule for a user
    ///
    /// An error from the test operation stops the evaluation before either
    /// branch runs. An error from the chosen branch is returned as is; the
    /// other branch is never tried.
    pub fn evaluate(&self, rule: &Rule, user_id: &str) -> Result<Outcome, RuleError> {
        let test = self.executor.execute(&rule.test, user_id)?;

        let (branch, operation) = if test.is_empty() {
            (Branch::Failed, &rule.failed)
        } else {
            (Branch::Success, &rule.success)
        };
        log::info!(
            "Test on '{}' returned {} document(s), running {} branch",
            rule.test.collection,
            test.len(),
            branch
        );

        let results = self.executor.execute(operation, user_id).inspect_err(|e| {
            log::error!("Unable to process {} branch: {}", branch, e);
        })?;

        Ok(Outcome {
            branch,
            test_matches: test.len(),
            results,
        })
    }
}
