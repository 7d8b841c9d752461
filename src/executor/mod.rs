/// Pipeline executor and rule evaluator
///
/// This module contains the engine that turns an operation's expressions
/// into an aggregation pipeline and the evaluator that branches on the
/// result of a rule's test operation.

mod evaluator;
pub mod traits;

pub use evaluator::{Branch, Outcome, RuleEvaluator};

use crate::config::Operation;
use crate::pipeline::{parse_stage, substitute, ExpressionPolicy, ResultSet, RuleError, Stage};
use traits::PipelineSource;

/// The pipeline executor
///
/// The executor is stateless: every call builds its pipeline from scratch
/// and hands it to the data source.
pub struct PipelineExecutor<'a> {
    /// Data source pipelines are submitted to
    pub source: &'a dyn PipelineSource,
    /// How expressions that are not JSON objects are handled
    pub policy: ExpressionPolicy,
}

impl<'a> PipelineExecutor<'a> {
    /// Create a new executor with the lenient expression policy
    pub fn new(source: &'a dyn PipelineSource) -> Self {
        Self {
            source,
            policy: ExpressionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: ExpressionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Substitute the user id into each expression and parse it as a stage
    ///
    /// The Nth stage is always built from the Nth expression.
    pub fn build_pipeline(
        &self,
        operation: &Operation,
        user_id: &str,
    ) -> Result<Vec<Stage>, RuleError> {
        operation
            .expressions
            .iter()
            .enumerate()
            .map(|(index, expression)| {
                let expression = substitute(expression, user_id);
                log::debug!("[{}] {}", operation.collection, expression);
                parse_stage(index, &expression, self.policy)
            })
            .collect()
    }

    /// Run an operation for a user and return every resulting document
    ///
    /// # Errors
    /// * `MalformedExpression` - strict policy and an expression is not an object
    /// * `CollectionNotFound` - the collection does not exist; nothing is submitted
    /// * `Execution` - the data source failed, with the collection name
    pub fn execute(&self, operation: &Operation, user_id: &str) -> Result<ResultSet, RuleError> {
        let collection = operation.collection.as_str();

        // 1. Build the pipeline stages in expression order
        let stages = self.build_pipeline(operation, user_id)?;

        // 2. Resolve the collection before submitting anything
        let exists = self
            .source
            .has_collection(collection)
            .map_err(|e| RuleError::execution(collection, e))?;
        if !exists {
            return Err(RuleError::CollectionNotFound {
                collection: collection.to_string(),
            });
        }

        // 3. Submit the pipeline
        let results = self
            .source
            .aggregate(collection, &stages)
            .map_err(|e| RuleError::execution(collection, e))?;

        // 4. Return documents in source order
        log::info!(
            "Collection '{}' returned {} document(s)",
            collection,
            results.len()
        );
        log::debug!("[{}] results: {:?}", collection, results);

        Ok(results)
    }
}
