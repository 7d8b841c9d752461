use crate::config::{ConnectionConfig, Rule};
use crate::executor::traits::PipelineSource;
use crate::executor::{Outcome, PipelineExecutor, RuleEvaluator};
use crate::mongo::MongoSource;
use crate::pipeline::{ExpressionPolicy, RuleError};
use crate::store::RuleStore;

/// Load a rule, connect to MongoDB and evaluate the rule for a user
///
/// The rule is loaded before connecting so a missing or malformed rule
/// costs no network round trip. The connection is dropped on return,
/// including when evaluation fails.
pub fn run(
    config: &ConnectionConfig,
    store: &dyn RuleStore,
    rule_name: &str,
    user_id: &str,
    policy: ExpressionPolicy,
) -> Result<Outcome, RuleError> {
    let rule = store.load(rule_name)?;
    let source = MongoSource::connect(config)?;

    evaluate_with(&source, &rule, rule_name, user_id, policy)
}

/// Load a rule and evaluate it against an already open data source
pub fn run_with_source(
    source: &dyn PipelineSource,
    store: &dyn RuleStore,
    rule_name: &str,
    user_id: &str,
    policy: ExpressionPolicy,
) -> Result<Outcome, RuleError> {
    let rule = store.load(rule_name)?;
    evaluate_with(source, &rule, rule_name, user_id, policy)
}

fn evaluate_with(
    source: &dyn PipelineSource,
    rule: &Rule,
    rule_name: &str,
    user_id: &str,
    policy: ExpressionPolicy,
) -> Result<Outcome, RuleError> {
    log::info!("Running rule '{}' for user '{}'", rule_name, user_id);

    let executor = PipelineExecutor::new(source).with_policy(policy);
    RuleEvaluator::new(executor).evaluate(rule, user_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Operation, Rule};
    use crate::executor::traits::MemorySource;
    use crate::executor::Branch;
    use serde_json::json;
    use std::collections::HashMap;

    /// Rules held in memory, keyed by name
    struct MapStore(HashMap<String, Rule>);

    impl RuleStore for MapStore {
        fn load(&self, name: &str) -> Result<Rule, RuleError> {
            self.0.get(name).cloned().ok_or_else(|| RuleError::NotFound {
                name: name.to_string(),
                path: name.into(),
            })
        }
    }

    fn store() -> MapStore {
        let op = |collection: &str, expressions: &[&str]| Operation {
            collection: collection.to_string(),
            expressions: expressions.iter().map(|e| e.to_string()).collect(),
        };

        let rule = Rule {
            test: op("orders", &[r##"{"$match":{"user":"#userId#"}}"##]),
            success: op("advice", &[r#"{"$match":{"type":"upsell"}}"#]),
            failed: op("advice", &[r#"{"$match":{"type":"welcome"}}"#]),
        };
        MapStore(HashMap::from([("advice".to_string(), rule)]))
    }

    #[test]
    fn test_run_with_source() {
        let source = MemorySource::new()
            .with_collection("orders", vec![json!({"user": "u1"})])
            .with_collection(
                "advice",
                vec![
                    json!({"type": "upsell", "text": "Try premium"}),
                    json!({"type": "welcome", "text": "Welcome!"}),
                ],
            );

        let outcome =
            run_with_source(&source, &store(), "advice", "u1", ExpressionPolicy::Lenient).unwrap();
        assert_eq!(outcome.branch, Branch::Success);
        assert_eq!(outcome.results[0]["text"], json!("Try premium"));
    }

    #[test]
    fn test_run_with_source_unknown_rule() {
        let source = MemorySource::new();

        let err = run_with_source(&source, &store(), "missing", "u1", ExpressionPolicy::Lenient)
            .unwrap_err();
        assert!(matches!(err, RuleError::NotFound { .. }));
        assert!(source.submissions().is_empty());
    }

    #[test]
    fn test_run_fails_on_rule_before_connecting() {
        // An unroutable config would hang on connect; the missing rule must fail first
        let config = ConnectionConfig::new("192.0.2.1:27017", "goinggo");

        let err = run(&config, &store(), "missing", "u1", ExpressionPolicy::Lenient).unwrap_err();
        assert!(matches!(err, RuleError::NotFound { .. }));
    }

    #[test]
    fn test_run_rejects_invalid_config() {
        let mut config = ConnectionConfig::new("localhost:27017", "goinggo");
        config.target_database = String::new();

        let err = run(&config, &store(), "advice", "u1", ExpressionPolicy::Lenient).unwrap_err();
        assert!(matches!(err, RuleError::Config(_)));
    }
}
