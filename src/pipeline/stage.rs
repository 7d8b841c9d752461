use serde_json::{Map, Value};

use super::RuleError;

/// A generic document: string keys mapped to arbitrary JSON values
pub type Document = Map<String, Value>;

/// One aggregation pipeline stage, e.g. `{"$match": {...}}`
pub type Stage = Document;

/// Documents returned by one pipeline, in source order
pub type ResultSet = Vec<Document>;

/// What to do with an expression that is not a JSON object
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExpressionPolicy {
    /// Replace the stage with an empty document and keep going
    #[default]
    Lenient,
    /// Fail the operation with `RuleError::MalformedExpression`
    Strict,
}

/// Parse one substituted expression into a pipeline stage
///
/// `index` is the expression's position in its operation and only feeds
/// diagnostics.
pub fn parse_stage(
    index: usize,
    expression: &str,
    policy: ExpressionPolicy,
) -> Result<Stage, RuleError> {
    let reason = match serde_json::from_str::<Value>(expression) {
        Ok(Value::Object(stage)) => return Ok(stage),
        Ok(other) => format!("expected an object, got {}", type_name(&other)),
        Err(e) => e.to_string(),
    };

    match policy {
        ExpressionPolicy::Lenient => {
            log::warn!(
                "Expression {} is not a valid stage ({}), using an empty stage",
                index,
                reason
            );
            Ok(Stage::new())
        }
        ExpressionPolicy::Strict => Err(RuleError::MalformedExpression {
            index,
            expression: expression.to_string(),
            reason,
        }),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_stage_object() {
        let stage = parse_stage(0, r#"{"$match":{"user":"u1"}}"#, ExpressionPolicy::Strict).unwrap();
        assert_eq!(Value::Object(stage), json!({"$match": {"user": "u1"}}));
    }

    #[test]
    fn test_parse_stage_lenient_invalid_json() {
        let stage = parse_stage(2, r#"{"$match":"#, ExpressionPolicy::Lenient).unwrap();
        assert!(stage.is_empty());
    }

    #[test]
    fn test_parse_stage_lenient_non_object() {
        let stage = parse_stage(0, "[1, 2, 3]", ExpressionPolicy::Lenient).unwrap();
        assert!(stage.is_empty());
    }

    #[test]
    fn test_parse_stage_strict_invalid_json() {
        let err = parse_stage(3, "not json", ExpressionPolicy::Strict).unwrap_err();
        match err {
            RuleError::MalformedExpression {
                index, expression, ..
            } => {
                assert_eq!(index, 3);
                assert_eq!(expression, "not json");
            }
            other => panic!("Expected MalformedExpression, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_stage_strict_non_object() {
        let err = parse_stage(0, r#""$limit""#, ExpressionPolicy::Strict).unwrap_err();
        assert!(err.to_string().contains("expected an object, got string"));
    }

    #[test]
    fn test_policy_default_is_lenient() {
        assert_eq!(ExpressionPolicy::default(), ExpressionPolicy::Lenient);
    }
}
