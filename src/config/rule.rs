use serde::{Deserialize, Serialize};
use validator::Validate;

/// A collection plus the ordered expressions run against it
///
/// Example:
/// ```json
/// {
///   "collection": "orders",
///   "expressions": [
///     "{\"$match\": {\"user\": \"#userId#\"}}",
///     "{\"$limit\": 1}"
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// Target collection name
    #[validate(length(min = 1, message = "collection must not be empty"))]
    pub collection: String,

    /// Pipeline stages as JSON object literals, in execution order
    pub expressions: Vec<String>,
}

/// A rule: a test operation and the two operations it chooses between
///
/// `failed` runs when `test` returns no documents, `success` otherwise.
/// Older rule files name the test section `rule`; both spellings load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    /// Operation whose result decides the branch
    #[serde(alias = "rule")]
    #[validate(nested)]
    pub test: Operation,

    /// Operation run when the test returns documents
    #[validate(nested)]
    pub success: Operation,

    /// Operation run when the test returns nothing
    #[validate(nested)]
    pub failed: Operation,
}
