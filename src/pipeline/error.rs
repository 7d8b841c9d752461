use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while loading or evaluating a rule
#[derive(Debug, Error)]
pub enum RuleError {
    /// The rule name does not resolve to a stored rule
    #[error("Rule '{name}' not found at {}", .path.display())]
    NotFound { name: String, path: PathBuf },

    /// The rule exists but could not be read
    #[error("Rule '{name}' could not be read: {source}")]
    Unreadable {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// The rule document could not be decoded into a rule
    #[error("Rule '{name}' is malformed: {reason}")]
    MalformedRule { name: String, reason: String },

    /// An expression is not a JSON object (strict policy only)
    #[error("Expression {index} is not a valid pipeline stage ({reason}): {expression}")]
    MalformedExpression {
        index: usize,
        expression: String,
        reason: String,
    },

    /// The target collection does not exist in the data source
    #[error("Collection '{collection}' does not exist")]
    CollectionNotFound { collection: String },

    /// The data source rejected or failed the pipeline
    #[error("Pipeline on collection '{collection}' failed: {source}")]
    Execution {
        collection: String,
        #[source]
        source: SourceError,
    },

    /// The data source could not be reached
    #[error("Unable to connect to data source: {0}")]
    Connect(#[source] SourceError),

    /// Invalid or unreadable connection configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl RuleError {
    /// Create a MalformedRule error
    pub fn malformed_rule(name: impl Into<String>, reason: impl ToString) -> Self {
        Self::MalformedRule {
            name: name.into(),
            reason: reason.to_string(),
        }
    }

    /// Create an Execution error for a collection
    pub fn execution(collection: impl Into<String>, source: SourceError) -> Self {
        Self::Execution {
            collection: collection.into(),
            source,
        }
    }

    /// Create a Config error
    pub fn config(message: impl ToString) -> Self {
        Self::Config(message.to_string())
    }
}

/// Errors raised by a data source driver
#[derive(Debug, Error)]
pub enum SourceError {
    /// Error reported by the MongoDB driver
    #[error(transparent)]
    Driver(#[from] mongodb::error::Error),

    /// A stage or document could not be converted for the driver
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// The stage does not have exactly one operator key
    #[error("Invalid pipeline stage: {0}")]
    InvalidStage(String),

    /// The stage operator is not supported by this source
    #[error("Unsupported pipeline stage '{0}'")]
    UnsupportedStage(String),
}
