/// Pipeline building blocks
///
/// This module contains the error types, the `#userId#` placeholder
/// substitution and the parsing of expressions into pipeline stages.

mod error;
mod placeholder;
mod stage;

pub use error::{RuleError, SourceError};
pub use placeholder::{substitute, USER_ID_TOKEN};
pub use stage::{parse_stage, Document, ExpressionPolicy, ResultSet, Stage};
