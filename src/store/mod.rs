/// Rule storage
///
/// This module resolves rule names to stored rule definitions and
/// decodes them into `Rule` values.

mod file;

pub use file::FileRuleStore;

use validator::Validate;

use crate::config::Rule;
use crate::pipeline::RuleError;

/// Trait for loading rules by name
///
/// Lets the runner be driven by rules kept somewhere other than the
/// filesystem, and keeps tests free of disk access where they want to.
pub trait RuleStore {
    /// Load and decode the named rule
    fn load(&self, name: &str) -> Result<Rule, RuleError>;
}

/// Decode a rule document and check its operations
pub fn parse_rule(name: &str, content: &str) -> Result<Rule, RuleError> {
    let rule: Rule =
        serde_json::from_str(content).map_err(|e| RuleError::malformed_rule(name, e))?;
    rule.validate().map_err(|e| RuleError::malformed_rule(name, e))?;
    Ok(rule)
}
