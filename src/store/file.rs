use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{parse_rule, RuleStore};
use crate::config::Rule;
use crate::pipeline::RuleError;

/// Loads rules from `<root>/<name>.json`
#[derive(Debug, Clone)]
pub struct FileRuleStore {
    root: PathBuf,
}

impl FileRuleStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a rule name resolves to
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.root.join(format!("{}.json", name))
    }

    /// A name is a plain file stem: not empty, not hidden, no separators or NUL
    fn is_valid_name(name: &str) -> bool {
        !name.is_empty() && !name.starts_with('.') && !name.contains(['/', '\\', '\0'])
    }
}

impl RuleStore for FileRuleStore {
    fn load(&self, name: &str) -> Result<Rule, RuleError> {
        let path = self.path_for(name);
        if !Self::is_valid_name(name) {
            return Err(RuleError::NotFound {
                name: name.to_string(),
                path,
            });
        }

        log::debug!("Loading rule '{}' from {}", name, path.display());

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(RuleError::NotFound {
                    name: name.to_string(),
                    path,
                });
            }
            Err(e) => {
                return Err(RuleError::Unreadable {
                    name: name.to_string(),
                    source: e,
                });
            }
        };

        parse_rule(name, &content)
    }
}
