use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::pipeline::{Document, ResultSet, SourceError, Stage};

/// Trait for running aggregation pipelines
///
/// This trait allows the executor to be decoupled from any specific
/// database driver. Implementations can be mocked for testing or
/// swapped for different database backends.
pub trait PipelineSource: Send + Sync {
    /// Whether a collection with this name exists
    fn has_collection(&self, collection: &str) -> Result<bool, SourceError>;

    /// Run the stages, in order, as one pipeline and return every document
    fn aggregate(&self, collection: &str, stages: &[Stage]) -> Result<ResultSet, SourceError>;
}

// Mock implementations for testing

/// A pipeline submitted to a `MemorySource`
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub collection: String,
    pub stages: Vec<Stage>,
}

/// In-memory pipeline source for testing
///
/// This is a small document store that supports:
/// - `$match` with top-level equality (implicit AND, null matches missing)
/// - `$sort` on the first key, `1` ascending or `-1` descending
/// - `$skip` and `$limit`
/// - `$project` with inclusion fields (`_id` kept unless excluded)
/// - `$count`
///
/// Every submitted pipeline is recorded, in order, whether or not it ran.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    /// Collection name -> documents
    collections: Arc<Mutex<HashMap<String, Vec<Document>>>>,
    /// Pipelines in submission order
    submissions: Arc<Mutex<Vec<Submission>>>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a collection with initial documents
    ///
    /// Values that are not JSON objects are skipped.
    pub fn with_collection(self, name: &str, documents: Vec<Value>) -> Self {
        let documents = documents
            .into_iter()
            .filter_map(|doc| match doc {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();

        self.collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(name.to_string(), documents);
        self
    }

    /// Every pipeline submitted so far
    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Collections that received a pipeline, in submission order
    pub fn submitted_collections(&self) -> Vec<String> {
        self.submissions()
            .into_iter()
            .map(|s| s.collection)
            .collect()
    }

    /// Helper: Split a stage into its single operator and argument
    fn operator(stage: &Stage) -> Result<(&str, &Value), SourceError> {
        let mut entries = stage.iter();
        match (entries.next(), entries.next()) {
            (Some((name, arg)), None) => Ok((name.as_str(), arg)),
            _ => Err(SourceError::InvalidStage(format!(
                "a stage must have exactly one field, got {}",
                stage.len()
            ))),
        }
    }

    /// Helper: Check if a document matches a simple equality filter
    fn matches_filter(doc: &Document, filter: &Document) -> bool {
        filter.iter().all(|(key, expected)| match (doc.get(key), expected) {
            (Some(actual), expected) => actual == expected,
            (None, Value::Null) => true,
            _ => false,
        })
    }

    /// Helper: Compare two optional values for sorting
    fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
        match (a, b) {
            (Some(Value::Number(a)), Some(Value::Number(b))) => match (a.as_f64(), b.as_f64()) {
                (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
                _ => Ordering::Equal,
            },
            (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
            (Some(_), None) => Ordering::Greater,
            (None, Some(_)) => Ordering::Less,
            _ => Ordering::Equal,
        }
    }

    fn is_truthy(value: &Value) -> bool {
        match value {
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
            _ => false,
        }
    }

    fn as_count(name: &str, arg: &Value) -> Result<usize, SourceError> {
        arg.as_u64()
            .map(|n| n as usize)
            .ok_or_else(|| SourceError::InvalidStage(format!("{} expects a non-negative integer", name)))
    }

    fn as_object<'v>(name: &str, arg: &'v Value) -> Result<&'v Document, SourceError> {
        arg.as_object()
            .ok_or_else(|| SourceError::InvalidStage(format!("{} expects an object", name)))
    }

    /// Helper: Apply one stage to the current documents
    fn apply(docs: Vec<Document>, stage: &Stage) -> Result<Vec<Document>, SourceError> {
        let (name, arg) = Self::operator(stage)?;

        match name {
            "$match" => {
                let filter = Self::as_object(name, arg)?;
                Ok(docs
                    .into_iter()
                    .filter(|doc| Self::matches_filter(doc, filter))
                    .collect())
            }

            "$sort" => {
                let spec = Self::as_object(name, arg)?;
                let mut docs = docs;
                // Only the first sort key is honoured
                if let Some((field, order)) = spec.iter().next() {
                    let descending = order.as_i64() == Some(-1);
                    docs.sort_by(|a, b| {
                        let cmp = Self::compare(a.get(field), b.get(field));
                        if descending { cmp.reverse() } else { cmp }
                    });
                }
                Ok(docs)
            }

            "$skip" => {
                let n = Self::as_count(name, arg)?;
                Ok(docs.into_iter().skip(n).collect())
            }

            "$limit" => {
                let n = Self::as_count(name, arg)?;
                Ok(docs.into_iter().take(n).collect())
            }

            "$project" => {
                let spec = Self::as_object(name, arg)?;
                let keep_id = spec.get("_id").is_none_or(Self::is_truthy);
                Ok(docs
                    .into_iter()
                    .map(|doc| {
                        doc.into_iter()
                            .filter(|(key, _)| {
                                if key == "_id" {
                                    keep_id
                                } else {
                                    spec.get(key).is_some_and(Self::is_truthy)
                                }
                            })
                            .collect()
                    })
                    .collect())
            }

            "$count" => {
                let field = arg
                    .as_str()
                    .ok_or_else(|| SourceError::InvalidStage("$count expects a field name".into()))?;
                if docs.is_empty() {
                    return Ok(vec![]);
                }
                let mut counted = Document::new();
                counted.insert(field.to_string(), Value::from(docs.len()));
                Ok(vec![counted])
            }

            other => Err(SourceError::UnsupportedStage(other.to_string())),
        }
    }
}

impl PipelineSource for MemorySource {
    fn has_collection(&self, collection: &str) -> Result<bool, SourceError> {
        let collections = self.collections.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(collections.contains_key(collection))
    }

    fn aggregate(&self, collection: &str, stages: &[Stage]) -> Result<ResultSet, SourceError> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Submission {
                collection: collection.to_string(),
                stages: stages.to_vec(),
            });

        // Unknown collections aggregate to nothing, as in MongoDB
        let docs = self
            .collections
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(collection)
            .cloned()
            .unwrap_or_default();

        stages.iter().try_fold(docs, Self::apply)
    }
}
