//! Abstract document store interface
//!
//! Records are schema-flexible JSON objects grouped in named collections and
//! keyed by an application-assigned string `id` (never the backend's own key).

use async_trait::async_trait;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::Arc;

use crate::constants::UNIQUE_FIELDS;
use crate::error::{LaunchpadError, Result};

/// A stored record
pub type Document = Map<String, Value>;

/// A single condition on a top-level field
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// `field == value`
    Eq(String, Value),
    /// `field` equals one of the values
    In(String, Vec<Value>),
}

impl Condition {
    pub fn matches(&self, document: &Document) -> bool {
        match self {
            Condition::Eq(field, expected) => document.get(field) == Some(expected),
            Condition::In(field, allowed) => document
                .get(field)
                .map_or(false, |value| allowed.contains(value)),
        }
    }
}

/// Conjunction of top-level field conditions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    conditions: Vec<Condition>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a `field == value` condition
    pub fn eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::Eq(field.into(), value.into()));
        self
    }

    /// Adds a `field in values` condition
    pub fn one_of<V: Into<Value>>(
        mut self,
        field: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        self.conditions.push(Condition::In(
            field.into(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn by_id(id: &str) -> Self {
        Self::new().eq("id", id)
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Evaluates the filter against a document
    pub fn matches(&self, document: &Document) -> bool {
        self.conditions.iter().all(|condition| condition.matches(document))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A filtered, sorted, paginated read
#[derive(Debug, Clone, Default)]
pub struct Query {
    pub filter: Filter,
    pub skip: u64,
    pub limit: Option<u64>,
    pub sort: Option<(String, SortOrder)>,
}

impl Query {
    pub fn new(filter: Filter) -> Self {
        Self {
            filter,
            ..Self::default()
        }
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn sort_by(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort = Some((field.into(), order));
        self
    }
}

/// Document storage interface
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Prepare collections (indexes etc.). Called once at startup.
    async fn initialize(&self, _collections: &[&str]) -> Result<()> {
        Ok(())
    }

    /// Insert a new document. Fails with `Conflict` if the id is taken.
    async fn insert(&self, collection: &str, document: Document) -> Result<()>;

    /// Atomically insert unless a document with the same id exists.
    /// Returns true when this call inserted.
    async fn insert_if_absent(&self, collection: &str, document: Document) -> Result<bool>;

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<Document>>;

    async fn find_one(&self, collection: &str, filter: &Filter) -> Result<Option<Document>>;

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    async fn count(&self, collection: &str, filter: &Filter) -> Result<u64>;

    /// Set the given top-level fields. Returns false when no document matched.
    async fn update_by_id(&self, collection: &str, id: &str, fields: Document) -> Result<bool>;

    /// `update_by_id` plus appending `value` to the array at `array_field`,
    /// as one atomic write. Returns false when no document matched.
    async fn update_and_push(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
        array_field: &str,
        value: Value,
    ) -> Result<bool>;

    /// Replace the document with the same id, inserting it if missing
    async fn upsert(&self, collection: &str, document: Document) -> Result<()>;

    /// Returns false when no document matched
    async fn delete_by_id(&self, collection: &str, id: &str) -> Result<bool>;

    /// Health check for the storage backend
    async fn health_check(&self) -> Result<bool>;
}

/// Shared reference to the document store
pub type SharedDocumentStore = Arc<dyn DocumentStore>;

/// Fields of `collection` that must be unique across its documents
pub fn unique_fields(collection: &str) -> impl Iterator<Item = &'static str> + '_ {
    UNIQUE_FIELDS
        .iter()
        .filter(move |(name, _)| *name == collection)
        .map(|(_, field)| *field)
}

/// The application id of a document
pub fn document_id(document: &Document) -> Result<&str> {
    document
        .get("id")
        .and_then(Value::as_str)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| LaunchpadError::StorageError("Document has no string id".to_string()))
}

/// Serialize a typed record into a document
pub fn to_document<T: serde::Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(LaunchpadError::SystemError(format!(
            "Expected an object, got {}",
            other
        ))),
    }
}

/// Deserialize a document into a typed record
pub fn from_document<T: serde::de::DeserializeOwned>(document: Document) -> Result<T> {
    serde_json::from_value(Value::Object(document)).map_err(|e| {
        LaunchpadError::StorageError(format!("Stored document does not match schema: {}", e))
    })
}

/// Ordering used when sorting on a field. Missing and null sort first.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    fn rank(value: Option<&Value>) -> u8 {
        match value {
            None | Some(Value::Null) => 0,
            Some(Value::Bool(_)) => 1,
            Some(Value::Number(_)) => 2,
            Some(Value::String(_)) => 3,
            Some(_) => 4,
        }
    }

    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => {
            // RFC 3339 timestamps vary in fractional digits, so compare them as instants
            match (
                chrono::DateTime::parse_from_rfc3339(x),
                chrono::DateTime::parse_from_rfc3339(y),
            ) {
                (Ok(x), Ok(y)) => x.cmp(&y),
                _ => x.cmp(y),
            }
        }
        _ => rank(a).cmp(&rank(b)),
    }
}
