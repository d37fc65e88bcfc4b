/// Key-value store abstraction
///
/// This module defines the persistence seam of the crate: a schemaless table
/// store addressed through [`KeyValueStore`]. Records are JSON objects
/// ([`Item`]) keyed by their `id` attribute; reads are predicate-filtered
/// scans rather than indexed lookups, so correctness never depends on an
/// index existing. A backend is free to execute a filter via an index, but
/// the reference semantics are record-by-record evaluation.
///
/// # Operations
///
/// - [`KeyValueStore::put`]: unconditional write keyed by the item's `id`
/// - [`KeyValueStore::conditional_put`]: atomic "write unless a matching
///   record exists" — the uniqueness primitive used by the repositories
/// - [`KeyValueStore::scan`]: filtered full scan with optional limit and
///   continuation key
/// - [`KeyValueStore::update`]: `SET`-style partial update of one record
///
/// # Example
///
/// ```
/// use eventhub::db::{Filter, KeyValueStore, MemoryStore, ScanRequest};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), eventhub::db::StoreError> {
/// let store = MemoryStore::new();
/// let item = eventhub::db::to_item(&json!({ "id": "u1", "name": "Ada" }))?;
/// store.put("users", item).await?;
///
/// let page = store
///     .scan(ScanRequest::new("users").with_filter(Filter::new().eq("name", "Ada")))
///     .await?;
/// assert_eq!(page.items.len(), 1);
/// # Ok(())
/// # }
/// ```
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

pub mod expression;
pub mod memory;

pub use expression::{Condition, Filter, Update};
pub use memory::MemoryStore;

/// A stored record: a JSON object keyed by its `id` attribute
pub type Item = serde_json::Map<String, Value>;

/// Error type for store operations
///
/// Store errors propagate to callers unmodified — no retry, no backoff.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A conditional write found a record matching the guard predicate
    #[error("conditional write failed: a record matching \"{0}\" exists")]
    ConditionFailed(String),

    /// An update targeted a record that does not exist
    #[error("no record with id \"{0}\"")]
    KeyNotFound(String),

    /// A record could not be encoded to or decoded from its stored form
    #[error("malformed record: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The item is missing its `id` attribute or it is not a string
    #[error("item has no usable id attribute")]
    MissingId,

    /// The backend itself failed
    #[error("store backend error: {0}")]
    Backend(String),
}

/// Encodes a serializable value into a store [`Item`]
///
/// # Errors
///
/// Returns [`StoreError::Serialization`] if the value does not serialize to a
/// JSON object.
pub fn to_item<T: Serialize>(value: &T) -> Result<Item, StoreError> {
    match serde_json::to_value(value)? {
        Value::Object(map) => Ok(map),
        other => Err(StoreError::Serialization(serde::ser::Error::custom(
            format!("expected a JSON object, got {other}"),
        ))),
    }
}

/// Decodes a store [`Item`] into a typed value
pub fn from_item<T: DeserializeOwned>(item: Item) -> Result<T, StoreError> {
    Ok(serde_json::from_value(Value::Object(item))?)
}

/// Extracts the string `id` attribute of an item
pub fn item_id(item: &Item) -> Result<&str, StoreError> {
    item.get("id")
        .and_then(Value::as_str)
        .ok_or(StoreError::MissingId)
}

/// A filtered scan request
///
/// `limit` bounds the number of *matching* items returned, not the number of
/// records inspected; `start_after` is the exclusive continuation key from a
/// previous page's [`ScanPage::last_evaluated_key`].
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Table to scan
    pub table: String,

    /// Conjunctive filter; an empty filter matches every record
    pub filter: Filter,

    /// Maximum number of matching items to return (None = no bound)
    pub limit: Option<usize>,

    /// Exclusive continuation key from the previous page
    pub start_after: Option<String>,
}

impl ScanRequest {
    /// Creates an unfiltered, unbounded scan of `table`
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            filter: Filter::new(),
            limit: None,
            start_after: None,
        }
    }

    /// Sets the filter
    pub fn with_filter(mut self, filter: Filter) -> Self {
        self.filter = filter;
        self
    }

    /// Bounds the number of matching items returned
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Resumes after the given continuation key
    pub fn with_start_after(mut self, key: Option<String>) -> Self {
        self.start_after = key;
        self
    }
}

/// One page of scan results
#[derive(Debug, Clone, Default)]
pub struct ScanPage {
    /// Matching items, in the table's stable iteration order
    pub items: Vec<Item>,

    /// Continuation key, present iff the scan stopped before exhausting the
    /// table
    pub last_evaluated_key: Option<String>,
}

/// The store client seam
///
/// A single shared handle (`Arc<dyn KeyValueStore>`) is reused across all
/// concurrent callers; every call is a self-contained read or write with no
/// client-side state retained between calls. Inject the handle into each
/// repository at construction — there is no process-global client.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Writes an item, replacing any existing record with the same `id`
    async fn put(&self, table: &str, item: Item) -> Result<(), StoreError>;

    /// Writes an item only if no record in `table` matches `absent`
    ///
    /// The existence check and the write execute as one atomic operation
    /// against the backend; two concurrent calls with the same guard cannot
    /// both succeed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::ConditionFailed`] if a matching record exists.
    async fn conditional_put(
        &self,
        table: &str,
        item: Item,
        absent: &Filter,
    ) -> Result<(), StoreError>;

    /// Scans `table`, evaluating the filter record by record
    async fn scan(&self, request: ScanRequest) -> Result<ScanPage, StoreError>;

    /// Applies `SET`-style assignments to the record with the given `id`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::KeyNotFound`] if no such record exists.
    async fn update(&self, table: &str, id: &str, update: Update) -> Result<(), StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_item_requires_object() {
        assert!(to_item(&json!({ "id": "a" })).is_ok());
        assert!(to_item(&json!([1, 2, 3])).is_err());
        assert!(to_item(&json!("scalar")).is_err());
    }

    #[test]
    fn test_item_id() {
        let item = to_item(&json!({ "id": "r1", "name": "x" })).unwrap();
        assert_eq!(item_id(&item).unwrap(), "r1");

        let missing = to_item(&json!({ "name": "x" })).unwrap();
        assert!(matches!(item_id(&missing), Err(StoreError::MissingId)));

        let non_string = to_item(&json!({ "id": 7 })).unwrap();
        assert!(matches!(item_id(&non_string), Err(StoreError::MissingId)));
    }
}
