/// In-memory store backend
///
/// Tables live behind a single `tokio::sync::RwLock` and preserve insertion
/// order, which makes continuation keys stable across pages. This backend is
/// both the test double and the reference semantics for the
/// [`KeyValueStore`] contract: every scan really does walk the table record
/// by record, and `conditional_put` holds the write lock across the
/// existence check and the write, so the check-and-write pair is atomic.
use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::debug;

use super::{item_id, Filter, Item, KeyValueStore, ScanPage, ScanRequest, StoreError, Update};

/// In-memory [`KeyValueStore`] implementation
///
/// # Example
///
/// ```
/// use eventhub::db::{to_item, KeyValueStore, MemoryStore, ScanRequest};
/// use serde_json::json;
///
/// # async fn example() -> Result<(), eventhub::db::StoreError> {
/// let store = MemoryStore::new();
/// store
///     .put("events", to_item(&json!({ "id": "e1", "name": "meetup" }))?)
///     .await?;
/// let page = store.scan(ScanRequest::new("events")).await?;
/// assert_eq!(page.items.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<HashMap<String, Vec<Item>>>,
}

impl MemoryStore {
    /// Creates an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records in a table, deleted or not (test helper)
    pub async fn len(&self, table: &str) -> usize {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// True if the table holds no records
    pub async fn is_empty(&self, table: &str) -> bool {
        self.len(table).await == 0
    }

    fn insert_or_replace(rows: &mut Vec<Item>, item: Item, id: &str) {
        match rows.iter_mut().find(|row| item_id(row).ok() == Some(id)) {
            Some(existing) => *existing = item,
            None => rows.push(item),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn put(&self, table: &str, item: Item) -> Result<(), StoreError> {
        let id = item_id(&item)?.to_string();
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        Self::insert_or_replace(rows, item, &id);
        Ok(())
    }

    async fn conditional_put(
        &self,
        table: &str,
        item: Item,
        absent: &Filter,
    ) -> Result<(), StoreError> {
        let id = item_id(&item)?.to_string();
        // Hold the write lock across check and write.
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_string()).or_default();
        if rows.iter().any(|row| absent.matches(row)) {
            debug!(table, condition = %absent, "conditional put rejected");
            return Err(StoreError::ConditionFailed(absent.expression()));
        }
        Self::insert_or_replace(rows, item, &id);
        Ok(())
    }

    async fn scan(&self, request: ScanRequest) -> Result<ScanPage, StoreError> {
        let tables = self.tables.read().await;
        let rows = match tables.get(&request.table) {
            Some(rows) => rows,
            None => return Ok(ScanPage::default()),
        };

        let mut items = Vec::new();
        let mut last_evaluated_key = None;
        // When resuming, skip every record up to and including the
        // continuation key; an unknown key yields an empty final page.
        let mut started = request.start_after.is_none();

        for (index, row) in rows.iter().enumerate() {
            let row_id = item_id(row)?;
            if !started {
                if Some(row_id) == request.start_after.as_deref() {
                    started = true;
                }
                continue;
            }
            if !request.filter.matches(row) {
                continue;
            }
            items.push(row.clone());
            if Some(items.len()) == request.limit {
                if index + 1 < rows.len() {
                    last_evaluated_key = Some(row_id.to_string());
                }
                break;
            }
        }

        debug!(
            table = %request.table,
            matched = items.len(),
            more = last_evaluated_key.is_some(),
            "scan"
        );
        Ok(ScanPage {
            items,
            last_evaluated_key,
        })
    }

    async fn update(&self, table: &str, id: &str, update: Update) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let rows = tables
            .get_mut(table)
            .ok_or_else(|| StoreError::KeyNotFound(id.to_string()))?;
        let row = rows
            .iter_mut()
            .find(|row| item_id(row).ok() == Some(id))
            .ok_or_else(|| StoreError::KeyNotFound(id.to_string()))?;
        update.apply(row);
        Ok(())
    }
}
