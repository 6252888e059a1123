//! In-process [`TableStore`] with entity-tag concurrency.
//!
//! Used by the preview tool and the integration suites. Rows live in ordered
//! maps so queries return a stable order; every write issues a fresh tag.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

use crate::domain::VersionTag;

use super::store::{TableEntity, TableQuery, TableStore, TableStoreError};

type RowKey = (String, String);
type Table = BTreeMap<RowKey, TableEntity>;

/// Memory-backed table store.
#[derive(Debug, Default)]
pub struct MemoryTableStore {
    tables: RwLock<HashMap<String, Table>>,
    next_tag: AtomicU64,
    failing_writes: Mutex<HashMap<String, TableStoreError>>,
}

impl MemoryTableStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent write to `table` fail with `error` until
    /// [`MemoryTableStore::clear_failures`] is called.
    pub async fn fail_writes(&self, table: &str, error: TableStoreError) {
        self.failing_writes
            .lock()
            .await
            .insert(table.to_owned(), error);
    }

    /// Stop injecting write failures.
    pub async fn clear_failures(&self) {
        self.failing_writes.lock().await.clear();
    }

    /// Number of rows stored in `table`.
    pub async fn row_count(&self, table: &str) -> usize {
        self.tables.read().await.get(table).map_or(0, BTreeMap::len)
    }

    fn issue_tag(&self) -> VersionTag {
        let tag = self.next_tag.fetch_add(1, Ordering::Relaxed) + 1;
        VersionTag::new(format!("W/\"{tag}\""))
    }

    async fn injected_failure(&self, table: &str) -> Result<(), TableStoreError> {
        match self.failing_writes.lock().await.get(table) {
            Some(error) => {
                debug!(table, %error, "injected table write failure");
                Err(error.clone())
            }
            None => Ok(()),
        }
    }
}

fn row_key(entity: &TableEntity) -> RowKey {
    (entity.partition_key.clone(), entity.row_key.clone())
}

#[async_trait]
impl TableStore for MemoryTableStore {
    async fn get(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, TableStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .and_then(|rows| rows.get(&(partition_key.to_owned(), row_key.to_owned())))
            .cloned())
    }

    async fn query(
        &self,
        table: &str,
        query: &TableQuery,
    ) -> Result<Vec<TableEntity>, TableStoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .get(table)
            .map(|rows| {
                rows.values()
                    .filter(|entity| query.matches(entity))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn insert(
        &self,
        table: &str,
        mut entity: TableEntity,
    ) -> Result<TableEntity, TableStoreError> {
        self.injected_failure(table).await?;
        let mut tables = self.tables.write().await;
        let rows = tables.entry(table.to_owned()).or_default();
        let key = row_key(&entity);
        if rows.contains_key(&key) {
            return Err(TableStoreError::already_exists(table, entity.key()));
        }
        entity.etag = Some(self.issue_tag());
        rows.insert(key, entity.clone());
        Ok(entity)
    }

    async fn replace(
        &self,
        table: &str,
        mut entity: TableEntity,
    ) -> Result<TableEntity, TableStoreError> {
        self.injected_failure(table).await?;
        let mut tables = self.tables.write().await;
        let key = row_key(&entity);
        let Some(stored) = tables.get_mut(table).and_then(|rows| rows.get_mut(&key)) else {
            return Err(TableStoreError::not_found(table, entity.key()));
        };
        let stale = entity
            .etag
            .as_ref()
            .is_some_and(|expected| stored.etag.as_ref() != Some(expected));
        if stale {
            return Err(TableStoreError::conflict(table, entity.key()));
        }
        entity.etag = Some(self.issue_tag());
        *stored = entity.clone();
        Ok(entity)
    }

    async fn delete(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<bool, TableStoreError> {
        self.injected_failure(table).await?;
        let mut tables = self.tables.write().await;
        Ok(tables
            .get_mut(table)
            .and_then(|rows| rows.remove(&(partition_key.to_owned(), row_key.to_owned())))
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    const TABLE: &str = "Trips";

    #[fixture]
    fn store() -> MemoryTableStore {
        MemoryTableStore::new()
    }

    fn row(partition: &str, row: &str, name: &str) -> TableEntity {
        let mut entity = TableEntity::new(partition, row);
        entity.set("Name", name.into());
        entity
    }

    #[rstest]
    #[tokio::test]
    async fn insert_issues_tags_and_rejects_duplicates(store: MemoryTableStore) {
        let stored = store
            .insert(TABLE, row("owner", "t1", "Oslo"))
            .await
            .expect("insert succeeds");
        assert!(stored.etag.is_some());

        let err = store
            .insert(TABLE, row("owner", "t1", "Bergen"))
            .await
            .expect_err("duplicate rejected");
        assert!(matches!(err, TableStoreError::AlreadyExists { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_with_stale_tag_conflicts(store: MemoryTableStore) {
        let first = store
            .insert(TABLE, row("owner", "t1", "Oslo"))
            .await
            .expect("insert succeeds");
        let mut edit = first.clone();
        edit.set("Name", "Oslo 2".into());
        let second = store.replace(TABLE, edit).await.expect("fresh tag wins");
        assert_ne!(second.etag, first.etag);

        let err = store
            .replace(TABLE, first)
            .await
            .expect_err("stale tag rejected");
        assert!(matches!(err, TableStoreError::Conflict { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_without_tag_is_unconditional(store: MemoryTableStore) {
        store
            .insert(TABLE, row("owner", "t1", "Oslo"))
            .await
            .expect("insert succeeds");
        let replaced = store
            .replace(TABLE, row("owner", "t1", "Tromsø"))
            .await
            .expect("unconditional replace");
        assert_eq!(replaced.get("Name").and_then(|v| v.as_str()), Some("Tromsø"));
    }

    #[rstest]
    #[tokio::test]
    async fn replace_of_missing_row_is_not_found(store: MemoryTableStore) {
        let err = store
            .replace(TABLE, row("owner", "nope", "Oslo"))
            .await
            .expect_err("missing row");
        assert!(matches!(err, TableStoreError::NotFound { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn queries_span_partitions_by_row_key(store: MemoryTableStore) {
        store.insert(TABLE, row("a", "shared", "A")).await.expect("insert");
        store.insert(TABLE, row("b", "other", "B")).await.expect("insert");

        let found = store
            .query(TABLE, &TableQuery::row_key("shared"))
            .await
            .expect("query");
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].partition_key, "a");
    }

    #[rstest]
    #[tokio::test]
    async fn delete_reports_whether_a_row_was_removed(store: MemoryTableStore) {
        store.insert(TABLE, row("owner", "t1", "Oslo")).await.expect("insert");
        assert!(store.delete(TABLE, "owner", "t1").await.expect("delete"));
        assert!(!store.delete(TABLE, "owner", "t1").await.expect("delete again"));
        assert_eq!(store.row_count(TABLE).await, 0);
    }

    #[rstest]
    #[tokio::test]
    async fn injected_failures_block_writes_only(store: MemoryTableStore) {
        store.insert(TABLE, row("owner", "t1", "Oslo")).await.expect("insert");
        store
            .fail_writes(TABLE, TableStoreError::connection("throttled"))
            .await;

        let err = store
            .insert(TABLE, row("owner", "t2", "Bergen"))
            .await
            .expect_err("write blocked");
        assert!(matches!(err, TableStoreError::Connection { .. }));
        assert!(store.get(TABLE, "owner", "t1").await.expect("read").is_some());

        store.clear_failures().await;
        store
            .insert(TABLE, row("owner", "t2", "Bergen"))
            .await
            .expect("write allowed again");
    }
}
