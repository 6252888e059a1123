//! Schema-less table store abstraction.
//!
//! Rows are addressed by `(partition_key, row_key)` and carry an open set of
//! loosely typed properties. The store attaches an entity tag to every row it
//! returns; replacing a row with a stale tag fails with
//! [`TableStoreError::Conflict`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::VersionTag;
use crate::domain::ports::define_port_error;

define_port_error! {
    /// Errors raised by table store adapters.
    pub enum TableStoreError {
        /// The store could not be reached.
        Connection { message: String } =>
            "table store connection failed: {message}",
        /// The store rejected or failed the request.
        Query { message: String } =>
            "table store query failed: {message}",
        /// The row's entity tag no longer matches.
        Conflict { table: String, key: String } =>
            "entity tag mismatch on {table} row {key}",
        /// Insert hit an existing row.
        AlreadyExists { table: String, key: String } =>
            "{table} row {key} already exists",
        /// Replace targeted a missing row.
        NotFound { table: String, key: String } =>
            "{table} row {key} not found",
    }
}

/// A loosely typed property value.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    /// Text.
    String(String),
    /// Boolean.
    Bool(bool),
    /// 32-bit integer.
    Int32(i32),
    /// 64-bit integer.
    Int64(i64),
    /// Double-precision float.
    Double(f64),
    /// Exact decimal.
    Decimal(Decimal),
    /// Timestamp.
    DateTime(DateTime<Utc>),
}

impl PropertyValue {
    /// Text value when the property is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value.as_str()),
            _ => None,
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

/// One stored row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntity {
    /// Partition key.
    pub partition_key: String,
    /// Row key, unique within the partition.
    pub row_key: String,
    /// Named properties.
    pub properties: BTreeMap<String, PropertyValue>,
    /// Entity tag attached by the store on read and write.
    pub etag: Option<VersionTag>,
}

impl TableEntity {
    /// Empty row with the given keys.
    pub fn new(partition_key: impl Into<String>, row_key: impl Into<String>) -> Self {
        Self {
            partition_key: partition_key.into(),
            row_key: row_key.into(),
            properties: BTreeMap::new(),
            etag: None,
        }
    }

    /// Attach the entity tag the write must match.
    pub fn with_etag(mut self, etag: Option<VersionTag>) -> Self {
        self.etag = etag;
        self
    }

    /// Property by name.
    pub fn get(&self, name: &str) -> Option<&PropertyValue> {
        self.properties.get(name)
    }

    /// Set a property, replacing any previous value.
    pub fn set(&mut self, name: &str, value: PropertyValue) {
        self.properties.insert(name.to_owned(), value);
    }

    /// Remove a property.
    pub fn remove(&mut self, name: &str) {
        self.properties.remove(name);
    }

    /// `partition/row` label used in errors and logs.
    pub fn key(&self) -> String {
        format!("{}/{}", self.partition_key, self.row_key)
    }
}

/// Filter for [`TableStore::query`].
///
/// Every populated criterion must hold. Without a partition key the query
/// scans every partition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableQuery {
    /// Restrict to one partition.
    pub partition_key: Option<String>,
    /// Restrict to one row key.
    pub row_key: Option<String>,
    /// Property equality filters.
    pub equals: Vec<(String, PropertyValue)>,
}

impl TableQuery {
    /// Every row in `partition_key`.
    pub fn partition(partition_key: impl Into<String>) -> Self {
        Self {
            partition_key: Some(partition_key.into()),
            ..Self::default()
        }
    }

    /// Rows with `row_key` in any partition.
    pub fn row_key(row_key: impl Into<String>) -> Self {
        Self {
            row_key: Some(row_key.into()),
            ..Self::default()
        }
    }

    /// Every row in the table.
    pub fn all() -> Self {
        Self::default()
    }

    /// Add a property equality filter.
    pub fn where_eq(mut self, name: &str, value: impl Into<PropertyValue>) -> Self {
        self.equals.push((name.to_owned(), value.into()));
        self
    }

    /// Whether `entity` satisfies every criterion.
    pub fn matches(&self, entity: &TableEntity) -> bool {
        self.partition_key
            .as_ref()
            .is_none_or(|key| *key == entity.partition_key)
            && self.row_key.as_ref().is_none_or(|key| *key == entity.row_key)
            && self
                .equals
                .iter()
                .all(|(name, value)| entity.get(name) == Some(value))
    }
}

/// Port over a partitioned key/value table service.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableStore: Send + Sync {
    /// Fetch one row.
    async fn get(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<Option<TableEntity>, TableStoreError>;

    /// Rows matching `query`, ordered by partition then row key.
    async fn query(
        &self,
        table: &str,
        query: &TableQuery,
    ) -> Result<Vec<TableEntity>, TableStoreError>;

    /// Insert a new row; fails when the keys are taken.
    async fn insert(&self, table: &str, entity: TableEntity)
    -> Result<TableEntity, TableStoreError>;

    /// Replace an existing row.
    ///
    /// When `entity.etag` is set it must match the stored tag.
    async fn replace(
        &self,
        table: &str,
        entity: TableEntity,
    ) -> Result<TableEntity, TableStoreError>;

    /// Delete a row. Returns `false` when it did not exist.
    async fn delete(
        &self,
        table: &str,
        partition_key: &str,
        row_key: &str,
    ) -> Result<bool, TableStoreError>;
}
