//! Document store boundary for Kuuburi.
//!
//! The hosted database is an external collaborator; this crate defines the
//! operations the application relies on (list-all, equality queries, insert,
//! merge-upsert, delete, and atomic array membership updates) plus an
//! in-memory reference backend used for local development and tests.

pub mod error;
pub mod memory;
pub mod schema;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use schema::{CollectionSchema, FieldKind, SchemaSet};

use async_trait::async_trait;
use serde_json::Value;

/// A record as returned from the store: the store-assigned id plus the
/// document's field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub fields: Value,
}

/// Operations against a schemaless remote document database.
///
/// `array_union` and `array_remove` are atomic server-side membership
/// updates on an array-valued field; they never duplicate an element and
/// never fail on removing an absent one.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document in the collection, in id order.
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError>;

    /// Documents whose `field` equals `value`.
    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError>;

    /// Append a document; the store assigns and returns the id.
    async fn insert(&self, collection: &str, fields: Value) -> Result<String, StoreError>;

    /// Merge top-level fields into the document, creating it if missing.
    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    /// Remove a document. Deleting a missing document is not an error.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;

    /// Add `element` to the array field unless already present.
    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: &str,
    ) -> Result<(), StoreError>;

    /// Remove `element` from the array field if present.
    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: &str,
    ) -> Result<(), StoreError>;
}
