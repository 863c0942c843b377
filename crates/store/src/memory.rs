//! In-memory backend for local development and tests.
//!
//! Ids are UUIDv7, so id order doubles as insertion order. All shared state
//! lives behind one `RwLock`; this backend serves a single client instance
//! and makes no cross-client guarantee, matching the hosted store's
//! last-write-wins behavior.

use std::collections::{BTreeMap, HashMap};

use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::StoreError;
use crate::schema::SchemaSet;
use crate::{Document, DocumentStore};

type Collection = BTreeMap<String, Map<String, Value>>;

pub struct MemoryStore {
    schemas: SchemaSet,
    collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryStore {
    pub fn new(schemas: SchemaSet) -> Self {
        Self {
            schemas,
            collections: RwLock::new(HashMap::new()),
        }
    }

    /// A store that accepts any document shape.
    pub fn unvalidated() -> Self {
        Self::new(SchemaSet::default())
    }

    fn validate_insert(&self, collection: &str, fields: &Map<String, Value>) -> Result<(), StoreError> {
        match self.schemas.get(collection) {
            Some(schema) => schema.validate_insert(fields),
            None => Ok(()),
        }
    }

    fn validate_patch(&self, collection: &str, patch: &Map<String, Value>) -> Result<(), StoreError> {
        match self.schemas.get(collection) {
            Some(schema) => schema.validate_patch(patch),
            None => Ok(()),
        }
    }
}

fn as_object(fields: Value) -> Result<Map<String, Value>, StoreError> {
    match fields {
        Value::Object(map) => Ok(map),
        _ => Err(StoreError::NotAnObject),
    }
}

fn not_found(collection: &str, id: &str) -> StoreError {
    StoreError::NotFound {
        collection: collection.to_string(),
        id: id.to_string(),
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn list_all(&self, collection: &str) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().await;
        let documents = collections
            .get(collection)
            .map(|docs| {
                docs.iter()
                    .map(|(id, fields)| Document {
                        id: id.clone(),
                        fields: Value::Object(fields.clone()),
                    })
                    .collect()
            })
            .unwrap_or_default();
        Ok(documents)
    }

    async fn query_by_field(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, StoreError> {
        let all = self.list_all(collection).await?;
        Ok(all
            .into_iter()
            .filter(|doc| doc.fields.get(field) == Some(value))
            .collect())
    }

    async fn insert(&self, collection: &str, fields: Value) -> Result<String, StoreError> {
        let fields = as_object(fields)?;
        self.validate_insert(collection, &fields)?;

        let id = Uuid::now_v7().to_string();
        let mut collections = self.collections.write().await;
        collections
            .entry(collection.to_string())
            .or_default()
            .insert(id.clone(), fields);
        tracing::debug!(collection, id = %id, "document inserted");
        Ok(id)
    }

    async fn merge(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let patch = as_object(patch)?;
        self.validate_patch(collection, &patch)?;

        let mut collections = self.collections.write().await;
        let document = collections
            .entry(collection.to_string())
            .or_default()
            .entry(id.to_string())
            .or_default();
        for (name, value) in patch {
            document.insert(name, value);
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        if let Some(docs) = collections.get_mut(collection) {
            docs.remove(id);
        }
        Ok(())
    }

    async fn array_union(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: &str,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;

        let entry = document
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        let items = entry.as_array_mut().ok_or_else(|| StoreError::NotAnArray {
            field: field.to_string(),
        })?;
        if !items.iter().any(|item| item.as_str() == Some(element)) {
            items.push(Value::String(element.to_string()));
        }
        Ok(())
    }

    async fn array_remove(
        &self,
        collection: &str,
        id: &str,
        field: &str,
        element: &str,
    ) -> Result<(), StoreError> {
        let mut collections = self.collections.write().await;
        let document = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or_else(|| not_found(collection, id))?;

        match document.get_mut(field) {
            Some(Value::Array(items)) => {
                items.retain(|item| item.as_str() != Some(element));
                Ok(())
            }
            Some(_) => Err(StoreError::NotAnArray {
                field: field.to_string(),
            }),
            // Absent field reads as an empty array.
            None => Ok(()),
        }
    }
}
