//! Collection schemas validated at the store boundary.
//!
//! The remote database itself is schemaless; modules declare the shape of
//! the collections they own and every insert or merge is checked against
//! that shape before it is applied.

use std::collections::HashMap;

use serde_json::{Map, Value};

use crate::error::StoreError;

/// Accepted value shapes for a document field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldKind {
    Text,
    /// A float, optionally range-limited (inclusive on both ends).
    Number { min: Option<f64>, max: Option<f64> },
    /// An array of strings, e.g. a list of document ids.
    TextArray,
}

impl FieldKind {
    fn accepts(&self, value: &Value) -> Result<(), String> {
        match self {
            FieldKind::Text => {
                if value.is_string() {
                    Ok(())
                } else {
                    Err("expected a string".to_string())
                }
            }
            FieldKind::Number { min, max } => {
                let number = value.as_f64().ok_or("expected a number")?;
                if min.is_some_and(|min| number < min) || max.is_some_and(|max| number > max) {
                    return Err(format!("value {number} is out of range"));
                }
                Ok(())
            }
            FieldKind::TextArray => {
                let items = value.as_array().ok_or("expected an array")?;
                if items.iter().all(Value::is_string) {
                    Ok(())
                } else {
                    Err("expected an array of strings".to_string())
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
struct FieldRule {
    name: &'static str,
    kind: FieldKind,
    required: bool,
}

/// The declared shape of one collection.
#[derive(Debug, Clone)]
pub struct CollectionSchema {
    collection: &'static str,
    fields: Vec<FieldRule>,
}

impl CollectionSchema {
    pub fn new(collection: &'static str) -> Self {
        Self {
            collection,
            fields: Vec::new(),
        }
    }

    /// Field that must be present on insert.
    pub fn required(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldRule {
            name,
            kind,
            required: true,
        });
        self
    }

    /// Field that may be absent.
    pub fn optional(mut self, name: &'static str, kind: FieldKind) -> Self {
        self.fields.push(FieldRule {
            name,
            kind,
            required: false,
        });
        self
    }

    pub fn collection(&self) -> &'static str {
        self.collection
    }

    /// Check a full document. Required fields must be present.
    pub fn validate_insert(&self, fields: &Map<String, Value>) -> Result<(), StoreError> {
        for rule in &self.fields {
            if rule.required && !fields.contains_key(rule.name) {
                return Err(self.reject(format!("missing required field '{}'", rule.name)));
            }
        }
        self.validate_patch(fields)
    }

    /// Check a partial update. Only the present fields are validated.
    pub fn validate_patch(&self, patch: &Map<String, Value>) -> Result<(), StoreError> {
        for (name, value) in patch {
            let Some(rule) = self.fields.iter().find(|rule| rule.name == name) else {
                return Err(self.reject(format!("unknown field '{name}'")));
            };
            if let Err(reason) = rule.kind.accepts(value) {
                return Err(self.reject(format!("field '{name}': {reason}")));
            }
        }
        Ok(())
    }

    fn reject(&self, reason: String) -> StoreError {
        StoreError::Schema {
            collection: self.collection.to_string(),
            reason,
        }
    }
}

/// Schemas for all collections known to the application, keyed by name.
/// Collections without a schema pass through unvalidated.
#[derive(Debug, Clone, Default)]
pub struct SchemaSet {
    schemas: HashMap<&'static str, CollectionSchema>,
}

impl SchemaSet {
    pub fn new(schemas: Vec<CollectionSchema>) -> Self {
        Self {
            schemas: schemas
                .into_iter()
                .map(|schema| (schema.collection(), schema))
                .collect(),
        }
    }

    pub fn get(&self, collection: &str) -> Option<&CollectionSchema> {
        self.schemas.get(collection)
    }
}
