//! Error taxonomy for the document store boundary.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("document '{id}' not found in collection '{collection}'")]
    NotFound { collection: String, id: String },

    #[error("collection '{collection}' rejected document: {reason}")]
    Schema { collection: String, reason: String },

    #[error("field '{field}' is not an array")]
    NotAnArray { field: String },

    #[error("document fields must be a JSON object")]
    NotAnObject,

    #[error("store unavailable: {0}")]
    Unavailable(String),
}
