use serde::{Deserialize, Serialize};

use kuuburi_store::Document;

use super::CatalogError;

/// A book recommendation as stored in the `books` collection.
/// The id is assigned by the store and never written back as a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    #[serde(default, skip_serializing)]
    pub id: String,
    pub title: String,
    pub author: String,
    pub genre: String,
    /// Float in the 0 to 5 range, checked at the store boundary.
    pub rating: f64,
    pub description: String,
    /// Uid of the user who submitted the recommendation.
    pub recommended_by: String,
}

impl Book {
    pub fn from_document(document: Document) -> Result<Self, CatalogError> {
        let mut book: Book =
            serde_json::from_value(document.fields).map_err(|error| CatalogError::Malformed {
                id: document.id.clone(),
                reason: error.to_string(),
            })?;
        book.id = document.id;
        Ok(book)
    }
}

/// Submission form payload; `recommended_by` is attached by the service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookDraft {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub rating: f64,
    pub description: String,
}

/// Partial update of a stored book.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}
