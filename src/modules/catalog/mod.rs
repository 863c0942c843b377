pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use kuuburi_kernel::{InitCtx, Module};
use kuuburi_store::{CollectionSchema, DocumentStore, FieldKind, StoreError};

pub use models::{Book, BookDraft, BookPatch};

pub const BOOKS_COLLECTION: &str = "books";

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed book document '{id}': {reason}")]
    Malformed { id: String, reason: String },

    #[error("invalid submission: {0}")]
    Invalid(String),
}

/// Catalog module owning the `books` collection.
pub struct CatalogModule;

impl CatalogModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for CatalogModule {
    fn name(&self) -> &'static str {
        "catalog"
    }

    fn schemas(&self) -> Vec<CollectionSchema> {
        vec![CollectionSchema::new(BOOKS_COLLECTION)
            .required("title", FieldKind::Text)
            .required("author", FieldKind::Text)
            .required("genre", FieldKind::Text)
            .required(
                "rating",
                FieldKind::Number {
                    min: Some(0.0),
                    max: Some(5.0),
                },
            )
            .required("description", FieldKind::Text)
            .required("recommendedBy", FieldKind::Text)]
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "catalog module initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "catalog module stopped");
        Ok(())
    }
}

/// Data-sync operations for the book collection. Every method is one remote
/// call with no retry; callers decide how failures surface.
#[derive(Clone)]
pub struct CatalogService {
    store: Arc<dyn DocumentStore>,
}

impl CatalogService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Load the whole collection. No pagination, no incremental sync.
    pub async fn fetch_all(&self) -> Result<Vec<Book>, CatalogError> {
        let documents = self.store.list_all(BOOKS_COLLECTION).await?;
        documents.into_iter().map(Book::from_document).collect()
    }

    /// Append a submission and return the stored record with its new id.
    pub async fn add(&self, draft: BookDraft, recommended_by: &str) -> Result<Book, CatalogError> {
        validate_draft(&draft)?;

        let fields = json!({
            "title": draft.title,
            "author": draft.author,
            "genre": draft.genre,
            "rating": draft.rating,
            "description": draft.description,
            "recommendedBy": recommended_by,
        });
        let id = self.store.insert(BOOKS_COLLECTION, fields).await?;

        Ok(Book {
            id,
            title: draft.title,
            author: draft.author,
            genre: draft.genre,
            rating: draft.rating,
            description: draft.description,
            recommended_by: recommended_by.to_string(),
        })
    }

    pub async fn update(&self, id: &str, patch: BookPatch) -> Result<(), CatalogError> {
        let fields = serde_json::to_value(&patch).map_err(|error| CatalogError::Malformed {
            id: id.to_string(),
            reason: error.to_string(),
        })?;
        self.store.merge(BOOKS_COLLECTION, id, fields).await?;
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), CatalogError> {
        self.store.delete(BOOKS_COLLECTION, id).await?;
        Ok(())
    }

    /// Books submitted by the given user.
    pub async fn recommended_by(&self, uid: &str) -> Result<Vec<Book>, CatalogError> {
        let documents = self
            .store
            .query_by_field(BOOKS_COLLECTION, "recommendedBy", &json!(uid))
            .await?;
        documents.into_iter().map(Book::from_document).collect()
    }
}

fn validate_draft(draft: &BookDraft) -> Result<(), CatalogError> {
    let text_fields = [
        ("title", &draft.title),
        ("author", &draft.author),
        ("genre", &draft.genre),
        ("description", &draft.description),
    ];
    for (name, value) in text_fields {
        if value.trim().is_empty() {
            return Err(CatalogError::Invalid(format!("'{name}' must not be empty")));
        }
    }
    if !(0.0..=5.0).contains(&draft.rating) {
        return Err(CatalogError::Invalid(format!(
            "rating {} is outside the 0 to 5 range",
            draft.rating
        )));
    }
    Ok(())
}

/// Create a new instance of the catalog module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(CatalogModule::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use kuuburi_store::MemoryStore;

    fn draft(title: &str, author: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            genre: "Science Fiction".to_string(),
            rating: 4.5,
            description: "A classic.".to_string(),
        }
    }

    fn service() -> CatalogService {
        CatalogService::new(Arc::new(MemoryStore::unvalidated()))
    }

    #[tokio::test]
    async fn added_book_appears_in_a_fresh_fetch_with_a_new_id() {
        let service = service();
        let existing = service.add(draft("Dune", "Herbert"), "u1").await.unwrap();
        let added = service
            .add(draft("Foundation", "Asimov"), "u1")
            .await
            .unwrap();
        assert_ne!(added.id, existing.id);

        let all = service.fetch_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all.iter().any(|book| book.id == added.id));
    }

    #[tokio::test]
    async fn empty_fields_are_rejected_before_any_remote_call() {
        let service = service();
        let error = service.add(draft("", "Herbert"), "u1").await.unwrap_err();
        assert!(matches!(error, CatalogError::Invalid(_)));
        assert!(service.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn out_of_range_rating_is_rejected() {
        let service = service();
        let mut bad = draft("Dune", "Herbert");
        bad.rating = 5.5;
        assert!(matches!(
            service.add(bad, "u1").await,
            Err(CatalogError::Invalid(_))
        ));
    }

    #[tokio::test]
    async fn update_merges_into_the_stored_record() {
        let service = service();
        let book = service.add(draft("Dune", "Herbert"), "u1").await.unwrap();

        service
            .update(
                &book.id,
                BookPatch {
                    rating: Some(5.0),
                    ..BookPatch::default()
                },
            )
            .await
            .unwrap();

        let all = service.fetch_all().await.unwrap();
        assert_eq!(all[0].rating, 5.0);
        assert_eq!(all[0].title, "Dune");
    }

    #[tokio::test]
    async fn delete_removes_the_record() {
        let service = service();
        let book = service.add(draft("Dune", "Herbert"), "u1").await.unwrap();
        service.delete(&book.id).await.unwrap();
        assert!(service.fetch_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recommended_by_filters_on_submitter() {
        let service = service();
        service.add(draft("Dune", "Herbert"), "u1").await.unwrap();
        service
            .add(draft("Foundation", "Asimov"), "u2")
            .await
            .unwrap();

        let mine = service.recommended_by("u1").await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Dune");
    }
}
