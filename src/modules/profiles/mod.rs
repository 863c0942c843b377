pub mod models;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use thiserror::Error;

use kuuburi_auth::AuthenticatedUser;
use kuuburi_kernel::{InitCtx, Module};
use kuuburi_store::{CollectionSchema, DocumentStore, FieldKind, StoreError};

pub use models::UserProfile;

pub const USERS_COLLECTION: &str = "users";
const LIKED_FIELD: &str = "likedBooks";
const FAVORITE_FIELD: &str = "favoriteBooks";

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("malformed profile document '{id}': {reason}")]
    Malformed { id: String, reason: String },
}

/// Profiles module owning the `users` collection.
pub struct ProfilesModule;

impl ProfilesModule {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Module for ProfilesModule {
    fn name(&self) -> &'static str {
        "profiles"
    }

    fn schemas(&self) -> Vec<CollectionSchema> {
        vec![CollectionSchema::new(USERS_COLLECTION)
            .required("uid", FieldKind::Text)
            .optional("displayName", FieldKind::Text)
            .optional("email", FieldKind::Text)
            .optional(LIKED_FIELD, FieldKind::TextArray)
            .optional(FAVORITE_FIELD, FieldKind::TextArray)]
    }

    async fn init(&self, ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        tracing::info!(
            module = self.name(),
            environment = ?ctx.settings.environment,
            "profiles module initialized"
        );
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        tracing::info!(module = self.name(), "profiles module stopped");
        Ok(())
    }
}

/// Data-sync operations for user documents. Writes address the document by
/// uid; reads go through an equality query on the `uid` field, matching the
/// hosted store's access paths.
#[derive(Clone)]
pub struct ProfileService {
    store: Arc<dyn DocumentStore>,
}

impl ProfileService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// The profile for `uid`, or `None` when no document matches yet.
    pub async fn fetch(&self, uid: &str) -> Result<Option<UserProfile>, ProfileError> {
        let documents = self
            .store
            .query_by_field(USERS_COLLECTION, "uid", &json!(uid))
            .await?;
        let Some(document) = documents.into_iter().next() else {
            return Ok(None);
        };

        let profile = serde_json::from_value(document.fields).map_err(|error| {
            ProfileError::Malformed {
                id: document.id,
                reason: error.to_string(),
            }
        })?;
        Ok(Some(profile))
    }

    /// Merge the authenticated identity into the user's document,
    /// creating it on first sign-in.
    pub async fn ensure(&self, user: &AuthenticatedUser) -> Result<(), ProfileError> {
        let identity = json!({
            "uid": user.uid,
            "displayName": user.display_name,
            "email": user.email,
        });
        self.store.merge(USERS_COLLECTION, &user.uid, identity).await?;
        Ok(())
    }

    /// Add or remove one book id from the liked list.
    pub async fn set_liked(&self, uid: &str, book_id: &str, liked: bool) -> Result<(), ProfileError> {
        self.set_membership(uid, LIKED_FIELD, book_id, liked).await
    }

    /// Add or remove one book id from the favorites list.
    pub async fn set_favorite(
        &self,
        uid: &str,
        book_id: &str,
        favorite: bool,
    ) -> Result<(), ProfileError> {
        self.set_membership(uid, FAVORITE_FIELD, book_id, favorite)
            .await
    }

    async fn set_membership(
        &self,
        uid: &str,
        field: &str,
        book_id: &str,
        member: bool,
    ) -> Result<(), ProfileError> {
        if member {
            self.store
                .array_union(USERS_COLLECTION, uid, field, book_id)
                .await?;
        } else {
            self.store
                .array_remove(USERS_COLLECTION, uid, field, book_id)
                .await?;
        }
        Ok(())
    }
}

/// Create a new instance of the profiles module
pub fn create_module() -> std::sync::Arc<dyn Module> {
    std::sync::Arc::new(ProfilesModule::new())
}
