use serde::{Deserialize, Serialize};

/// Per-user document in the `users` collection, keyed by uid.
/// The liked/favorite arrays hold book ids; the store's array-union and
/// array-remove operations keep each id unique per array.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub uid: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub liked_books: Vec<String>,
    #[serde(default)]
    pub favorite_books: Vec<String>,
}
