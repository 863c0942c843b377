//! Session view controller.
//!
//! Holds all ephemeral UI state for one client instance and dispatches user
//! actions to the data-sync services. Navigation, search, and selection are
//! synchronous local transitions; everything touching the remote store is
//! async, and local state mirrors a remote mutation only after it succeeds.
//! Remote failures are logged and surface as a boolean or a skipped update,
//! never as a panic or a poisoned state.

use kuuburi_auth::{AuthProvider, AuthenticatedUser};
use kuuburi_events::{EventBus, SessionEvent};

use crate::modules::catalog::{Book, BookDraft, CatalogService};
use crate::modules::profiles::ProfileService;
use crate::utils::contains_ci;

/// Pages reachable from the navigation bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Page {
    #[default]
    Home,
    About,
    Search,
    Profile,
    Add,
}

/// Ordering applied to search results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortMode {
    #[default]
    Relevance,
    Rating,
    Newest,
}

/// Sub-views of the profile page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProfileTab {
    #[default]
    Recommendations,
    ReadingList,
    Favorites,
}

pub struct Session {
    catalog: CatalogService,
    profiles: ProfileService,
    events: EventBus,

    page: Page,
    books: Vec<Book>,
    search_results: Vec<Book>,
    sort: SortMode,
    active_tab: ProfileTab,
    selected: Option<Book>,
    user: Option<AuthenticatedUser>,
    liked: Vec<String>,
    favorites: Vec<String>,
}

impl Session {
    pub fn new(catalog: CatalogService, profiles: ProfileService, events: EventBus) -> Self {
        Self {
            catalog,
            profiles,
            events,
            page: Page::default(),
            books: Vec::new(),
            search_results: Vec::new(),
            sort: SortMode::default(),
            active_tab: ProfileTab::default(),
            selected: None,
            user: None,
            liked: Vec::new(),
            favorites: Vec::new(),
        }
    }

    // --- local state transitions ---

    pub fn navigate(&mut self, page: Page) {
        self.page = page;
    }

    /// Case-insensitive substring match on title or author over the loaded
    /// books. An empty query matches everything. Switches to the search page.
    pub fn search(&mut self, query: &str) {
        self.search_results = self
            .books
            .iter()
            .filter(|book| contains_ci(&book.title, query) || contains_ci(&book.author, query))
            .cloned()
            .collect();
        self.apply_sort();
        self.page = Page::Search;
    }

    /// Change the sort mode and re-order the current results.
    pub fn set_sort(&mut self, sort: SortMode) {
        self.sort = sort;
        self.apply_sort();
    }

    fn apply_sort(&mut self) {
        let books = &self.books;
        let position = |id: &str| books.iter().position(|book| book.id == id);
        match self.sort {
            // Relevance keeps match order, which follows load order.
            SortMode::Relevance => self
                .search_results
                .sort_by_key(|book| position(&book.id).unwrap_or(usize::MAX)),
            SortMode::Rating => self
                .search_results
                .sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            // Store ids are time-ordered, so reverse load order is
            // newest-first.
            SortMode::Newest => self
                .search_results
                .sort_by_key(|book| std::cmp::Reverse(position(&book.id).unwrap_or(0))),
        }
    }

    pub fn select_book(&mut self, book_id: &str) {
        self.selected = self.books.iter().find(|book| book.id == book_id).cloned();
    }

    pub fn close_book(&mut self) {
        self.selected = None;
    }

    pub fn set_active_tab(&mut self, tab: ProfileTab) {
        self.active_tab = tab;
    }

    // --- auth lifecycle ---

    /// Run the provider's sign-in flow, persist the identity, and load the
    /// user's liked/favorite lists. A user with no profile document yet gets
    /// empty lists. Returns whether authentication succeeded.
    pub async fn sign_in(&mut self, provider: &dyn AuthProvider) -> bool {
        let user = match provider.sign_in().await {
            Ok(user) => user,
            Err(error) => {
                tracing::error!(%error, "sign-in failed");
                return false;
            }
        };

        if let Err(error) = self.profiles.ensure(&user).await {
            tracing::error!(%error, uid = %user.uid, "failed to persist identity");
        }

        self.liked.clear();
        self.favorites.clear();
        match self.profiles.fetch(&user.uid).await {
            Ok(Some(profile)) => {
                self.liked = profile.liked_books;
                self.favorites = profile.favorite_books;
            }
            Ok(None) => {}
            Err(error) => {
                tracing::error!(%error, uid = %user.uid, "failed to load profile");
            }
        }

        self.events.publish(SessionEvent::SignedIn {
            uid: user.uid.clone(),
            display_name: user.display_name.clone(),
        });
        self.user = Some(user);
        true
    }

    /// Sign out and drop all per-user state.
    pub async fn sign_out(&mut self, provider: &dyn AuthProvider) {
        if let Err(error) = provider.sign_out().await {
            tracing::error!(%error, "sign-out failed");
            return;
        }
        self.user = None;
        self.liked.clear();
        self.favorites.clear();
        self.events.publish(SessionEvent::SignedOut);
    }

    // --- data sync ---

    /// Fetch-on-mount of the whole book collection. On failure the current
    /// (initially empty) list stays in place.
    pub async fn load_books(&mut self) {
        match self.catalog.fetch_all().await {
            Ok(books) => self.books = books,
            Err(error) => tracing::error!(%error, "failed to load book collection"),
        }
    }

    /// Submit a recommendation. The new record is mirrored into local state
    /// only after the store accepted it.
    pub async fn add_recommendation(&mut self, draft: BookDraft) -> bool {
        let Some(user) = &self.user else {
            tracing::warn!("submission requires a signed-in user");
            return false;
        };

        match self.catalog.add(draft, &user.uid).await {
            Ok(book) => {
                self.events.publish(SessionEvent::BookAdded {
                    book_id: book.id.clone(),
                });
                self.books.push(book);
                true
            }
            Err(error) => {
                tracing::error!(%error, "failed to add recommendation");
                false
            }
        }
    }

    /// Flip the liked state of one book. The local list changes only after
    /// the remote update succeeded; signed-out users are a no-op.
    pub async fn toggle_like(&mut self, book_id: &str) {
        let Some(user) = &self.user else { return };

        let liked = self.liked.iter().any(|id| id == book_id);
        match self.profiles.set_liked(&user.uid, book_id, !liked).await {
            Ok(()) => {
                if liked {
                    self.liked.retain(|id| id != book_id);
                } else {
                    self.liked.push(book_id.to_string());
                }
            }
            Err(error) => {
                tracing::error!(%error, book_id, "failed to update liked books");
            }
        }
    }

    /// Flip the favorite state of one book; same policy as `toggle_like`.
    pub async fn toggle_favorite(&mut self, book_id: &str) {
        let Some(user) = &self.user else { return };

        let favorite = self.favorites.iter().any(|id| id == book_id);
        match self
            .profiles
            .set_favorite(&user.uid, book_id, !favorite)
            .await
        {
            Ok(()) => {
                if favorite {
                    self.favorites.retain(|id| id != book_id);
                } else {
                    self.favorites.push(book_id.to_string());
                }
            }
            Err(error) => {
                tracing::error!(%error, book_id, "failed to update favorites");
            }
        }
    }

    /// Books the signed-in user submitted, fetched on demand for the
    /// profile page. Empty when signed out or on a remote failure.
    pub async fn my_recommendations(&self) -> Vec<Book> {
        let Some(user) = &self.user else {
            return Vec::new();
        };
        match self.catalog.recommended_by(&user.uid).await {
            Ok(books) => books,
            Err(error) => {
                tracing::error!(%error, uid = %user.uid, "failed to load recommendations");
                Vec::new()
            }
        }
    }

    // --- read accessors ---

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn search_results(&self) -> &[Book] {
        &self.search_results
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn active_tab(&self) -> ProfileTab {
        self.active_tab
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.selected.as_ref()
    }

    pub fn current_user(&self) -> Option<&AuthenticatedUser> {
        self.user.as_ref()
    }

    pub fn is_liked(&self, book_id: &str) -> bool {
        self.liked.iter().any(|id| id == book_id)
    }

    pub fn is_favorite(&self, book_id: &str) -> bool {
        self.favorites.iter().any(|id| id == book_id)
    }

    /// The home page's popular slice: the first three loaded books.
    pub fn featured(&self) -> &[Book] {
        &self.books[..self.books.len().min(3)]
    }

    /// The home page's personal slice: the next three loaded books.
    pub fn personalized(&self) -> &[Book] {
        let start = self.books.len().min(3);
        let end = self.books.len().min(6);
        &self.books[start..end]
    }

    /// Loaded books the user has liked, in load order.
    pub fn liked_books(&self) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| self.is_liked(&book.id))
            .collect()
    }

    /// Loaded books the user has favorited, in load order.
    pub fn favorite_books(&self) -> Vec<&Book> {
        self.books
            .iter()
            .filter(|book| self.is_favorite(&book.id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::Value;

    use kuuburi_auth::DevProvider;
    use kuuburi_store::{Document, DocumentStore, MemoryStore, StoreError};

    fn draft(title: &str, author: &str, rating: f64) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: author.to_string(),
            genre: "Science Fiction".to_string(),
            rating,
            description: "A classic.".to_string(),
        }
    }

    fn provider() -> DevProvider {
        DevProvider::new("u1", "Ada", "ada@example.com")
    }

    fn session_over(store: Arc<dyn DocumentStore>) -> Session {
        Session::new(
            CatalogService::new(store.clone()),
            ProfileService::new(store),
            EventBus::default(),
        )
    }

    /// Seeds Dune and Foundation through a signed-in session.
    async fn seeded_session() -> Session {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        session.sign_in(&provider()).await;
        assert!(session.add_recommendation(draft("Dune", "Herbert", 4.5)).await);
        assert!(
            session
                .add_recommendation(draft("Foundation", "Asimov", 4.2))
                .await
        );
        session
    }

    /// Store double whose mutations always fail, for outage-path tests.
    struct FailingStore;

    #[async_trait]
    impl DocumentStore for FailingStore {
        async fn list_all(&self, _collection: &str) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn query_by_field(
            &self,
            _collection: &str,
            _field: &str,
            _value: &Value,
        ) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn insert(&self, _collection: &str, _fields: Value) -> Result<String, StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn merge(&self, _collection: &str, _id: &str, _patch: Value) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn delete(&self, _collection: &str, _id: &str) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn array_union(
            &self,
            _collection: &str,
            _id: &str,
            _field: &str,
            _element: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }

        async fn array_remove(
            &self,
            _collection: &str,
            _id: &str,
            _field: &str,
            _element: &str,
        ) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("offline".to_string()))
        }
    }

    #[tokio::test]
    async fn search_matches_title_or_author_case_insensitively() {
        let mut session = seeded_session().await;

        session.search("dun");
        let titles: Vec<&str> = session
            .search_results()
            .iter()
            .map(|book| book.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Dune"]);
        assert_eq!(session.page(), Page::Search);

        // "a" hits Foundation twice over, via title and author "Asimov".
        session.search("a");
        let titles: Vec<&str> = session
            .search_results()
            .iter()
            .map(|book| book.title.as_str())
            .collect();
        assert_eq!(titles, vec!["Foundation"]);
    }

    #[tokio::test]
    async fn empty_query_returns_all_books() {
        let mut session = seeded_session().await;
        session.search("");
        assert_eq!(session.search_results().len(), session.books().len());
    }

    #[tokio::test]
    async fn search_with_no_match_is_empty() {
        let mut session = seeded_session().await;
        session.search("tolkien");
        assert!(session.search_results().is_empty());
    }

    #[tokio::test]
    async fn sort_modes_reorder_results() {
        let mut session = seeded_session().await;
        session.search("");

        session.set_sort(SortMode::Rating);
        assert_eq!(session.search_results()[0].title, "Dune");

        session.set_sort(SortMode::Newest);
        assert_eq!(session.search_results()[0].title, "Foundation");

        session.set_sort(SortMode::Relevance);
        assert_eq!(session.search_results()[0].title, "Dune");
    }

    #[tokio::test]
    async fn navigation_and_tabs_are_unconditional() {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        assert_eq!(session.page(), Page::Home);

        session.navigate(Page::About);
        assert_eq!(session.page(), Page::About);

        session.set_active_tab(ProfileTab::Favorites);
        assert_eq!(session.active_tab(), ProfileTab::Favorites);
    }

    #[tokio::test]
    async fn selecting_and_closing_a_book() {
        let mut session = seeded_session().await;
        let id = session.books()[0].id.clone();

        session.select_book(&id);
        assert_eq!(session.selected_book().unwrap().id, id);

        session.close_book();
        assert!(session.selected_book().is_none());

        session.select_book("missing");
        assert!(session.selected_book().is_none());
    }

    #[tokio::test]
    async fn toggle_like_round_trips_locally_and_remotely() {
        let store = Arc::new(MemoryStore::unvalidated());
        let mut session = session_over(store.clone());
        session.sign_in(&provider()).await;
        assert!(session.add_recommendation(draft("Dune", "Herbert", 4.5)).await);
        let id = session.books()[0].id.clone();

        session.toggle_like(&id).await;
        assert!(session.is_liked(&id));

        session.toggle_like(&id).await;
        assert!(!session.is_liked(&id));

        // Remote copy went back to its original state too.
        let profile = ProfileService::new(store).fetch("u1").await.unwrap().unwrap();
        assert!(profile.liked_books.is_empty());
    }

    #[tokio::test]
    async fn toggles_are_no_ops_when_signed_out() {
        let mut session = seeded_session().await;
        let id = session.books()[0].id.clone();
        session.sign_out(&provider()).await;

        session.toggle_like(&id).await;
        session.toggle_favorite(&id).await;
        assert!(!session.is_liked(&id));
        assert!(!session.is_favorite(&id));
    }

    #[tokio::test]
    async fn remote_failure_leaves_local_state_unchanged() {
        let mut session = seeded_session().await;
        let id = session.books()[0].id.clone();
        session.toggle_like(&id).await;
        assert!(session.is_liked(&id));

        // Swap in an offline store behind fresh services.
        let offline: Arc<dyn DocumentStore> = Arc::new(FailingStore);
        session.profiles = ProfileService::new(offline.clone());
        session.catalog = CatalogService::new(offline);

        session.toggle_like(&id).await;
        assert!(session.is_liked(&id), "failed remote update must not flip local state");

        let before = session.books().len();
        assert!(!session.add_recommendation(draft("Ubik", "Dick", 4.0)).await);
        assert_eq!(session.books().len(), before);
    }

    #[tokio::test]
    async fn sign_in_without_profile_yields_empty_sets() {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        assert!(session.sign_in(&provider()).await);
        assert_eq!(session.current_user().unwrap().uid, "u1");
        assert!(session.liked_books().is_empty());
        assert!(session.favorite_books().is_empty());
    }

    #[tokio::test]
    async fn sign_in_restores_persisted_lists() {
        let store = Arc::new(MemoryStore::unvalidated());
        let mut session = session_over(store.clone());
        session.sign_in(&provider()).await;
        assert!(session.add_recommendation(draft("Dune", "Herbert", 4.5)).await);
        let id = session.books()[0].id.clone();
        session.toggle_like(&id).await;
        session.sign_out(&provider()).await;
        assert!(!session.is_liked(&id));

        // A fresh session for the same uid sees the persisted list.
        let mut next = session_over(store);
        next.load_books().await;
        next.sign_in(&provider()).await;
        assert!(next.is_liked(&id));
    }

    #[tokio::test]
    async fn sign_out_clears_user_state_and_publishes_events() {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        let mut rx = session.events.subscribe();

        session.sign_in(&provider()).await;
        session.sign_out(&provider()).await;
        assert!(session.current_user().is_none());

        assert!(matches!(
            rx.recv().await.unwrap(),
            SessionEvent::SignedIn { .. }
        ));
        assert_eq!(rx.recv().await.unwrap(), SessionEvent::SignedOut);
    }

    #[tokio::test]
    async fn load_books_failure_keeps_the_empty_list() {
        let mut session = session_over(Arc::new(FailingStore));
        session.load_books().await;
        assert!(session.books().is_empty());
    }

    #[tokio::test]
    async fn add_requires_a_signed_in_user() {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        assert!(!session.add_recommendation(draft("Dune", "Herbert", 4.5)).await);
    }

    #[tokio::test]
    async fn home_slices_partition_the_loaded_books() {
        let mut session = session_over(Arc::new(MemoryStore::unvalidated()));
        session.sign_in(&provider()).await;
        for index in 0..5 {
            let title = format!("Book {index}");
            assert!(session.add_recommendation(draft(&title, "Author", 3.0)).await);
        }

        assert_eq!(session.featured().len(), 3);
        assert_eq!(session.personalized().len(), 2);
        assert_eq!(session.featured()[0].title, "Book 0");
        assert_eq!(session.personalized()[0].title, "Book 3");
    }

    #[tokio::test]
    async fn my_recommendations_filters_on_the_signed_in_user() {
        let store = Arc::new(MemoryStore::unvalidated());
        let mut session = session_over(store.clone());

        let other = DevProvider::new("u2", "Grace", "grace@example.com");
        session.sign_in(&other).await;
        assert!(session.add_recommendation(draft("Ubik", "Dick", 4.0)).await);
        session.sign_out(&other).await;

        session.sign_in(&provider()).await;
        assert!(session.add_recommendation(draft("Dune", "Herbert", 4.5)).await);

        let mine = session.my_recommendations().await;
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].title, "Dune");
    }
}
