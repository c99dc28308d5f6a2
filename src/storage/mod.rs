//! All things related to the storage of users, notes and bookmarks

use async_trait::async_trait;
use thiserror::Error;
use url::Url;
use uuid::Uuid;

use crate::bookmarks::Bookmark;
use crate::notes::Note;
use crate::users::User;

pub use memory::Memory;
pub use postgres::Postgres;

mod memory;
mod postgres;

/// Default page size for listings
pub const DEFAULT_PAGE_SIZE: u32 = 10;

/// Upper bound for the page size of listings
pub const MAX_PAGE_SIZE: u32 = 100;

/// Storage errors
#[derive(Debug, Error)]
pub enum Error {
    /// A connection error with the storage
    #[error("Connection error: {0}")]
    Connection(String),

    /// A migration could not run
    #[error("Migration error: {0}")]
    Migration(String),
}

/// Result type for all storage interactions
pub type Result<T> = core::result::Result<T, Error>;

/// Filters for listing notes or bookmarks
///
/// `page` and `limit` are normalized on construction: pages start at 1 and
/// the page size is clamped to `1..=MAX_PAGE_SIZE`
#[derive(Debug)]
pub struct ItemQuery {
    /// Free text search over the text index of the resource
    pub search: Option<String>,

    /// Match records carrying at least one of these tags
    pub tags: Option<Vec<String>>,

    /// Page to fetch, starting at 1
    pub page: u32,

    /// Number of items per page
    pub limit: u32,
}

impl ItemQuery {
    pub fn new(
        search: Option<String>,
        tags: Option<Vec<String>>,
        page: Option<u32>,
        limit: Option<u32>,
    ) -> Self {
        Self {
            search: search.filter(|search| !search.is_empty()),
            tags: tags.filter(|tags| !tags.is_empty()),
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE),
        }
    }

    /// Number of items to skip to reach the current page
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.limit)
    }
}

/// A single page of items, with the total count over all pages
#[derive(Debug)]
pub struct ItemPage<T> {
    /// The items of the current page
    pub items: Vec<T>,

    /// Total number of items matching the query
    pub total: u64,
}

/// Values to create a User
pub struct CreateUserValues<'a> {
    /// The initial session ID for the user
    pub session_id: &'a Uuid,

    /// The username
    pub username: &'a str,

    /// The hashed password
    pub hashed_password: &'a str,
}

/// Values to create a Note
pub struct CreateNoteValues<'a> {
    /// User owning the note
    pub user: &'a User,

    /// Title of the note, already trimmed and validated
    pub title: &'a str,

    /// Content of the note
    pub content: &'a str,

    /// Normalized tags
    pub tags: &'a [String],

    /// Mark the note as favorite
    pub is_favorite: bool,
}

/// Values to update a Note
///
/// Only the set fields are written
pub struct UpdateNoteValues<'a> {
    /// New title of the note
    pub title: Option<&'a str>,

    /// New content of the note
    pub content: Option<&'a str>,

    /// New set of normalized tags, replacing the current one
    pub tags: Option<&'a [String]>,

    /// New favorite marker
    pub is_favorite: Option<bool>,
}

/// Values to create a Bookmark
pub struct CreateBookmarkValues<'a> {
    /// User owning the bookmark
    pub user: &'a User,

    /// Title of the bookmark, provided or fetched from the page
    pub title: &'a str,

    /// The bookmarked URL
    pub url: &'a Url,

    /// Description of the bookmark, already trimmed and validated
    pub description: &'a str,

    /// Normalized tags
    pub tags: &'a [String],

    /// Mark the bookmark as favorite
    pub is_favorite: bool,
}

/// Values to update a Bookmark
///
/// Only the set fields are written
pub struct UpdateBookmarkValues<'a> {
    /// New title of the bookmark
    pub title: Option<&'a str>,

    /// New bookmarked URL
    pub url: Option<&'a Url>,

    /// New description of the bookmark
    pub description: Option<&'a str>,

    /// New set of normalized tags, replacing the current one
    pub tags: Option<&'a [String]>,

    /// New favorite marker
    pub is_favorite: Option<bool>,
}

/// Storage with all supported operations
///
/// Every note/bookmark operation is scoped to the owning user: records of
/// other users are invisible, lookups for them come back empty
#[async_trait]
pub trait Storage: Clone + Send + Sync + 'static {
    /// Finds a single user by its username
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>>;

    /// Finds a single user by its ID
    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>>;

    /// Create a single user
    async fn create_user(&self, values: &CreateUserValues) -> Result<User>;

    /// Find a page of notes of a user, newest first
    ///
    /// The Postgres backend matches `search` against its full-text index,
    /// the memory backend approximates with case-insensitive containment
    async fn find_notes(&self, user_id: &Uuid, query: &ItemQuery) -> Result<ItemPage<Note>>;

    /// Find a single note of a user
    async fn find_single_note_by_id(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
    ) -> Result<Option<Note>>;

    /// Create a note
    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note>;

    /// Update a note of a user
    ///
    /// Comes back empty when the note does not exist for that user
    async fn update_note(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>>;

    /// Delete a note of a user, reporting whether anything was deleted
    async fn delete_note(&self, user_id: &Uuid, note_id: &Uuid) -> Result<bool>;

    /// Find a page of bookmarks of a user, newest first
    ///
    /// Search semantics match [`Storage::find_notes`]
    async fn find_bookmarks(
        &self,
        user_id: &Uuid,
        query: &ItemQuery,
    ) -> Result<ItemPage<Bookmark>>;

    /// Find a single bookmark of a user
    async fn find_single_bookmark_by_id(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
    ) -> Result<Option<Bookmark>>;

    /// Create a bookmark
    async fn create_bookmark(&self, values: &CreateBookmarkValues) -> Result<Bookmark>;

    /// Update a bookmark of a user
    ///
    /// Comes back empty when the bookmark does not exist for that user
    async fn update_bookmark(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
        values: &UpdateBookmarkValues,
    ) -> Result<Option<Bookmark>>;

    /// Delete a bookmark of a user, reporting whether anything was deleted
    async fn delete_bookmark(&self, user_id: &Uuid, bookmark_id: &Uuid) -> Result<bool>;
}
