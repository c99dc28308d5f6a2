//! Memory storage
//!
//! Will be destroyed on system shutdown

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::bookmarks::Bookmark;
use crate::notes::Note;
use crate::users::User;

use super::CreateBookmarkValues;
use super::CreateNoteValues;
use super::CreateUserValues;
use super::ItemPage;
use super::ItemQuery;
use super::Result;
use super::Storage;
use super::UpdateBookmarkValues;
use super::UpdateNoteValues;

/// An in-memory storage
///
/// Will be destroyed on system shutdown
#[derive(Clone, Debug)]
pub struct Memory {
    /// All users in storage
    users: Arc<Mutex<HashMap<Uuid, User>>>,

    /// All notes in storage
    notes: Arc<Mutex<HashMap<Uuid, Note>>>,

    /// All bookmarks in storage
    bookmarks: Arc<Mutex<HashMap<Uuid, Bookmark>>>,
}

impl Memory {
    /// Create a new empty Memory storage
    pub fn new() -> Self {
        Self {
            users: Arc::new(Mutex::new(HashMap::new())),
            notes: Arc::new(Mutex::new(HashMap::new())),
            bookmarks: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

/// Case-insensitive containment, standing in for a full-text index
fn matches_search(query: &ItemQuery, title: &str, body: &str) -> bool {
    query.search.as_ref().is_none_or(|search| {
        let search = search.to_lowercase();

        title.to_lowercase().contains(&search) || body.to_lowercase().contains(&search)
    })
}

/// A record matches when it carries at least one of the filtered tags
fn matches_tags(query: &ItemQuery, tags: &[String]) -> bool {
    query
        .tags
        .as_ref()
        .is_none_or(|filter| tags.iter().any(|tag| filter.contains(tag)))
}

/// Cut a sorted result set down to the requested page
fn paginate<T>(items: Vec<T>, query: &ItemQuery) -> ItemPage<T> {
    let total = items.len() as u64;

    let items = items
        .into_iter()
        .skip(usize::try_from(query.offset()).unwrap_or(usize::MAX))
        .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
        .collect();

    ItemPage { items, total }
}

#[async_trait]
impl Storage for Memory {
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .await
            .values()
            .find(|user| user.username == username)
            .cloned())
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        Ok(self.users.lock().await.get(id).cloned())
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let user = User {
            id: Uuid::new_v4(),
            session_id: *values.session_id,
            username: values.username.to_string(),
            hashed_password: values.hashed_password.to_string(),
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        self.users.lock().await.insert(user.id, user.clone());

        Ok(user)
    }

    async fn find_notes(&self, user_id: &Uuid, query: &ItemQuery) -> Result<ItemPage<Note>> {
        let mut matching = self
            .notes
            .lock()
            .await
            .values()
            .filter(|note| &note.user_id == user_id)
            .filter(|note| matches_search(query, &note.title, &note.content))
            .filter(|note| matches_tags(query, &note.tags))
            .cloned()
            .collect::<Vec<Note>>();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(matching, query))
    }

    async fn find_single_note_by_id(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
    ) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .get(note_id)
            .filter(|note| &note.user_id == user_id)
            .cloned())
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        let note = Note {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            title: values.title.to_string(),
            content: values.content.to_string(),
            tags: values.tags.to_vec(),
            is_favorite: values.is_favorite,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        self.notes.lock().await.insert(note.id, note.clone());

        Ok(note)
    }

    async fn update_note(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>> {
        Ok(self
            .notes
            .lock()
            .await
            .get_mut(note_id)
            .filter(|note| &note.user_id == user_id)
            .map(|note| {
                if let Some(title) = values.title {
                    note.title = title.to_string();
                }

                if let Some(content) = values.content {
                    note.content = content.to_string();
                }

                if let Some(tags) = values.tags {
                    note.tags = tags.to_vec();
                }

                if let Some(is_favorite) = values.is_favorite {
                    note.is_favorite = is_favorite;
                }

                note.updated_at = Utc::now().naive_utc();

                note.clone()
            }))
    }

    async fn delete_note(&self, user_id: &Uuid, note_id: &Uuid) -> Result<bool> {
        let mut notes = self.notes.lock().await;

        let owned = notes
            .get(note_id)
            .is_some_and(|note| &note.user_id == user_id);

        if owned {
            notes.remove(note_id);
        }

        Ok(owned)
    }

    async fn find_bookmarks(
        &self,
        user_id: &Uuid,
        query: &ItemQuery,
    ) -> Result<ItemPage<Bookmark>> {
        let mut matching = self
            .bookmarks
            .lock()
            .await
            .values()
            .filter(|bookmark| &bookmark.user_id == user_id)
            .filter(|bookmark| matches_search(query, &bookmark.title, &bookmark.description))
            .filter(|bookmark| matches_tags(query, &bookmark.tags))
            .cloned()
            .collect::<Vec<Bookmark>>();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        Ok(paginate(matching, query))
    }

    async fn find_single_bookmark_by_id(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
    ) -> Result<Option<Bookmark>> {
        Ok(self
            .bookmarks
            .lock()
            .await
            .get(bookmark_id)
            .filter(|bookmark| &bookmark.user_id == user_id)
            .cloned())
    }

    async fn create_bookmark(&self, values: &CreateBookmarkValues) -> Result<Bookmark> {
        let bookmark = Bookmark {
            id: Uuid::new_v4(),
            user_id: values.user.id,
            title: values.title.to_string(),
            url: values.url.to_string(),
            description: values.description.to_string(),
            tags: values.tags.to_vec(),
            is_favorite: values.is_favorite,
            created_at: Utc::now().naive_utc(),
            updated_at: Utc::now().naive_utc(),
        };

        self.bookmarks
            .lock()
            .await
            .insert(bookmark.id, bookmark.clone());

        Ok(bookmark)
    }

    async fn update_bookmark(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
        values: &UpdateBookmarkValues,
    ) -> Result<Option<Bookmark>> {
        Ok(self
            .bookmarks
            .lock()
            .await
            .get_mut(bookmark_id)
            .filter(|bookmark| &bookmark.user_id == user_id)
            .map(|bookmark| {
                if let Some(title) = values.title {
                    bookmark.title = title.to_string();
                }

                if let Some(url) = values.url {
                    bookmark.url = url.to_string();
                }

                if let Some(description) = values.description {
                    bookmark.description = description.to_string();
                }

                if let Some(tags) = values.tags {
                    bookmark.tags = tags.to_vec();
                }

                if let Some(is_favorite) = values.is_favorite {
                    bookmark.is_favorite = is_favorite;
                }

                bookmark.updated_at = Utc::now().naive_utc();

                bookmark.clone()
            }))
    }

    async fn delete_bookmark(&self, user_id: &Uuid, bookmark_id: &Uuid) -> Result<bool> {
        let mut bookmarks = self.bookmarks.lock().await;

        let owned = bookmarks
            .get(bookmark_id)
            .is_some_and(|bookmark| &bookmark.user_id == user_id);

        if owned {
            bookmarks.remove(bookmark_id);
        }

        Ok(owned)
    }
}
