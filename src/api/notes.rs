//! Notes API management

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::notes::Note;
use crate::storage::CreateNoteValues;
use crate::storage::ItemPage;
use crate::storage::ItemQuery;
use crate::storage::Storage;
use crate::storage::UpdateNoteValues;
use crate::tags;
use crate::validation;
use crate::validation::Violations;

use super::CurrentUser;
use super::Error;
use super::Form;
use super::Message;
use super::Pagination;
use super::PathParameters;
use super::QueryParameters;
use super::Success;

/// The note response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NoteResponse {
    /// The note ID
    pub id: Uuid,

    /// Title of the note
    pub title: String,

    /// Content of the note
    pub content: String,

    /// Normalized tags of the note
    pub tags: Vec<String>,

    /// Favorite marker
    pub is_favorite: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl NoteResponse {
    /// Create a note response from a [`Note`](Note)
    fn from_note(note: Note) -> Self {
        Self {
            id: note.id,
            title: note.title,
            content: note.content,
            tags: note.tags,
            is_favorite: note.is_favorite,
            created_at: note.created_at,
            updated_at: note.updated_at,
        }
    }

    /// Create a note response from multiple [`Note`](Note)s
    fn from_note_multiple(mut notes: Vec<Note>) -> Vec<Self> {
        notes.drain(..).map(Self::from_note).collect::<Vec<Self>>()
    }
}

/// A single page of notes
#[derive(Debug, Serialize)]
pub struct NoteListResponse {
    /// The notes of the current page
    notes: Vec<NoteResponse>,

    /// Position of the page in the full result set
    pagination: Pagination,
}

/// Filters accepted by the note listing
#[derive(Debug, Deserialize)]
pub struct ListNotesQuery {
    /// Free text search
    q: Option<String>,

    /// Comma separated tags, matching records carrying any of them
    tags: Option<String>,

    /// Page to fetch, starting at 1
    page: Option<u32>,

    /// Page size
    limit: Option<u32>,
}

impl ListNotesQuery {
    fn into_item_query(self) -> ItemQuery {
        ItemQuery::new(
            self.q,
            self.tags
                .as_deref()
                .filter(|raw| !raw.is_empty())
                .map(tags::parse_filter),
            self.page,
            self.limit,
        )
    }
}

/// List notes of the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:5000/api/notes?q=campaign&tags=work,todo&page=2&limit=5'
/// ```
///
/// Response:
/// ```json
/// { "notes": [ ... ], "pagination": { "page": 2, "limit": 5, "total": 12, "pages": 3 } }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<ListNotesQuery>,
) -> Result<Success<NoteListResponse>, Error> {
    let query = query.into_item_query();

    let ItemPage { items, total } = storage.find_notes(&current_user.id, &query).await?;

    Ok(Success::ok(NoteListResponse {
        notes: NoteResponse::from_note_multiple(items),
        pagination: Pagination::new(&query, total),
    }))
}

/// Get a single note of the current user
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<NoteResponse>, Error> {
    fetch_note(&storage, &current_user.id, &note_id)
        .await
        .map(|note| Success::ok(NoteResponse::from_note(note)))
}

/// Create note form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNoteForm {
    /// Title of the note
    title: Option<String>,

    /// Content of the note
    content: Option<String>,

    /// Tags of the note, normalized before storage
    tags: Option<Vec<String>>,

    /// Mark the note as favorite
    is_favorite: Option<bool>,
}

/// Create a note based on the [`CreateNoteForm`](CreateNoteForm) form
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "title": "Groceries", "content": "Bread, eggs", "tags": ["Errands"] }' \
///     http://localhost:5000/api/notes
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let title = form.title.as_deref().unwrap_or_default().trim();
    let content = form.content.as_deref().unwrap_or_default();

    let mut violations = Violations::new();
    validation::check_title(&mut violations, title);
    validation::check_content(&mut violations, content);

    if !violations.is_empty() {
        return Err(Error::validation(violations));
    }

    let tags = tags::normalize(form.tags.as_deref().unwrap_or_default());

    let values = CreateNoteValues {
        user: &current_user,
        title,
        content,
        tags: &tags,
        is_favorite: form.is_favorite.unwrap_or_default(),
    };

    let note = storage.create_note(&values).await?;

    Ok(Success::created(NoteResponse::from_note(note)))
}

/// Update note form
///
/// These fields are the only ones an update can touch, anything else in the
/// body is dropped
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateNoteForm {
    /// New title of the note
    title: Option<String>,

    /// New content of the note
    content: Option<String>,

    /// New tags of the note, replacing the current ones
    tags: Option<Vec<String>>,

    /// New favorite marker
    is_favorite: Option<bool>,
}

/// Update a note based on the [`UpdateNoteForm`](UpdateNoteForm) form
///
/// Only the provided fields are written
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
    Form(form): Form<UpdateNoteForm>,
) -> Result<Success<NoteResponse>, Error> {
    let title = form.title.as_deref().map(str::trim);
    let content = form.content.as_deref();

    let mut violations = Violations::new();

    if let Some(title) = title {
        validation::check_title(&mut violations, title);
    }

    if let Some(content) = content {
        validation::check_content(&mut violations, content);
    }

    if !violations.is_empty() {
        return Err(Error::validation(violations));
    }

    let tags = form.tags.as_deref().map(tags::normalize);

    let values = UpdateNoteValues {
        title,
        content,
        tags: tags.as_deref(),
        is_favorite: form.is_favorite,
    };

    let note = storage
        .update_note(&current_user.id, &note_id, &values)
        .await?
        .ok_or_else(|| Error::not_found("Note not found"))?;

    Ok(Success::ok(NoteResponse::from_note(note)))
}

/// Delete a note of the current user
///
/// Request:
/// ```sh
/// curl -v -XDELETE \
///     -H 'Authorization: Bearer tokentokentoken' \
///     http://localhost:5000/api/notes/<uuid>
/// ```
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(note_id): PathParameters<Uuid>,
) -> Result<Success<Message>, Error> {
    let deleted = storage.delete_note(&current_user.id, &note_id).await?;

    if deleted {
        Ok(Success::ok(Message::new("Note deleted successfully")))
    } else {
        Err(Error::not_found("Note not found"))
    }
}

/// Fetch a note from storage
async fn fetch_note<S: Storage>(
    storage: &S,
    user_id: &Uuid,
    note_id: &Uuid,
) -> Result<Note, Error> {
    storage
        .find_single_note_by_id(user_id, note_id)
        .await?
        .map_or_else(|| Err(Error::not_found("Note not found")), Ok)
}
