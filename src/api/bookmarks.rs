//! Bookmarks API management

use axum::Extension;
use chrono::NaiveDateTime;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

use crate::bookmarks::Bookmark;
use crate::link_metadata;
use crate::storage::CreateBookmarkValues;
use crate::storage::ItemPage;
use crate::storage::ItemQuery;
use crate::storage::Storage;
use crate::storage::UpdateBookmarkValues;
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

/// The bookmark response information
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    /// The bookmark ID
    pub id: Uuid,

    /// Title of the bookmark
    pub title: String,

    /// The bookmarked URL
    pub url: String,

    /// Description of the bookmark
    pub description: String,

    /// Normalized tags of the bookmark
    pub tags: Vec<String>,

    /// Favorite marker
    pub is_favorite: bool,

    /// Creation date
    pub created_at: NaiveDateTime,

    /// Last updated at
    pub updated_at: NaiveDateTime,
}

impl BookmarkResponse {
    /// Create a bookmark response from a [`Bookmark`](Bookmark)
    fn from_bookmark(bookmark: Bookmark) -> Self {
        Self {
            id: bookmark.id,
            title: bookmark.title,
            url: bookmark.url,
            description: bookmark.description,
            tags: bookmark.tags,
            is_favorite: bookmark.is_favorite,
            created_at: bookmark.created_at,
            updated_at: bookmark.updated_at,
        }
    }

    /// Create a bookmark response from multiple [`Bookmark`](Bookmark)s
    fn from_bookmark_multiple(mut bookmarks: Vec<Bookmark>) -> Vec<Self> {
        bookmarks
            .drain(..)
            .map(Self::from_bookmark)
            .collect::<Vec<Self>>()
    }
}

/// A single page of bookmarks
#[derive(Debug, Serialize)]
pub struct BookmarkListResponse {
    /// The bookmarks of the current page
    bookmarks: Vec<BookmarkResponse>,

    /// Position of the page in the full result set
    pagination: Pagination,
}

/// Filters accepted by the bookmark listing
#[derive(Debug, Deserialize)]
pub struct ListBookmarksQuery {
    /// Free text search
    q: Option<String>,

    /// Comma separated tags, matching records carrying any of them
    tags: Option<String>,

    /// Page to fetch, starting at 1
    page: Option<u32>,

    /// Page size
    limit: Option<u32>,
}

impl ListBookmarksQuery {
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

/// List bookmarks of the current user, newest first
///
/// Request:
/// ```sh
/// curl -v -H 'Authorization: Bearer tokentokentoken' \
///     'http://localhost:5000/api/bookmarks?tags=reading&page=1'
/// ```
///
/// Response:
/// ```json
/// { "bookmarks": [ ... ], "pagination": { "page": 1, "limit": 10, "total": 3, "pages": 1 } }
/// ```
pub async fn list<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    QueryParameters(query): QueryParameters<ListBookmarksQuery>,
) -> Result<Success<BookmarkListResponse>, Error> {
    let query = query.into_item_query();

    let ItemPage { items, total } = storage.find_bookmarks(&current_user.id, &query).await?;

    Ok(Success::ok(BookmarkListResponse {
        bookmarks: BookmarkResponse::from_bookmark_multiple(items),
        pagination: Pagination::new(&query, total),
    }))
}

/// Get a single bookmark of the current user
pub async fn single<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(bookmark_id): PathParameters<Uuid>,
) -> Result<Success<BookmarkResponse>, Error> {
    fetch_bookmark(&storage, &current_user.id, &bookmark_id)
        .await
        .map(|bookmark| Success::ok(BookmarkResponse::from_bookmark(bookmark)))
}

/// Create bookmark form
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookmarkForm {
    /// Title of the bookmark, fetched from the page when empty
    title: Option<String>,

    /// The URL to bookmark
    url: Option<String>,

    /// Description of the bookmark
    description: Option<String>,

    /// Tags of the bookmark, normalized before storage
    tags: Option<Vec<String>>,

    /// Mark the bookmark as favorite
    is_favorite: Option<bool>,
}

/// Create a bookmark based on the [`CreateBookmarkForm`](CreateBookmarkForm) form
///
/// A missing or empty title is filled in from the page behind the URL, see
/// [`fetch_page_title`](link_metadata::fetch_page_title)
///
/// Request:
/// ```sh
/// curl -v -H 'Content-Type: application/json' \
///     -H 'Authorization: Bearer tokentokentoken' \
///     -d '{ "url": "https://www.rust-lang.org/", "tags": ["Reading"] }' \
///     http://localhost:5000/api/bookmarks
/// ```
pub async fn create<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    Form(form): Form<CreateBookmarkForm>,
) -> Result<Success<BookmarkResponse>, Error> {
    let title = form.title.as_deref().unwrap_or_default().trim();
    let description = form.description.as_deref().unwrap_or_default().trim();

    let mut violations = Violations::new();
    let url =
        validation::check_url(&mut violations, form.url.as_deref().unwrap_or_default().trim());
    validation::check_description(&mut violations, description);

    if !title.is_empty() {
        validation::check_title(&mut violations, title);
    }

    let Some(url) = url else {
        return Err(Error::validation(violations));
    };

    if !violations.is_empty() {
        return Err(Error::validation(violations));
    }

    let title = if title.is_empty() {
        let fetched = link_metadata::fetch_page_title(url.as_str()).await;

        let mut violations = Violations::new();
        validation::check_title(&mut violations, &fetched);

        if !violations.is_empty() {
            return Err(Error::validation(violations));
        }

        fetched
    } else {
        title.to_string()
    };

    let tags = tags::normalize(form.tags.as_deref().unwrap_or_default());

    let values = CreateBookmarkValues {
        user: &current_user,
        title: &title,
        url: &url,
        description,
        tags: &tags,
        is_favorite: form.is_favorite.unwrap_or_default(),
    };

    let bookmark = storage.create_bookmark(&values).await?;

    Ok(Success::created(BookmarkResponse::from_bookmark(bookmark)))
}

/// Update bookmark form
///
/// These fields are the only ones an update can touch, anything else in the
/// body is dropped
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookmarkForm {
    /// New title of the bookmark
    title: Option<String>,

    /// New URL of the bookmark
    url: Option<String>,

    /// New description of the bookmark
    description: Option<String>,

    /// New tags of the bookmark, replacing the current ones
    tags: Option<Vec<String>>,

    /// New favorite marker
    is_favorite: Option<bool>,
}

/// Update a bookmark based on the [`UpdateBookmarkForm`](UpdateBookmarkForm) form
///
/// Only the provided fields are written. Changing the URL without sending a
/// title along refetches the title from the new page
pub async fn update<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(bookmark_id): PathParameters<Uuid>,
    Form(form): Form<UpdateBookmarkForm>,
) -> Result<Success<BookmarkResponse>, Error> {
    let title = form.title.as_deref().map(str::trim);
    let description = form.description.as_deref().map(str::trim);

    let mut violations = Violations::new();

    let url = form
        .url
        .as_deref()
        .map(|raw| validation::check_url(&mut violations, raw.trim()));

    if let Some(title) = title {
        // an empty title is refetched from the link when one is supplied
        if !(url.is_some() && title.is_empty()) {
            validation::check_title(&mut violations, title);
        }
    }

    if let Some(description) = description {
        validation::check_description(&mut violations, description);
    }

    if !violations.is_empty() {
        return Err(Error::validation(violations));
    }

    // invalid URLs bailed out above
    let url = url.flatten();

    let fetched_title = match &url {
        Some(url) if title.is_none_or(str::is_empty) => {
            Some(link_metadata::fetch_page_title(url.as_str()).await)
        }
        _ => None,
    };

    if let Some(fetched) = &fetched_title {
        let mut violations = Violations::new();
        validation::check_title(&mut violations, fetched);

        if !violations.is_empty() {
            return Err(Error::validation(violations));
        }
    }

    let title = fetched_title.as_deref().or(title);
    let tags = form.tags.as_deref().map(tags::normalize);

    let values = UpdateBookmarkValues {
        title,
        url: url.as_ref(),
        description,
        tags: tags.as_deref(),
        is_favorite: form.is_favorite,
    };

    let bookmark = storage
        .update_bookmark(&current_user.id, &bookmark_id, &values)
        .await?
        .ok_or_else(|| Error::not_found("Bookmark not found"))?;

    Ok(Success::ok(BookmarkResponse::from_bookmark(bookmark)))
}

/// Delete a bookmark of the current user
pub async fn delete<S: Storage>(
    Extension(storage): Extension<S>,
    current_user: CurrentUser<S>,
    PathParameters(bookmark_id): PathParameters<Uuid>,
) -> Result<Success<Message>, Error> {
    let deleted = storage.delete_bookmark(&current_user.id, &bookmark_id).await?;

    if deleted {
        Ok(Success::ok(Message::new("Bookmark deleted successfully")))
    } else {
        Err(Error::not_found("Bookmark not found"))
    }
}

/// Fetch a bookmark from storage
async fn fetch_bookmark<S: Storage>(
    storage: &S,
    user_id: &Uuid,
    bookmark_id: &Uuid,
) -> Result<Bookmark, Error> {
    storage
        .find_single_bookmark_by_id(user_id, bookmark_id)
        .await?
        .map_or_else(|| Err(Error::not_found("Bookmark not found")), Ok)
}
