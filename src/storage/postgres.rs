//! Postgres storage

use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use crate::bookmarks::Bookmark;
use crate::notes::Note;
use crate::users::User;

use super::CreateBookmarkValues;
use super::CreateNoteValues;
use super::CreateUserValues;
use super::Error;
use super::ItemPage;
use super::ItemQuery;
use super::Result;
use super::Storage;
use super::UpdateBookmarkValues;
use super::UpdateNoteValues;

/// Migrator to run migrations on startup
static MIGRATOR: Migrator = sqlx::migrate!();

/// Postgres storage
#[derive(Clone)]
pub struct Postgres {
    /// Pool of connections
    connection_pool: PgPool,
}

impl Postgres {
    /// Create Postgres storage from a connection string
    ///
    /// Migrations will be run
    pub async fn new(database_url: &str) -> Result<Self> {
        let connection_pool = PgPoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await
            .map_err(connection_error)?;

        Self::new_with_pool(connection_pool).await
    }

    /// Create Postgres storage with an existing pool
    ///
    /// Migrations will be run
    pub async fn new_with_pool(connection_pool: PgPool) -> Result<Self> {
        MIGRATOR
            .run(&connection_pool)
            .await
            .map_err(|err| Error::Migration(err.to_string()))?;

        Ok(Self { connection_pool })
    }
}

/// Append the search/tags conditions of an [`ItemQuery`] to a WHERE clause
///
/// `text_columns` is the concatenation backing the full-text index of the
/// table, for notes `title || ' ' || content`
fn push_item_filters(
    filters: &mut String,
    param_idx: &mut usize,
    query: &ItemQuery,
    text_columns: &str,
) {
    if query.search.is_some() {
        filters.push_str(&format!(
            "AND to_tsvector('english', {text_columns}) @@ plainto_tsquery('english', ${param_idx}) "
        ));
        *param_idx += 1;
    }

    if query.tags.is_some() {
        filters.push_str(&format!("AND tags && ${param_idx} "));
        *param_idx += 1;
    }
}

/// Bind the values matching [`push_item_filters`], in the same order
macro_rules! bind_item_filters {
    ($query:expr, $user_id:expr, $item_query:expr) => {{
        let mut q = $query.bind($user_id);

        if let Some(search) = &$item_query.search {
            q = q.bind(search);
        }

        if let Some(tags) = &$item_query.tags {
            q = q.bind(tags.as_slice());
        }

        q
    }};
}

#[async_trait]
impl Storage for Postgres {
    async fn find_single_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE username = $1
            LIMIT 1
            ",
        )
        .bind(username)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_single_user_by_id(&self, id: &Uuid) -> Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r"
            SELECT *
            FROM users
            WHERE id = $1
            LIMIT 1
            ",
        )
        .bind(id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn create_user(&self, values: &CreateUserValues) -> Result<User> {
        let user = sqlx::query_as::<_, User>(
            r"
            INSERT INTO users (id, session_id, username, hashed_password)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.session_id)
        .bind(values.username)
        .bind(values.hashed_password)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(user)
    }

    async fn find_notes(&self, user_id: &Uuid, query: &ItemQuery) -> Result<ItemPage<Note>> {
        let mut filters = String::from("WHERE user_id = $1 ");
        let mut param_idx = 2;

        push_item_filters(&mut filters, &mut param_idx, query, "title || ' ' || content");

        let count_sql = format!("SELECT COUNT(*) FROM notes {filters}");
        let select_sql = format!(
            "SELECT * FROM notes {filters}ORDER BY created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let total = bind_item_filters!(sqlx::query_scalar::<_, i64>(&count_sql), user_id, query)
            .fetch_one(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        let notes = bind_item_filters!(sqlx::query_as::<_, Note>(&select_sql), user_id, query)
            .bind(i64::from(query.limit))
            .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
            .fetch_all(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(ItemPage {
            items: notes,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_single_note_by_id(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
    ) -> Result<Option<Note>> {
        let note = sqlx::query_as::<_, Note>(
            r"
            SELECT *
            FROM notes
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(note_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn create_note(&self, values: &CreateNoteValues) -> Result<Note> {
        let note = sqlx::query_as::<_, Note>(
            r"
            INSERT INTO notes (id, user_id, title, content, tags, is_favorite)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.content)
        .bind(values.tags)
        .bind(values.is_favorite)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(note)
    }

    async fn update_note(
        &self,
        user_id: &Uuid,
        note_id: &Uuid,
        values: &UpdateNoteValues,
    ) -> Result<Option<Note>> {
        let mut updates = vec!["updated_at = CURRENT_TIMESTAMP".to_string()];
        let mut param_idx = 3;

        if values.title.is_some() {
            updates.push(format!("title = ${param_idx}"));
            param_idx += 1;
        }

        if values.content.is_some() {
            updates.push(format!("content = ${param_idx}"));
            param_idx += 1;
        }

        if values.tags.is_some() {
            updates.push(format!("tags = ${param_idx}"));
            param_idx += 1;
        }

        if values.is_favorite.is_some() {
            updates.push(format!("is_favorite = ${param_idx}"));
        }

        let sql = format!(
            "UPDATE notes SET {} WHERE user_id = $1 AND id = $2 RETURNING *",
            updates.join(", ")
        );

        let mut q = sqlx::query_as::<_, Note>(&sql).bind(user_id).bind(note_id);

        if let Some(title) = values.title {
            q = q.bind(title);
        }

        if let Some(content) = values.content {
            q = q.bind(content);
        }

        if let Some(tags) = values.tags {
            q = q.bind(tags);
        }

        if let Some(is_favorite) = values.is_favorite {
            q = q.bind(is_favorite);
        }

        let note = q
            .fetch_optional(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(note)
    }

    async fn delete_note(&self, user_id: &Uuid, note_id: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM notes
            WHERE user_id = $1 AND id = $2
            ",
        )
        .bind(user_id)
        .bind(note_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_bookmarks(
        &self,
        user_id: &Uuid,
        query: &ItemQuery,
    ) -> Result<ItemPage<Bookmark>> {
        let mut filters = String::from("WHERE user_id = $1 ");
        let mut param_idx = 2;

        push_item_filters(
            &mut filters,
            &mut param_idx,
            query,
            "title || ' ' || description",
        );

        let count_sql = format!("SELECT COUNT(*) FROM bookmarks {filters}");
        let select_sql = format!(
            "SELECT * FROM bookmarks {filters}ORDER BY created_at DESC LIMIT ${param_idx} OFFSET ${}",
            param_idx + 1
        );

        let total = bind_item_filters!(sqlx::query_scalar::<_, i64>(&count_sql), user_id, query)
            .fetch_one(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        let bookmarks =
            bind_item_filters!(sqlx::query_as::<_, Bookmark>(&select_sql), user_id, query)
                .bind(i64::from(query.limit))
                .bind(i64::try_from(query.offset()).unwrap_or(i64::MAX))
                .fetch_all(&self.connection_pool)
                .await
                .map_err(connection_error)?;

        Ok(ItemPage {
            items: bookmarks,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }

    async fn find_single_bookmark_by_id(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
    ) -> Result<Option<Bookmark>> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r"
            SELECT *
            FROM bookmarks
            WHERE user_id = $1 AND id = $2
            LIMIT 1
            ",
        )
        .bind(user_id)
        .bind(bookmark_id)
        .fetch_optional(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(bookmark)
    }

    async fn create_bookmark(&self, values: &CreateBookmarkValues) -> Result<Bookmark> {
        let bookmark = sqlx::query_as::<_, Bookmark>(
            r"
            INSERT INTO bookmarks (id, user_id, title, url, description, tags, is_favorite)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            ",
        )
        .bind(Uuid::new_v4())
        .bind(values.user.id)
        .bind(values.title)
        .bind(values.url.to_string())
        .bind(values.description)
        .bind(values.tags)
        .bind(values.is_favorite)
        .fetch_one(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(bookmark)
    }

    async fn update_bookmark(
        &self,
        user_id: &Uuid,
        bookmark_id: &Uuid,
        values: &UpdateBookmarkValues,
    ) -> Result<Option<Bookmark>> {
        let mut updates = vec!["updated_at = CURRENT_TIMESTAMP".to_string()];
        let mut param_idx = 3;

        if values.title.is_some() {
            updates.push(format!("title = ${param_idx}"));
            param_idx += 1;
        }

        if values.url.is_some() {
            updates.push(format!("url = ${param_idx}"));
            param_idx += 1;
        }

        if values.description.is_some() {
            updates.push(format!("description = ${param_idx}"));
            param_idx += 1;
        }

        if values.tags.is_some() {
            updates.push(format!("tags = ${param_idx}"));
            param_idx += 1;
        }

        if values.is_favorite.is_some() {
            updates.push(format!("is_favorite = ${param_idx}"));
        }

        let sql = format!(
            "UPDATE bookmarks SET {} WHERE user_id = $1 AND id = $2 RETURNING *",
            updates.join(", ")
        );

        let mut q = sqlx::query_as::<_, Bookmark>(&sql)
            .bind(user_id)
            .bind(bookmark_id);

        if let Some(title) = values.title {
            q = q.bind(title);
        }

        if let Some(url) = values.url {
            q = q.bind(url.to_string());
        }

        if let Some(description) = values.description {
            q = q.bind(description);
        }

        if let Some(tags) = values.tags {
            q = q.bind(tags);
        }

        if let Some(is_favorite) = values.is_favorite {
            q = q.bind(is_favorite);
        }

        let bookmark = q
            .fetch_optional(&self.connection_pool)
            .await
            .map_err(connection_error)?;

        Ok(bookmark)
    }

    async fn delete_bookmark(&self, user_id: &Uuid, bookmark_id: &Uuid) -> Result<bool> {
        let result = sqlx::query(
            r"
            DELETE FROM bookmarks
            WHERE user_id = $1 AND id = $2
            ",
        )
        .bind(user_id)
        .bind(bookmark_id)
        .execute(&self.connection_pool)
        .await
        .map_err(connection_error)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Convert `SQLx` to storage connection error
fn connection_error<E>(err: E) -> Error
where
    E: std::error::Error,
{
    Error::Connection(err.to_string())
}
