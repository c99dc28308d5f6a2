//! All API endpoint setup

use axum::Router;
use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::routing::put;

pub use current_user::CurrentUser;
pub use current_user::JwtKeys;
pub use request::Form;
pub use request::PathParameters;
pub use request::QueryParameters;
pub use response::Error;
pub use response::Message;
pub use response::Pagination;
pub use response::Success;

use crate::storage::Storage;

mod auth;
mod bookmarks;
mod current_user;
mod health;
mod notes;
mod request;
mod response;

/// Get the Axum router for all API routes
pub fn router<S: Storage>() -> Router {
    let auth = Router::new()
        .route("/register", post(auth::register::<S>))
        .route("/login", post(auth::login::<S>))
        .route("/me", get(auth::me::<S>));

    let notes = Router::new()
        .route("/", get(notes::list::<S>))
        .route("/", post(notes::create::<S>))
        .route("/{note}", get(notes::single::<S>))
        .route("/{note}", put(notes::update::<S>))
        .route("/{note}", delete(notes::delete::<S>));

    let bookmarks = Router::new()
        .route("/", get(bookmarks::list::<S>))
        .route("/", post(bookmarks::create::<S>))
        .route("/{bookmark}", get(bookmarks::single::<S>))
        .route("/{bookmark}", put(bookmarks::update::<S>))
        .route("/{bookmark}", delete(bookmarks::delete::<S>));

    Router::new()
        .route("/health", get(health::check))
        .nest("/auth", auth)
        .nest("/notes", notes)
        .nest("/bookmarks", bookmarks)
}
