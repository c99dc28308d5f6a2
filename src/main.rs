#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
// easier to use when using the functions as callback of foreign functions
#![allow(clippy::needless_pass_by_value)]
// #![doc = include_str!("../README.md")]

use std::net::SocketAddr;

use anyhow::Result;
use axum::Extension;
use axum::Router;
use axum::http::Method;
use axum::http::header;
use axum::response::IntoResponse;
use axum::response::Response;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::prelude::*;

use crate::api::Error;
use crate::api::JwtKeys;
use crate::api::router;
use crate::storage::Memory;
use crate::storage::Postgres;
use crate::storage::Storage;
use crate::utils::env_var_or_else;

mod api;
mod bookmarks;
mod graceful_shutdown;
mod link_metadata;
mod notes;
mod password;
mod storage;
mod tags;
#[cfg(test)]
mod tests;
mod users;
mod utils;
mod validation;

const DEFAULT_RUST_LOG: &str = "stashy=debug,tower_http=debug";
const DEFAULT_ADDRESS: &str = "0.0.0.0:5000";

#[tokio::main]
async fn main() -> Result<()> {
    setup_environment();
    setup_tracing();

    let app = setup_app().await?;

    let address = setup_address()?;
    tracing::info!("Listening on {}", address);

    let listener = TcpListener::bind(address).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(graceful_shutdown::handler())
        .await?;

    Ok(())
}

/// Create and setup the app with its dependencies
///
/// Runs on Postgres when `DATABASE_URL` is set, on volatile in-memory
/// storage otherwise
///
/// # Errors
///
/// Will return `Err` if the database connection or its migrations fail
pub async fn setup_app() -> Result<Router> {
    match std::env::var("DATABASE_URL") {
        Ok(database_url) if !database_url.is_empty() => {
            let storage = Postgres::new(&database_url).await?;

            Ok(build_app(storage))
        }
        _ => {
            tracing::warn!("`DATABASE_URL` is not set, falling back to in-memory storage");

            Ok(build_app(Memory::new()))
        }
    }
}

/// Create the router around the given storage
fn build_app<S: Storage>(storage: S) -> Router {
    let jwt_keys = setup_jwt_keys();

    Router::new()
        .nest("/api", router::<S>())
        .fallback(fallback)
        .layer(TraceLayer::new_for_http())
        .layer(setup_cors())
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(Extension(storage))
        .layer(Extension(jwt_keys))
}

/// Response for requests outside the API surface
async fn fallback() -> Error {
    Error::not_found("Route not found")
}

/// Turn a handler panic into a plain 500 response
fn panic_response(err: Box<dyn std::any::Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    tracing::error!("Unhandled panic: {detail}");

    Error::internal_server_error("Something went wrong!").into_response()
}

fn setup_environment() {
    dotenvy::dotenv().ok();
}

fn setup_tracing() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::fmt;
    use tracing_subscriber::registry;

    registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_RUST_LOG.into()),
        ))
        .with(fmt::layer())
        .init();
}

fn setup_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_origin(Any)
}

fn setup_jwt_keys() -> JwtKeys {
    use crate::password::generate;

    let jwt_secret = env_var_or_else("JWT_SECRET", || {
        let jwt_secret = generate();
        tracing::info!("`JWT_SECRET` is not set, generating temporary one: {jwt_secret}");
        jwt_secret
    });

    JwtKeys::new(jwt_secret.as_bytes())
}

fn setup_address() -> Result<SocketAddr> {
    let mut address =
        env_var_or_else("ADDRESS", || String::from(DEFAULT_ADDRESS)).parse::<SocketAddr>()?;

    // optional override of just the port
    if let Ok(port) = std::env::var("PORT") {
        // only check non-empty strings
        if !port.is_empty() {
            let port = port.parse::<u16>()?;

            address.set_port(port);
        }
    }

    Ok(address)
}
