//! Integration tests against the full router
//!
//! Every test runs on its own app with in-memory storage

mod health;
mod notes;
