//! # Subtrack Shared Library
//!
//! Domain types, validation and persistence for the Subtrack subscription
//! service. The HTTP layer lives in `subtrack-api`.
//!
//! ## Module Organization
//!
//! - `validation`: `MM-YYYY` date checks and field rules
//! - `models`: the `Subscription` model and its SQL
//! - `repository`: storage abstraction with PostgreSQL and in-memory backends
//! - `db`: connection pool and migrations

pub mod db;
pub mod models;
pub mod repository;
pub mod validation;

/// Current version of the shared library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
