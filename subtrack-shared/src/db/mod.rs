//! Database layer
//!
//! - `pool`: PostgreSQL connection pool with a startup health check
//! - `migrations`: embedded sqlx migrations
//!
//! Queries for the subscription table live next to the model in
//! [`crate::models::subscription`].

pub mod migrations;
pub mod pool;
