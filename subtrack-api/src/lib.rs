//! # Subtrack API Server Library
//!
//! HTTP service recording users' paid subscriptions and summing their cost.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Staged configuration loading
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Query string extraction
//! - `middleware`: Access log
//! - `openapi`: Generated OpenAPI document
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod openapi;
pub mod routes;
