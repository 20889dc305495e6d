//! Database models
//!
//! - `subscription`: subscription records, request payloads, cost filters
//!   and the SQL that reads and writes them

pub mod subscription;
