//! Shared infrastructure for the Stocklist application.
//!
//! Connection management for the PostgreSQL entity store and the Redis
//! session backend, plus the error types infrastructure code reports.

pub mod cache;
pub mod database;
pub mod error;
