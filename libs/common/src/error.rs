//! Error types reported by the infrastructure layer.

use sqlx::Error as SqlxError;
use thiserror::Error;

/// Failures raised while talking to the entity store or session backend.
#[derive(Error, Debug)]
pub enum InfraError {
    /// Could not reach the entity store.
    #[error("connection error: {0}")]
    Connection(#[source] SqlxError),

    /// A query failed after the connection was established.
    #[error("query error: {0}")]
    Query(#[source] SqlxError),

    /// The session backend reported a failure.
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// The environment did not yield a usable configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Result alias for infrastructure operations.
pub type InfraResult<T> = Result<T, InfraError>;
