//! Database-specific error types and conversions.

use provreg_core::error::RegistryError;

/// Database-layer error type.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("SurrealDB error: {0}")]
    Surreal(#[from] surrealdb::Error),

    #[error("Query failed: {0}")]
    Query(String),

    #[error("Migration failed: {0}")]
    Migration(String),

    /// A stored row does not satisfy a domain invariant.
    #[error("Data integrity error: {0}")]
    Integrity(String),
}

impl From<DbError> for RegistryError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::Integrity(msg) => RegistryError::DataIntegrity(msg),
            other => RegistryError::Database(other.to_string()),
        }
    }
}

/// Whether an error reports a violated `UNIQUE` index.
///
/// The typed variant covers the embedded engines; the message probe
/// covers remote responses, which arrive as flattened query errors.
pub(crate) fn is_unique_index_violation(err: &surrealdb::Error) -> bool {
    if matches!(
        err,
        surrealdb::Error::Db(surrealdb::error::Db::IndexExists { .. })
    ) {
        return true;
    }
    err.to_string().contains("already contains")
}
