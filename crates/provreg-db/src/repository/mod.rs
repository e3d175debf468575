//! SurrealDB repository implementations.

mod claim;
mod principal;
mod resource;

pub use claim::SurrealResourceClaimRepository;
pub use principal::SurrealPrincipalRepository;
pub use resource::SurrealResourceRepository;

use chrono::{DateTime, Utc};
use provreg_core::models::Audit;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};

use crate::error::DbError;

/// Draw the next value from a named integer sequence.
///
/// The increment is a single UPSERT statement, so concurrent callers
/// always observe distinct values.
pub(crate) async fn next_sequence<C: Connection>(
    db: &Surreal<C>,
    sequence: &str,
) -> Result<i64, DbError> {
    let mut result = db
        .query(
            "UPSERT type::thing('counter', $sequence) \
             SET next = (next ?? 0) + 1 RETURN VALUE next",
        )
        .bind(("sequence", sequence.to_string()))
        .await?
        .check()
        .map_err(|e| DbError::Query(e.to_string()))?;

    let values: Vec<i64> = result.take(0)?;
    values
        .into_iter()
        .next()
        .ok_or_else(|| DbError::Query(format!("sequence '{sequence}' returned no value")))
}

/// Assemble audit columns from stored datetimes.
pub(crate) fn audit_from(
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
) -> Audit {
    Audit {
        created_date: DateTime::<Utc>::from(created_date),
        modified_date: DateTime::<Utc>::from(modified_date),
        created_by,
        modified_by,
    }
}
