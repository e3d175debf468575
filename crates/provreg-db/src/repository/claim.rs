//! SurrealDB implementation of [`ResourceClaimRepository`].
//!
//! The full insert shape (owner, resource, name, credentials) doubles
//! as the natural key: the credentials object participates in the
//! unique index, so re-submitting the same grant is a conflict and a
//! changed credentials payload is a new claim.

use provreg_core::error::RegistryResult;
use provreg_core::models::claim::{NewResourceClaim, ResourceClaim};
use provreg_core::repository::{InsertOutcome, ResourceClaimRepository};
use provreg_core::uid::PrincipalUid;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};

use crate::error::{DbError, is_unique_index_violation};
use crate::repository::{audit_from, next_sequence};

/// Name of the integer id sequence for claims.
const CLAIM_SEQUENCE: &str = "resource_claim";

/// DB-side row struct for queries where the record id is already known.
#[derive(Debug, Deserialize)]
struct ClaimRow {
    owner_id: String,
    resource_id: i64,
    name: String,
    credentials: serde_json::Value,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct ClaimRowWithId {
    record_id: i64,
    owner_id: String,
    resource_id: i64,
    name: String,
    credentials: serde_json::Value,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

impl ClaimRow {
    fn into_claim(self, id: i64) -> Result<ResourceClaim, DbError> {
        let owner_id = PrincipalUid::parse(&self.owner_id)
            .map_err(|e| DbError::Integrity(format!("claim {id} has invalid owner id: {e}")))?;
        Ok(ResourceClaim {
            id,
            owner_id,
            resource_id: self.resource_id,
            name: self.name,
            credentials: self.credentials,
            audit: audit_from(
                self.created_date,
                self.modified_date,
                self.created_by,
                self.modified_by,
            ),
        })
    }
}

impl ClaimRowWithId {
    fn try_into_claim(self) -> Result<ResourceClaim, DbError> {
        let id = self.record_id;
        ClaimRow {
            owner_id: self.owner_id,
            resource_id: self.resource_id,
            name: self.name,
            credentials: self.credentials,
            created_date: self.created_date,
            modified_date: self.modified_date,
            created_by: self.created_by,
            modified_by: self.modified_by,
        }
        .into_claim(id)
    }
}

/// SurrealDB implementation of the ResourceClaim repository.
pub struct SurrealResourceClaimRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealResourceClaimRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealResourceClaimRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceClaimRepository for SurrealResourceClaimRepository<C> {
    async fn insert(&self, claim: NewResourceClaim) -> RegistryResult<InsertOutcome<ResourceClaim>> {
        let id = next_sequence(&self.db, CLAIM_SEQUENCE).await?;

        let result = self
            .db
            .query(
                "CREATE type::thing('resource_claim', $id) SET \
                 owner_id = $owner_id, resource_id = $resource_id, \
                 name = $name, credentials = $credentials",
            )
            .bind(("id", id))
            .bind(("owner_id", claim.owner_id.to_string()))
            .bind(("resource_id", claim.resource_id))
            .bind(("name", claim.name))
            .bind(("credentials", claim.credentials))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) if is_unique_index_violation(&e) => return Ok(InsertOutcome::Conflict),
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<ClaimRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query(format!("insert of claim {id} returned no row")))?;

        Ok(InsertOutcome::Created(row.into_claim(id)?))
    }

    async fn find_by_natural_key(
        &self,
        claim: &NewResourceClaim,
    ) -> RegistryResult<Option<ResourceClaim>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource_claim \
                 WHERE owner_id = $owner_id AND resource_id = $resource_id \
                 AND name = $name AND credentials = $credentials",
            )
            .bind(("owner_id", claim.owner_id.to_string()))
            .bind(("resource_id", claim.resource_id))
            .bind(("name", claim.name.clone()))
            .bind(("credentials", claim.credentials.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClaimRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(ClaimRowWithId::try_into_claim)
            .transpose()
            .map_err(Into::into)
    }

    async fn find_all_by_resource_ids(
        &self,
        resource_ids: &[i64],
    ) -> RegistryResult<Vec<ResourceClaim>> {
        if resource_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource_claim \
                 WHERE resource_id IN $resource_ids ORDER BY id",
            )
            .bind(("resource_ids", resource_ids.to_vec()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ClaimRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_claim().map_err(Into::into))
            .collect()
    }
}
