//! SurrealDB implementation of [`ResourceRepository`].
//!
//! Resource record ids are integers drawn from the `counter` table so
//! the registry keeps the compact numeric ids its clients expect.
//! Claims are never loaded here; the service layer attaches them
//! according to its visibility rules.

use provreg_core::error::RegistryResult;
use provreg_core::models::resource::{NewResource, Resource, ResourceKind, UpdateResource};
use provreg_core::repository::{InsertOutcome, ResourceRepository};
use provreg_core::uid::PrincipalUid;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};

use crate::error::{DbError, is_unique_index_violation};
use crate::repository::{audit_from, next_sequence};

/// Name of the integer id sequence for resources.
const RESOURCE_SEQUENCE: &str = "resource";

/// DB-side row struct for queries where the record id is already known.
#[derive(Debug, Deserialize)]
struct ResourceRow {
    kind: String,
    name: String,
    owner_id: String,
    parent_id: Option<i64>,
    active: bool,
    set_to_cooldown_at: Option<Datetime>,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct ResourceRowWithId {
    record_id: i64,
    kind: String,
    name: String,
    owner_id: String,
    parent_id: Option<i64>,
    active: bool,
    set_to_cooldown_at: Option<Datetime>,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

impl ResourceRow {
    fn into_resource(self, id: i64) -> Result<Resource, DbError> {
        let kind: ResourceKind = self
            .kind
            .parse()
            .map_err(|_| DbError::Integrity(format!("resource {id} has unknown kind '{}'", self.kind)))?;
        let owner_id = PrincipalUid::parse(&self.owner_id)
            .map_err(|e| DbError::Integrity(format!("resource {id} has invalid owner id: {e}")))?;
        Ok(Resource {
            id,
            kind,
            name: self.name,
            owner_id,
            parent_id: self.parent_id,
            claims: None,
            active: self.active,
            set_to_cooldown_at: self.set_to_cooldown_at.map(Into::into),
            audit: audit_from(
                self.created_date,
                self.modified_date,
                self.created_by,
                self.modified_by,
            ),
        })
    }
}

impl ResourceRowWithId {
    fn try_into_resource(self) -> Result<Resource, DbError> {
        let id = self.record_id;
        ResourceRow {
            kind: self.kind,
            name: self.name,
            owner_id: self.owner_id,
            parent_id: self.parent_id,
            active: self.active,
            set_to_cooldown_at: self.set_to_cooldown_at,
            created_date: self.created_date,
            modified_date: self.modified_date,
            created_by: self.created_by,
            modified_by: self.modified_by,
        }
        .into_resource(id)
    }
}

/// SurrealDB implementation of the Resource repository.
pub struct SurrealResourceRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealResourceRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealResourceRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> ResourceRepository for SurrealResourceRepository<C> {
    async fn insert(&self, resource: NewResource) -> RegistryResult<InsertOutcome<Resource>> {
        let id = next_sequence(&self.db, RESOURCE_SEQUENCE).await?;

        let result = self
            .db
            .query(
                "CREATE type::thing('resource', $id) SET \
                 kind = $kind, name = $name, \
                 owner_id = $owner_id, parent_id = $parent_id",
            )
            .bind(("id", id))
            .bind(("kind", resource.kind.as_str()))
            .bind(("name", resource.name))
            .bind(("owner_id", resource.owner_id.to_string()))
            .bind(("parent_id", resource.parent_id))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) if is_unique_index_violation(&e) => return Ok(InsertOutcome::Conflict),
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| DbError::Query(format!("insert of resource {id} returned no row")))?;

        Ok(InsertOutcome::Created(row.into_resource(id)?))
    }

    async fn find_by_id(&self, id: i64) -> RegistryResult<Option<Resource>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('resource', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_resource(id))
            .transpose()
            .map_err(Into::into)
    }

    async fn find_by_kind_and_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> RegistryResult<Vec<Resource>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 WHERE kind = $kind AND name = $name ORDER BY id",
            )
            .bind(("kind", kind.as_str()))
            .bind(("name", name.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_resource().map_err(Into::into))
            .collect()
    }

    async fn find_claimed_by(
        &self,
        claimed_by: &PrincipalUid,
        name: Option<&str>,
        kind: Option<ResourceKind>,
    ) -> RegistryResult<Vec<Resource>> {
        // Resolve claimed resource ids first; the filter query then
        // runs against the resource table alone.
        let mut result = self
            .db
            .query("SELECT VALUE resource_id FROM resource_claim WHERE owner_id = $owner_id")
            .bind(("owner_id", claimed_by.to_string()))
            .await
            .map_err(DbError::from)?;

        let mut ids: Vec<i64> = result.take(0).map_err(DbError::from)?;
        ids.sort_unstable();
        ids.dedup();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut sql = String::from(
            "SELECT meta::id(id) AS record_id, * FROM resource \
             WHERE meta::id(id) IN $ids",
        );
        if name.is_some() {
            sql.push_str(" AND name = $name");
        }
        if kind.is_some() {
            sql.push_str(" AND kind = $kind");
        }
        sql.push_str(" ORDER BY id");

        let mut query = self.db.query(sql).bind(("ids", ids));
        if let Some(name) = name {
            query = query.bind(("name", name.to_string()));
        }
        if let Some(kind) = kind {
            query = query.bind(("kind", kind.as_str()));
        }

        let mut result = query.await.map_err(DbError::from)?;
        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_resource().map_err(Into::into))
            .collect()
    }

    async fn find_by_natural_key(
        &self,
        kind: ResourceKind,
        name: &str,
        owner_id: &PrincipalUid,
        parent_id: Option<i64>,
    ) -> RegistryResult<Option<Resource>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM resource \
                 WHERE kind = $kind AND name = $name \
                 AND owner_id = $owner_id AND parent_id = $parent_id",
            )
            .bind(("kind", kind.as_str()))
            .bind(("name", name.to_string()))
            .bind(("owner_id", owner_id.to_string()))
            .bind(("parent_id", parent_id))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<ResourceRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(ResourceRowWithId::try_into_resource)
            .transpose()
            .map_err(Into::into)
    }

    async fn update(&self, resource: UpdateResource) -> RegistryResult<Option<Resource>> {
        let id = resource.id;
        let mut result = self
            .db
            .query(
                "UPDATE type::thing('resource', $id) SET \
                 kind = $kind, name = $name, \
                 owner_id = $owner_id, parent_id = $parent_id, \
                 modified_date = time::now() \
                 RETURN AFTER",
            )
            .bind(("id", id))
            .bind(("kind", resource.kind.as_str()))
            .bind(("name", resource.name))
            .bind(("owner_id", resource.owner_id.to_string()))
            .bind(("parent_id", resource.parent_id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_resource(id))
            .transpose()
            .map_err(Into::into)
    }

    async fn update_active(&self, id: i64, active: bool) -> RegistryResult<Option<Resource>> {
        // Deactivation stamps the cooldown; reactivation clears it.
        let sql = if active {
            "UPDATE type::thing('resource', $id) SET \
             active = true, set_to_cooldown_at = NONE, \
             modified_date = time::now() RETURN AFTER"
        } else {
            "UPDATE type::thing('resource', $id) SET \
             active = false, set_to_cooldown_at = time::now(), \
             modified_date = time::now() RETURN AFTER"
        };

        let mut result = self
            .db
            .query(sql)
            .bind(("id", id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<ResourceRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_resource(id))
            .transpose()
            .map_err(Into::into)
    }

    async fn exists(&self, id: i64) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM type::thing('resource', $id)")
            .bind(("id", id))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<i64> = result.take(0).map_err(DbError::from)?;
        Ok(!ids.is_empty())
    }
}
