//! SurrealDB implementation of [`PrincipalRepository`].
//!
//! Both principal variants live in one SCHEMAFULL table with a `type`
//! discriminator. The row-to-variant projection happens here, and a
//! row whose required variant fields are missing surfaces as a
//! data-integrity error rather than a defaulted value.

use provreg_core::error::RegistryResult;
use provreg_core::models::principal::{
    AdNaturalKey, ApplicationDeployment, NewPrincipal, Principal, PrincipalType, User,
};
use provreg_core::repository::{InsertOutcome, PrincipalRepository};
use provreg_core::uid::PrincipalUid;
use serde::Deserialize;
use surrealdb::sql::Datetime;
use surrealdb::{Connection, Surreal};

use crate::error::{DbError, is_unique_index_violation};
use crate::repository::audit_from;

/// DB-side row struct for queries where the record id is already known.
#[derive(Debug, Deserialize)]
struct PrincipalRow {
    #[serde(rename = "type")]
    principal_type: String,
    name: String,
    environment_name: Option<String>,
    cluster: Option<String>,
    business_group: Option<String>,
    application_name: Option<String>,
    user_id: Option<String>,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

/// DB-side row struct that includes the record id via `meta::id(id)`.
#[derive(Debug, Deserialize)]
struct PrincipalRowWithId {
    record_id: String,
    #[serde(rename = "type")]
    principal_type: String,
    name: String,
    environment_name: Option<String>,
    cluster: Option<String>,
    business_group: Option<String>,
    application_name: Option<String>,
    user_id: Option<String>,
    created_date: Datetime,
    modified_date: Datetime,
    created_by: String,
    modified_by: String,
}

fn require<T>(field: &str, id: &PrincipalUid, value: Option<T>) -> Result<T, DbError> {
    value.ok_or_else(|| {
        DbError::Integrity(format!(
            "principal with id={id} is missing required field '{field}' for its type"
        ))
    })
}

impl PrincipalRow {
    fn into_principal(self, id: PrincipalUid) -> Result<Principal, DbError> {
        let audit = audit_from(
            self.created_date,
            self.modified_date,
            self.created_by,
            self.modified_by,
        );
        match self.principal_type.as_str() {
            "ApplicationDeployment" => Ok(Principal::ApplicationDeployment(ApplicationDeployment {
                environment_name: require("environment_name", &id, self.environment_name)?,
                cluster: require("cluster", &id, self.cluster)?,
                business_group: require("business_group", &id, self.business_group)?,
                application_name: self.application_name,
                name: self.name,
                id,
                audit,
            })),
            "User" => Ok(Principal::User(User {
                user_id: require("user_id", &id, self.user_id)?,
                name: self.name,
                id,
                audit,
            })),
            other => Err(DbError::Integrity(format!(
                "principal with id={id} has unknown type '{other}'"
            ))),
        }
    }
}

impl PrincipalRowWithId {
    fn try_into_principal(self) -> Result<Principal, DbError> {
        let id = PrincipalUid::parse(&self.record_id)
            .map_err(|e| DbError::Integrity(format!("invalid principal id in store: {e}")))?;
        PrincipalRow {
            principal_type: self.principal_type,
            name: self.name,
            environment_name: self.environment_name,
            cluster: self.cluster,
            business_group: self.business_group,
            application_name: self.application_name,
            user_id: self.user_id,
            created_date: self.created_date,
            modified_date: self.modified_date,
            created_by: self.created_by,
            modified_by: self.modified_by,
        }
        .into_principal(id)
    }
}

/// Flatten a [`NewPrincipal`] into the nullable column shape.
struct PrincipalColumns {
    principal_type: &'static str,
    name: String,
    environment_name: Option<String>,
    cluster: Option<String>,
    business_group: Option<String>,
    application_name: Option<String>,
    user_id: Option<String>,
}

fn columns_of(principal: NewPrincipal) -> (PrincipalUid, PrincipalColumns) {
    match principal {
        NewPrincipal::ApplicationDeployment(ad) => (
            ad.id,
            PrincipalColumns {
                principal_type: PrincipalType::ApplicationDeployment.as_str(),
                name: ad.name,
                environment_name: Some(ad.environment_name),
                cluster: Some(ad.cluster),
                business_group: Some(ad.business_group),
                application_name: ad.application_name,
                user_id: None,
            },
        ),
        NewPrincipal::User(user) => (
            user.id,
            PrincipalColumns {
                principal_type: PrincipalType::User.as_str(),
                name: user.name,
                environment_name: None,
                cluster: None,
                business_group: None,
                application_name: None,
                user_id: Some(user.user_id),
            },
        ),
    }
}

/// SurrealDB implementation of the Principal repository.
pub struct SurrealPrincipalRepository<C: Connection> {
    db: Surreal<C>,
}

impl<C: Connection> Clone for SurrealPrincipalRepository<C> {
    fn clone(&self) -> Self {
        Self {
            db: self.db.clone(),
        }
    }
}

impl<C: Connection> SurrealPrincipalRepository<C> {
    pub fn new(db: Surreal<C>) -> Self {
        Self { db }
    }
}

impl<C: Connection> PrincipalRepository for SurrealPrincipalRepository<C> {
    async fn insert(&self, principal: NewPrincipal) -> RegistryResult<InsertOutcome<Principal>> {
        let (id, cols) = columns_of(principal);
        let id_str = id.to_string();

        let result = self
            .db
            .query(
                "CREATE type::thing('principal', $id) SET \
                 type = $principal_type, name = $name, \
                 environment_name = $environment_name, \
                 cluster = $cluster, \
                 business_group = $business_group, \
                 application_name = $application_name, \
                 user_id = $user_id",
            )
            .bind(("id", id_str.clone()))
            .bind(("principal_type", cols.principal_type))
            .bind(("name", cols.name))
            .bind(("environment_name", cols.environment_name))
            .bind(("cluster", cols.cluster))
            .bind(("business_group", cols.business_group))
            .bind(("application_name", cols.application_name))
            .bind(("user_id", cols.user_id))
            .await
            .map_err(DbError::from)?;

        let mut result = match result.check() {
            Ok(result) => result,
            Err(e) if is_unique_index_violation(&e) => return Ok(InsertOutcome::Conflict),
            Err(e) => return Err(DbError::Query(e.to_string()).into()),
        };

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        let row = rows.into_iter().next().ok_or_else(|| {
            DbError::Query(format!("insert of principal {id_str} returned no row"))
        })?;

        Ok(InsertOutcome::Created(row.into_principal(id)?))
    }

    async fn find_by_id(&self, id: &PrincipalUid) -> RegistryResult<Option<Principal>> {
        let mut result = self
            .db
            .query("SELECT * FROM type::thing('principal', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_principal(id.clone()))
            .transpose()
            .map_err(Into::into)
    }

    async fn find_all_by_type(
        &self,
        principal_type: PrincipalType,
    ) -> RegistryResult<Vec<Principal>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE type = $principal_type ORDER BY id",
            )
            .bind(("principal_type", principal_type.as_str()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .map(|row| row.try_into_principal().map_err(Into::into))
            .collect()
    }

    async fn find_ad_by_natural_key(&self, key: &AdNaturalKey) -> RegistryResult<Option<Principal>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE type = 'ApplicationDeployment' \
                 AND name = $name \
                 AND environment_name = $environment_name \
                 AND cluster = $cluster \
                 AND business_group = $business_group \
                 AND application_name = $application_name",
            )
            .bind(("name", key.name.clone()))
            .bind(("environment_name", key.environment_name.clone()))
            .bind(("cluster", key.cluster.clone()))
            .bind(("business_group", key.business_group.clone()))
            .bind(("application_name", key.application_name.clone()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(PrincipalRowWithId::try_into_principal)
            .transpose()
            .map_err(Into::into)
    }

    async fn find_user_by_natural_key(
        &self,
        name: &str,
        user_id: &str,
    ) -> RegistryResult<Option<Principal>> {
        let mut result = self
            .db
            .query(
                "SELECT meta::id(id) AS record_id, * FROM principal \
                 WHERE type = 'User' AND name = $name AND user_id = $user_id",
            )
            .bind(("name", name.to_string()))
            .bind(("user_id", user_id.to_string()))
            .await
            .map_err(DbError::from)?;

        let rows: Vec<PrincipalRowWithId> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(PrincipalRowWithId::try_into_principal)
            .transpose()
            .map_err(Into::into)
    }

    async fn update(&self, principal: NewPrincipal) -> RegistryResult<Option<Principal>> {
        let (id, cols) = columns_of(principal);

        let mut result = self
            .db
            .query(
                "UPDATE type::thing('principal', $id) SET \
                 type = $principal_type, name = $name, \
                 environment_name = $environment_name, \
                 cluster = $cluster, \
                 business_group = $business_group, \
                 application_name = $application_name, \
                 user_id = $user_id, \
                 modified_date = time::now() \
                 RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("principal_type", cols.principal_type))
            .bind(("name", cols.name))
            .bind(("environment_name", cols.environment_name))
            .bind(("cluster", cols.cluster))
            .bind(("business_group", cols.business_group))
            .bind(("application_name", cols.application_name))
            .bind(("user_id", cols.user_id))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;

        let rows: Vec<PrincipalRow> = result.take(0).map_err(DbError::from)?;
        rows.into_iter()
            .next()
            .map(|row| row.into_principal(id))
            .transpose()
            .map_err(Into::into)
    }

    async fn delete_by_id(&self, id: &PrincipalUid) -> RegistryResult<()> {
        self.db
            .query("DELETE type::thing('principal', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?
            .check()
            .map_err(|e| DbError::Query(e.to_string()))?;
        Ok(())
    }

    async fn exists(&self, id: &PrincipalUid) -> RegistryResult<bool> {
        let mut result = self
            .db
            .query("SELECT VALUE meta::id(id) FROM type::thing('principal', $id)")
            .bind(("id", id.to_string()))
            .await
            .map_err(DbError::from)?;

        let ids: Vec<String> = result.take(0).map_err(DbError::from)?;
        Ok(!ids.is_empty())
    }
}
