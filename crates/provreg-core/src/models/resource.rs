//! Resource domain model.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;
use crate::models::Audit;
use crate::models::claim::ResourceClaim;
use crate::uid::PrincipalUid;

/// Kinds of provisioned infrastructure objects tracked by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    MinioPolicy,
    MinioObjectArea,
    ManagedPostgresDatabase,
    ManagedOracleSchema,
    ExternalSchema,
    PostgresDatabaseInstance,
    OracleDatabaseInstance,
    StorageGridTenant,
    StorageGridObjectArea,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::MinioPolicy => "MinioPolicy",
            ResourceKind::MinioObjectArea => "MinioObjectArea",
            ResourceKind::ManagedPostgresDatabase => "ManagedPostgresDatabase",
            ResourceKind::ManagedOracleSchema => "ManagedOracleSchema",
            ResourceKind::ExternalSchema => "ExternalSchema",
            ResourceKind::PostgresDatabaseInstance => "PostgresDatabaseInstance",
            ResourceKind::OracleDatabaseInstance => "OracleDatabaseInstance",
            ResourceKind::StorageGridTenant => "StorageGridTenant",
            ResourceKind::StorageGridObjectArea => "StorageGridObjectArea",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "MinioPolicy" => Ok(ResourceKind::MinioPolicy),
            "MinioObjectArea" => Ok(ResourceKind::MinioObjectArea),
            "ManagedPostgresDatabase" => Ok(ResourceKind::ManagedPostgresDatabase),
            "ManagedOracleSchema" => Ok(ResourceKind::ManagedOracleSchema),
            "ExternalSchema" => Ok(ResourceKind::ExternalSchema),
            "PostgresDatabaseInstance" => Ok(ResourceKind::PostgresDatabaseInstance),
            "OracleDatabaseInstance" => Ok(ResourceKind::OracleDatabaseInstance),
            "StorageGridTenant" => Ok(ResourceKind::StorageGridTenant),
            "StorageGridObjectArea" => Ok(ResourceKind::StorageGridObjectArea),
            other => Err(RegistryError::Validation(format!(
                "unknown resource kind: {other}"
            ))),
        }
    }
}

/// A provisioned infrastructure object owned by a principal.
///
/// `claims` is `None` when claims were not requested; an empty vec
/// means claims were requested and there are none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    pub id: i64,
    pub kind: ResourceKind,
    pub name: String,
    pub owner_id: PrincipalUid,
    pub parent_id: Option<i64>,
    pub claims: Option<Vec<ResourceClaim>>,
    pub active: bool,
    pub set_to_cooldown_at: Option<DateTime<Utc>>,
    pub audit: Audit,
}

/// Insert shape; the id is assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewResource {
    pub kind: ResourceKind,
    pub name: String,
    pub owner_id: PrincipalUid,
    pub parent_id: Option<i64>,
}

/// Full-replace update shape for an existing resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateResource {
    pub id: i64,
    pub kind: ResourceKind,
    pub name: String,
    pub owner_id: PrincipalUid,
    pub parent_id: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_string_round_trip() {
        let kinds = [
            ResourceKind::MinioPolicy,
            ResourceKind::MinioObjectArea,
            ResourceKind::ManagedPostgresDatabase,
            ResourceKind::ManagedOracleSchema,
            ResourceKind::ExternalSchema,
            ResourceKind::PostgresDatabaseInstance,
            ResourceKind::OracleDatabaseInstance,
            ResourceKind::StorageGridTenant,
            ResourceKind::StorageGridObjectArea,
        ];
        for kind in kinds {
            assert_eq!(kind.as_str().parse::<ResourceKind>().unwrap(), kind);
        }
        assert!("NotAKind".parse::<ResourceKind>().is_err());
    }
}
