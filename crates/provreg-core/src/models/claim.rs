//! Resource claim domain model.
//!
//! A claim grants a principal a named role on a resource, together
//! with an opaque JSON credentials payload. Claims are only ever
//! created and listed; there is no update or standalone delete.

use serde::{Deserialize, Serialize};

use crate::models::Audit;
use crate::uid::PrincipalUid;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceClaim {
    pub id: i64,
    pub owner_id: PrincipalUid,
    pub resource_id: i64,
    /// Claim label, e.g. `READ` or `ADMIN`.
    pub name: String,
    /// Arbitrary JSON object; the registry never inspects it.
    pub credentials: serde_json::Value,
    pub audit: Audit,
}

/// Insert shape; doubles as the natural key for idempotent creation
/// (owner, resource, name, credentials).
#[derive(Debug, Clone, PartialEq)]
pub struct NewResourceClaim {
    pub owner_id: PrincipalUid,
    pub resource_id: i64,
    pub name: String,
    pub credentials: serde_json::Value,
}
