//! Repository trait definitions for data access abstraction.
//!
//! All repository operations are async. Inserts that participate in
//! idempotent creation report a unique-index violation as
//! [`InsertOutcome::Conflict`] instead of an error; the caller decides
//! whether to fetch the pre-existing row.

use crate::error::RegistryResult;
use crate::models::claim::{NewResourceClaim, ResourceClaim};
use crate::models::principal::{AdNaturalKey, NewPrincipal, Principal, PrincipalType};
use crate::models::resource::{NewResource, Resource, ResourceKind, UpdateResource};
use crate::uid::{PrincipalUid, UidProbe};

/// Result of an insert guarded by a natural-key unique index.
#[derive(Debug, Clone, PartialEq)]
pub enum InsertOutcome<T> {
    /// The row was inserted.
    Created(T),
    /// A row with the same natural key already exists.
    Conflict,
}

pub trait PrincipalRepository: Send + Sync {
    fn insert(
        &self,
        principal: NewPrincipal,
    ) -> impl Future<Output = RegistryResult<InsertOutcome<Principal>>> + Send;

    fn find_by_id(
        &self,
        id: &PrincipalUid,
    ) -> impl Future<Output = RegistryResult<Option<Principal>>> + Send;

    fn find_all_by_type(
        &self,
        principal_type: PrincipalType,
    ) -> impl Future<Output = RegistryResult<Vec<Principal>>> + Send;

    fn find_ad_by_natural_key(
        &self,
        key: &AdNaturalKey,
    ) -> impl Future<Output = RegistryResult<Option<Principal>>> + Send;

    fn find_user_by_natural_key(
        &self,
        name: &str,
        user_id: &str,
    ) -> impl Future<Output = RegistryResult<Option<Principal>>> + Send;

    /// Full replace of the variant fields; returns `None` when the id
    /// does not exist.
    fn update(
        &self,
        principal: NewPrincipal,
    ) -> impl Future<Output = RegistryResult<Option<Principal>>> + Send;

    /// No-op when the id does not exist.
    fn delete_by_id(&self, id: &PrincipalUid) -> impl Future<Output = RegistryResult<()>> + Send;

    fn exists(&self, id: &PrincipalUid) -> impl Future<Output = RegistryResult<bool>> + Send;
}

/// Any principal repository can serve as the uid collision probe.
impl<R: PrincipalRepository> UidProbe for R {
    fn uid_exists(&self, uid: &PrincipalUid) -> impl Future<Output = RegistryResult<bool>> + Send {
        self.exists(uid)
    }
}

pub trait ResourceRepository: Send + Sync {
    fn insert(
        &self,
        resource: NewResource,
    ) -> impl Future<Output = RegistryResult<InsertOutcome<Resource>>> + Send;

    fn find_by_id(&self, id: i64) -> impl Future<Output = RegistryResult<Option<Resource>>> + Send;

    fn find_by_kind_and_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> impl Future<Output = RegistryResult<Vec<Resource>>> + Send;

    /// Resources holding at least one claim owned by `claimed_by`,
    /// optionally narrowed to an exact name and/or kind. Ordered by id.
    fn find_claimed_by(
        &self,
        claimed_by: &PrincipalUid,
        name: Option<&str>,
        kind: Option<ResourceKind>,
    ) -> impl Future<Output = RegistryResult<Vec<Resource>>> + Send;

    fn find_by_natural_key(
        &self,
        kind: ResourceKind,
        name: &str,
        owner_id: &PrincipalUid,
        parent_id: Option<i64>,
    ) -> impl Future<Output = RegistryResult<Option<Resource>>> + Send;

    fn update(
        &self,
        resource: UpdateResource,
    ) -> impl Future<Output = RegistryResult<Option<Resource>>> + Send;

    /// Deactivation stamps `set_to_cooldown_at` with the store clock;
    /// reactivation clears it.
    fn update_active(
        &self,
        id: i64,
        active: bool,
    ) -> impl Future<Output = RegistryResult<Option<Resource>>> + Send;

    fn exists(&self, id: i64) -> impl Future<Output = RegistryResult<bool>> + Send;
}

pub trait ResourceClaimRepository: Send + Sync {
    fn insert(
        &self,
        claim: NewResourceClaim,
    ) -> impl Future<Output = RegistryResult<InsertOutcome<ResourceClaim>>> + Send;

    fn find_by_natural_key(
        &self,
        claim: &NewResourceClaim,
    ) -> impl Future<Output = RegistryResult<Option<ResourceClaim>>> + Send;

    /// All claims for the given resources, in creation order.
    fn find_all_by_resource_ids(
        &self,
        resource_ids: &[i64],
    ) -> impl Future<Output = RegistryResult<Vec<ResourceClaim>>> + Send;
}
