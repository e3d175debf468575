//! Resource and claim business logic.
//!
//! Listing is a pipeline: query the matching resources, drop inactive
//! rows unless deactivated ones were asked for, then attach claims
//! according to the visibility the caller is entitled to.

use std::collections::HashMap;

use provreg_core::error::{RegistryError, RegistryResult};
use provreg_core::models::claim::{NewResourceClaim, ResourceClaim};
use provreg_core::models::resource::{NewResource, Resource, ResourceKind, UpdateResource};
use provreg_core::repository::{
    InsertOutcome, ResourceClaimRepository, ResourceRepository,
};
use provreg_core::uid::PrincipalUid;

/// How a resource listing is selected.
#[derive(Debug, Clone)]
pub enum FindParams {
    /// Exact (name, kind) match.
    ByNameAndKind { name: String, kind: ResourceKind },
    /// Resources holding at least one claim owned by `claimed_by`,
    /// optionally narrowed further.
    ByClaimedBy {
        claimed_by: PrincipalUid,
        name: Option<String>,
        kind: Option<ResourceKind>,
        only_my_claims: bool,
    },
}

/// Which claims a listing attaches to each resource.
enum ClaimVisibility {
    Hidden,
    OnlyOwnedBy(PrincipalUid),
    All,
}

pub struct ResourceService<R, K> {
    resources: R,
    claims: K,
}

impl<R: Clone, K: Clone> Clone for ResourceService<R, K> {
    fn clone(&self) -> Self {
        Self {
            resources: self.resources.clone(),
            claims: self.claims.clone(),
        }
    }
}

impl<R, K> ResourceService<R, K>
where
    R: ResourceRepository,
    K: ResourceClaimRepository,
{
    pub fn new(resources: R, claims: K) -> Self {
        Self { resources, claims }
    }

    /// Idempotent create on (kind, name, owner, parent).
    pub async fn create_resource(&self, new: NewResource) -> RegistryResult<Resource> {
        let key = new.clone();
        match self.resources.insert(new).await? {
            InsertOutcome::Created(resource) => Ok(resource),
            InsertOutcome::Conflict => self
                .resources
                .find_by_natural_key(key.kind, &key.name, &key.owner_id, key.parent_id)
                .await?
                .ok_or_else(|| {
                    RegistryError::Database(
                        "resource insert conflicted but no row matches its key".into(),
                    )
                }),
        }
    }

    pub async fn find_by_id(
        &self,
        id: i64,
        include_claims: bool,
    ) -> RegistryResult<Option<Resource>> {
        let Some(mut resource) = self.resources.find_by_id(id).await? else {
            return Ok(None);
        };
        if include_claims {
            let claims = self.claims.find_all_by_resource_ids(&[id]).await?;
            attach_claims(
                std::slice::from_mut(&mut resource),
                claims,
                &ClaimVisibility::All,
            );
        }
        Ok(Some(resource))
    }

    /// Full replace; `None` when the id does not exist.
    pub async fn update_resource(&self, update: UpdateResource) -> RegistryResult<Option<Resource>> {
        self.resources.update(update).await
    }

    /// Toggle the lifecycle flag; `None` when the id does not exist.
    pub async fn update_active(&self, id: i64, active: bool) -> RegistryResult<Option<Resource>> {
        self.resources.update_active(id, active).await
    }

    pub async fn exists(&self, id: i64) -> RegistryResult<bool> {
        self.resources.exists(id).await
    }

    pub async fn find_all_by_params(
        &self,
        params: FindParams,
        include_claims: bool,
        include_deactivated: bool,
    ) -> RegistryResult<Vec<Resource>> {
        let mut found = match &params {
            FindParams::ByNameAndKind { name, kind } => {
                self.resources.find_by_kind_and_name(*kind, name).await?
            }
            FindParams::ByClaimedBy {
                claimed_by,
                name,
                kind,
                ..
            } => {
                self.resources
                    .find_claimed_by(claimed_by, name.as_deref(), *kind)
                    .await?
            }
        };

        if !include_deactivated {
            found.retain(|resource| resource.active);
        }

        let visibility = match (include_claims, params) {
            (false, _) => ClaimVisibility::Hidden,
            (
                true,
                FindParams::ByClaimedBy {
                    claimed_by,
                    only_my_claims: true,
                    ..
                },
            ) => ClaimVisibility::OnlyOwnedBy(claimed_by),
            (true, _) => ClaimVisibility::All,
        };

        if !matches!(visibility, ClaimVisibility::Hidden) && !found.is_empty() {
            let ids: Vec<i64> = found.iter().map(|resource| resource.id).collect();
            let claims = self.claims.find_all_by_resource_ids(&ids).await?;
            attach_claims(&mut found, claims, &visibility);
        }

        Ok(found)
    }

    /// Idempotent create on the full (owner, resource, name,
    /// credentials) key, so re-registering an existing grant returns it
    /// and rotated credentials become a new claim.
    pub async fn create_resource_claim(
        &self,
        new: NewResourceClaim,
    ) -> RegistryResult<ResourceClaim> {
        let key = new.clone();
        match self.claims.insert(new).await? {
            InsertOutcome::Created(claim) => Ok(claim),
            InsertOutcome::Conflict => {
                self.claims.find_by_natural_key(&key).await?.ok_or_else(|| {
                    RegistryError::Database(
                        "claim insert conflicted but no row matches its key".into(),
                    )
                })
            }
        }
    }
}

/// Attach each resource's claims, filtered by visibility. The input
/// claims are in creation order and grouping preserves it.
fn attach_claims(
    resources: &mut [Resource],
    claims: Vec<ResourceClaim>,
    visibility: &ClaimVisibility,
) {
    let mut by_resource: HashMap<i64, Vec<ResourceClaim>> = HashMap::new();
    for claim in claims {
        let visible = match visibility {
            ClaimVisibility::Hidden => false,
            ClaimVisibility::OnlyOwnedBy(owner) => &claim.owner_id == owner,
            ClaimVisibility::All => true,
        };
        if visible {
            by_resource.entry(claim.resource_id).or_default().push(claim);
        }
    }
    for resource in resources {
        resource.claims = Some(by_resource.remove(&resource.id).unwrap_or_default());
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use provreg_core::models::Audit;
    use serde_json::json;

    use super::*;

    fn audit() -> Audit {
        let now = Utc::now();
        Audit {
            created_date: now,
            modified_date: now,
            created_by: "provreg".into(),
            modified_by: "provreg".into(),
        }
    }

    fn resource(id: i64) -> Resource {
        Resource {
            id,
            kind: ResourceKind::MinioPolicy,
            name: format!("r{id}"),
            owner_id: PrincipalUid::generate(),
            parent_id: None,
            claims: None,
            active: true,
            set_to_cooldown_at: None,
            audit: audit(),
        }
    }

    fn claim(id: i64, resource_id: i64, owner: &PrincipalUid) -> ResourceClaim {
        ResourceClaim {
            id,
            owner_id: owner.clone(),
            resource_id,
            name: "READ".into(),
            credentials: json!({}),
            audit: audit(),
        }
    }

    #[test]
    fn attach_all_groups_by_resource_in_order() {
        let owner = PrincipalUid::generate();
        let mut resources = vec![resource(1), resource(2)];
        let claims = vec![
            claim(10, 1, &owner),
            claim(11, 2, &owner),
            claim(12, 1, &owner),
        ];

        attach_claims(&mut resources, claims, &ClaimVisibility::All);

        let first = resources[0].claims.as_ref().unwrap();
        assert_eq!(first.iter().map(|c| c.id).collect::<Vec<_>>(), vec![10, 12]);
        assert_eq!(resources[1].claims.as_ref().unwrap().len(), 1);
    }

    #[test]
    fn only_owned_by_filters_other_claimants() {
        let mine = PrincipalUid::generate();
        let theirs = PrincipalUid::generate();
        let mut resources = vec![resource(1)];
        let claims = vec![claim(10, 1, &mine), claim(11, 1, &theirs)];

        attach_claims(
            &mut resources,
            claims,
            &ClaimVisibility::OnlyOwnedBy(mine.clone()),
        );

        let attached = resources[0].claims.as_ref().unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].owner_id, mine);
    }

    #[test]
    fn resources_without_claims_get_an_empty_list_not_none() {
        let mut resources = vec![resource(1)];
        attach_claims(&mut resources, Vec::new(), &ClaimVisibility::All);
        let attached = resources[0].claims.as_ref().unwrap();
        assert!(attached.is_empty());
    }
}
