//! Integration tests for the Resource and ResourceClaim repository
//! implementations using in-memory SurrealDB.

use provreg_core::models::claim::NewResourceClaim;
use provreg_core::models::resource::{NewResource, ResourceKind, UpdateResource};
use provreg_core::repository::{
    InsertOutcome, ResourceClaimRepository, ResourceRepository,
};
use provreg_core::uid::PrincipalUid;
use provreg_db::repository::{SurrealResourceClaimRepository, SurrealResourceRepository};
use serde_json::json;
use surrealdb::Surreal;
use surrealdb::engine::local::Mem;

type LocalDb = surrealdb::engine::local::Db;

/// Helper: spin up in-memory DB and run migrations.
async fn setup() -> (
    SurrealResourceRepository<LocalDb>,
    SurrealResourceClaimRepository<LocalDb>,
) {
    let db = Surreal::new::<Mem>(()).await.unwrap();
    db.use_ns("test").use_db("test").await.unwrap();
    provreg_db::run_migrations(&db).await.unwrap();
    (
        SurrealResourceRepository::new(db.clone()),
        SurrealResourceClaimRepository::new(db),
    )
}

fn owner() -> PrincipalUid {
    PrincipalUid::generate()
}

fn new_resource(name: &str, owner_id: &PrincipalUid) -> NewResource {
    NewResource {
        kind: ResourceKind::MinioPolicy,
        name: name.into(),
        owner_id: owner_id.clone(),
        parent_id: None,
    }
}

fn created<T>(outcome: InsertOutcome<T>) -> T {
    match outcome {
        InsertOutcome::Created(value) => value,
        InsertOutcome::Conflict => panic!("unexpected conflict"),
    }
}

#[tokio::test]
async fn ids_are_assigned_from_a_monotonic_sequence() {
    let (resources, _) = setup().await;
    let owner = owner();

    let first = created(resources.insert(new_resource("one", &owner)).await.unwrap());
    let second = created(resources.insert(new_resource("two", &owner)).await.unwrap());

    assert!(second.id > first.id);
    assert!(first.active);
    assert!(first.set_to_cooldown_at.is_none());
}

#[tokio::test]
async fn duplicate_natural_key_reports_conflict() {
    let (resources, _) = setup().await;
    let owner = owner();

    created(resources.insert(new_resource("db", &owner)).await.unwrap());
    assert!(matches!(
        resources.insert(new_resource("db", &owner)).await.unwrap(),
        InsertOutcome::Conflict
    ));

    // A different parent is a different natural key.
    let with_parent = NewResource {
        parent_id: Some(99),
        ..new_resource("db", &owner)
    };
    assert!(matches!(
        resources.insert(with_parent).await.unwrap(),
        InsertOutcome::Created(_)
    ));

    // So is a different owner.
    assert!(matches!(
        resources.insert(new_resource("db", &self::owner())).await.unwrap(),
        InsertOutcome::Created(_)
    ));
}

#[tokio::test]
async fn natural_key_lookup_matches_the_conflicting_row() {
    let (resources, _) = setup().await;
    let owner = owner();

    let existing = created(resources.insert(new_resource("db", &owner)).await.unwrap());
    let found = resources
        .find_by_natural_key(ResourceKind::MinioPolicy, "db", &owner, None)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(found.id, existing.id);

    assert!(resources
        .find_by_natural_key(ResourceKind::MinioPolicy, "db", &owner, Some(7))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn update_replaces_fields() {
    let (resources, _) = setup().await;
    let owner = owner();
    let new_owner = self::owner();

    let resource = created(resources.insert(new_resource("old", &owner)).await.unwrap());

    let updated = resources
        .update(UpdateResource {
            id: resource.id,
            kind: ResourceKind::ManagedOracleSchema,
            name: "new".into(),
            owner_id: new_owner.clone(),
            parent_id: Some(3),
        })
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.id, resource.id);
    assert_eq!(updated.kind, ResourceKind::ManagedOracleSchema);
    assert_eq!(updated.name, "new");
    assert_eq!(updated.owner_id, new_owner);
    assert_eq!(updated.parent_id, Some(3));
    assert_eq!(updated.audit.created_date, resource.audit.created_date);

    assert!(resources
        .update(UpdateResource {
            id: 424242,
            kind: ResourceKind::MinioPolicy,
            name: "ghost".into(),
            owner_id: owner,
            parent_id: None,
        })
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn deactivation_round_trip_toggles_cooldown() {
    let (resources, _) = setup().await;
    let resource = created(
        resources
            .insert(new_resource("cooldown", &owner()))
            .await
            .unwrap(),
    );

    let deactivated = resources
        .update_active(resource.id, false)
        .await
        .unwrap()
        .unwrap();
    assert!(!deactivated.active);
    let cooldown = deactivated.set_to_cooldown_at.expect("cooldown must be set");
    assert!(cooldown >= resource.audit.created_date);

    let reactivated = resources
        .update_active(resource.id, true)
        .await
        .unwrap()
        .unwrap();
    assert!(reactivated.active);
    assert!(reactivated.set_to_cooldown_at.is_none());

    assert!(resources.update_active(424242, false).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_kind_and_name_is_an_exact_match() {
    let (resources, _) = setup().await;

    created(resources.insert(new_resource("shared", &owner())).await.unwrap());
    created(resources.insert(new_resource("shared", &owner())).await.unwrap());
    created(resources.insert(new_resource("other", &owner())).await.unwrap());

    let found = resources
        .find_by_kind_and_name(ResourceKind::MinioPolicy, "shared")
        .await
        .unwrap();
    assert_eq!(found.len(), 2);

    let none = resources
        .find_by_kind_and_name(ResourceKind::ExternalSchema, "shared")
        .await
        .unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn claimed_by_returns_claimed_resources_with_optional_filters() {
    let (resources, claims) = setup().await;
    let claimant = owner();

    let claimed_a = created(
        resources
            .insert(NewResource {
                kind: ResourceKind::ManagedPostgresDatabase,
                ..new_resource("alpha", &owner())
            })
            .await
            .unwrap(),
    );
    let claimed_b = created(resources.insert(new_resource("beta", &owner())).await.unwrap());
    // Unclaimed noise.
    created(resources.insert(new_resource("gamma", &owner())).await.unwrap());

    for resource_id in [claimed_a.id, claimed_b.id] {
        created(
            claims
                .insert(NewResourceClaim {
                    owner_id: claimant.clone(),
                    resource_id,
                    name: "READ".into(),
                    credentials: json!({"user": "u"}),
                })
                .await
                .unwrap(),
        );
    }

    let all = resources
        .find_claimed_by(&claimant, None, None)
        .await
        .unwrap();
    assert_eq!(
        all.iter().map(|r| r.id).collect::<Vec<_>>(),
        vec![claimed_a.id, claimed_b.id]
    );

    let by_name = resources
        .find_claimed_by(&claimant, Some("alpha"), None)
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].id, claimed_a.id);

    let by_kind = resources
        .find_claimed_by(&claimant, None, Some(ResourceKind::ManagedPostgresDatabase))
        .await
        .unwrap();
    assert_eq!(by_kind.len(), 1);
    assert_eq!(by_kind[0].id, claimed_a.id);

    let nothing = resources
        .find_claimed_by(&owner(), None, None)
        .await
        .unwrap();
    assert!(nothing.is_empty());
}

#[tokio::test]
async fn multiple_claims_on_one_resource_list_it_once() {
    let (resources, claims) = setup().await;
    let claimant = owner();

    let resource = created(resources.insert(new_resource("multi", &owner())).await.unwrap());
    for name in ["READ", "ADMIN"] {
        created(
            claims
                .insert(NewResourceClaim {
                    owner_id: claimant.clone(),
                    resource_id: resource.id,
                    name: name.into(),
                    credentials: json!({}),
                })
                .await
                .unwrap(),
        );
    }

    let found = resources
        .find_claimed_by(&claimant, None, None)
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn claim_creation_is_guarded_by_its_full_natural_key() {
    let (resources, claims) = setup().await;
    let claimant = owner();
    let resource = created(resources.insert(new_resource("r", &owner())).await.unwrap());

    let claim = NewResourceClaim {
        owner_id: claimant.clone(),
        resource_id: resource.id,
        name: "READ".into(),
        credentials: json!({"password": "s3cret"}),
    };

    let first = created(claims.insert(claim.clone()).await.unwrap());
    assert!(matches!(
        claims.insert(claim.clone()).await.unwrap(),
        InsertOutcome::Conflict
    ));

    let existing = claims.find_by_natural_key(&claim).await.unwrap().unwrap();
    assert_eq!(existing.id, first.id);
    assert_eq!(existing.credentials, json!({"password": "s3cret"}));

    // Same grant with different credentials is a new claim.
    let rotated = NewResourceClaim {
        credentials: json!({"password": "rotated"}),
        ..claim.clone()
    };
    assert!(matches!(
        claims.insert(rotated).await.unwrap(),
        InsertOutcome::Created(_)
    ));

    // A different claim name is a new claim as well.
    let admin = NewResourceClaim {
        name: "ADMIN".into(),
        ..claim
    };
    assert!(matches!(
        claims.insert(admin).await.unwrap(),
        InsertOutcome::Created(_)
    ));
}

#[tokio::test]
async fn claims_listing_preserves_creation_order() {
    let (resources, claims) = setup().await;
    let resource = created(resources.insert(new_resource("ordered", &owner())).await.unwrap());

    let mut claim_ids = Vec::new();
    for i in 0..3 {
        let claim = created(
            claims
                .insert(NewResourceClaim {
                    owner_id: owner(),
                    resource_id: resource.id,
                    name: format!("claim-{i}"),
                    credentials: json!({}),
                })
                .await
                .unwrap(),
        );
        claim_ids.push(claim.id);
    }

    let listed = claims
        .find_all_by_resource_ids(&[resource.id])
        .await
        .unwrap();
    assert_eq!(listed.iter().map(|c| c.id).collect::<Vec<_>>(), claim_ids);

    assert!(claims.find_all_by_resource_ids(&[]).await.unwrap().is_empty());
}
