//! Resource and claim endpoints.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use provreg_core::models::claim::{NewResourceClaim, ResourceClaim};
use provreg_core::models::resource::{NewResource, Resource, ResourceKind, UpdateResource};
use provreg_core::uid::PrincipalUid;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::api::response::ApiResponse;
use crate::service::FindParams;
use crate::state::AppState;

const ENTITY: &str = "Resource";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourcePayload {
    pub name: String,
    pub kind: ResourceKind,
    pub owner_id: String,
    #[serde(default)]
    pub parent_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimPayload {
    pub owner_id: String,
    pub name: String,
    pub credentials: serde_json::Value,
}

#[derive(Debug, Deserialize)]
pub struct ActivePayload {
    pub active: bool,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceQuery {
    pub claimed_by: Option<String>,
    pub name: Option<String>,
    pub kind: Option<String>,
    pub include_claims: Option<bool>,
    pub only_my_claims: Option<bool>,
    pub include_deactivated: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceItemQuery {
    pub include_claims: Option<bool>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimResponse {
    pub id: i64,
    pub owner_id: String,
    pub resource_id: i64,
    pub name: String,
    pub credentials: serde_json::Value,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

impl From<ResourceClaim> for ClaimResponse {
    fn from(claim: ResourceClaim) -> Self {
        Self {
            id: claim.id,
            owner_id: claim.owner_id.to_string(),
            resource_id: claim.resource_id,
            name: claim.name,
            credentials: claim.credentials,
            created_date: claim.audit.created_date,
            modified_date: claim.audit.modified_date,
            created_by: claim.audit.created_by,
            modified_by: claim.audit.modified_by,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceResponse {
    pub id: i64,
    pub kind: ResourceKind,
    pub name: String,
    pub owner_id: String,
    pub parent_id: Option<i64>,
    /// Absent entirely when claims were not requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub claims: Option<Vec<ClaimResponse>>,
    pub active: bool,
    pub set_to_cooldown_at: Option<DateTime<Utc>>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

impl From<Resource> for ResourceResponse {
    fn from(resource: Resource) -> Self {
        Self {
            id: resource.id,
            kind: resource.kind,
            name: resource.name,
            owner_id: resource.owner_id.to_string(),
            parent_id: resource.parent_id,
            claims: resource
                .claims
                .map(|claims| claims.into_iter().map(Into::into).collect()),
            active: resource.active,
            set_to_cooldown_at: resource.set_to_cooldown_at,
            created_date: resource.audit.created_date,
            modified_date: resource.audit.modified_date,
            created_by: resource.audit.created_by,
            modified_by: resource.audit.modified_by,
        }
    }
}

pub async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Json(payload): Json<ResourcePayload>,
) -> ApiResult<Json<ApiResponse<ResourceResponse>>> {
    let owner = PrincipalUid::parse(&payload.owner_id)
        .map_err(|_| ApiError::not_found("Principal", &payload.owner_id))?;
    if !state.principals.exists(&owner).await? {
        return Err(ApiError::not_found("Principal", &payload.owner_id));
    }

    let resource = state
        .resources
        .create_resource(NewResource {
            kind: payload.kind,
            name: payload.name,
            owner_id: owner,
            parent_id: payload.parent_id,
        })
        .await?;
    Ok(Json(ApiResponse::item(resource.into())))
}

pub async fn find_by_id<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
    Query(query): Query<ResourceItemQuery>,
) -> ApiResult<Json<ApiResponse<ResourceResponse>>> {
    let include_claims = query.include_claims.unwrap_or(false);
    let resource = state
        .resources
        .find_by_id(id, include_claims)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, id))?;
    Ok(Json(ApiResponse::item(resource.into())))
}

pub async fn find_all<C: Connection>(
    State(state): State<AppState<C>>,
    Query(query): Query<ResourceQuery>,
) -> ApiResult<Json<ApiResponse<ResourceResponse>>> {
    let include_claims = query.include_claims.unwrap_or(true);
    let only_my_claims = query.only_my_claims.unwrap_or(true);
    let include_deactivated = query.include_deactivated.unwrap_or(false);
    let kind = query
        .kind
        .as_deref()
        .map(str::parse::<ResourceKind>)
        .transpose()?;

    let params = if let Some(claimed_by) = &query.claimed_by {
        // An unknown (or malformed) claimant has claimed nothing.
        let Ok(uid) = PrincipalUid::parse(claimed_by) else {
            return Ok(Json(ApiResponse::empty()));
        };
        if !state.principals.exists(&uid).await? {
            return Ok(Json(ApiResponse::empty()));
        }
        FindParams::ByClaimedBy {
            claimed_by: uid,
            name: query.name.clone(),
            kind,
            only_my_claims,
        }
    } else {
        match (query.name.clone(), kind) {
            (Some(name), Some(kind)) => FindParams::ByNameAndKind { name, kind },
            _ => {
                return Err(ApiError::bad_request(
                    "Either claimedBy or both name and kind must be supplied",
                ));
            }
        }
    };

    let found = state
        .resources
        .find_all_by_params(params, include_claims, include_deactivated)
        .await?;
    Ok(Json(ApiResponse::ok(
        found.into_iter().map(Into::into).collect(),
    )))
}

pub async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
    Json(payload): Json<ResourcePayload>,
) -> ApiResult<Json<ApiResponse<ResourceResponse>>> {
    if !state.resources.exists(id).await? {
        return Err(ApiError::not_found(ENTITY, id));
    }
    let owner = PrincipalUid::parse(&payload.owner_id).map_err(|_| {
        ApiError::bad_request(format!(
            "Principal with id={} does not exist",
            payload.owner_id
        ))
    })?;
    if !state.principals.exists(&owner).await? {
        return Err(ApiError::bad_request(format!(
            "Principal with id={} does not exist",
            payload.owner_id
        )));
    }

    let resource = state
        .resources
        .update_resource(UpdateResource {
            id,
            kind: payload.kind,
            name: payload.name,
            owner_id: owner,
            parent_id: payload.parent_id,
        })
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, id))?;
    Ok(Json(ApiResponse::item(resource.into())))
}

pub async fn update_active<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
    Json(payload): Json<ActivePayload>,
) -> ApiResult<Json<ApiResponse<ResourceResponse>>> {
    let resource = state
        .resources
        .update_active(id, payload.active)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, id))?;
    Ok(Json(ApiResponse::item(resource.into())))
}

pub async fn create_claim<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<i64>,
    Json(payload): Json<ClaimPayload>,
) -> ApiResult<Json<ApiResponse<ClaimResponse>>> {
    if !payload.credentials.is_object() {
        return Err(ApiError::bad_request("credentials must be a JSON object"));
    }
    let owner = PrincipalUid::parse(&payload.owner_id).map_err(|_| {
        ApiError::bad_request(format!(
            "Principal with id={} does not exist",
            payload.owner_id
        ))
    })?;
    if !state.principals.exists(&owner).await? {
        return Err(ApiError::bad_request(format!(
            "Principal with id={} does not exist",
            payload.owner_id
        )));
    }
    if !state.resources.exists(id).await? {
        return Err(ApiError::bad_request(format!(
            "Resource with id={id} does not exist"
        )));
    }

    let claim = state
        .resources
        .create_resource_claim(NewResourceClaim {
            owner_id: owner,
            resource_id: id,
            name: payload.name,
            credentials: payload.credentials,
        })
        .await?;
    Ok(Json(ApiResponse::item(claim.into())))
}
