//! ApplicationDeployment endpoints.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use provreg_core::models::principal::ApplicationDeployment;
use provreg_core::uid::PrincipalUid;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse_uid;
use crate::api::response::ApiResponse;
use crate::service::AdSpec;
use crate::state::AppState;

const ENTITY: &str = "ApplicationDeployment";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdPayload {
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    #[serde(default)]
    pub application_name: Option<String>,
}

impl From<AdPayload> for AdSpec {
    fn from(payload: AdPayload) -> Self {
        Self {
            name: payload.name,
            environment_name: payload.environment_name,
            cluster: payload.cluster,
            business_group: payload.business_group,
            application_name: payload.application_name,
        }
    }
}

/// Partial update used when a deployment moves between environments,
/// clusters or business groups. Absent or blank fields are untouched.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdMigrationPayload {
    pub environment_name: Option<String>,
    pub cluster: Option<String>,
    pub business_group: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdResponse {
    pub id: String,
    pub name: String,
    pub environment_name: String,
    pub cluster: String,
    pub business_group: String,
    pub application_name: Option<String>,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

impl From<ApplicationDeployment> for AdResponse {
    fn from(ad: ApplicationDeployment) -> Self {
        Self {
            id: ad.id.to_string(),
            name: ad.name,
            environment_name: ad.environment_name,
            cluster: ad.cluster,
            business_group: ad.business_group,
            application_name: ad.application_name,
            created_date: ad.audit.created_date,
            modified_date: ad.audit.modified_date,
            created_by: ad.audit.created_by,
            modified_by: ad.audit.modified_by,
        }
    }
}

fn provided(field: &Option<String>) -> Option<&str> {
    field.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn merge_migration(existing: &ApplicationDeployment, payload: &AdMigrationPayload) -> AdSpec {
    AdSpec {
        name: existing.name.clone(),
        environment_name: provided(&payload.environment_name)
            .unwrap_or(&existing.environment_name)
            .to_string(),
        cluster: provided(&payload.cluster)
            .unwrap_or(&existing.cluster)
            .to_string(),
        business_group: provided(&payload.business_group)
            .unwrap_or(&existing.business_group)
            .to_string(),
        application_name: existing.application_name.clone(),
    }
}

pub async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Json(payload): Json<AdPayload>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let ad = state
        .principals
        .create_application_deployment(payload.into())
        .await?;
    Ok(Json(ApiResponse::item(ad.into())))
}

pub async fn find_by_id<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let uid = parse_uid(ENTITY, &id)?;
    let ad = state
        .principals
        .find_application_deployment(&uid)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;
    Ok(Json(ApiResponse::item(ad.into())))
}

pub async fn find_all<C: Connection>(
    State(state): State<AppState<C>>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let ads = state.principals.find_all_application_deployments().await?;
    Ok(Json(ApiResponse::ok(
        ads.into_iter().map(Into::into).collect(),
    )))
}

pub async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(payload): Json<AdPayload>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    let uid = parse_uid(ENTITY, &id)?;
    let ad = state
        .principals
        .update_application_deployment(uid, payload.into())
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;
    Ok(Json(ApiResponse::item(ad.into())))
}

pub async fn migrate<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(payload): Json<AdMigrationPayload>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    if provided(&payload.environment_name).is_none()
        && provided(&payload.cluster).is_none()
        && provided(&payload.business_group).is_none()
    {
        return Err(ApiError::bad_request(
            "At least one property must have a valid value",
        ));
    }

    let uid = parse_uid(ENTITY, &id)?;
    let existing = state
        .principals
        .find_application_deployment(&uid)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;

    let spec = merge_migration(&existing, &payload);
    let ad = state
        .principals
        .update_application_deployment(uid, spec)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;
    Ok(Json(ApiResponse::item(ad.into())))
}

pub async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<AdResponse>>> {
    // Delete succeeds whether or not the row exists.
    if let Ok(uid) = PrincipalUid::parse(&id) {
        state.principals.delete(&uid).await?;
    }
    Ok(Json(ApiResponse::empty()))
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use provreg_core::models::Audit;

    use super::*;

    fn existing() -> ApplicationDeployment {
        let now = Utc::now();
        ApplicationDeployment {
            id: PrincipalUid::generate(),
            name: "whoami".into(),
            environment_name: "dev".into(),
            cluster: "east".into(),
            business_group: "payments".into(),
            application_name: Some("app".into()),
            audit: Audit {
                created_date: now,
                modified_date: now,
                created_by: "provreg".into(),
                modified_by: "provreg".into(),
            },
        }
    }

    #[test]
    fn migration_touches_only_provided_fields() {
        let merged = merge_migration(
            &existing(),
            &AdMigrationPayload {
                environment_name: Some("prod".into()),
                ..Default::default()
            },
        );
        assert_eq!(merged.environment_name, "prod");
        assert_eq!(merged.cluster, "east");
        assert_eq!(merged.business_group, "payments");
        assert_eq!(merged.name, "whoami");
        assert_eq!(merged.application_name.as_deref(), Some("app"));
    }

    #[test]
    fn blank_migration_fields_count_as_absent() {
        let merged = merge_migration(
            &existing(),
            &AdMigrationPayload {
                environment_name: Some("  ".into()),
                cluster: Some("west".into()),
                ..Default::default()
            },
        );
        assert_eq!(merged.environment_name, "dev");
        assert_eq!(merged.cluster, "west");
    }
}
