//! User endpoints.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use provreg_core::models::principal::User;
use provreg_core::uid::PrincipalUid;
use serde::{Deserialize, Serialize};
use surrealdb::Connection;

use crate::api::error::{ApiError, ApiResult};
use crate::api::parse_uid;
use crate::api::response::ApiResponse;
use crate::service::UserSpec;
use crate::state::AppState;

const ENTITY: &str = "User";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPayload {
    pub user_id: String,
    pub name: String,
}

impl From<UserPayload> for UserSpec {
    fn from(payload: UserPayload) -> Self {
        Self {
            user_id: payload.user_id,
            name: payload.name,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub created_date: DateTime<Utc>,
    pub modified_date: DateTime<Utc>,
    pub created_by: String,
    pub modified_by: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id.to_string(),
            user_id: user.user_id,
            name: user.name,
            created_date: user.audit.created_date,
            modified_date: user.audit.modified_date,
            created_by: user.audit.created_by,
            modified_by: user.audit.modified_by,
        }
    }
}

pub async fn create<C: Connection>(
    State(state): State<AppState<C>>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let user = state.principals.create_user(payload.into()).await?;
    Ok(Json(ApiResponse::item(user.into())))
}

pub async fn find_by_id<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let uid = parse_uid(ENTITY, &id)?;
    let user = state
        .principals
        .find_user(&uid)
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;
    Ok(Json(ApiResponse::item(user.into())))
}

pub async fn find_all<C: Connection>(
    State(state): State<AppState<C>>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let users = state.principals.find_all_users().await?;
    Ok(Json(ApiResponse::ok(
        users.into_iter().map(Into::into).collect(),
    )))
}

pub async fn update<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
    Json(payload): Json<UserPayload>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    let uid = parse_uid(ENTITY, &id)?;
    let user = state
        .principals
        .update_user(uid, payload.into())
        .await?
        .ok_or_else(|| ApiError::not_found(ENTITY, &id))?;
    Ok(Json(ApiResponse::item(user.into())))
}

pub async fn remove<C: Connection>(
    State(state): State<AppState<C>>,
    Path(id): Path<String>,
) -> ApiResult<Json<ApiResponse<UserResponse>>> {
    // Delete succeeds whether or not the row exists.
    if let Ok(uid) = PrincipalUid::parse(&id) {
        state.principals.delete(&uid).await?;
    }
    Ok(Json(ApiResponse::empty()))
}
