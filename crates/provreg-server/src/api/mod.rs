//! HTTP API: axum router and per-entity handler modules.

pub mod application_deployment;
pub mod auth;
pub mod error;
pub mod resource;
pub mod response;
pub mod user;

use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use provreg_core::uid::PrincipalUid;
use surrealdb::Connection;
use tower_http::trace::TraceLayer;

use crate::api::error::ApiError;
use crate::state::AppState;

/// A malformed principal id in the path cannot name an existing row,
/// so it gets the same not-found answer as an unknown one.
pub(crate) fn parse_uid(entity: &'static str, id: &str) -> Result<PrincipalUid, ApiError> {
    PrincipalUid::parse(id).map_err(|_| ApiError::not_found(entity, id))
}

pub fn router<C: Connection>(state: AppState<C>) -> Router {
    Router::new()
        .route(
            "/applicationDeployment",
            post(application_deployment::create::<C>)
                .get(application_deployment::find_all::<C>),
        )
        .route(
            "/applicationDeployment/{id}",
            get(application_deployment::find_by_id::<C>)
                .put(application_deployment::update::<C>)
                .patch(application_deployment::migrate::<C>)
                .delete(application_deployment::remove::<C>),
        )
        .route("/user", post(user::create::<C>).get(user::find_all::<C>))
        .route(
            "/user/{id}",
            get(user::find_by_id::<C>)
                .put(user::update::<C>)
                .delete(user::remove::<C>),
        )
        .route(
            "/resource",
            post(resource::create::<C>).get(resource::find_all::<C>),
        )
        .route(
            "/resource/{id}",
            get(resource::find_by_id::<C>)
                .put(resource::update::<C>)
                .patch(resource::update_active::<C>),
        )
        .route("/resource/{id}/claims", post(resource::create_claim::<C>))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_bearer::<C>,
        ))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
