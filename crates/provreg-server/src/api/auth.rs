//! Shared-secret bearer authentication.
//!
//! Active only when a token is configured; every request must then
//! carry `Authorization: Bearer <token>`. With no token configured the
//! middleware passes everything through.

use axum::Json;
use axum::extract::{Request, State};
use axum::http::{StatusCode, header};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use surrealdb::Connection;

use crate::api::response::ApiResponse;
use crate::state::AppState;

pub async fn require_bearer<C: Connection>(
    State(state): State<AppState<C>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.auth_token.as_deref() else {
        return next.run(request).await;
    };

    let supplied = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "));

    if supplied == Some(expected) {
        next.run(request).await
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<serde_json::Value>::failure(
                "Invalid or missing bearer token",
            )),
        )
            .into_response()
    }
}
