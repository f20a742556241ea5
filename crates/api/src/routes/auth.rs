//! Authentication routes for login and register.

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use spendflow_shared::auth::{LoginRequest, RegisterRequest};

use crate::{AppState, error::ApiError};

/// Creates the auth router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/register", post(register))
}

/// POST /auth/login - Authenticate user and return a token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.auth.login(payload).await?;
    Ok(Json(response))
}

/// POST /auth/register - Create a user and return a token.
async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let response = state.auth.register(payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}
