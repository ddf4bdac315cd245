// ============================
// parley-backend-lib/src/handlers.rs
// ============================
//! HTTP request handlers for the auth endpoints.
use crate::auth;
use crate::error::AppError;
use crate::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use parley_common::{LoginRequest, SignupRequest};
use std::sync::Arc;

/// `POST /signup`
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, AppError> {
    auth::signup(state.store.as_ref(), req).await?;

    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "message": "Account successfully created" })),
    ))
}

/// `POST /login`
pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let fullname = auth::login(state.store.as_ref(), req).await?;

    Ok(Json(serde_json::json!({
        "message": "Login Successful",
        "fullname": fullname,
    })))
}
