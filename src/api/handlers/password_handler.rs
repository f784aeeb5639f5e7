//! Password-reset handlers.

use axum::{
    extract::{Path, State},
    response::Json,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::ValidatedJson;
use crate::api::AppState;
use crate::errors::AppResult;
use crate::types::MessageResponse;

/// Reset request.
///
/// The address format is not checked; every input gets the same
/// confirmation.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ForgotPasswordRequest {
    #[schema(example = "jane@example.com")]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    #[schema(example = "NewSecurePass123!", min_length = 8)]
    pub password: String,
}

/// Answer for a live reset link
#[derive(Debug, Serialize, ToSchema)]
pub struct ResetTokenStatus {
    pub valid: bool,
}

/// Reset routes; `forgot` is mounted under `/users`, `reset` at the root
pub fn forgot_password_routes() -> Router<AppState> {
    Router::new().route("/forgot-password", post(forgot_password))
}

pub fn reset_password_routes() -> Router<AppState> {
    Router::new().route(
        "/reset-password/:token",
        get(validate_reset_token).post(reset_password),
    )
}

/// Request a password-reset link
///
/// The answer is the same whether or not the address is registered.
#[utoipa::path(
    post,
    path = "/users/forgot-password",
    tag = "Password reset",
    request_body = ForgotPasswordRequest,
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 429, description = "Too many requests")
    )
)]
pub async fn forgot_password(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = state.password_reset().issue(payload.email).await?;
    Ok(Json(MessageResponse::new(message)))
}

/// Check a reset link before showing the new-password form
#[utoipa::path(
    get,
    path = "/reset-password/{token}",
    tag = "Password reset",
    params(("token" = String, Path, description = "Reset token from the emailed link")),
    responses(
        (status = 200, description = "Token is live", body = ResetTokenStatus),
        (status = 400, description = "Invalid or expired token")
    )
)]
pub async fn validate_reset_token(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> AppResult<Json<ResetTokenStatus>> {
    state.password_reset().validate(token).await?;
    Ok(Json(ResetTokenStatus { valid: true }))
}

/// Set a new password with a live reset token
#[utoipa::path(
    post,
    path = "/reset-password/{token}",
    tag = "Password reset",
    params(("token" = String, Path, description = "Reset token from the emailed link")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = MessageResponse),
        (status = 400, description = "Invalid or expired token, or weak password")
    )
)]
pub async fn reset_password(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let message = state
        .password_reset()
        .consume(token, payload.password)
        .await?;
    Ok(Json(MessageResponse::new(message)))
}
