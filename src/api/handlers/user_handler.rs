//! Profile self-service handlers.

use axum::{
    extract::State,
    response::Json,
    routing::get,
    Extension, Router,
};

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{ProfileUpdate, TransactionResponse, UserResponse};
use crate::errors::AppResult;

/// Profile routes, mounted under `/users`
pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/profile",
            get(get_profile).post(update_profile).delete(delete_profile),
        )
        .route("/profile/transactions", get(list_transactions))
}

/// Get the caller's profile
#[utoipa::path(
    get,
    path = "/users/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current user", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn get_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users().get_user(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// Edit the caller's profile
#[utoipa::path(
    post,
    path = "/users/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    request_body = ProfileUpdate,
    responses(
        (status = 200, description = "Updated profile", body = UserResponse),
        (status = 400, description = "Invalid update"),
        (status = 401, description = "Not authenticated"),
        (status = 409, description = "Email already registered")
    )
)]
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<ProfileUpdate>,
) -> AppResult<Json<UserResponse>> {
    let user = state
        .users()
        .update_profile(current_user.id, payload)
        .await?;
    Ok(Json(UserResponse::from(user)))
}

/// Delete the caller's account
#[utoipa::path(
    delete,
    path = "/users/profile",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Deleted account", body = UserResponse),
        (status = 401, description = "Not authenticated"),
        (status = 404, description = "Account no longer exists")
    )
)]
pub async fn delete_profile(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<UserResponse>> {
    let user = state.users().delete_account(current_user.id).await?;
    Ok(Json(UserResponse::from(user)))
}

/// The caller's ledger, newest first
#[utoipa::path(
    get,
    path = "/users/profile/transactions",
    tag = "Profile",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Transaction history", body = [TransactionResponse]),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<TransactionResponse>>> {
    let transactions = state.users().transaction_history(current_user.id).await?;
    Ok(Json(
        transactions
            .into_iter()
            .map(TransactionResponse::from)
            .collect(),
    ))
}
