//! Operator-only handlers.

use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, patch},
    Extension, Router,
};
use uuid::Uuid;

use crate::api::extractors::ValidatedJson;
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::domain::{AdminUpdate, UserResponse};
use crate::errors::AppResult;
use crate::types::{Paginated, PaginationParams};

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/admin/users/:id", patch(update_user))
}

/// List every account
#[utoipa::path(
    get,
    path = "/users",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(PaginationParams),
    responses(
        (status = 200, description = "One page of accounts with paging metadata"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required")
    )
)]
pub async fn list_users(
    State(state): State<AppState>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let (users, total) = state.users().list_users(params.clone()).await?;
    let data = users.into_iter().map(UserResponse::from).collect();
    Ok(Json(Paginated::new(data, &params, total)))
}

/// Set an account's balance and flags
#[utoipa::path(
    patch,
    path = "/admin/users/{id}",
    tag = "Admin",
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Account ID")),
    request_body = AdminUpdate,
    responses(
        (status = 200, description = "Updated account", body = UserResponse),
        (status = 400, description = "Invalid update"),
        (status = 401, description = "Not authenticated"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Account not found")
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<Uuid>,
    ValidatedJson(payload): ValidatedJson<AdminUpdate>,
) -> AppResult<Json<UserResponse>> {
    tracing::info!(admin_id = %current_user.id, user_id = %id, "Admin account update");
    let user = state.users().admin_update(id, payload).await?;
    Ok(Json(UserResponse::from(user)))
}
