//! Application route configuration.

use axum::{extract::State, http::StatusCode, middleware, response::Json, routing::get, Router};
use serde::Serialize;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{
    admin_routes, auth_routes, forgot_password_routes, reset_password_routes, user_routes,
    withdrawal_routes,
};
use super::middleware::{
    admin_middleware, auth_middleware, rate_limit_auth_middleware, rate_limit_middleware,
};
use super::openapi::ApiDoc;
use super::AppState;
use crate::config::APP_NAME;

/// Create the application router with all routes configured
pub fn create_router(state: AppState) -> Router {
    // Public credential endpoints (strict rate limit)
    let credentials = Router::new()
        .nest("/users", auth_routes().merge(forgot_password_routes()))
        .merge(reset_password_routes())
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_auth_middleware,
        ));

    // Signed-in users (JWT + general rate limit)
    let protected = Router::new()
        .nest("/users", user_routes())
        .merge(withdrawal_routes())
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    // Operators (JWT + admin role + general rate limit)
    let admin = admin_routes()
        .route_layer(middleware::from_fn(admin_middleware))
        .route_layer(middleware::from_fn_with_state(state.clone(), auth_middleware))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_middleware,
        ));

    Router::new()
        // Health check endpoints (no rate limiting)
        .route("/", get(root))
        .route("/health", get(health))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(credentials)
        .merge(protected)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> String {
    format!("{} API", APP_NAME)
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    services: ServiceHealth,
}

#[derive(Serialize)]
struct ServiceHealth {
    database: ServiceStatus,
    redis: ServiceStatus,
}

#[derive(Serialize)]
struct ServiceStatus {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl ServiceStatus {
    fn from_result<E: std::fmt::Display>(result: Option<Result<(), E>>) -> Self {
        match result {
            None => Self {
                status: "disabled",
                error: None,
            },
            Some(Ok(())) => Self {
                status: "healthy",
                error: None,
            },
            Some(Err(e)) => Self {
                status: "unhealthy",
                error: Some(e.to_string()),
            },
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Readiness: database and Redis round-trips
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let database = match state.database.as_ref() {
        Some(db) => Some(db.ping().await),
        None => None,
    };
    let redis = match state.cache.as_ref() {
        Some(cache) => Some(cache.ping().await),
        None => None,
    };

    let services = ServiceHealth {
        database: ServiceStatus::from_result(database),
        redis: ServiceStatus::from_result(redis),
    };
    let degraded = services.database.is_unhealthy() || services.redis.is_unhealthy();

    let status_code = if degraded {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::OK
    };

    (
        status_code,
        Json(HealthResponse {
            status: if degraded { "degraded" } else { "healthy" },
            services,
        }),
    )
}
