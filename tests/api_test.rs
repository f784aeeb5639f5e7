//! HTTP tests for the full router.
//!
//! The router runs over the in-memory store with no Redis or Postgres, so
//! rate limiting is off and the health check reports both as disabled.

mod common;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;
use uuid::Uuid;

use coinblazers_api::api::{create_router, AppState};
use coinblazers_api::config::{PASSWORD_RESET_MESSAGE, RESET_REQUESTED_MESSAGE};
use coinblazers_api::domain::UserRole;
use coinblazers_api::infra::InMemoryStore;
use coinblazers_api::services::Services;

use common::{balance_of, seed_user, stored_reset_token, test_config, RecordingNotifier, PASSWORD};

struct TestApp {
    router: Router,
    store: InMemoryStore,
    notifier: Arc<RecordingNotifier>,
}

impl TestApp {
    fn new() -> Self {
        let store = InMemoryStore::new();
        let notifier = RecordingNotifier::new();
        let services = Services::from_store(
            Arc::new(store.clone()),
            notifier.clone(),
            &test_config(),
        );
        let router = create_router(AppState::new(Arc::new(services)));

        Self {
            router,
            store,
            notifier,
        }
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .request(
                Method::POST,
                "/users/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        body["token"]["accessToken"].as_str().unwrap().to_string()
    }

    /// Seed an account and sign it in
    async fn signed_in(&self, email: &str, balance: i64) -> (Uuid, String) {
        let user = seed_user(&self.store, email, balance).await;
        (user.id, self.login(email).await)
    }

    async fn signed_in_admin(&self, email: &str) -> (Uuid, String) {
        let user = seed_user(&self.store, email, 0).await;
        self.store.set_role(user.id, UserRole::Admin).await.unwrap();
        (user.id, self.login(email).await)
    }
}

fn error_code(body: &Value) -> &str {
    body["error"]["code"].as_str().unwrap_or_default()
}

#[tokio::test]
async fn test_root_and_health() {
    let app = TestApp::new();

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "CoinBlazers API");

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["services"]["database"]["status"], "disabled");
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new();
    let (status, body) = app
        .request(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/withdraw"].is_object());
}

#[tokio::test]
async fn test_register_returns_user_and_token() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/users/register",
            None,
            Some(json!({
                "email": "jane@example.com",
                "password": PASSWORD,
                "firstName": "Jane",
                "lastName": "Doe"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED, "{}", body);
    assert_eq!(body["user"]["email"], "jane@example.com");
    assert_eq!(body["user"]["balance"], "0");
    assert!(body["user"].get("passwordHash").is_none());
    assert_eq!(body["token"]["tokenType"], "Bearer");
    assert_eq!(app.notifier.sent_to("jane@example.com").len(), 1);
}

#[tokio::test]
async fn test_register_validation_error() {
    let app = TestApp::new();
    let (status, body) = app
        .request(
            Method::POST,
            "/users/register",
            None,
            Some(json!({
                "email": "not-an-email",
                "password": "short",
                "firstName": "Jane",
                "lastName": "Doe"
            })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new();
    seed_user(&app.store, "jane@example.com", 0).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "WrongPass123" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_profile_requires_token() {
    let app = TestApp::new();

    let (status, _) = app.request(Method::GET, "/users/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/users/profile", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_round_trip() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("jane@example.com", 0).await;

    let (status, body) = app
        .request(Method::GET, "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["firstName"], "Jane");

    let (status, body) = app
        .request(
            Method::POST,
            "/users/profile",
            Some(&token),
            Some(json!({ "lastName": "Smith", "phoneNumber": "+15555550199" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["lastName"], "Smith");
    assert_eq!(body["phoneNumber"], "+15555550199");
}

#[tokio::test]
async fn test_profile_update_rejects_unknown_fields() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("jane@example.com", 0).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/users/profile",
            Some(&token),
            Some(json!({ "balance": "1000000" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "VALIDATION_ERROR");
    assert_eq!(balance_of(&app.store, "jane@example.com").await, Decimal::ZERO);
}

#[tokio::test]
async fn test_delete_profile() {
    let app = TestApp::new();
    let (id, token) = app.signed_in("jane@example.com", 0).await;

    let (status, body) = app
        .request(Method::DELETE, "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id.to_string());

    let (status, _) = app
        .request(Method::GET, "/users/profile", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_withdraw_and_history() {
    let app = TestApp::new();
    let (id, token) = app.signed_in("jane@example.com", 500).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": "200", "userId": id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Withdrawal successful");
    assert_eq!(body["transaction"]["type"], "withdrawal");
    assert_eq!(
        balance_of(&app.store, "jane@example.com").await,
        Decimal::from(300)
    );

    let (status, body) = app
        .request(Method::GET, "/users/profile/transactions", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let history = body.as_array().unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["amount"], "200");
}

#[tokio::test]
async fn test_withdraw_failures() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("jane@example.com", 100).await;

    for amount in [json!("abc"), json!(0), json!(-5), Value::Null] {
        let (status, body) = app
            .request(
                Method::POST,
                "/withdraw",
                Some(&token),
                Some(json!({ "amount": amount })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(error_code(&body), "INVALID_AMOUNT");
    }

    let (status, body) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": 150 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INSUFFICIENT_FUNDS");

    assert_eq!(app.store.transaction_count().await, 0);
    assert_eq!(
        balance_of(&app.store, "jane@example.com").await,
        Decimal::from(100)
    );
}

#[tokio::test]
async fn test_withdraw_from_other_account_forbidden() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("jane@example.com", 100).await;
    let other = seed_user(&app.store, "john@example.com", 100).await;

    let (status, _) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": 10, "userId": other.id })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(
        balance_of(&app.store, "john@example.com").await,
        Decimal::from(100)
    );
}

#[tokio::test]
async fn test_admin_withdraws_for_user_and_unknown_user_is_404() {
    let app = TestApp::new();
    let (admin_id, token) = app.signed_in_admin("ops@example.com").await;
    let customer = seed_user(&app.store, "jane@example.com", 100).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": 40, "userId": customer.id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["transaction"]["requestedBy"], admin_id.to_string());
    assert_eq!(body["transaction"]["accountId"], customer.id.to_string());

    let (status, body) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": 40, "userId": Uuid::new_v4() })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), "USER_NOT_FOUND");
}

#[tokio::test]
async fn test_admin_routes_require_admin() {
    let app = TestApp::new();
    let (id, token) = app.signed_in("jane@example.com", 0).await;

    let (status, _) = app.request(Method::GET, "/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/admin/users/{}", id),
            Some(&token),
            Some(json!({ "balance": "1000" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(balance_of(&app.store, "jane@example.com").await, Decimal::ZERO);
}

#[tokio::test]
async fn test_admin_lists_and_updates_accounts() {
    let app = TestApp::new();
    let (_, token) = app.signed_in_admin("ops@example.com").await;
    let customer = seed_user(&app.store, "jane@example.com", 0).await;

    let (status, body) = app
        .request(Method::GET, "/users?page=1&per_page=10", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let uri = format!("/admin/users/{}", customer.id);
    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "balance": "250.50", "isFrozen": true })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["balance"], "250.50");
    assert_eq!(body["isFrozen"], true);

    let (status, _) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "balance": "-1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(Method::PATCH, &uri, Some(&token), Some(json!({ "email": "x@y.z" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .request(
            Method::PATCH,
            &format!("/admin/users/{}", Uuid::new_v4()),
            Some(&token),
            Some(json!({ "isFrozen": false })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_password_reset_over_http() {
    let app = TestApp::new();
    seed_user(&app.store, "jane@example.com", 0).await;

    for email in ["jane@example.com", "nobody@example.com"] {
        let (status, body) = app
            .request(
                Method::POST,
                "/users/forgot-password",
                None,
                Some(json!({ "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], RESET_REQUESTED_MESSAGE);
    }

    let token = stored_reset_token(&app.store, "jane@example.com")
        .await
        .unwrap();
    let uri = format!("/reset-password/{}", token);

    let (status, body) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = app
        .request(
            Method::POST,
            &uri,
            None,
            Some(json!({ "password": "BrandNewPass99" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], PASSWORD_RESET_MESSAGE);

    let (status, body) = app.request(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_OR_EXPIRED_TOKEN");

    let (status, _) = app
        .request(
            Method::POST,
            "/users/login",
            None,
            Some(json!({ "email": "jane@example.com", "password": "BrandNewPass99" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_forgot_password_is_uniform_for_malformed_address() {
    let app = TestApp::new();

    for email in ["not-an-email", ""] {
        let (status, body) = app
            .request(
                Method::POST,
                "/users/forgot-password",
                None,
                Some(json!({ "email": email })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", body);
        assert_eq!(body["message"], RESET_REQUESTED_MESSAGE);
    }
    assert!(app.notifier.sent().is_empty());
}

#[tokio::test]
async fn test_withdraw_checks_amount_before_account() {
    let app = TestApp::new();
    let (_, token) = app.signed_in("jane@example.com", 100).await;

    let (status, body) = app
        .request(
            Method::POST,
            "/withdraw",
            Some(&token),
            Some(json!({ "amount": -5, "userId": "abc" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), "INVALID_AMOUNT");

    for user_id in [json!("abc"), json!(7)] {
        let (status, body) = app
            .request(
                Method::POST,
                "/withdraw",
                Some(&token),
                Some(json!({ "amount": 10, "userId": user_id })),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(error_code(&body), "USER_NOT_FOUND");
    }

    assert_eq!(app.store.transaction_count().await, 0);
}

#[tokio::test]
async fn test_list_users_with_huge_page_is_empty() {
    let app = TestApp::new();
    let (_, token) = app.signed_in_admin("ops@example.com").await;

    let uri = format!("/users?page={}&per_page=100", u64::MAX);
    let (status, body) = app.request(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert!(body["data"].as_array().unwrap().is_empty());
    assert_eq!(body["meta"]["total"], 1);
}

#[tokio::test]
async fn test_admin_balance_must_fit_money_column() {
    let app = TestApp::new();
    let (_, token) = app.signed_in_admin("ops@example.com").await;
    let customer = seed_user(&app.store, "jane@example.com", 0).await;
    let uri = format!("/admin/users/{}", customer.id);

    for balance in ["10.005", "1000000000000000000"] {
        let (status, body) = app
            .request(
                Method::PATCH,
                &uri,
                Some(&token),
                Some(json!({ "balance": balance })),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", balance);
        assert_eq!(error_code(&body), "VALIDATION_ERROR");
    }

    let (status, body) = app
        .request(
            Method::PATCH,
            &uri,
            Some(&token),
            Some(json!({ "balance": "10.50" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(balance_of(&app.store, "jane@example.com").await, Decimal::new(1050, 2));
}
