//! Authentication service - registration, login and token verification.

use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::emails;
use super::notification::{notify, Notifier};
use crate::config::{JwtSettings, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::domain::{normalize_email, NewUser, Password, RegisterUser, User};
use crate::errors::{AppError, AppResult};
use crate::infra::UnitOfWork;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Signed access token
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Lifetime in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Authenticated user together with a fresh token
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: User,
    pub token: TokenResponse,
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account and sign the new user in
    async fn register(&self, request: RegisterUser) -> AppResult<AuthSession>;

    /// Check credentials and issue a token
    async fn login(&self, email: String, password: String) -> AppResult<AuthSession>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

/// Registration, login and HS256 token handling.
///
/// Unknown emails and wrong passwords both answer `InvalidCredentials`
/// after a full hash verification, so response time does not reveal
/// which one failed.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    notifier: Arc<dyn Notifier>,
    jwt: JwtSettings,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, notifier: Arc<dyn Notifier>, jwt: JwtSettings) -> Self {
        Self { uow, notifier, jwt }
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.jwt.expiration_hours);

        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            role: user.role.to_string(),
            exp: expires_at.timestamp(),
            iat: now.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt.secret_bytes()),
        )?;

        Ok(TokenResponse {
            access_token: token,
            token_type: TOKEN_TYPE_BEARER.to_string(),
            expires_in: self.jwt.expiration_hours * SECONDS_PER_HOUR,
        })
    }
}

/// Real Argon2 hash checked against when the email is unknown, so a miss
/// costs the same as a wrong password.
fn dummy_password() -> Option<&'static Password> {
    static DUMMY: OnceLock<Option<Password>> = OnceLock::new();
    DUMMY
        .get_or_init(|| Password::new("dummy-password-for-timing").ok())
        .as_ref()
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(&self, request: RegisterUser) -> AppResult<AuthSession> {
        let email = normalize_email(&request.email);
        let users = self.uow.users();

        if users.find_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("User with this email"));
        }

        let password_hash = Password::new(&request.password)?.into_string();
        let user = users
            .create(NewUser {
                email,
                password_hash,
                first_name: request.first_name.trim().to_string(),
                last_name: request.last_name.trim().to_string(),
                phone_number: request.phone_number,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        notify(self.notifier.as_ref(), emails::welcome(&user), "welcome").await;

        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    async fn login(&self, email: String, password: String) -> AppResult<AuthSession> {
        let user = self.uow.users().find_by_email(&normalize_email(&email)).await?;

        let Some(user) = user else {
            if let Some(dummy) = dummy_password() {
                dummy.verify(&password);
            }
            return Err(AppError::InvalidCredentials);
        };

        if !Password::from_hash(user.password_hash.as_str()).verify(&password) {
            tracing::debug!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let token = self.issue_token(&user)?;
        Ok(AuthSession { user, token })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt.secret_bytes()),
            &Validation::default(),
        )?;

        Ok(token_data.claims)
    }
}
