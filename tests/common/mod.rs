//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;

use coinblazers_api::config::{Config, EmailDelivery, JwtSettings, MailSettings};
use coinblazers_api::domain::{AdminUpdate, NewUser, Password, User};
use coinblazers_api::errors::NotificationError;
use coinblazers_api::infra::{InMemoryStore, UserRepository};
use coinblazers_api::jobs::EmailJob;
use coinblazers_api::services::Notifier;

pub const OPERATOR_EMAIL: &str = "support@coinblazers.com";
pub const BASE_URL: &str = "https://app.coinblazers.test";
pub const PASSWORD: &str = "CorrectHorse42";

/// Notifier that keeps every email it is handed.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<EmailJob>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A notifier whose transport is down.
    pub fn failing() -> Arc<Self> {
        let notifier = Self::default();
        notifier.failing.store(true, Ordering::SeqCst);
        Arc::new(notifier)
    }

    pub fn sent(&self) -> Vec<EmailJob> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, address: &str) -> Vec<EmailJob> {
        self.sent()
            .into_iter()
            .filter(|email| email.to == address)
            .collect()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, email: EmailJob) -> Result<(), NotificationError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(NotificationError::Queue("transport unavailable".to_string()));
        }
        self.sent.lock().unwrap().push(email);
        Ok(())
    }
}

pub fn test_config() -> Config {
    Config {
        database_url: "postgres://unused".to_string(),
        redis_url: "redis://unused".to_string(),
        jwt: JwtSettings::new("integration-test-secret-at-least-32-chars", 1),
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        app_base_url: BASE_URL.to_string(),
        reset_token_ttl_seconds: 3600,
        mail: MailSettings {
            from_email: "no-reply@coinblazers.test".to_string(),
            from_name: "CoinBlazers".to_string(),
            support_email: OPERATOR_EMAIL.to_string(),
            mailjet_api_key: None,
            mailjet_api_secret: None,
            delivery: EmailDelivery::Direct,
        },
    }
}

/// Create an account with a real password hash and the given balance.
pub async fn seed_user(store: &InMemoryStore, email: &str, balance: i64) -> User {
    let user = UserRepository::create(
        store,
        NewUser {
            email: email.to_string(),
            password_hash: Password::new(PASSWORD).unwrap().into_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone_number: None,
        },
    )
    .await
    .unwrap();

    store
        .apply_admin_update(
            user.id,
            AdminUpdate {
                balance: Some(Decimal::from(balance)),
                ..Default::default()
            },
        )
        .await
        .unwrap()
}

/// The live reset token stored for `email`, if any.
pub async fn stored_reset_token(store: &InMemoryStore, email: &str) -> Option<String> {
    UserRepository::find_by_email(store, email)
        .await
        .unwrap()
        .and_then(|user| user.reset)
        .map(|reset| reset.token)
}

pub async fn balance_of(store: &InMemoryStore, email: &str) -> Decimal {
    UserRepository::find_by_email(store, email)
        .await
        .unwrap()
        .expect("user exists")
        .balance
}
