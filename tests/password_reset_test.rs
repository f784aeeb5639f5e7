//! Password-reset lifecycle against the in-memory store.

mod common;

use std::sync::Arc;

use chrono::{Duration, Utc};

use coinblazers_api::config::{PASSWORD_RESET_MESSAGE, RESET_REQUESTED_MESSAGE};
use coinblazers_api::domain::Password;
use coinblazers_api::errors::AppError;
use coinblazers_api::infra::{InMemoryStore, UserRepository};
use coinblazers_api::services::emails::PASSWORD_RESET_SUBJECT;
use coinblazers_api::services::PasswordResetManager;

use common::{seed_user, stored_reset_token, RecordingNotifier, BASE_URL};

const EMAIL: &str = "jane@example.com";

fn manager(
    store: &InMemoryStore,
    notifier: Arc<RecordingNotifier>,
) -> PasswordResetManager<InMemoryStore> {
    PasswordResetManager::new(Arc::new(store.clone()), notifier, BASE_URL, 3600)
}

#[tokio::test]
async fn test_issue_stores_token_and_mails_link() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let notifier = RecordingNotifier::new();

    let message = manager(&store, notifier.clone())
        .issue_at(EMAIL, Utc::now())
        .await
        .unwrap();
    assert_eq!(message, RESET_REQUESTED_MESSAGE);

    let token = stored_reset_token(&store, EMAIL).await.unwrap();
    assert_eq!(token.len(), 64);
    assert!(token.chars().all(|c| c.is_ascii_hexdigit()));

    let sent = notifier.sent_to(EMAIL);
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, PASSWORD_RESET_SUBJECT);
    assert!(sent[0]
        .text
        .contains(&format!("{}/reset-password/{}", BASE_URL, token)));
    assert!(sent[0].html.is_some());
}

#[tokio::test]
async fn test_issue_is_uniform_for_unknown_email() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let notifier = RecordingNotifier::new();

    let message = manager(&store, notifier.clone())
        .issue_at("nobody@example.com", Utc::now())
        .await
        .unwrap();

    assert_eq!(message, RESET_REQUESTED_MESSAGE);
    assert!(notifier.sent().is_empty());
    assert!(stored_reset_token(&store, EMAIL).await.is_none());
}

#[tokio::test]
async fn test_issue_matches_email_case_insensitively() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;

    manager(&store, RecordingNotifier::new())
        .issue_at("  Jane@Example.COM ", Utc::now())
        .await
        .unwrap();

    assert!(stored_reset_token(&store, EMAIL).await.is_some());
}

#[tokio::test]
async fn test_token_expires_after_one_hour() {
    let store = InMemoryStore::new();
    let user = seed_user(&store, EMAIL, 0).await;
    let manager = manager(&store, RecordingNotifier::new());

    let issued_at = Utc::now();
    manager.issue_at(EMAIL, issued_at).await.unwrap();
    let token = stored_reset_token(&store, EMAIL).await.unwrap();

    let holder = manager
        .validate_at(&token, issued_at + Duration::seconds(3599))
        .await
        .unwrap();
    assert_eq!(holder.id, user.id);

    let expired = manager
        .validate_at(&token, issued_at + Duration::seconds(3601))
        .await;
    assert!(matches!(expired, Err(AppError::InvalidOrExpiredToken)));

    let consume_late = manager
        .consume_at(&token, "BrandNewPass99", issued_at + Duration::seconds(3601))
        .await;
    assert!(matches!(consume_late, Err(AppError::InvalidOrExpiredToken)));
}

#[tokio::test]
async fn test_consume_is_single_use() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let manager = manager(&store, RecordingNotifier::new());

    let now = Utc::now();
    manager.issue_at(EMAIL, now).await.unwrap();
    let token = stored_reset_token(&store, EMAIL).await.unwrap();

    let message = manager
        .consume_at(&token, "BrandNewPass99", now)
        .await
        .unwrap();
    assert_eq!(message, PASSWORD_RESET_MESSAGE);

    assert!(matches!(
        manager.validate_at(&token, now).await,
        Err(AppError::InvalidOrExpiredToken)
    ));
    assert!(matches!(
        manager.consume_at(&token, "AnotherPass77", now).await,
        Err(AppError::InvalidOrExpiredToken)
    ));

    let user = UserRepository::find_by_email(&store, EMAIL)
        .await
        .unwrap()
        .unwrap();
    assert!(user.reset.is_none());
    let hash = Password::from_hash(user.password_hash);
    assert!(hash.verify("BrandNewPass99"));
    assert!(!hash.verify("AnotherPass77"));
}

#[tokio::test]
async fn test_reissue_invalidates_previous_token() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let manager = manager(&store, RecordingNotifier::new());

    let now = Utc::now();
    manager.issue_at(EMAIL, now).await.unwrap();
    let first = stored_reset_token(&store, EMAIL).await.unwrap();
    manager.issue_at(EMAIL, now).await.unwrap();
    let second = stored_reset_token(&store, EMAIL).await.unwrap();

    assert_ne!(first, second);
    assert!(matches!(
        manager.validate_at(&first, now).await,
        Err(AppError::InvalidOrExpiredToken)
    ));
    assert!(manager.validate_at(&second, now).await.is_ok());
}

#[tokio::test]
async fn test_notification_failure_keeps_token_valid() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let manager = manager(&store, RecordingNotifier::failing());

    let now = Utc::now();
    let message = manager.issue_at(EMAIL, now).await.unwrap();
    assert_eq!(message, RESET_REQUESTED_MESSAGE);

    let token = stored_reset_token(&store, EMAIL).await.unwrap();
    assert!(manager.validate_at(&token, now).await.is_ok());
}

#[tokio::test]
async fn test_short_password_leaves_token_live() {
    let store = InMemoryStore::new();
    seed_user(&store, EMAIL, 0).await;
    let manager = manager(&store, RecordingNotifier::new());

    let now = Utc::now();
    manager.issue_at(EMAIL, now).await.unwrap();
    let token = stored_reset_token(&store, EMAIL).await.unwrap();

    let result = manager.consume_at(&token, "short", now).await;
    assert!(matches!(result, Err(AppError::Validation(_))));
    assert!(manager.validate_at(&token, now).await.is_ok());
}
