//! Password-reset grant: an opaque token plus its expiry.

use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};

use crate::config::RESET_TOKEN_BYTES;

/// Pending reset grant stored on the user.
///
/// Token and expiry always travel together, so a token without an expiry
/// (or the reverse) cannot be represented.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordReset {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl PasswordReset {
    /// Draw a fresh token from the OS RNG, valid for `ttl_seconds` after `now`.
    pub fn generate(now: DateTime<Utc>, ttl_seconds: i64) -> Self {
        let mut bytes = [0u8; RESET_TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);

        Self {
            token: hex::encode(bytes),
            expires_at: now + Duration::seconds(ttl_seconds),
        }
    }

    /// Whether the grant still permits a reset at `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Whether `token` matches this grant and is still live at `now`.
    pub fn accepts(&self, token: &str, now: DateTime<Utc>) -> bool {
        !token.is_empty() && self.token == token && self.is_valid_at(now)
    }
}

impl std::fmt::Debug for PasswordReset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PasswordReset")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
