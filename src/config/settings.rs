//! Application settings loaded from environment variables.

use std::env;
use std::str::FromStr;

use thiserror::Error;

use super::constants::{
    APP_NAME, DEFAULT_APP_BASE_URL, DEFAULT_DATABASE_URL, DEFAULT_JWT_EXPIRATION_HOURS,
    DEFAULT_REDIS_URL, DEFAULT_RESET_TOKEN_TTL_SECONDS, DEFAULT_SERVER_HOST, DEFAULT_SERVER_PORT,
    DEFAULT_SUPPORT_EMAIL, MIN_JWT_SECRET_LENGTH,
};

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("JWT_SECRET environment variable must be set in production")]
    MissingJwtSecret,

    #[error("JWT_SECRET must be at least {0} characters long")]
    WeakJwtSecret(usize),

    #[error("Invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },
}

/// How notification emails leave the process
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmailDelivery {
    /// Enqueue into the durable job queue, delivered by `jobs work`
    Queue,
    /// Send inline through the mail transport
    Direct,
}

impl FromStr for EmailDelivery {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "queue" => Ok(EmailDelivery::Queue),
            "direct" => Ok(EmailDelivery::Direct),
            _ => Err(ConfigError::InvalidValue {
                name: "EMAIL_DELIVERY",
                value: s.to_string(),
            }),
        }
    }
}

/// JWT signing parameters handed to the authenticator
#[derive(Clone)]
pub struct JwtSettings {
    secret: String,
    pub expiration_hours: i64,
}

impl JwtSettings {
    pub fn new(secret: impl Into<String>, expiration_hours: i64) -> Self {
        Self {
            secret: secret.into(),
            expiration_hours,
        }
    }

    /// Get JWT secret bytes for token signing/verification.
    pub fn secret_bytes(&self) -> &[u8] {
        self.secret.as_bytes()
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &"[REDACTED]")
            .field("expiration_hours", &self.expiration_hours)
            .finish()
    }
}

/// Outgoing mail settings
#[derive(Clone)]
pub struct MailSettings {
    pub from_email: String,
    pub from_name: String,
    pub support_email: String,
    pub mailjet_api_key: Option<String>,
    pub mailjet_api_secret: Option<String>,
    pub delivery: EmailDelivery,
}

impl MailSettings {
    /// Mailjet credentials, if both halves are present
    pub fn mailjet_credentials(&self) -> Option<(&str, &str)> {
        match (&self.mailjet_api_key, &self.mailjet_api_secret) {
            (Some(key), Some(secret)) => Some((key.as_str(), secret.as_str())),
            _ => None,
        }
    }
}

impl std::fmt::Debug for MailSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailSettings")
            .field("from_email", &self.from_email)
            .field("from_name", &self.from_name)
            .field("support_email", &self.support_email)
            .field("mailjet_api_key", &self.mailjet_api_key.as_ref().map(|_| "[REDACTED]"))
            .field("mailjet_api_secret", &self.mailjet_api_secret.as_ref().map(|_| "[REDACTED]"))
            .field("delivery", &self.delivery)
            .finish()
    }
}

/// Application configuration
#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub jwt: JwtSettings,
    pub server_host: String,
    pub server_port: u16,
    pub app_base_url: String,
    pub reset_token_ttl_seconds: i64,
    pub mail: MailSettings,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("redis_url", &"[REDACTED]")
            .field("jwt", &self.jwt)
            .field("server_host", &self.server_host)
            .field("server_port", &self.server_port)
            .field("app_base_url", &self.app_base_url)
            .field("reset_token_ttl_seconds", &self.reset_token_ttl_seconds)
            .field("mail", &self.mail)
            .finish()
    }
}

impl Config {
    /// Load configuration from `.env` and environment variables.
    ///
    /// # Errors
    /// Fails if JWT_SECRET is missing in a release build, too short, or if a
    /// variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let jwt_secret = match env::var("JWT_SECRET") {
            Ok(secret) => secret,
            Err(_) if cfg!(debug_assertions) => {
                tracing::warn!("JWT_SECRET not set, using insecure default for development");
                "dev-secret-key-minimum-32-chars!!".to_string()
            }
            Err(_) => return Err(ConfigError::MissingJwtSecret),
        };

        if jwt_secret.len() < MIN_JWT_SECRET_LENGTH {
            return Err(ConfigError::WeakJwtSecret(MIN_JWT_SECRET_LENGTH));
        }

        let delivery = match env::var("EMAIL_DELIVERY") {
            Ok(value) => value.parse()?,
            Err(_) => EmailDelivery::Queue,
        };

        let reset_token_ttl_seconds =
            parse_var("RESET_TOKEN_TTL_SECONDS", DEFAULT_RESET_TOKEN_TTL_SECONDS)?;
        if reset_token_ttl_seconds <= 0 {
            return Err(ConfigError::InvalidValue {
                name: "RESET_TOKEN_TTL_SECONDS",
                value: reset_token_ttl_seconds.to_string(),
            });
        }

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            redis_url: env::var("REDIS_URL").unwrap_or_else(|_| DEFAULT_REDIS_URL.to_string()),
            jwt: JwtSettings::new(
                jwt_secret,
                parse_var("JWT_EXPIRATION_HOURS", DEFAULT_JWT_EXPIRATION_HOURS)?,
            ),
            server_host: env::var("SERVER_HOST")
                .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
            server_port: parse_var("SERVER_PORT", DEFAULT_SERVER_PORT)?,
            app_base_url: env::var("APP_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or_else(|_| DEFAULT_APP_BASE_URL.to_string()),
            reset_token_ttl_seconds,
            mail: MailSettings {
                from_email: env::var("MAIL_FROM_EMAIL")
                    .unwrap_or_else(|_| DEFAULT_SUPPORT_EMAIL.to_string()),
                from_name: env::var("MAIL_FROM_NAME").unwrap_or_else(|_| APP_NAME.to_string()),
                support_email: env::var("SUPPORT_EMAIL")
                    .unwrap_or_else(|_| DEFAULT_SUPPORT_EMAIL.to_string()),
                mailjet_api_key: env::var("MAILJET_API_KEY").ok(),
                mailjet_api_secret: env::var("MAILJET_API_SECRET").ok(),
                delivery,
            },
        })
    }

    /// Get the full server address.
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

/// Parse an optional variable, falling back to `default` when unset.
fn parse_var<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(value) => value
            .parse()
            .map_err(|_| ConfigError::InvalidValue { name, value }),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_delivery_parse() {
        assert_eq!("queue".parse::<EmailDelivery>().unwrap(), EmailDelivery::Queue);
        assert_eq!(" Direct ".parse::<EmailDelivery>().unwrap(), EmailDelivery::Direct);
        assert!("smtp".parse::<EmailDelivery>().is_err());
    }

    #[test]
    fn test_jwt_settings_debug_redacts_secret() {
        let jwt = JwtSettings::new("super-secret-value-that-is-long-enough", 24);
        let rendered = format!("{:?}", jwt);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn test_mailjet_credentials_require_both_halves() {
        let mut mail = MailSettings {
            from_email: "support@coinblazers.com".to_string(),
            from_name: APP_NAME.to_string(),
            support_email: "support@coinblazers.com".to_string(),
            mailjet_api_key: Some("key".to_string()),
            mailjet_api_secret: None,
            delivery: EmailDelivery::Direct,
        };
        assert!(mail.mailjet_credentials().is_none());

        mail.mailjet_api_secret = Some("secret".to_string());
        assert_eq!(mail.mailjet_credentials(), Some(("key", "secret")));
    }
}
