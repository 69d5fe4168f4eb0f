//! Application configuration loaded from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use actix_web::cookie::Key;
use quill_infra::{PasswordConfig, RateLimitConfig};

#[cfg(feature = "database")]
use quill_infra::DatabaseConfig;

/// Minimum length of `SECRET_KEY`, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Configuration errors that stop the server from starting.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least {MIN_SECRET_LEN} bytes long")]
    SecretTooShort,

    #[error("SECRET_KEY must be set when RUST_ENV is production")]
    MissingSecret,
}

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub secret: Option<String>,
    pub cookie_secure: bool,
    pub production: bool,
}

impl SessionConfig {
    /// Derive the cookie signing and encryption key.
    ///
    /// Without a secret, development builds get an ephemeral key; sessions then
    /// do not survive a restart.
    pub fn key(&self) -> Result<Key, ConfigError> {
        match &self.secret {
            Some(secret) if secret.len() >= MIN_SECRET_LEN => Ok(Key::derive_from(secret.as_bytes())),
            Some(_) => Err(ConfigError::SecretTooShort),
            None if self.production => Err(ConfigError::MissingSecret),
            None => {
                tracing::warn!("SECRET_KEY not set. Using an ephemeral session key.");
                Ok(Key::generate())
            }
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    #[cfg(feature = "database")]
    pub database: DatabaseConfig,
    pub auto_migrate: bool,
    pub session: SessionConfig,
    pub rate_limit: RateLimitConfig,
    pub passwords: PasswordConfig,
    pub templates_dir: Option<PathBuf>,
}

fn parsed<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.parse().ok())
}

fn flag(name: &str, default: bool) -> bool {
    env::var(name)
        .map(|v| !matches!(v.to_lowercase().as_str(), "0" | "false" | "no" | "off"))
        .unwrap_or(default)
}

impl AppConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        #[cfg(feature = "database")]
        let database = {
            let defaults = DatabaseConfig::default();
            DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or(defaults.url),
                max_connections: parsed("DB_MAX_CONNECTIONS").unwrap_or(defaults.max_connections),
                min_connections: parsed("DB_MIN_CONNECTIONS").unwrap_or(defaults.min_connections),
            }
        };

        let passwords = {
            let defaults = PasswordConfig::default();
            PasswordConfig {
                memory_kib: parsed("ARGON2_MEMORY_KIB").unwrap_or(defaults.memory_kib),
                iterations: parsed("ARGON2_ITERATIONS").unwrap_or(defaults.iterations),
                parallelism: parsed("ARGON2_PARALLELISM").unwrap_or(defaults.parallelism),
                pepper: env::var("PASSWORD_PEPPER").ok().filter(|s| !s.is_empty()),
            }
        };

        let production = env::var("RUST_ENV")
            .map(|v| v == "production" || v == "prod")
            .unwrap_or(false);

        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: parsed("PORT").unwrap_or(8080),
            #[cfg(feature = "database")]
            database,
            auto_migrate: flag("AUTO_MIGRATE", true),
            session: SessionConfig {
                secret: env::var("SECRET_KEY").ok().filter(|s| !s.is_empty()),
                cookie_secure: flag("SESSION_COOKIE_SECURE", production),
                production,
            },
            rate_limit: RateLimitConfig {
                max_requests: parsed("RATE_LIMIT_MAX_REQUESTS").unwrap_or(10),
                window: Duration::from_secs(parsed("RATE_LIMIT_WINDOW_SECS").unwrap_or(60)),
            },
            passwords,
            templates_dir: env::var("TEMPLATES_DIR").ok().map(PathBuf::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session(secret: Option<&str>, production: bool) -> SessionConfig {
        SessionConfig {
            secret: secret.map(str::to_string),
            cookie_secure: false,
            production,
        }
    }

    #[test]
    fn test_short_secret_is_rejected() {
        assert!(matches!(
            session(Some("too-short"), false).key(),
            Err(ConfigError::SecretTooShort)
        ));
    }

    #[test]
    fn test_same_secret_derives_same_key() {
        let secret = "0123456789abcdef0123456789abcdef-quill";

        let a = session(Some(secret), true).key().unwrap();
        let b = session(Some(secret), true).key().unwrap();

        assert_eq!(a.master(), b.master());
    }

    #[test]
    fn test_missing_secret_only_fails_in_production() {
        assert!(session(None, false).key().is_ok());
        assert!(matches!(
            session(None, true).key(),
            Err(ConfigError::MissingSecret)
        ));
    }
}
