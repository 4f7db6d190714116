//! Process configuration, read once at startup from the environment.

use axum::http::HeaderValue;
use thiserror::Error;

use farmxchain_auth::{SigningKey, TokenError};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:3000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Development-only signing key; used when `JWT_SECRET` is unset.
const DEV_JWT_SECRET: &str = "farmxchain-insecure-development-signing-key";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid JWT_SECRET: {0}")]
    SigningKey(#[from] TokenError),

    #[error("{name} is required: {reason}")]
    Missing { name: &'static str, reason: &'static str },

    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub signing_key: SigningKey,
    pub bind_addr: String,
    pub cors_origin: HeaderValue,
    pub max_upload_bytes: usize,
    /// Set when persistent stores were requested.
    pub database_url: Option<String>,
}

impl ApiConfig {
    /// Defaults for everything except the signing key.
    pub fn with_signing_key(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cors_origin: HeaderValue::from_static(DEFAULT_CORS_ORIGIN),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            database_url: None,
        }
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let signing_key = match var("JWT_SECRET") {
            Some(secret) => SigningKey::new(secret.into_bytes())?,
            None => {
                tracing::warn!("JWT_SECRET not set; using insecure dev default");
                SigningKey::new(DEV_JWT_SECRET.as_bytes())?
            }
        };

        let mut config = Self::with_signing_key(signing_key);

        if let Some(addr) = var("BIND_ADDR") {
            config.bind_addr = addr.trim().to_string();
        }

        if let Some(origin) = var("CORS_ALLOWED_ORIGIN") {
            config.cors_origin = HeaderValue::from_str(origin.trim()).map_err(|_| {
                ConfigError::Invalid {
                    name: "CORS_ALLOWED_ORIGIN",
                    value: origin.clone(),
                }
            })?;
        }

        if let Some(raw) = var("MAX_UPLOAD_BYTES") {
            config.max_upload_bytes = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or(ConfigError::Invalid {
                    name: "MAX_UPLOAD_BYTES",
                    value: raw.clone(),
                })?;
        }

        let persistent = match var("USE_PERSISTENT_STORES") {
            None => false,
            Some(raw) => {
                let normalized = raw.trim().to_ascii_lowercase();
                match normalized.as_str() {
                    "true" | "1" | "yes" => true,
                    "false" | "0" | "no" => false,
                    _ => {
                        return Err(ConfigError::Invalid {
                            name: "USE_PERSISTENT_STORES",
                            value: raw,
                        });
                    }
                }
            }
        };

        if persistent {
            let url = var("DATABASE_URL").ok_or(ConfigError::Missing {
                name: "DATABASE_URL",
                reason: "USE_PERSISTENT_STORES is enabled",
            })?;
            config.database_url = Some(url);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = ApiConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.bind_addr, DEFAULT_BIND_ADDR);
        assert_eq!(config.cors_origin, DEFAULT_CORS_ORIGIN);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
        assert!(config.database_url.is_none());
    }

    #[test]
    fn short_secret_is_rejected() {
        let err = ApiConfig::from_lookup(lookup(&[("JWT_SECRET", "short")])).unwrap_err();
        assert!(matches!(err, ConfigError::SigningKey(TokenError::KeyTooShort { .. })));
    }

    #[test]
    fn overrides_are_read() {
        let config = ApiConfig::from_lookup(lookup(&[
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("BIND_ADDR", "127.0.0.1:9000"),
            ("CORS_ALLOWED_ORIGIN", "https://farmxchain.example"),
            ("MAX_UPLOAD_BYTES", "2048"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr, "127.0.0.1:9000");
        assert_eq!(config.cors_origin, "https://farmxchain.example");
        assert_eq!(config.max_upload_bytes, 2048);
    }

    #[test]
    fn persistent_stores_need_a_database_url() {
        let err = ApiConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "true")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing { name: "DATABASE_URL", .. }));

        let config = ApiConfig::from_lookup(lookup(&[
            ("USE_PERSISTENT_STORES", "true"),
            ("DATABASE_URL", "postgres://localhost/farmxchain"),
        ]))
        .unwrap();
        assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/farmxchain"));
    }

    #[test]
    fn malformed_values_are_rejected() {
        assert!(ApiConfig::from_lookup(lookup(&[("MAX_UPLOAD_BYTES", "lots")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("MAX_UPLOAD_BYTES", "0")])).is_err());
        assert!(ApiConfig::from_lookup(lookup(&[("USE_PERSISTENT_STORES", "maybe")])).is_err());
    }
}
