// ABOUTME: Environment-based server configuration with typed sections
// ABOUTME: Parses ports, database, identity provider, and HTTP limits from env vars
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::env;
use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use ironlog_core::constants::identity::{DEFAULT_JWKS_REFRESH_SECS, JWKS_WELL_KNOWN_PATH};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default listen port
const DEFAULT_HTTP_PORT: u16 = 8080;
/// Default database location
const DEFAULT_DATABASE_URL: &str = "sqlite:./data/ironlog.db";
/// Default pool size for file databases
const DEFAULT_MAX_CONNECTIONS: u32 = 10;
/// Default per-request deadline
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Request body cap
const DEFAULT_MAX_BODY_BYTES: usize = 256 * 1024;

/// Strongly typed log level configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Error level
    Error,
    /// Warning level
    Warn,
    /// Info level (default)
    #[default]
    Info,
    /// Debug level
    Debug,
    /// Trace level
    Trace,
}

impl LogLevel {
    /// Parse from string with fallback to info
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "error" => Self::Error,
            "warn" => Self::Warn,
            "debug" => Self::Debug,
            "trace" => Self::Trace,
            _ => Self::Info,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Error => write!(f, "error"),
            Self::Warn => write!(f, "warn"),
            Self::Info => write!(f, "info"),
            Self::Debug => write!(f, "debug"),
            Self::Trace => write!(f, "trace"),
        }
    }
}

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Local development (default)
    #[default]
    Development,
    /// Production deployment
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback to development
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Database settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// sqlx connection string
    pub url: String,
    /// Pool size for file-backed databases
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_owned(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

/// OpenID Connect provider settings used to verify bearer tokens
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    /// Expected `iss` claim
    pub issuer: Option<String>,
    /// Expected `aud` claim (the app client id)
    pub client_id: Option<String>,
    /// Explicit key set location, overriding the issuer well-known path
    pub jwks_url: Option<String>,
    /// Interval between scheduled key refreshes, in seconds
    pub jwks_refresh_secs: u64,
}

impl IdentityConfig {
    /// Derive the Cognito issuer for a region and user pool
    #[must_use]
    pub fn cognito_issuer(region: &str, user_pool_id: &str) -> String {
        format!("https://cognito-idp.{region}.amazonaws.com/{user_pool_id}")
    }

    /// Key set location: explicit URL or the issuer's well-known path
    #[must_use]
    pub fn resolved_jwks_url(&self) -> Option<String> {
        self.jwks_url.clone().or_else(|| {
            self.issuer
                .as_deref()
                .map(|issuer| format!("{}{JWKS_WELL_KNOWN_PATH}", issuer.trim_end_matches('/')))
        })
    }

    /// Whether issuer and client id are both known
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.issuer.is_some() && self.client_id.is_some()
    }

    /// Scheduled refresh interval
    #[must_use]
    pub const fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.jwks_refresh_secs)
    }
}

/// HTTP surface settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Allowed CORS origins; `*` allows any
    pub cors_origins: Vec<String>,
    /// Per-request deadline in seconds
    pub request_timeout_secs: u64,
    /// Largest accepted request body
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            cors_origins: vec!["*".to_owned()],
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }
}

/// Top-level server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP listen port
    pub http_port: u16,
    /// Log level
    pub log_level: LogLevel,
    /// Deployment environment
    pub environment: Environment,
    /// Database settings
    pub database: DatabaseConfig,
    /// Token verification settings
    pub identity: IdentityConfig,
    /// HTTP surface settings
    pub http: HttpConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_port: DEFAULT_HTTP_PORT,
            log_level: LogLevel::default(),
            environment: Environment::default(),
            database: DatabaseConfig::default(),
            identity: IdentityConfig {
                jwks_refresh_secs: DEFAULT_JWKS_REFRESH_SECS,
                ..IdentityConfig::default()
            },
            http: HttpConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric variable does not parse or the
    /// configuration fails [`ServerConfig::validate`]
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let issuer = non_empty_var("OIDC_ISSUER").or_else(|| {
            match (
                non_empty_var("COGNITO_REGION"),
                non_empty_var("COGNITO_USER_POOL_ID"),
            ) {
                (Some(region), Some(pool)) => Some(IdentityConfig::cognito_issuer(&region, &pool)),
                _ => None,
            }
        });

        let config = Self {
            http_port: env_var_or("HTTP_PORT", &DEFAULT_HTTP_PORT.to_string())
                .parse()
                .context("Invalid HTTP_PORT value")?,
            log_level: LogLevel::from_str_or_default(&env_var_or("RUST_LOG", "info")),
            environment: Environment::from_str_or_default(&env_var_or(
                "ENVIRONMENT",
                "development",
            )),
            database: DatabaseConfig {
                url: env_var_or("DATABASE_URL", DEFAULT_DATABASE_URL),
                max_connections: env_var_or(
                    "DATABASE_MAX_CONNECTIONS",
                    &DEFAULT_MAX_CONNECTIONS.to_string(),
                )
                .parse()
                .context("Invalid DATABASE_MAX_CONNECTIONS value")?,
            },
            identity: IdentityConfig {
                issuer,
                client_id: non_empty_var("OIDC_CLIENT_ID")
                    .or_else(|| non_empty_var("COGNITO_CLIENT_ID")),
                jwks_url: non_empty_var("OIDC_JWKS_URL"),
                jwks_refresh_secs: env_var_or(
                    "JWKS_REFRESH_SECS",
                    &DEFAULT_JWKS_REFRESH_SECS.to_string(),
                )
                .parse()
                .context("Invalid JWKS_REFRESH_SECS value")?,
            },
            http: HttpConfig {
                cors_origins: parse_origins(&env_var_or("CORS_ALLOWED_ORIGINS", "*")),
                request_timeout_secs: env_var_or(
                    "REQUEST_TIMEOUT_SECS",
                    &DEFAULT_REQUEST_TIMEOUT_SECS.to_string(),
                )
                .parse()
                .context("Invalid REQUEST_TIMEOUT_SECS value")?,
                max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            },
        };

        config.validate()?;
        info!("{}", config.summary());
        Ok(config)
    }

    /// Check cross-field rules
    ///
    /// # Errors
    ///
    /// Returns an error in production when the identity provider is incomplete,
    /// or when the request timeout is zero
    pub fn validate(&self) -> Result<()> {
        if !self.identity.is_complete() {
            if self.environment.is_production() {
                return Err(anyhow::anyhow!(
                    "OIDC_ISSUER (or COGNITO_REGION + COGNITO_USER_POOL_ID) and OIDC_CLIENT_ID are required in production"
                ));
            }
            warn!("Identity provider is not configured; every authenticated request will be rejected");
        }

        if self.http.request_timeout_secs == 0 {
            return Err(anyhow::anyhow!("REQUEST_TIMEOUT_SECS must be positive"));
        }

        Ok(())
    }

    /// Human-readable summary without secrets
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Ironlog Server Configuration:\n\
             - HTTP Port: {}\n\
             - Environment: {}\n\
             - Log Level: {}\n\
             - Database: {}\n\
             - OIDC Issuer: {}\n\
             - CORS Origins: {}\n\
             - Request Timeout: {}s",
            self.http_port,
            self.environment,
            self.log_level,
            self.database.url,
            self.identity.issuer.as_deref().unwrap_or("(not configured)"),
            self.http.cors_origins.join(","),
            self.http.request_timeout_secs,
        )
    }
}

fn env_var_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_owned())
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins() {
        assert_eq!(parse_origins("*"), vec!["*"]);
        assert_eq!(
            parse_origins("https://a.example, https://b.example,"),
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn test_cognito_issuer_and_jwks_url() {
        let identity = IdentityConfig {
            issuer: Some(IdentityConfig::cognito_issuer("eu-west-1", "eu-west-1_abc")),
            client_id: Some("client".into()),
            jwks_url: None,
            jwks_refresh_secs: DEFAULT_JWKS_REFRESH_SECS,
        };
        assert_eq!(
            identity.resolved_jwks_url().as_deref(),
            Some("https://cognito-idp.eu-west-1.amazonaws.com/eu-west-1_abc/.well-known/jwks.json")
        );
        assert!(identity.is_complete());
    }

    #[test]
    fn test_production_requires_identity() {
        let config = ServerConfig {
            environment: Environment::Production,
            ..ServerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
    }
}
