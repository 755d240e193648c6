// ABOUTME: RS256 access-token verification against an OIDC issuer's published key set
// ABOUTME: Checks signature, expiry, issuer, and audience (aud or client_id claim)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::sync::Arc;

use async_trait::async_trait;
use ironlog_core::errors::{AppError, AppResult};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, decode_header, Algorithm, Validation};
use serde::Deserialize;
use tracing::{debug, warn};

use super::jwks::JwksCache;
use super::{TokenVerifier, VerifiedIdentity};
use crate::config::environment::IdentityConfig;

/// `aud` may be a single string or a list
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Audience {
    One(String),
    Many(Vec<String>),
}

impl Audience {
    fn contains(&self, expected: &str) -> bool {
        match self {
            Self::One(value) => value == expected,
            Self::Many(values) => values.iter().any(|value| value == expected),
        }
    }
}

/// Claims read from an access or ID token
#[derive(Debug, Deserialize)]
struct TokenClaims {
    sub: String,
    #[serde(default)]
    aud: Option<Audience>,
    /// Cognito access tokens carry the app client here instead of `aud`
    #[serde(default)]
    client_id: Option<String>,
}

impl TokenClaims {
    fn is_for_client(&self, client_id: &str) -> bool {
        self.aud.as_ref().is_some_and(|aud| aud.contains(client_id))
            || self.client_id.as_deref() == Some(client_id)
    }
}

/// Verifies bearer tokens issued by one OIDC provider
pub struct OidcVerifier {
    issuer: String,
    client_id: String,
    keys: Arc<JwksCache>,
}

impl OidcVerifier {
    /// Verifier for `issuer` tokens addressed to `client_id`
    #[must_use]
    pub const fn new(issuer: String, client_id: String, keys: Arc<JwksCache>) -> Self {
        Self {
            issuer,
            client_id,
            keys,
        }
    }

    /// Build from configuration; `None` when issuer or client id is missing
    #[must_use]
    pub fn from_config(config: &IdentityConfig) -> Option<Self> {
        let issuer = config.issuer.clone()?;
        let client_id = config.client_id.clone()?;
        let url = config.resolved_jwks_url()?;
        let keys = Arc::new(JwksCache::new(url, config.refresh_interval()));
        Some(Self::new(issuer, client_id, keys))
    }

    /// Shared key cache, for scheduling refreshes
    #[must_use]
    pub const fn key_cache(&self) -> &Arc<JwksCache> {
        &self.keys
    }
}

#[async_trait]
impl TokenVerifier for OidcVerifier {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode token header");
            AppError::unauthorized("Invalid token format")
        })?;

        let kid = header.kid.ok_or_else(|| {
            debug!("Token missing key ID (kid) in header");
            AppError::unauthorized("Token missing key ID")
        })?;

        let key = self.keys.decoding_key(&kid).await?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_issuer(&[self.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        // Audience is checked below so that `client_id` tokens are accepted too
        validation.validate_aud = false;

        let data = decode::<TokenClaims>(token, &key, &validation).map_err(|e| {
            debug!(error = %e, "Token validation failed");
            match e.kind() {
                ErrorKind::ExpiredSignature => AppError::unauthorized("Token expired"),
                ErrorKind::InvalidIssuer => AppError::unauthorized("Invalid token issuer"),
                ErrorKind::InvalidAlgorithm => AppError::unauthorized("Unsupported token algorithm"),
                _ => AppError::unauthorized("Invalid token"),
            }
        })?;

        if !data.claims.is_for_client(&self.client_id) {
            warn!(subject = %data.claims.sub, "Token issued for a different client");
            return Err(AppError::unauthorized("Invalid token audience"));
        }
        if data.claims.sub.trim().is_empty() {
            return Err(AppError::unauthorized("Token subject is empty"));
        }

        Ok(VerifiedIdentity {
            subject: data.claims.sub,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(raw: &str) -> TokenClaims {
        serde_json::from_str(raw).unwrap()
    }

    #[test]
    fn test_audience_forms() {
        assert!(claims(r#"{"sub":"a","aud":"app"}"#).is_for_client("app"));
        assert!(claims(r#"{"sub":"a","aud":["x","app"]}"#).is_for_client("app"));
        assert!(claims(r#"{"sub":"a","client_id":"app"}"#).is_for_client("app"));
        assert!(!claims(r#"{"sub":"a","aud":"other"}"#).is_for_client("app"));
        assert!(!claims(r#"{"sub":"a"}"#).is_for_client("app"));
    }

    #[test]
    fn test_from_config_requires_issuer_and_client() {
        let mut config = IdentityConfig {
            issuer: Some("https://issuer.example".into()),
            client_id: None,
            jwks_url: None,
            jwks_refresh_secs: 60,
        };
        assert!(OidcVerifier::from_config(&config).is_none());

        config.client_id = Some("app".into());
        let verifier = OidcVerifier::from_config(&config).unwrap();
        assert_eq!(
            verifier.key_cache().url(),
            "https://issuer.example/.well-known/jwks.json"
        );
    }
}
