// ABOUTME: Identity context resolving a bearer credential to a stable external subject
// ABOUTME: Verifier trait with the OIDC implementation and a static table for tests and local runs
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

//! # Identity
//!
//! The HTTP layer only needs one thing from the identity provider: given a
//! bearer token, who is calling? [`TokenVerifier`] is that seam.
//! [`OidcVerifier`] checks RS256 access tokens against a remote key set;
//! [`StaticTokenVerifier`] maps fixed tokens to subjects.

use std::collections::HashMap;

use async_trait::async_trait;
use ironlog_core::errors::{AppError, AppResult};

/// Key set fetching and caching
pub mod jwks;
/// OIDC access token verification
pub mod oidc;

pub use jwks::JwksCache;
pub use oidc::OidcVerifier;

/// Caller identity established by a verified token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Provider subject; maps to the profile's external id
    pub subject: String,
}

/// Turns a bearer token into a verified identity
#[async_trait]
pub trait TokenVerifier: Send + Sync {
    /// Verify `token`
    ///
    /// # Errors
    ///
    /// Returns `UNAUTHORIZED` for any token that cannot be verified
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity>;
}

/// Verifier backed by a fixed token table
#[derive(Debug, Clone, Default)]
pub struct StaticTokenVerifier {
    subjects: HashMap<String, String>,
}

impl StaticTokenVerifier {
    /// Empty table; every token is rejected
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `token` as `subject`
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>, subject: impl Into<String>) -> Self {
        self.subjects.insert(token.into(), subject.into());
        self
    }
}

#[async_trait]
impl TokenVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> AppResult<VerifiedIdentity> {
        self.subjects
            .get(token)
            .map(|subject| VerifiedIdentity {
                subject: subject.clone(),
            })
            .ok_or_else(|| AppError::unauthorized("Invalid token"))
    }
}

/// Verifier used when no identity provider is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct RejectAllVerifier;

#[async_trait]
impl TokenVerifier for RejectAllVerifier {
    async fn verify(&self, _token: &str) -> AppResult<VerifiedIdentity> {
        Err(AppError::unauthorized(
            "Identity provider is not configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ironlog_core::errors::ErrorCode;

    #[tokio::test]
    async fn test_static_verifier() {
        let verifier = StaticTokenVerifier::new().with_token("t-1", "sub-1");

        let identity = verifier.verify("t-1").await.unwrap();
        assert_eq!(identity.subject, "sub-1");

        let err = verifier.verify("t-2").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    #[tokio::test]
    async fn test_reject_all() {
        let err = RejectAllVerifier.verify("anything").await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
}
