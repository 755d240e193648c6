// ABOUTME: Bearer-token authentication binding each request to a provisioned profile
// ABOUTME: Verifies the token, then finds or creates the profile for the token subject
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::sync::Arc;

use axum::http::HeaderMap;
use ironlog_core::errors::{AppError, AppResult};
use uuid::Uuid;

use crate::database::Database;
use crate::identity::TokenVerifier;

/// Profile bound to the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedProfile {
    /// Internal profile id used for every ownership check
    pub profile_id: Uuid,
    /// Identity provider subject
    pub external_id: String,
}

/// Authenticates requests and provisions profiles on first sight
#[derive(Clone)]
pub struct ProfileAuthenticator {
    verifier: Arc<dyn TokenVerifier>,
    database: Arc<Database>,
}

impl ProfileAuthenticator {
    /// Create a new authenticator
    #[must_use]
    pub fn new(verifier: Arc<dyn TokenVerifier>, database: Arc<Database>) -> Self {
        Self { verifier, database }
    }

    /// Authenticate from request headers
    ///
    /// # Errors
    ///
    /// Returns `UNAUTHORIZED` for a missing, malformed, or unverifiable token
    pub async fn authenticate_headers(&self, headers: &HeaderMap) -> AppResult<AuthenticatedProfile> {
        let auth_header = headers
            .get(http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok());
        let auth = self.authenticate_request(auth_header).await?;
        // Tag the enclosing http_request span
        tracing::Span::current().record("profile_id", auth.profile_id.to_string());
        Ok(auth)
    }

    /// Authenticate an `Authorization` header value
    ///
    /// # Errors
    ///
    /// Returns `UNAUTHORIZED` for a missing, malformed, or unverifiable token,
    /// or an internal error if provisioning the profile fails
    #[tracing::instrument(
        skip(self, auth_header),
        fields(
            profile_id = tracing::field::Empty,
            success = tracing::field::Empty,
        )
    )]
    pub async fn authenticate_request(
        &self,
        auth_header: Option<&str>,
    ) -> AppResult<AuthenticatedProfile> {
        let Some(header) = auth_header else {
            tracing::debug!("Authentication failed: missing authorization header");
            tracing::Span::current().record("success", false);
            return Err(AppError::unauthorized("Missing authorization header"));
        };

        // Security: never log the header value
        let token = bearer_token(header).inspect_err(|_| {
            tracing::Span::current().record("success", false);
        })?;

        let identity = match self.verifier.verify(token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::Span::current().record("success", false);
                tracing::warn!(error = %e.message, "Token verification failed");
                return Err(e);
            }
        };

        let profile = self
            .database
            .profiles()
            .get_or_create_by_external_id(&identity.subject)
            .await?;

        tracing::Span::current()
            .record("profile_id", profile.id.to_string())
            .record("success", true);

        Ok(AuthenticatedProfile {
            profile_id: profile.id,
            external_id: profile.external_id,
        })
    }
}

/// Extract the token from `Bearer <token>`
fn bearer_token(header: &str) -> AppResult<&str> {
    let (scheme, token) = header
        .split_once(' ')
        .ok_or_else(|| AppError::unauthorized("Malformed authorization header"))?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err(AppError::unauthorized(
            "Authorization scheme must be Bearer",
        ));
    }
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::unauthorized("Empty bearer token"));
    }
    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parsing() {
        assert_eq!(bearer_token("Bearer abc").unwrap(), "abc");
        assert_eq!(bearer_token("bearer   abc  ").unwrap(), "abc");
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("Bearer ").is_err());
        assert!(bearer_token("abc").is_err());
    }
}
