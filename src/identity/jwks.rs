// ABOUTME: Process-wide cache of the identity provider's JSON Web Key Set
// ABOUTME: Scheduled expiry, single in-flight refresh, and rate-limited refresh on unknown key ids
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Duration, Utc};
use ironlog_core::constants::identity::MIN_FORCED_REFRESH_SECS;
use ironlog_core::errors::{AppError, AppResult};
use jsonwebtoken::DecodingKey;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One key of a JWKS document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonWebKey {
    /// Key id matched against the token header
    pub kid: String,
    /// Key type; only `RSA` is used
    pub kty: String,
    /// Intended algorithm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    /// Intended use (`sig`)
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub key_use: Option<String>,
    /// RSA modulus, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n: Option<String>,
    /// RSA exponent, base64url
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub e: Option<String>,
}

/// JWKS document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct JsonWebKeySet {
    /// Published keys
    pub keys: Vec<JsonWebKey>,
}

struct CachedKeys {
    keys: HashMap<String, DecodingKey>,
    fetched_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
}

/// Cached signing keys of one issuer
///
/// Reads share an `RwLock`; refreshes serialize on a `Mutex` so at most one
/// fetch is in flight no matter how many requests miss at once.
pub struct JwksCache {
    url: String,
    http_client: Client,
    ttl: Duration,
    cached: Arc<RwLock<Option<CachedKeys>>>,
    refresh_lock: Mutex<()>,
}

impl JwksCache {
    /// Cache for the key set at `url`, expiring after `refresh_interval`
    #[must_use]
    pub fn new(url: impl Into<String>, refresh_interval: StdDuration) -> Self {
        let ttl = Duration::from_std(refresh_interval).unwrap_or_else(|_| Duration::days(1));
        Self {
            url: url.into(),
            http_client: Client::new(),
            ttl,
            cached: Arc::new(RwLock::new(None)),
            refresh_lock: Mutex::new(()),
        }
    }

    /// Key set location
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Decoding key for `kid`, refreshing the set when needed
    ///
    /// # Errors
    ///
    /// Returns `UNAUTHORIZED` for an unknown key id, or an internal error when
    /// the key set cannot be fetched
    pub async fn decoding_key(&self, kid: &str) -> AppResult<DecodingKey> {
        if let Some(key) = self.lookup(kid, true).await {
            return Ok(key);
        }

        {
            let _guard = self.refresh_lock.lock().await;
            // Another request may have refreshed while this one waited
            if let Some(key) = self.lookup(kid, true).await {
                return Ok(key);
            }
            if self.may_refresh().await {
                self.fetch_and_store().await?;
            } else {
                debug!(kid = %kid, "Key set refreshed recently, not refetching for unknown kid");
            }
        }

        self.lookup(kid, false).await.ok_or_else(|| {
            debug!(kid = %kid, "Token signed with unknown key");
            AppError::unauthorized("Unknown token signing key")
        })
    }

    /// Fetch the key set now, regardless of cache state
    ///
    /// # Errors
    ///
    /// Returns an internal error when the key set cannot be fetched or has no usable key
    pub async fn refresh(&self) -> AppResult<usize> {
        let _guard = self.refresh_lock.lock().await;
        self.fetch_and_store().await
    }

    /// Refresh the key set every `interval` until the task is aborted
    #[must_use]
    pub fn spawn_scheduled_refresh(self: &Arc<Self>, interval: StdDuration) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                if let Err(e) = cache.refresh().await {
                    warn!(error = %e, url = %cache.url, "Scheduled key set refresh failed");
                }
            }
        })
    }

    async fn lookup(&self, kid: &str, require_fresh: bool) -> Option<DecodingKey> {
        let cache = self.cached.read().await;
        cache.as_ref().and_then(|cached| {
            if require_fresh && cached.expires_at <= Utc::now() {
                None
            } else {
                cached.keys.get(kid).cloned()
            }
        })
    }

    /// Expired or absent sets always refresh; fresh sets only after the forced-refresh gap
    async fn may_refresh(&self) -> bool {
        let cache = self.cached.read().await;
        cache.as_ref().is_none_or(|cached| {
            let now = Utc::now();
            cached.expires_at <= now
                || now - cached.fetched_at >= Duration::seconds(MIN_FORCED_REFRESH_SECS)
        })
    }

    async fn fetch_and_store(&self) -> AppResult<usize> {
        info!(url = %self.url, "Fetching identity provider key set");

        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| {
                warn!(error = %e, url = %self.url, "Failed to fetch key set");
                AppError::internal(format!("Failed to fetch key set: {e}"))
            })?;

        let document: JsonWebKeySet = response.json().await.map_err(|e| {
            warn!(error = %e, "Failed to parse key set response");
            AppError::internal(format!("Failed to parse key set: {e}"))
        })?;

        let keys = decode_key_set(&document)?;
        let count = keys.len();
        let fetched_at = Utc::now();
        let expires_at = fetched_at + self.ttl;

        *self.cached.write().await = Some(CachedKeys {
            keys,
            fetched_at,
            expires_at,
        });
        info!(num_keys = count, expires_at = %expires_at, "Identity provider keys cached");
        Ok(count)
    }
}

/// Convert the RSA entries of a key set into decoding keys
///
/// # Errors
///
/// Returns an internal error when no entry yields a usable key
pub fn decode_key_set(document: &JsonWebKeySet) -> AppResult<HashMap<String, DecodingKey>> {
    let mut keys = HashMap::with_capacity(document.keys.len());
    for jwk in &document.keys {
        if jwk.kty != "RSA" || jwk.key_use.as_deref().is_some_and(|u| u != "sig") {
            continue;
        }
        let (Some(n), Some(e)) = (jwk.n.as_deref(), jwk.e.as_deref()) else {
            warn!(kid = %jwk.kid, "RSA key without modulus or exponent");
            continue;
        };
        match DecodingKey::from_rsa_components(n, e) {
            Ok(key) => {
                keys.insert(jwk.kid.clone(), key);
            }
            Err(err) => warn!(kid = %jwk.kid, error = %err, "Skipping unusable RSA key"),
        }
    }

    if keys.is_empty() {
        return Err(AppError::internal("Key set contains no usable signing key"));
    }
    Ok(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_skips_foreign_keys() {
        let document = JsonWebKeySet {
            keys: vec![
                JsonWebKey {
                    kid: "ec".into(),
                    kty: "EC".into(),
                    alg: None,
                    key_use: Some("sig".into()),
                    n: None,
                    e: None,
                },
                JsonWebKey {
                    kid: "enc".into(),
                    kty: "RSA".into(),
                    alg: None,
                    key_use: Some("enc".into()),
                    n: Some("AQAB".into()),
                    e: Some("AQAB".into()),
                },
            ],
        };
        assert!(decode_key_set(&document).is_err());
    }

    #[test]
    fn test_document_shape() {
        let raw = r#"{"keys":[{"kid":"k1","kty":"RSA","alg":"RS256","use":"sig","n":"abc","e":"AQAB"}]}"#;
        let document: JsonWebKeySet = serde_json::from_str(raw).unwrap();
        assert_eq!(document.keys[0].key_use.as_deref(), Some("sig"));
        assert_eq!(document.keys[0].alg.as_deref(), Some("RS256"));
    }
}
