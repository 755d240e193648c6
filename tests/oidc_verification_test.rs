// ABOUTME: RS256 token verification against a locally served JWKS document
// ABOUTME: Covers valid, expired, foreign-issuer, wrong-audience, and unknown-key tokens plus key caching
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Ironlog Contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};

use axum::{routing::get, Json, Router};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
use chrono::{Duration, Utc};
use helpers::axum_test::AxumTestRequest;
use ironlog_server::config::environment::{IdentityConfig, ServerConfig};
use ironlog_server::errors::ErrorCode;
use ironlog_server::identity::{OidcVerifier, TokenVerifier};
use ironlog_server::resources::ServerResources;
use ironlog_server::routes::build_router;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{RsaPrivateKey, RsaPublicKey};
use serde_json::{json, Value};
use tokio::net::TcpListener;

const KID: &str = "test-key-1";
const CLIENT_ID: &str = "ironlog-app";

struct SigningKey {
    encoding: EncodingKey,
    jwk: Value,
}

/// One 2048-bit key for the whole test binary; generation is slow in debug builds
fn signing_key() -> &'static SigningKey {
    static KEY: OnceLock<SigningKey> = OnceLock::new();
    KEY.get_or_init(|| {
        let private_key = RsaPrivateKey::new(&mut rand::rngs::OsRng, 2048).unwrap();
        let public_key = RsaPublicKey::from(&private_key);
        let pem = private_key.to_pkcs1_pem(LineEnding::LF).unwrap();

        SigningKey {
            encoding: EncodingKey::from_rsa_pem(pem.as_bytes()).unwrap(),
            jwk: json!({
                "kid": KID,
                "kty": "RSA",
                "alg": "RS256",
                "use": "sig",
                "n": URL_SAFE_NO_PAD.encode(public_key.n().to_bytes_be()),
                "e": URL_SAFE_NO_PAD.encode(public_key.e().to_bytes_be()),
            }),
        }
    })
}

/// Serve the key set on an ephemeral port, counting fetches
async fn spawn_jwks_server() -> (SocketAddr, Arc<AtomicUsize>) {
    let fetches = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&fetches);
    let document = json!({ "keys": [signing_key().jwk.clone()] });

    let app = Router::new().route(
        "/.well-known/jwks.json",
        get(move || {
            let counter = Arc::clone(&counter);
            let document = document.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Json(document)
            }
        }),
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, fetches)
}

fn issuer(addr: SocketAddr) -> String {
    format!("http://{addr}")
}

fn verifier_for(addr: SocketAddr, refresh_secs: u64) -> OidcVerifier {
    OidcVerifier::from_config(&IdentityConfig {
        issuer: Some(issuer(addr)),
        client_id: Some(CLIENT_ID.to_owned()),
        jwks_url: None,
        jwks_refresh_secs: refresh_secs,
    })
    .unwrap()
}

fn mint(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = kid.map(ToOwned::to_owned);
    encode(&header, claims, &signing_key().encoding).unwrap()
}

fn claims_for(addr: SocketAddr, subject: &str) -> Value {
    json!({
        "sub": subject,
        "iss": issuer(addr),
        "aud": CLIENT_ID,
        "iat": Utc::now().timestamp(),
        "exp": (Utc::now() + Duration::hours(1)).timestamp(),
    })
}

#[tokio::test]
async fn test_valid_token_resolves_subject() {
    let (addr, fetches) = spawn_jwks_server().await;
    let verifier = verifier_for(addr, 3600);

    let token = mint(&claims_for(addr, "user-123"), Some(KID));
    let identity = verifier.verify(&token).await.unwrap();
    assert_eq!(identity.subject, "user-123");

    // Second verification is served from the cache
    verifier.verify(&token).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_client_id_claim_is_accepted_as_audience() {
    let (addr, _fetches) = spawn_jwks_server().await;
    let verifier = verifier_for(addr, 3600);

    let mut claims = claims_for(addr, "cognito-user");
    claims.as_object_mut().unwrap().remove("aud");
    claims["client_id"] = json!(CLIENT_ID);

    let identity = verifier.verify(&mint(&claims, Some(KID))).await.unwrap();
    assert_eq!(identity.subject, "cognito-user");
}

#[tokio::test]
async fn test_rejected_tokens() {
    let (addr, _fetches) = spawn_jwks_server().await;
    let verifier = verifier_for(addr, 3600);

    let mut expired = claims_for(addr, "user-123");
    expired["exp"] = json!((Utc::now() - Duration::hours(2)).timestamp());

    let mut foreign_issuer = claims_for(addr, "user-123");
    foreign_issuer["iss"] = json!("https://elsewhere.example");

    let mut wrong_audience = claims_for(addr, "user-123");
    wrong_audience["aud"] = json!("another-app");

    for claims in [expired, foreign_issuer, wrong_audience] {
        let err = verifier.verify(&mint(&claims, Some(KID))).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }

    let err = verifier
        .verify(&mint(&claims_for(addr, "user-123"), None))
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);

    let err = verifier.verify("definitely.not.ajwt").await.unwrap_err();
    assert_eq!(err.code, ErrorCode::Unauthorized);
}

#[tokio::test]
async fn test_unknown_kid_does_not_hammer_provider() {
    let (addr, fetches) = spawn_jwks_server().await;
    let verifier = verifier_for(addr, 3600);

    verifier
        .verify(&mint(&claims_for(addr, "user-123"), Some(KID)))
        .await
        .unwrap();

    for _ in 0..3 {
        let err = verifier
            .verify(&mint(&claims_for(addr, "user-123"), Some("rotated-away")))
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::Unauthorized);
    }
    assert_eq!(fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_expired_key_set_is_refetched() {
    let (addr, fetches) = spawn_jwks_server().await;
    let verifier = verifier_for(addr, 0);

    let token = mint(&claims_for(addr, "user-123"), Some(KID));
    verifier.verify(&token).await.unwrap();
    verifier.verify(&token).await.unwrap();
    assert_eq!(fetches.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_key_set_fails_closed() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let verifier = verifier_for(addr, 3600);
    let token = mint(&claims_for(addr, "user-123"), Some(KID));
    assert!(verifier.verify(&token).await.is_err());
}

#[tokio::test]
async fn test_router_provisions_profile_from_verified_subject() {
    let (addr, _fetches) = spawn_jwks_server().await;
    let database = common::create_test_database().await.unwrap();
    let resources = Arc::new(ServerResources::new(
        database,
        Arc::new(verifier_for(addr, 3600)),
        ServerConfig::default(),
    ));
    let app = build_router(resources);

    let token = mint(&claims_for(addr, "oidc-subject-42"), Some(KID));
    let profile = AxumTestRequest::get("/profile")
        .bearer(&token)
        .send(app.clone())
        .await
        .expect_json(200);
    assert_eq!(profile["externalId"], "oidc-subject-42");

    let mut expired = claims_for(addr, "oidc-subject-42");
    expired["exp"] = json!((Utc::now() - Duration::hours(2)).timestamp());
    AxumTestRequest::get("/profile")
        .bearer(&mint(&expired, Some(KID)))
        .send(app)
        .await
        .expect_error(401, "UNAUTHORIZED");
}
