#![allow(dead_code)]

use axum_test::TestServer;
use drinks_api::core::{AppState, JwksCache, TokenValidator};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, encode};
use serde_json::{Value, json};
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::sync::Arc;

pub const TEST_ISSUER: &str = "https://coffee-shop-test.eu.auth0.com/";
pub const TEST_AUDIENCE: &str = "drinks";
pub const TEST_KID: &str = "test-signing-key";
pub const TEST_SECRET: &[u8] = b"ilmiobellissimosegretochevaassolutamentecambiato";

/// Tutti i permessi di un manager
pub const MANAGER: &[&str] = &[
    "get:drinks-detail",
    "post:drinks",
    "patch:drinks",
    "delete:drinks",
];

/// Un barista può solo leggere le ricette complete
pub const BARISTA: &[&str] = &["get:drinks-detail"];

/// Crea un AppState per i test
///
/// Il key set è statico (HS256, un solo `kid`) così i test non dipendono
/// da un identity provider raggiungibile.
pub fn create_test_state(pool: SqlitePool) -> Arc<AppState> {
    let keys = JwksCache::from_static(HashMap::from([(
        TEST_KID.to_string(),
        DecodingKey::from_secret(TEST_SECRET),
    )]));
    let validator = TokenValidator::new(keys, TEST_ISSUER, TEST_AUDIENCE, vec![Algorithm::HS256]);
    Arc::new(AppState::new(pool, validator))
}

/// Crea un TestServer per i test
pub fn create_test_server(state: Arc<AppState>) -> TestServer {
    let app = drinks_api::create_router(state);
    TestServer::new(app).expect("Failed to create test server")
}

/// Claims validi per 24 ore con i permessi indicati
pub fn test_claims(permissions: &[&str]) -> Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "sub": "auth0|tester",
        "iss": TEST_ISSUER,
        "aud": TEST_AUDIENCE,
        "iat": now,
        "exp": now + 24 * 60 * 60,
        "permissions": permissions,
    })
}

/// Firma dei claims arbitrari con la chiave di test
pub fn sign_test_jwt(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &EncodingKey::from_secret(TEST_SECRET))
        .expect("Failed to create JWT token")
}

/// Genera un JWT token valido con i permessi indicati
pub fn create_test_jwt(permissions: &[&str]) -> String {
    sign_test_jwt(&test_claims(permissions), Some(TEST_KID))
}

pub async fn count_drinks(pool: &SqlitePool) -> i64 {
    sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM drinks")
        .fetch_one(pool)
        .await
        .expect("Failed to count drinks")
}
