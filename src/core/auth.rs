use crate::core::jwks::JwksCache;
use crate::core::{AppError, AppState};
use axum::extract::State;
use axum::{
    body::Body,
    extract::Request,
    http::{HeaderMap, Response, StatusCode, header},
    middleware::Next,
};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, Validation, decode, decode_header};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Permessi richiesti dalle route protette
pub mod permissions {
    pub const GET_DRINKS_DETAIL: &str = "get:drinks-detail";
    pub const POST_DRINKS: &str = "post:drinks";
    pub const PATCH_DRINKS: &str = "patch:drinks";
    pub const DELETE_DRINKS: &str = "delete:drinks";
}

/// Errore di autenticazione/autorizzazione con il proprio status HTTP,
/// un codice leggibile da macchina e una descrizione per il client.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{code}: {description}")]
pub struct AuthError {
    status: StatusCode,
    code: &'static str,
    description: &'static str,
}

impl AuthError {
    fn new(status: StatusCode, code: &'static str, description: &'static str) -> Self {
        Self {
            status,
            code,
            description,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn code(&self) -> &'static str {
        self.code
    }

    pub fn description(&self) -> &'static str {
        self.description
    }

    pub fn header_missing() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "authorization_header_missing",
            "Authorization header is expected.",
        )
    }

    pub fn invalid_header(description: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_header", description)
    }

    pub fn unknown_key() -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            "invalid_header",
            "Unable to find the appropriate key.",
        )
    }

    pub fn token_expired() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "token_expired", "Token expired.")
    }

    pub fn invalid_claims(description: &'static str) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid_claims", description)
    }

    pub fn invalid_token() -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            "invalid_token",
            "Token signature or content is invalid.",
        )
    }

    pub fn permission_denied() -> Self {
        Self::new(StatusCode::FORBIDDEN, "unauthorized", "Permission not found.")
    }

    pub fn keys_unavailable() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "jwks_unavailable",
            "Unable to retrieve the signing keys.",
        )
    }

    fn from_jwt(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::token_expired(),
            ErrorKind::InvalidAudience | ErrorKind::InvalidIssuer | ErrorKind::MissingRequiredClaim(_) => {
                Self::invalid_claims("Incorrect claims. Please, check the audience and issuer.")
            }
            ErrorKind::Json(_) => Self::invalid_claims("Token claims are malformed."),
            _ => Self::invalid_token(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Audience {
    One(String),
    Many(Vec<String>),
}

/// Claims verificati di un bearer token, validi per la sola richiesta corrente
#[derive(Debug, Clone, Deserialize)]
pub struct AuthClaims {
    #[serde(default)]
    pub sub: Option<String>,
    pub iss: String,
    pub aud: Audience,
    pub exp: u64,
    #[serde(default)]
    pub permissions: Vec<String>,
}

impl AuthClaims {
    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission)
    }
}

/// Estrae il token da un header `Authorization: Bearer <token>`
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or_else(AuthError::header_missing)?
        .to_str()
        .map_err(|_| AuthError::invalid_header("Authorization header must be valid ASCII."))?;

    let parts: Vec<&str> = value.split_whitespace().collect();
    match parts.as_slice() {
        [] => Err(AuthError::header_missing()),
        [scheme, ..] if !scheme.eq_ignore_ascii_case("bearer") => Err(AuthError::invalid_header(
            "Authorization header must start with \"Bearer\".",
        )),
        [_] => Err(AuthError::invalid_header("Token not found.")),
        [_, token] => Ok(*token),
        _ => Err(AuthError::invalid_header(
            "Authorization header must be bearer token.",
        )),
    }
}

/// Verifica i bearer token contro il key set dell'issuer configurato
pub struct TokenValidator {
    keys: JwksCache,
    validation: Validation,
}

impl TokenValidator {
    pub fn new(keys: JwksCache, issuer: &str, audience: &str, algorithms: Vec<Algorithm>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.algorithms = algorithms;
        validation.set_audience(&[audience]);
        validation.set_issuer(&[issuer]);
        validation.set_required_spec_claims(&["exp", "aud", "iss"]);
        Self { keys, validation }
    }

    #[instrument(skip(self, token))]
    pub async fn validate(&self, token: &str) -> Result<AuthClaims, AuthError> {
        debug!("Validating bearer token");
        let header = decode_header(token)
            .map_err(|_| AuthError::invalid_header("Unable to parse authentication token."))?;

        if !self.validation.algorithms.contains(&header.alg) {
            warn!("Token signed with unexpected algorithm {:?}", header.alg);
            return Err(AuthError::invalid_header("Token algorithm is not accepted."));
        }

        let kid = header.kid.ok_or_else(AuthError::unknown_key)?;
        let key = self.keys.find(&kid).await?.ok_or_else(|| {
            warn!("No signing key found for kid {}", kid);
            AuthError::unknown_key()
        })?;

        let data = decode::<AuthClaims>(token, &key, &self.validation).map_err(|e| {
            warn!("Token rejected: {:?}", e);
            AuthError::from_jwt(e)
        })?;
        Ok(data.claims)
    }
}

/// Permission gate: nessun I/O, solo un controllo sull'insieme dei permessi
pub fn check_permissions(claims: &AuthClaims, required: &str) -> Result<(), AuthError> {
    if claims.has_permission(required) {
        Ok(())
    } else {
        Err(AuthError::permission_denied())
    }
}

/// Stato del middleware di autorizzazione: ogni route protetta dichiara il
/// permesso che richiede
#[derive(Clone)]
pub struct PermissionGuard {
    state: Arc<AppState>,
    permission: &'static str,
}

impl PermissionGuard {
    pub fn new(state: Arc<AppState>, permission: &'static str) -> Self {
        Self { state, permission }
    }
}

/// Valida il token, controlla il permesso richiesto e inserisce i claims
/// nelle extension della richiesta
#[instrument(skip(guard, req, next), fields(permission = guard.permission))]
pub async fn authorization_middleware(
    State(guard): State<PermissionGuard>,
    mut req: Request,
    next: Next,
) -> Result<Response<Body>, AppError> {
    debug!("Running authorization middleware");
    let token = extract_bearer_token(req.headers())?;
    let claims = guard.state.auth.validate(token).await?;
    check_permissions(&claims, guard.permission).inspect_err(|_| {
        warn!("Caller {:?} lacks permission {}", claims.sub, guard.permission);
    })?;

    info!("Caller {:?} authorized for {}", claims.sub, guard.permission);
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{DecodingKey, EncodingKey, Header, encode};
    use serde_json::json;
    use std::collections::HashMap;

    const ISSUER: &str = "https://coffee.eu.auth0.com/";
    const AUDIENCE: &str = "drinks";
    const SECRET: &[u8] = b"unit-test-signing-secret";

    fn validator() -> TokenValidator {
        let keys = JwksCache::from_static(HashMap::from([(
            "unit".to_string(),
            DecodingKey::from_secret(SECRET),
        )]));
        TokenValidator::new(keys, ISSUER, AUDIENCE, vec![Algorithm::HS256])
    }

    fn sign(claims: serde_json::Value, kid: Option<&str>) -> String {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = kid.map(str::to_string);
        encode(&header, &claims, &EncodingKey::from_secret(SECRET)).unwrap()
    }

    fn claims(exp_offset: i64) -> serde_json::Value {
        json!({
            "sub": "auth0|barista",
            "iss": ISSUER,
            "aud": [AUDIENCE, "https://coffee.eu.auth0.com/userinfo"],
            "exp": chrono::Utc::now().timestamp() + exp_offset,
            "permissions": ["get:drinks-detail"]
        })
    }

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn parsed(claims: serde_json::Value) -> AuthClaims {
        serde_json::from_value(claims).unwrap()
    }

    #[test]
    fn test_extract_bearer_token() {
        let headers = headers_with("Bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");

        let headers = headers_with("bearer abc.def.ghi");
        assert_eq!(extract_bearer_token(&headers).unwrap(), "abc.def.ghi");
    }

    #[test]
    fn test_extract_bearer_token_rejects_malformed_headers() {
        let err = extract_bearer_token(&HeaderMap::new()).unwrap_err();
        assert_eq!(err.code(), "authorization_header_missing");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);

        for value in ["Basic abc", "Bearer", "Bearer a b", "Token"] {
            let err = extract_bearer_token(&headers_with(value)).unwrap_err();
            assert_eq!(err.code(), "invalid_header", "header {value:?}");
            assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn test_permission_gate() {
        let claims = parsed(claims(3600));
        assert!(check_permissions(&claims, permissions::GET_DRINKS_DETAIL).is_ok());

        let err = check_permissions(&claims, permissions::DELETE_DRINKS).unwrap_err();
        assert_eq!(err.status(), StatusCode::FORBIDDEN);
        assert_eq!(err.code(), "unauthorized");
    }

    #[test]
    fn test_missing_permissions_claim_denies_everything() {
        let mut raw = claims(3600);
        raw.as_object_mut().unwrap().remove("permissions");
        let claims = parsed(raw);
        assert!(claims.permissions.is_empty());
        assert!(check_permissions(&claims, permissions::GET_DRINKS_DETAIL).is_err());
    }

    #[tokio::test]
    async fn test_validate_accepts_well_formed_token() {
        let token = sign(claims(3600), Some("unit"));
        let claims = validator().validate(&token).await.unwrap();
        assert_eq!(claims.sub.as_deref(), Some("auth0|barista"));
        assert_eq!(claims.permissions, vec!["get:drinks-detail"]);
    }

    #[tokio::test]
    async fn test_validate_rejects_expired_token() {
        let token = sign(claims(-3600), Some("unit"));
        let err = validator().validate(&token).await.unwrap_err();
        assert_eq!(err.code(), "token_expired");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validate_rejects_wrong_audience_and_issuer() {
        let mut raw = claims(3600);
        raw["aud"] = json!("another-api");
        let err = validator().validate(&sign(raw, Some("unit"))).await.unwrap_err();
        assert_eq!(err.code(), "invalid_claims");

        let mut raw = claims(3600);
        raw["iss"] = json!("https://evil.example/");
        let err = validator().validate(&sign(raw, Some("unit"))).await.unwrap_err();
        assert_eq!(err.code(), "invalid_claims");
    }

    #[tokio::test]
    async fn test_validate_rejects_unknown_or_missing_kid() {
        let err = validator().validate(&sign(claims(3600), Some("other"))).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);

        let err = validator().validate(&sign(claims(3600), None)).await.unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validate_rejects_bad_signature_and_garbage() {
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some("unit".to_string());
        let forged = encode(&header, &claims(3600), &EncodingKey::from_secret(b"not-the-key")).unwrap();
        let err = validator().validate(&forged).await.unwrap_err();
        assert_eq!(err.code(), "invalid_token");

        let err = validator().validate("not-a-jwt").await.unwrap_err();
        assert_eq!(err.code(), "invalid_header");
        assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_validate_rejects_malformed_permissions_claim() {
        let mut raw = claims(3600);
        raw["permissions"] = json!("get:drinks-detail");
        let err = validator().validate(&sign(raw, Some("unit"))).await.unwrap_err();
        assert_eq!(err.code(), "invalid_claims");
    }
}
