//! Credential validation against the identity provider's tokeninfo
//! endpoint, with a short-lived cache so steady-state traffic does not
//! pay a network round trip per request.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use dispatch::{BackendError, Credential, Principal, SubjectId};
use moka::sync::Cache;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use url::Url;

use crate::http::{error_from_status, extract_detail, transport_error};

const CACHE_SIZE: u64 = 10_000;
const CACHE_TTL_SECS: u64 = 60;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),

    #[error("credential expired; caller must refresh")]
    NeedsRefresh,

    #[error("credential validation unavailable: {0}")]
    Unavailable(#[from] BackendError),
}

#[async_trait]
pub trait CredentialValidator: Send + Sync {
    async fn validate(&self, bearer: &str) -> Result<Principal, AuthError>;
}

#[derive(Deserialize)]
struct TokenInfo {
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Deserialize)]
struct JwtClaims {
    #[serde(default)]
    exp: Option<u64>,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

pub struct HttpCredentialValidator {
    client: reqwest::Client,
    tokeninfo_url: Url,
    cache: Cache<String, Principal>,
}

impl HttpCredentialValidator {
    pub fn new(client: reqwest::Client, tokeninfo_url: Url) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_SIZE)
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .build();

        HttpCredentialValidator {
            client,
            tokeninfo_url,
            cache,
        }
    }
}

#[async_trait]
impl CredentialValidator for HttpCredentialValidator {
    async fn validate(&self, bearer: &str) -> Result<Principal, AuthError> {
        // An expired JWT never reaches the identity provider: the payload
        // already says the caller must refresh, and it still identifies
        // who is asking.
        if let Some(claims) = decode_jwt_claims(bearer)
            && let Some(exp) = claims.exp
            && exp <= unix_now()
        {
            let JwtClaims { sub, email, .. } = claims;
            let subject = sub.or_else(|| email.clone()).ok_or(AuthError::NeedsRefresh)?;
            let mut principal = Principal::new(SubjectId::new(subject), Credential::new(bearer));
            principal.email = email;
            principal.needs_refresh = true;
            return Ok(principal);
        }

        let key = fingerprint(bearer);
        if let Some(principal) = self.cache.get(&key) {
            return Ok(principal);
        }

        let response = self
            .client
            .get(self.tokeninfo_url.clone())
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(transport_error(e)))?;

        let status = response.status();
        if matches!(
            status,
            reqwest::StatusCode::BAD_REQUEST
                | reqwest::StatusCode::UNAUTHORIZED
                | reqwest::StatusCode::FORBIDDEN
        ) {
            let body = response.text().await.unwrap_or_default();
            return Err(AuthError::Unauthenticated(extract_detail(&body)));
        }
        if !status.is_success() {
            return Err(AuthError::Unavailable(error_from_status(response).await));
        }

        let info: TokenInfo = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(BackendError::InvalidResponse(e.to_string())))?;

        if let Some(expires_in) = info.expires_in
            && expires_in <= 0
        {
            return Err(AuthError::NeedsRefresh);
        }

        let subject = info
            .sub
            .clone()
            .or_else(|| info.email.clone())
            .ok_or_else(|| AuthError::Unauthenticated("token info carries no subject".into()))?;
        let mut principal = Principal::new(SubjectId::new(subject), Credential::new(bearer));
        principal.email = info.email;

        // Do not cache entries that would outlive the credential itself.
        let cacheable = info
            .expires_in
            .is_none_or(|secs| secs > CACHE_TTL_SECS as i64);
        if cacheable {
            self.cache.insert(key, principal.clone());
        }
        Ok(principal)
    }
}

fn fingerprint(bearer: &str) -> String {
    let digest = Sha256::digest(bearer.as_bytes());
    format!("{digest:x}")
}

fn decode_jwt_claims(bearer: &str) -> Option<JwtClaims> {
    let mut segments = bearer.split('.');
    let (_header, payload) = (segments.next()?, segments.next()?);
    segments.next()?;
    if segments.next().is_some() {
        return None;
    }
    let payload = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&payload).ok()
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutils::MockUpstream;
    use http::StatusCode;
    use serde_json::json;

    fn jwt(claims: serde_json::Value) -> String {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"RS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(claims.to_string().as_bytes());
        format!("{header}.{payload}.signature")
    }

    fn validator(server: &MockUpstream) -> HttpCredentialValidator {
        HttpCredentialValidator::new(
            reqwest::Client::new(),
            server.url().join("v1/tokeninfo").unwrap(),
        )
    }

    #[tokio::test]
    async fn expired_jwt_is_flagged_without_a_network_call() {
        let server = MockUpstream::start(|_| (StatusCode::OK, "{}".to_string())).await;
        let token = jwt(json!({
            "sub": "user-1",
            "email": "user@example.com",
            "exp": 1_000_000
        }));

        let principal = validator(&server).validate(&token).await.unwrap();

        assert!(principal.needs_refresh);
        assert_eq!(principal.subject.as_str(), "user-1");
        assert_eq!(principal.email.as_deref(), Some("user@example.com"));
        assert_eq!(server.request_count(), 0);
    }

    #[tokio::test]
    async fn expired_jwt_without_identity_is_a_refresh_error() {
        let server = MockUpstream::start(|_| (StatusCode::OK, "{}".to_string())).await;
        let token = jwt(json!({"exp": 1_000_000}));

        let error = validator(&server).validate(&token).await.unwrap_err();
        assert!(matches!(error, AuthError::NeedsRefresh));
        assert_eq!(server.request_count(), 0);
    }

    #[tokio::test]
    async fn opaque_tokens_are_resolved_through_tokeninfo() {
        let server = MockUpstream::start(|_| {
            (
                StatusCode::OK,
                json!({"sub": "user-1", "email": "user@example.com", "expires_in": 3600})
                    .to_string(),
            )
        })
        .await;

        let principal = validator(&server).validate("opaque-token").await.unwrap();

        assert!(!principal.needs_refresh);
        assert_eq!(principal.subject.as_str(), "user-1");
        assert_eq!(principal.credential.reveal(), "opaque-token");
        assert_eq!(server.request_count(), 1);
        let request = &server.requests()[0];
        assert!(request.path.starts_with("/v1/tokeninfo"));
        assert_eq!(request.header("authorization"), Some("Bearer opaque-token"));
    }

    #[tokio::test]
    async fn validated_principals_are_cached() {
        let server = MockUpstream::start(|_| {
            (
                StatusCode::OK,
                json!({"sub": "user-1", "expires_in": 3600}).to_string(),
            )
        })
        .await;
        let validator = validator(&server);

        validator.validate("opaque-token").await.unwrap();
        validator.validate("opaque-token").await.unwrap();

        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn short_lived_credentials_are_not_cached() {
        let server = MockUpstream::start(|_| {
            (
                StatusCode::OK,
                json!({"sub": "user-1", "expires_in": 30}).to_string(),
            )
        })
        .await;
        let validator = validator(&server);

        validator.validate("opaque-token").await.unwrap();
        validator.validate("opaque-token").await.unwrap();

        assert_eq!(server.request_count(), 2);
    }

    #[tokio::test]
    async fn rejected_tokens_are_unauthenticated() {
        let server = MockUpstream::start(|_| {
            (
                StatusCode::UNAUTHORIZED,
                json!({"error": "invalid token"}).to_string(),
            )
        })
        .await;

        let error = validator(&server).validate("bad-token").await.unwrap_err();
        match error {
            AuthError::Unauthenticated(detail) => assert_eq!(detail, "invalid token"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn tokeninfo_reporting_expiry_is_a_refresh_error() {
        let server = MockUpstream::start(|_| {
            (
                StatusCode::OK,
                json!({"sub": "user-1", "expires_in": 0}).to_string(),
            )
        })
        .await;

        let error = validator(&server).validate("opaque-token").await.unwrap_err();
        assert!(matches!(error, AuthError::NeedsRefresh));
    }

    #[tokio::test]
    async fn identity_provider_outage_is_unavailable() {
        let server =
            MockUpstream::start(|_| (StatusCode::SERVICE_UNAVAILABLE, String::new())).await;

        let error = validator(&server).validate("opaque-token").await.unwrap_err();
        match error {
            AuthError::Unavailable(backend) => assert!(backend.is_transient()),
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
