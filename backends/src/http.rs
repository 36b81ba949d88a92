//! Request plumbing shared by the HTTP backends: bearer authentication,
//! cache directives, and the mapping from transport and status failures
//! onto `BackendError`.

use dispatch::{BackendError, CacheMode, Principal};
use reqwest::header::CACHE_CONTROL;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

/// Longest error-body excerpt carried into an error message.
const DETAIL_LIMIT: usize = 256;

/// Attaches the caller's credential and the cache directive to an
/// outgoing request. `Bypass` sets the standard proxy header plus a
/// query marker the backends understand.
pub(crate) fn prepare(
    builder: RequestBuilder,
    principal: &Principal,
    cache: CacheMode,
) -> RequestBuilder {
    let builder = builder.bearer_auth(principal.credential.reveal());
    match cache {
        CacheMode::Allow => builder,
        CacheMode::Bypass => builder
            .header(CACHE_CONTROL, "no-cache")
            .query(&[("fresh", "1")]),
    }
}

pub(crate) fn transport_error(error: reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout
    } else {
        BackendError::Unavailable(error.to_string())
    }
}

/// Maps a non-success status onto the transient/permanent split: 5xx and
/// 429 mean the backend is struggling, everything else is a refusal that
/// retrying elsewhere cannot fix.
pub(crate) async fn error_from_status(response: Response) -> BackendError {
    const RETRIABLE_STATUS_CODES: &[StatusCode] = &[
        StatusCode::TOO_MANY_REQUESTS,     // 429
        StatusCode::INTERNAL_SERVER_ERROR, // 500
        StatusCode::BAD_GATEWAY,           // 502
        StatusCode::SERVICE_UNAVAILABLE,   // 503
        StatusCode::GATEWAY_TIMEOUT,       // 504
    ];

    let status = response.status();
    let detail = match response.text().await {
        Ok(body) => extract_detail(&body),
        Err(_) => String::new(),
    };

    if RETRIABLE_STATUS_CODES.contains(&status) || status.is_server_error() {
        BackendError::Unavailable(format!("status {status}: {detail}"))
    } else {
        BackendError::Rejected {
            status: status.as_u16(),
            detail,
        }
    }
}

pub(crate) async fn expect_success(response: Response) -> Result<Response, BackendError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(error_from_status(response).await)
    }
}

pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, BackendError> {
    let response = expect_success(response).await?;
    let body = response.bytes().await.map_err(transport_error)?;
    serde_json::from_slice(&body).map_err(|e| BackendError::InvalidResponse(e.to_string()))
}

/// Pulls a human-readable message out of a JSON error body when one is
/// recognizable, otherwise returns a truncated excerpt of the raw body.
pub(crate) fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        for key in ["error", "message", "detail"] {
            if let Some(message) = value.get(key).and_then(|v| v.as_str()) {
                return message.to_string();
            }
        }
        if let Some(message) = value
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|v| v.as_str())
        {
            return message.to_string();
        }
    }
    body.chars().take(DETAIL_LIMIT).collect()
}
