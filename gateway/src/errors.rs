use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use backends::AuthError;
use dispatch::{BackendError, DispatchError};

use crate::envelope::Envelope;

/// Terminal failure of a request: the HTTP status plus the message
/// placed in the failure envelope.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn unauthenticated<S: Into<String>>(message: S) -> Self {
        ApiError {
            status: StatusCode::UNAUTHORIZED,
            message: message.into(),
        }
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    /// Maps a routing failure onto the wire. The cause chain is logged
    /// here; the envelope repeats it only when `expose` is set. Backend
    /// rejections keep their upstream status and detail, since those
    /// describe the caller's own request.
    pub fn from_dispatch(operation: &'static str, error: DispatchError, expose: bool) -> Self {
        tracing::warn!(operation, error = %error, "request failed");
        let (status, message) = match &error {
            DispatchError::NeedsRefresh => (StatusCode::UNAUTHORIZED, error.to_string()),
            DispatchError::AllBackendsDisabled { .. } => {
                (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
            }
            DispatchError::Backend {
                source: BackendError::Rejected { status, detail },
                ..
            } => (
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY),
                detail.clone(),
            ),
            DispatchError::Backend { .. } => (
                StatusCode::SERVICE_UNAVAILABLE,
                if expose {
                    error.to_string()
                } else {
                    "backend temporarily unavailable".to_string()
                },
            ),
            DispatchError::BothFailed { .. } => (
                StatusCode::BAD_GATEWAY,
                if expose {
                    error.to_string()
                } else {
                    "both backends failed".to_string()
                },
            ),
        };
        ApiError { status, message }
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::Unauthenticated(detail) => ApiError::unauthenticated(detail),
            AuthError::NeedsRefresh => ApiError::unauthenticated(error.to_string()),
            AuthError::Unavailable(source) => {
                tracing::warn!(error = %source, "credential validation unavailable");
                ApiError {
                    status: StatusCode::SERVICE_UNAVAILABLE,
                    message: "credential validation unavailable".to_string(),
                }
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(Envelope::failure(self.message))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch::Backend;

    #[test]
    fn rejections_mirror_the_upstream_status_and_detail() {
        let error = ApiError::from_dispatch(
            "entity.create",
            DispatchError::Backend {
                backend: Backend::Primary,
                source: BackendError::Rejected {
                    status: 422,
                    detail: "title is required".into(),
                },
            },
            false,
        );
        assert_eq!(error.status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(error.message, "title is required");
    }

    #[test]
    fn transient_failures_hide_their_cause_by_default() {
        let error = ApiError::from_dispatch(
            "data.load",
            DispatchError::Backend {
                backend: Backend::Primary,
                source: BackendError::Unavailable("connect error".into()),
            },
            false,
        );
        assert_eq!(error.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(error.message, "backend temporarily unavailable");
    }

    #[test]
    fn expose_flag_carries_the_cause_chain() {
        let error = ApiError::from_dispatch(
            "data.load",
            DispatchError::BothFailed {
                primary: BackendError::Timeout,
                fallback: BackendError::Unavailable("bridge down".into()),
            },
            true,
        );
        assert_eq!(error.status, StatusCode::BAD_GATEWAY);
        assert!(error.message.contains("request timed out"));
        assert!(error.message.contains("bridge down"));
    }

    #[test]
    fn dual_disable_is_an_internal_configuration_error() {
        let error = ApiError::from_dispatch(
            "data.load",
            DispatchError::AllBackendsDisabled {
                operation: "data.load",
            },
            false,
        );
        assert_eq!(error.status, StatusCode::INTERNAL_SERVER_ERROR);
    }
}
