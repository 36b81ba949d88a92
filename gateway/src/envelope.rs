use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use dispatch::Dispatched;
use serde::Serialize;

/// Response envelope shared by every API endpoint. Failures carry
/// `error`; successes carry `data` (when the operation has output) and
/// a `performance` block.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<Performance>,
}

/// Timing of the backend attempt that produced the response. The
/// duration covers the serving attempt only, so a fallback response
/// reports the legacy attempt's time, not the failed primary's.
#[derive(Debug, Serialize)]
pub struct Performance {
    pub duration_ms: u64,
    pub timestamp: u64,
}

impl Performance {
    fn of<O>(dispatched: &Dispatched<O>) -> Self {
        Performance {
            duration_ms: dispatched.duration.as_millis() as u64,
            timestamp: unix_millis(),
        }
    }
}

impl<T> Envelope<T> {
    pub fn success(dispatched: Dispatched<T>) -> Self {
        let performance = Performance::of(&dispatched);
        Envelope {
            success: true,
            data: Some(dispatched.output),
            error: None,
            performance: Some(performance),
        }
    }
}

impl Envelope<()> {
    /// Success with no payload, used by deletes.
    pub fn empty(dispatched: Dispatched<()>) -> Self {
        Envelope {
            success: true,
            data: None,
            error: None,
            performance: Some(Performance::of(&dispatched)),
        }
    }

    pub fn failure<S: Into<String>>(message: S) -> Self {
        Envelope {
            success: false,
            data: None,
            error: Some(message.into()),
            performance: None,
        }
    }
}

impl<T: Serialize> IntoResponse for Envelope<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use dispatch::Backend;
    use serde_json::{Value, json};
    use std::time::Duration;

    #[test]
    fn success_envelopes_carry_data_and_performance() {
        let envelope = Envelope::success(Dispatched {
            output: json!({"tasks": []}),
            served_by: Backend::Primary,
            duration: Duration::from_millis(42),
        });

        let rendered = serde_json::to_value(&envelope).unwrap();
        assert_eq!(rendered["success"], true);
        assert_eq!(rendered["data"]["tasks"], json!([]));
        assert_eq!(rendered["performance"]["duration_ms"], 42);
        assert!(rendered["performance"]["timestamp"].is_u64());
        assert!(rendered.get("error").is_none());
    }

    #[test]
    fn empty_envelopes_omit_the_data_key() {
        let envelope = Envelope::empty(Dispatched {
            output: (),
            served_by: Backend::Primary,
            duration: Duration::from_millis(5),
        });

        let rendered = serde_json::to_value(&envelope).unwrap();
        assert_eq!(rendered["success"], true);
        assert!(rendered.get("data").is_none());
        assert_eq!(rendered["performance"]["duration_ms"], 5);
    }

    #[test]
    fn failure_envelopes_carry_only_the_message() {
        let rendered: Value =
            serde_json::to_value(Envelope::failure("both backends failed")).unwrap();
        assert_eq!(rendered["success"], false);
        assert_eq!(rendered["error"], "both backends failed");
        assert!(rendered.get("data").is_none());
        assert!(rendered.get("performance").is_none());
    }
}
