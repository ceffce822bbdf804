//! Retry and error helpers for [`OtClient`](super::OtClient).

use crate::error::OtError;
use std::time::Duration;

/// Whether a response with this status may succeed after a backoff.
pub fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 425 | 429 | 502 | 503 | 504)
}

/// Delay before retry number `attempt` (zero-based).
///
/// Returns `base_ms * 2^attempt` milliseconds, with the exponent capped at 10.
pub fn exponential_backoff(attempt: u32, base_ms: u64) -> Duration {
    let delay_ms = base_ms.saturating_mul(2_u64.pow(attempt.min(10)));
    Duration::from_millis(delay_ms)
}

/// Turn an error response into an [`OtError::Status`].
///
/// The server reports errors as `{"error": "...", "status": n}`; any other body is kept
/// verbatim as the message.
pub fn status_error(status: u16, body: &str) -> OtError {
    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|json| json["error"].as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string());
    OtError::Status { status, message }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_retryable_status() {
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(404));
        assert!(!is_retryable_status(409));
    }

    #[test]
    fn test_exponential_backoff() {
        let delay0 = exponential_backoff(0, 100);
        let delay1 = exponential_backoff(1, 100);
        assert!(delay1 > delay0);
        assert_eq!(exponential_backoff(2, 100), Duration::from_millis(400));
        assert_eq!(exponential_backoff(30, 1), Duration::from_millis(1024));
    }

    #[test]
    fn test_status_error_reads_json_message() {
        let err = status_error(404, r#"{"error":"document not found: x","status":404}"#);
        match err {
            OtError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "document not found: x");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_status_error_plain_body() {
        let err = status_error(502, "bad gateway");
        assert!(matches!(err, OtError::Status { status: 502, ref message } if message == "bad gateway"));
    }
}
