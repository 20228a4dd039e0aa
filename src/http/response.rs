//! Error responses.
//!
//! # Responsibilities
//! - Render relay errors and routing misses as JSON error bodies
//! - Map every relay error to 400; upstream statuses never reach here
//!
//! Body shape:
//! ```text
//! { "statusCode": 400, "error": "Bad Request", "message": "request.url is required" }
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde::{Deserialize, Serialize};

use crate::relay::RelayError;

/// JSON body of every error reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub status_code: u16,
    pub error: String,
    pub message: String,
}

/// Build an error reply with `status` and a human-readable `message`.
pub fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorBody {
        status_code: status.as_u16(),
        error: status.canonical_reason().unwrap_or("Error").to_string(),
        message: message.into(),
    };
    (status, Json(body)).into_response()
}

impl IntoResponse for RelayError {
    fn into_response(self) -> Response {
        error_response(StatusCode::BAD_REQUEST, self.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn relay_errors_are_bad_requests() {
        let response = RelayError::UnsupportedProxyType("ftp".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: ErrorBody = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            ErrorBody {
                status_code: 400,
                error: "Bad Request".into(),
                message: "Unsupported proxy type: ftp".into(),
            }
        );
    }

    #[tokio::test]
    async fn wire_field_names() {
        let response = error_response(StatusCode::NOT_FOUND, "Page not Found!");
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            serde_json::json!({ "statusCode": 404, "error": "Not Found", "message": "Page not Found!" })
        );
    }
}
