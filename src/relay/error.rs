//! Error taxonomy for the relay pipeline.

use std::time::Duration;
use thiserror::Error;

/// Errors that can terminate a single relayed call.
///
/// None of these are retried and none of them affect other in-flight calls.
#[derive(Debug, Error)]
pub enum RelayError {
    /// A descriptor field is missing or has an invalid value.
    #[error("{0}")]
    Validation(String),

    /// The inbound body is not a well-formed descriptor.
    #[error("Error parsing JSON: {0}")]
    Decode(#[source] serde_json::Error),

    /// The rendered proxy URL could not be parsed or used.
    #[error("Invalid proxy URL: {0}")]
    InvalidProxyUrl(String),

    #[error("Unsupported proxy type: {0}")]
    UnsupportedProxyType(String),

    #[error("Invalid target URL: {0}")]
    InvalidTargetUrl(String),

    #[error("Unsupported request method: {0}")]
    UnsupportedMethod(String),

    /// A descriptor header name or value is not valid on the wire.
    #[error("Invalid header '{name}': {reason}")]
    InvalidHeader { name: String, reason: String },

    /// Network-level failure reaching the upstream (DNS, refused, TLS, read).
    #[error("Upstream request failed: {0}")]
    ForwardFailed(#[source] reqwest::Error),

    /// The upstream exchange did not finish before the per-call deadline.
    #[error("Upstream request timed out after {0:?}")]
    Timeout(Duration),

    /// The reply could not be serialized.
    #[error("Error encoding JSON: {0}")]
    Encode(#[source] serde_json::Error),
}

impl RelayError {
    /// Short label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            RelayError::Validation(_) => "validation",
            RelayError::Decode(_) => "decode",
            RelayError::InvalidProxyUrl(_) => "invalid_proxy_url",
            RelayError::UnsupportedProxyType(_) => "unsupported_proxy_type",
            RelayError::InvalidTargetUrl(_) => "invalid_target_url",
            RelayError::UnsupportedMethod(_) => "unsupported_method",
            RelayError::InvalidHeader { .. } => "invalid_header",
            RelayError::ForwardFailed(_) => "forward_failed",
            RelayError::Timeout(_) => "timeout",
            RelayError::Encode(_) => "encode",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = RelayError::UnsupportedProxyType("ftp".into());
        assert!(err.to_string().contains("ftp"));

        let err = RelayError::UnsupportedMethod("head".into());
        assert_eq!(err.to_string(), "Unsupported request method: head");
    }

    #[test]
    fn validation_message_is_passed_through() {
        let err = RelayError::Validation("request.url is required".into());
        assert_eq!(err.to_string(), "request.url is required");
        assert_eq!(err.kind(), "validation");
    }

    #[test]
    fn timeout_reports_seconds() {
        let err = RelayError::Timeout(Duration::from_secs(5));
        assert_eq!(err.to_string(), "Upstream request timed out after 5s");
    }

    #[test]
    fn timeout_keeps_sub_second_precision() {
        let err = RelayError::Timeout(Duration::from_millis(200));
        assert_eq!(err.to_string(), "Upstream request timed out after 200ms");

        let err = RelayError::Timeout(Duration::from_millis(1500));
        assert_eq!(err.to_string(), "Upstream request timed out after 1.5s");
    }
}
