//! Response framing.
//!
//! `binary` replies carry the upstream bytes as-is; `json` replies wrap them
//! in an envelope next to the submitted descriptor:
//!
//! ```text
//! { "request": <descriptor as submitted>, "response": <upstream payload> }
//! ```
//!
//! The envelope echoes the descriptor's original JSON text, so explicit
//! `null` fields and repeated header keys come back unchanged.

use axum::body::Body;
use axum::http::header::{HeaderValue, CONTENT_TYPE};
use axum::response::Response;
use serde::Serialize;
use serde_json::value::RawValue;

use crate::relay::descriptor::ResponseType;
use crate::relay::error::RelayError;
use crate::relay::forwarder::ForwardResult;

/// JSON reply pairing the descriptor with the upstream payload.
#[derive(Debug, Serialize)]
pub struct ResponseEnvelope<'a> {
    pub request: &'a RawValue,
    pub response: Payload<'a>,
}

/// Upstream payload as embedded in the envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Payload<'a> {
    /// The upstream body was valid JSON and is embedded unescaped.
    Json(&'a RawValue),
    /// Valid UTF-8 that is not JSON, as a string.
    Text(&'a str),
    /// Anything else, as an array of byte values.
    Bytes(&'a [u8]),
}

impl<'a> Payload<'a> {
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        if let Ok(raw) = serde_json::from_slice::<&RawValue>(bytes) {
            return Payload::Json(raw);
        }
        match std::str::from_utf8(bytes) {
            Ok(text) => Payload::Text(text),
            Err(_) => Payload::Bytes(bytes),
        }
    }
}

/// Frame `result` for the caller according to `response_type`.
///
/// `request` is the descriptor's JSON as the caller submitted it.
pub fn encode(request: &RawValue, response_type: ResponseType, result: ForwardResult) -> Result<Response, RelayError> {
    match response_type {
        ResponseType::Binary => {
            let content_type = result
                .content_type
                .unwrap_or_else(|| HeaderValue::from_static("application/octet-stream"));
            let mut response = Response::new(Body::from(result.body));
            response.headers_mut().insert(CONTENT_TYPE, content_type);
            Ok(response)
        }
        ResponseType::Json => {
            let envelope = ResponseEnvelope {
                request,
                response: Payload::from_bytes(&result.body),
            };
            let bytes = serde_json::to_vec(&envelope).map_err(RelayError::Encode)?;
            let mut response = Response::new(Body::from(bytes));
            response
                .headers_mut()
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
            Ok(response)
        }
    }
}
