//! Request-forwarding pipeline.
//!
//! # Data Flow
//! ```text
//! inbound JSON body
//!     → descriptor.rs (decode + validate, resolve response type)
//!     → transport.rs (direct / HTTP proxy / SOCKS5, via proxy_url.rs)
//!     → assembler.rs (method, URL + params, headers, body)
//!     → forwarder.rs (execute under deadline, buffer body)
//!     → encoder.rs (binary passthrough or JSON envelope)
//! ```
//!
//! # Design Decisions
//! - Every stage is a plain function of its inputs; nothing survives a call
//! - Errors are terminal for the call and surface as `RelayError`
//! - The response type is resolved before forwarding so failures can still be
//!   labelled with it

pub mod assembler;
pub mod descriptor;
pub mod encoder;
pub mod error;
pub mod forwarder;
pub mod proxy_url;
pub mod transport;

pub use descriptor::{HeaderList, HttpMethod, ProxyScheme, ProxySpec, RequestDescriptor, ResponseType};
pub use error::RelayError;
pub use forwarder::{ForwardResult, RequestForwarder};
pub use transport::Transport;

use axum::response::Response;
use serde_json::value::RawValue;

/// A decoded, validated descriptor paired with the JSON text it came from.
#[derive(Debug)]
pub struct Submission<'a> {
    raw: &'a RawValue,
    descriptor: RequestDescriptor,
    response_type: ResponseType,
}

impl<'a> Submission<'a> {
    /// Decode and validate one inbound body.
    pub fn parse(body: &'a [u8]) -> Result<Self, RelayError> {
        let raw: &RawValue = serde_json::from_slice(body).map_err(RelayError::Decode)?;
        let descriptor: RequestDescriptor = serde_json::from_str(raw.get()).map_err(RelayError::Decode)?;
        let response_type = descriptor.validate()?;

        Ok(Self {
            raw,
            descriptor,
            response_type,
        })
    }

    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    pub fn response_type(&self) -> ResponseType {
        self.response_type
    }

    /// Forward the call and frame the reply.
    pub async fn relay(&self, forwarder: &RequestForwarder) -> Result<Response, RelayError> {
        let result = forwarder.forward(&self.descriptor).await?;
        encoder::encode(self.raw, self.response_type, result)
    }
}
