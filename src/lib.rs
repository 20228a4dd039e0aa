//! Proxify: single-endpoint HTTP relay.
//!
//! Callers POST a JSON descriptor of an outbound HTTP request to `/proxify`;
//! the relay performs it (directly, or through an HTTP or SOCKS5 proxy) and
//! returns the upstream body either verbatim or in a JSON envelope.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod relay;
pub mod resilience;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use relay::{RelayError, RequestDescriptor, RequestForwarder};
