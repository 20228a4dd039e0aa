//! Executes a descriptor against its upstream.
//!
//! # Responsibilities
//! - Build the transport and the outbound request for one call
//! - Execute it under the per-call deadline
//! - Buffer the decoded response body
//!
//! # Design Decisions
//! - Upstream 4xx/5xx are results, not errors
//! - Only network-level failures become `ForwardFailed`
//! - Nothing is shared between calls except immutable timeouts

use std::time::{Duration, Instant};

use axum::body::Bytes;
use reqwest::header::{HeaderValue, CONTENT_TYPE};
use reqwest::StatusCode;

use crate::config::TimeoutConfig;
use crate::relay::assembler;
use crate::relay::descriptor::RequestDescriptor;
use crate::relay::error::RelayError;
use crate::relay::transport::Transport;
use crate::resilience::with_deadline;

/// Decoded upstream response.
#[derive(Debug, Clone)]
pub struct ForwardResult {
    pub status: StatusCode,
    pub content_type: Option<HeaderValue>,
    pub body: Bytes,
}

/// Performs outbound calls on behalf of callers.
#[derive(Debug, Clone)]
pub struct RequestForwarder {
    connect_timeout: Duration,
    deadline: Duration,
}

impl RequestForwarder {
    pub fn new(connect_timeout: Duration, deadline: Duration) -> Self {
        Self {
            connect_timeout,
            deadline,
        }
    }

    pub fn from_config(timeouts: &TimeoutConfig) -> Self {
        Self::new(
            Duration::from_secs(timeouts.connect_secs),
            Duration::from_secs(timeouts.upstream_secs),
        )
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    /// Perform the call described by `descriptor` and buffer its response.
    pub async fn forward(&self, descriptor: &RequestDescriptor) -> Result<ForwardResult, RelayError> {
        let start = Instant::now();

        let transport = Transport::build(descriptor.proxy.as_ref())?;
        let transport_label = transport.label();
        let client = transport.into_client(self.connect_timeout)?;
        let request = assembler::assemble(descriptor)?;

        let method = request.method().clone();
        let host = request.url().host_str().unwrap_or_default().to_string();

        tracing::debug!(
            method = %method,
            host = %host,
            transport = transport_label,
            "Forwarding request upstream"
        );

        let result = with_deadline(self.deadline, async move {
            let response = client.execute(request).await.map_err(RelayError::ForwardFailed)?;
            let status = response.status();
            let content_type = response.headers().get(CONTENT_TYPE).cloned();
            let body = response.bytes().await.map_err(RelayError::ForwardFailed)?;

            Ok(ForwardResult {
                status,
                content_type,
                body,
            })
        })
        .await;

        match &result {
            Ok(r) => tracing::info!(
                method = %method,
                host = %host,
                transport = transport_label,
                status = r.status.as_u16(),
                bytes = r.body.len(),
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream responded"
            ),
            Err(e) => tracing::error!(
                method = %method,
                host = %host,
                transport = transport_label,
                error = %e,
                elapsed_ms = start.elapsed().as_millis() as u64,
                "Upstream call failed"
            ),
        }

        result
    }
}
