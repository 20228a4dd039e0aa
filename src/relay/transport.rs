//! Outbound transport selection.
//!
//! # Responsibilities
//! - Map an optional proxy spec to a direct, HTTP-proxying or SOCKS5 transport
//! - Turn a transport into a single-use `reqwest::Client`
//!
//! # Design Decisions
//! - Transports are plain values; building one performs no network I/O
//! - A fresh client is built per call and never pooled or cached
//! - Direct transports ignore proxy environment variables
//! - SOCKS5 targets are resolved by the proxy, not locally

use std::time::Duration;

use reqwest::{Client, Proxy};
use url::Url;

use crate::relay::descriptor::{ProxyScheme, ProxySpec};
use crate::relay::error::RelayError;
use crate::relay::proxy_url;

/// How outbound bytes reach the upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transport {
    /// Connect straight to the target.
    Direct,
    /// Forward (or CONNECT) through an HTTP proxy. Embedded credentials are
    /// sent as Proxy-Authorization.
    HttpProxy(Url),
    /// Dial through a SOCKS5 proxy, authenticating when the URL carries
    /// credentials. Target hostnames are handed to the proxy unresolved.
    Socks5(Url),
}

impl Transport {
    /// Build the transport for an optional proxy spec.
    pub fn build(spec: Option<&ProxySpec>) -> Result<Self, RelayError> {
        let Some(spec) = spec else {
            return Ok(Transport::Direct);
        };

        let scheme: ProxyScheme = spec.scheme.parse()?;
        let url = proxy_url::build(spec)?;

        Ok(match scheme {
            ProxyScheme::Http => Transport::HttpProxy(url),
            ProxyScheme::Socks5 => Transport::Socks5(url),
        })
    }

    /// Short label for logs and metrics; never includes credentials.
    pub fn label(&self) -> &'static str {
        match self {
            Transport::Direct => "direct",
            Transport::HttpProxy(_) => ProxyScheme::Http.as_str(),
            Transport::Socks5(_) => ProxyScheme::Socks5.as_str(),
        }
    }

    /// Build a single-use client that sends everything over this transport.
    pub fn into_client(self, connect_timeout: Duration) -> Result<Client, RelayError> {
        let builder = Client::builder()
            .connect_timeout(connect_timeout)
            .pool_max_idle_per_host(0);

        let proxy_url = match self {
            Transport::Direct => return builder.no_proxy().build().map_err(RelayError::ForwardFailed),
            Transport::HttpProxy(url) => url,
            Transport::Socks5(url) => remote_dns(url)?,
        };

        let proxy = Proxy::all(proxy_url).map_err(|e| RelayError::InvalidProxyUrl(e.to_string()))?;
        builder.proxy(proxy).build().map_err(RelayError::ForwardFailed)
    }
}

/// reqwest resolves targets locally for `socks5://`; `socks5h://` defers
/// resolution to the proxy.
fn remote_dns(mut url: Url) -> Result<Url, RelayError> {
    url.set_scheme("socks5h")
        .map_err(|()| RelayError::InvalidProxyUrl(format!("cannot dial {} scheme as socks5h", url.scheme())))?;
    Ok(url)
}
