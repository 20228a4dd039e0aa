//! Wire types submitted by callers and their validation.
//!
//! The descriptor keeps the caller's raw text for `method`, `response_type`
//! and `proxy.type` so the JSON envelope can echo exactly what was sent. The
//! closed enums below are parsed from that text at the stage that needs them.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::relay::error::RelayError;

/// Upstream proxy a descriptor asks to be routed through.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxySpec {
    #[serde(rename = "type", default)]
    pub scheme: String,

    #[serde(default)]
    pub host: String,

    /// Zero is treated the same as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl ProxySpec {
    /// Explicit port, if one was given and is non-zero.
    pub fn port(&self) -> Option<u16> {
        self.port.filter(|p| *p != 0)
    }

    /// Username and password, only when both are non-empty.
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (self.username.as_deref(), self.password.as_deref()) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => Some((user, pass)),
            _ => None,
        }
    }
}

/// Caller-supplied description of one outbound HTTP call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RequestDescriptor {
    #[serde(default)]
    pub url: String,

    #[serde(default)]
    pub method: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_type: Option<String>,

    /// Raw JSON text forwarded verbatim as the outbound body.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Box<RawValue>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HeaderList>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proxy: Option<ProxySpec>,
}

impl RequestDescriptor {
    /// Check required fields and resolve the response framing.
    ///
    /// Checks run in a fixed order and the first failure is reported.
    pub fn validate(&self) -> Result<ResponseType, RelayError> {
        if self.url.is_empty() {
            return Err(RelayError::Validation("request.url is required".into()));
        }
        if self.method.is_empty() {
            return Err(RelayError::Validation("request.method is required".into()));
        }

        if let Some(proxy) = &self.proxy {
            if proxy.host.is_empty() {
                return Err(RelayError::Validation("request.proxy.host is required".into()));
            }
            if proxy.scheme.is_empty() {
                return Err(RelayError::Validation("request.proxy.type is required".into()));
            }
        }

        self.response_type.as_deref().unwrap_or_default().parse()
    }

    /// Outbound body bytes, if the descriptor carries a non-null body.
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body
            .as_deref()
            .map(|raw| raw.get().as_bytes())
            .filter(|bytes| !bytes.is_empty())
    }
}

/// Header entries in submission order, duplicates included.
///
/// Deserialized from a JSON object without collapsing repeated keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderList(Vec<(String, String)>);

impl HeaderList {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, String)> for HeaderList {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl Serialize for HeaderList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for HeaderList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeaderListVisitor;

        impl<'de> Visitor<'de> for HeaderListVisitor {
            type Value = HeaderList;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("an object of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut entries = Vec::with_capacity(access.size_hint().unwrap_or(0));
                while let Some(entry) = access.next_entry::<String, String>()? {
                    entries.push(entry);
                }
                Ok(HeaderList(entries))
            }
        }

        deserializer.deserialize_map(HeaderListVisitor)
    }
}

/// How the upstream response is framed back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseType {
    #[default]
    Json,
    Binary,
}

impl ResponseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseType::Json => "json",
            ResponseType::Binary => "binary",
        }
    }
}

impl FromStr for ResponseType {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "" | "json" => Ok(ResponseType::Json),
            "binary" => Ok(ResponseType::Binary),
            other => Err(RelayError::Validation(format!(
                "request.response_type = '{}' unsupported. Supported types: json, binary",
                other
            ))),
        }
    }
}

/// Proxy protocols a transport can be built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyScheme {
    Http,
    Socks5,
}

impl ProxyScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProxyScheme::Http => "http",
            ProxyScheme::Socks5 => "socks5",
        }
    }
}

impl FromStr for ProxyScheme {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "http" => Ok(ProxyScheme::Http),
            "socks5" => Ok(ProxyScheme::Socks5),
            other => Err(RelayError::UnsupportedProxyType(other.to_string())),
        }
    }
}

impl fmt::Display for ProxyScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Verbs the relay is willing to send upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl FromStr for HttpMethod {
    type Err = RelayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(RelayError::UnsupportedMethod(s.to_string())),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
        }
    }
}
