//! Outbound request assembly.

use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Body, Request};
use url::form_urlencoded;
use url::Url;

use crate::relay::descriptor::{HttpMethod, RequestDescriptor};
use crate::relay::error::RelayError;

/// Build the concrete outbound request described by `descriptor`.
///
/// A non-empty `params` map replaces the target's whole query string; an
/// empty or absent one leaves it untouched. Headers are appended, so repeated
/// names all reach the upstream.
pub fn assemble(descriptor: &RequestDescriptor) -> Result<Request, RelayError> {
    let mut url = Url::parse(&descriptor.url)
        .map_err(|e| RelayError::InvalidTargetUrl(format!("{}: {}", descriptor.url, e)))?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(RelayError::InvalidTargetUrl(format!(
            "{}: unsupported scheme '{}'",
            descriptor.url,
            url.scheme()
        )));
    }

    if let Some(params) = descriptor.params.as_ref().filter(|p| !p.is_empty()) {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params.iter())
            .finish();
        url.set_query(Some(&query));
    }

    let method: HttpMethod = descriptor.method.parse()?;
    let mut request = Request::new(method.into(), url);

    if let Some(body) = descriptor.body_bytes() {
        *request.body_mut() = Some(Body::from(body.to_vec()));
    }

    if let Some(headers) = &descriptor.headers {
        for (name, value) in headers.iter() {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| RelayError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            let header_value = HeaderValue::from_str(value).map_err(|e| RelayError::InvalidHeader {
                name: name.to_string(),
                reason: e.to_string(),
            })?;
            request.headers_mut().append(header_name, header_value);
        }
    }

    Ok(request)
}
