//! The seam between [`HttpService`](crate::http::HttpService) and the
//! network.
//!
//! The service only ever talks to a [`Transport`], so production code can
//! use [`ReqwestTransport`] while tests substitute a scripted double, the
//! same way a deterministic service stands in for a remote one.

use reqwest::header::HeaderMap;
use reqwest::{Client, ClientBuilder, StatusCode};

use crate::api::endpoint::{Payload, RequestOptions};

/// The raw outcome of one HTTP exchange: status and body text.
///
/// Everything downstream of the transport (envelope validation, caching,
/// interceptors) works on this value, not on a live connection.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: String,
}

/// Issues a resolved request and returns the raw response.
///
/// Connection-level failures surface as `reqwest::Error`; any response the
/// server actually produced, success or not, is a [`RawResponse`].
pub trait Transport {
    fn send(
        &self,
        request: &RequestOptions,
    ) -> impl Future<Output = Result<RawResponse, reqwest::Error>> + Send;
}

/// The production transport: a shared `reqwest` client.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: Client,
}

impl Default for ReqwestTransport {
    /// Creates a transport with a client identified by this crate's name
    /// and version.
    fn default() -> Self {
        let client = ClientBuilder::new()
            .user_agent(user_agent())
            .build()
            // build() only fails if a TLS backend or DNS resolver cannot be
            // initialized, which is unrecoverable for us.
            .expect("could not create a new HTTP client");
        Self { client }
    }
}

impl ReqwestTransport {
    /// Creates a transport around an already-configured client.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    async fn send(&self, request: &RequestOptions) -> Result<RawResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(request.method().clone(), request.url())
            .headers(strip_content_length(request.headers()));

        if !request.params().is_empty() {
            builder = builder.query(&request.query_pairs());
        }

        builder = match request.payload() {
            payload if payload.is_empty() => builder,
            Payload::Json(text) | Payload::Form(text) => builder.body(text.clone()),
            Payload::Fields(fields) => builder.json(fields),
        };

        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        Ok(RawResponse { status, body })
    }
}

/// An appropriate user agent to use when making HTTP requests.
fn user_agent() -> String {
    format!("{} v{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"))
}

// reqwest computes Content-Length from the body it is given; a stale value
// copied in from a caller-supplied header map would override it.
fn strip_content_length(headers: &HeaderMap) -> HeaderMap {
    let mut headers = headers.clone();
    headers.remove(reqwest::header::CONTENT_LENGTH);
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use regex::Regex;

    #[test]
    fn it_returns_a_user_agent_with_a_version_number() {
        let user_agent = user_agent();
        let version_re = Regex::new(r"^[a-z]+ v\d+\.\d+\.\d+$").unwrap();
        assert!(
            version_re.is_match(&user_agent),
            "{} does not match {}",
            user_agent,
            version_re,
        );
    }

    #[test]
    fn it_strips_a_stale_content_length() {
        use reqwest::header::{CONTENT_LENGTH, HeaderValue};
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_LENGTH, HeaderValue::from_static("999"));
        assert!(strip_content_length(&headers).is_empty());
    }
}
