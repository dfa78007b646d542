// SPDX-License-Identifier: Apache-2.0

//! The fetch lifecycle: gate, cache, send, validate, notify.

use std::sync::Mutex;

use log::{debug, trace};
use serde::Deserialize;
use serde_json::Value;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};

use crate::api::endpoint::RequestOptions;
use crate::http::cache::{CacheKey, ResponseCache};
use crate::http::interceptor::Interceptors;
use crate::http::transport::{RawResponse, ReqwestTransport, Transport};
use crate::http::{FetchError, FetchResult};

/// Shown when a failed response carries no usable `message` of its own.
const FALLBACK_MESSAGE: &str = "server is busy, try again later";

/// Options for a single fetch call.
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    pub(crate) from_cache: bool,
    pub(crate) success_message: Option<String>,
}

impl FetchOptions {
    /// Answers a matching earlier response from the cache instead of going
    /// to the network. Falls through to the network when nothing matches.
    pub fn from_cache(self) -> Self {
        Self {
            from_cache: true,
            ..self
        }
    }

    /// Sets the message handed to the success hook when the call succeeds.
    pub fn success_message(self, message: impl Into<String>) -> Self {
        Self {
            success_message: Some(message.into()),
            ..self
        }
    }
}

/// Issues requests through a [`Transport`], validating each response
/// envelope and translating failures into user-facing messages.
///
/// The service owns its [`Interceptors`] and its response cache; two
/// services never share either. Successful bodies are cached by request
/// identity and never evicted. A long-running process that issues many
/// distinct requests should call
/// [`clear_cache`](HttpService::clear_cache) periodically or accept the
/// growth.
///
/// Every response must carry the backend envelope: a JSON object whose
/// integer `code` field is 0 on success and whose `message` field, on
/// failure, explains why.
#[derive(Debug)]
pub struct HttpService<T = ReqwestTransport> {
    transport: T,
    default_headers: HeaderMap,
    interceptors: Interceptors,
    cache: Mutex<ResponseCache>,
}

impl HttpService<ReqwestTransport> {
    /// Creates a service over the production transport.
    pub fn new() -> Self {
        Self::with_transport(ReqwestTransport::default())
    }
}

impl Default for HttpService<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> HttpService<T> {
    /// Creates a service over the given transport.
    pub fn with_transport(transport: T) -> Self {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Self {
            transport,
            default_headers,
            interceptors: Interceptors::default(),
            cache: Mutex::new(ResponseCache::default()),
        }
    }

    /// Replaces the service's interceptor set.
    pub fn config(&mut self, interceptors: Interceptors) {
        self.interceptors = interceptors;
    }

    /// Fetches with default [`FetchOptions`]: no cache consultation, no
    /// success message.
    pub async fn fetch(&self, request: RequestOptions) -> FetchResult<Value> {
        self.fetch_with(request, FetchOptions::default()).await
    }

    /// Runs the full fetch lifecycle for one request.
    ///
    /// The pre-flight gate runs first; a declined call returns
    /// [`FetchError::Aborted`] without touching the network. The service
    /// default headers are then merged under the request's (the request
    /// wins per name), the cache is consulted when
    /// [`from_cache`](FetchOptions::from_cache) is set, and otherwise the
    /// request goes out through the transport. A successful call returns
    /// the decoded envelope body; every failure routes its translated
    /// message through the error hook before the error is returned.
    pub async fn fetch_with(
        &self,
        mut request: RequestOptions,
        options: FetchOptions,
    ) -> FetchResult<Value> {
        if !(self.interceptors.before_fetch)() {
            debug!("fetch aborted by the pre-flight gate");
            return Err(FetchError::Aborted);
        }

        request.merge_defaults(&self.default_headers);
        let key = CacheKey::for_request(&request);

        if options.from_cache {
            let cache = self.cache.lock().expect("cache lock poisoned");
            if let Some(body) = cache.lookup(&key) {
                trace!("cache hit for {} {}", request.method(), request.url());
                return Ok(body.clone());
            }
        }

        debug!("{} {}", request.method(), request.url());
        let response = match self.transport.send(&request).await {
            Ok(response) => response,
            Err(err) => {
                (self.interceptors.on_error)(FALLBACK_MESSAGE, None);
                return Err(FetchError::Request(err));
            }
        };

        if !response.status.is_success() {
            return Err(self.reject(response));
        }

        match parse_envelope(&response.body) {
            Some(body) => {
                (self.interceptors.on_success)(options.success_message.as_deref(), &response);
                self.cache
                    .lock()
                    .expect("cache lock poisoned")
                    .store(key, body.clone());
                Ok(body)
            }
            None => Err(self.reject(response)),
        }
    }

    /// Drops every cached response body.
    pub fn clear_cache(&self) {
        self.cache.lock().expect("cache lock poisoned").clear();
    }

    /// Number of cached response bodies.
    pub fn cache_len(&self) -> usize {
        self.cache.lock().expect("cache lock poisoned").len()
    }

    /// Routes the translated message through the error hook and wraps the
    /// response in the matching error.
    fn reject(&self, response: RawResponse) -> FetchError {
        let message = user_message(&response);
        (self.interceptors.on_error)(&message, Some(&response));
        if response.status.is_success() {
            FetchError::Envelope { response }
        } else {
            FetchError::Http {
                status: response.status,
                response,
            }
        }
    }
}

/// Envelope fields every backend response must carry.
#[derive(Debug, Deserialize)]
struct Envelope {
    code: i64,
}

/// Accepts only a JSON object whose `code` field is exactly the integer 0,
/// returning the full decoded body.
fn parse_envelope(body: &str) -> Option<Value> {
    let value: Value = serde_json::from_str(body).ok()?;
    if !value.is_object() {
        return None;
    }
    let envelope: Envelope = serde_json::from_value(value.clone()).ok()?;
    (envelope.code == 0).then_some(value)
}

/// Translates a failed response into a user-facing message.
///
/// Well-known statuses get a fixed message; anything else falls back to the
/// body's `message` field, or a generic notice when the body has none.
fn user_message(response: &RawResponse) -> String {
    match response.status.as_u16() {
        400 => "request error".to_string(),
        401 => "session expired, please log in again".to_string(),
        403 => "no permission for this operation".to_string(),
        404 => "invalid API address".to_string(),
        _ => serde_json::from_str::<Value>(&response.body)
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
    }
}
