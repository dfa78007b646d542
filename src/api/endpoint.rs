//! Endpoint descriptors and the resolved request values built from them.
//!
//! An [`EndpointDef`] is what callers hand to the directory when registering
//! an endpoint; the directory turns it into an [`EndpointTemplate`] with a
//! fully built URL and a derived [`Payload`]. Looking an endpoint up clones
//! the template, applies an optional [`CallOverride`], and produces a
//! [`RequestOptions`] value that is handed to the transport. Templates are
//! never exposed mutably, so no two callers can observe each other's edits.

use reqwest::Method;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, IntoHeaderName};
use serde_json::{Map, Value};

/// Key-value fields used for query parameters and request bodies.
///
/// Values are [`serde_json::Value`], so only serializable primitives and
/// nested containers can enter the system. The map is ordered by key, which
/// keeps every serialized form of a request deterministic.
pub type Fields = Map<String, Value>;

/// A request body in transport-ready form.
///
/// Derived from a field map and the request's `Content-Type` header; the
/// pair is re-derived whenever either side changes, so the payload is never
/// stale relative to the fields that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// JSON encoding of the field map, for `application/json`.
    Json(String),

    /// `&`-joined `key=value` pairs, for `application/x-www-form-urlencoded`.
    Form(String),

    /// The untouched field map, for any other content type. The transport
    /// decides how to encode it.
    Fields(Fields),
}

impl Payload {
    /// Derives the transport-ready body for the given fields and content
    /// type.
    ///
    /// Form values are rendered as bare scalars and are NOT percent-encoded;
    /// callers are responsible for supplying URL-safe values.
    ///
    /// # Examples
    ///
    /// ```
    /// use apikit::api::endpoint::{Fields, Payload};
    /// use serde_json::json;
    ///
    /// let mut body = Fields::new();
    /// body.insert("id".to_string(), json!(7));
    /// body.insert("name".to_string(), json!("ada"));
    ///
    /// assert_eq!(
    ///     Payload::derive(&body, Some("application/json")),
    ///     Payload::Json(r#"{"id":7,"name":"ada"}"#.to_string()),
    /// );
    /// assert_eq!(
    ///     Payload::derive(&body, Some("application/x-www-form-urlencoded")),
    ///     Payload::Form("id=7&name=ada".to_string()),
    /// );
    /// ```
    pub fn derive(body: &Fields, content_type: Option<&str>) -> Self {
        match content_type {
            Some(kind) if kind.starts_with("application/json") => {
                Payload::Json(Value::Object(body.clone()).to_string())
            }
            Some(kind) if kind.starts_with("application/x-www-form-urlencoded") => {
                Payload::Form(form_encode(body))
            }
            _ => Payload::Fields(body.clone()),
        }
    }

    /// True if the payload carries no body at all.
    pub fn is_empty(&self) -> bool {
        match self {
            Payload::Json(text) => text == "{}",
            Payload::Form(text) => text.is_empty(),
            Payload::Fields(fields) => fields.is_empty(),
        }
    }
}

/// A named endpoint as supplied at registration time.
///
/// Every field is optional; the directory fills in defaults (`GET`, the
/// base headers/params/body) when it builds the stored template.
#[derive(Debug, Clone, Default)]
pub struct EndpointDef {
    /// URL fragment relative to the directory base, e.g. `login` or
    /// `profile/:id`.
    pub url: String,

    /// HTTP method; `GET` when absent.
    pub method: Option<Method>,

    /// Headers merged over the base headers (this side wins).
    pub headers: HeaderMap,

    /// Query parameters merged under the base params (the base wins).
    pub params: Fields,

    /// Body fields merged over the base body (this side wins).
    pub body: Fields,
}

impl EndpointDef {
    /// A definition for the given URL fragment, relative to the directory
    /// base.
    pub fn at(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Sets the HTTP method.
    pub fn method(self, method: Method) -> Self {
        Self {
            method: Some(method),
            ..self
        }
    }

    /// Adds a header.
    pub fn header(mut self, name: impl IntoHeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds a body field.
    pub fn body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }
}

/// A per-call patch applied on top of a stored template during lookup.
///
/// Headers, params, and body additions all win over the template's values
/// on key collision.
#[derive(Debug, Clone, Default)]
pub struct CallOverride {
    pub headers: HeaderMap,
    pub params: Fields,
    pub body: Fields,
}

impl CallOverride {
    /// Adds a header.
    pub fn header(mut self, name: impl IntoHeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Adds a query parameter.
    pub fn param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Adds a body field.
    pub fn body_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.body.insert(key.into(), value.into());
        self
    }
}

/// A stored endpoint descriptor: the URL built at registration time plus
/// merged headers, params, body, and the derived payload.
#[derive(Debug, Clone, PartialEq)]
pub struct EndpointTemplate {
    url: String,
    method: Method,
    headers: HeaderMap,
    params: Fields,
    body: Fields,
    payload: Payload,
}

impl EndpointTemplate {
    pub(crate) fn build(
        url: String,
        method: Method,
        headers: HeaderMap,
        params: Fields,
        body: Fields,
    ) -> Self {
        let payload = Payload::derive(&body, content_type(&headers));
        Self {
            url,
            method,
            headers,
            params,
            body,
            payload,
        }
    }

    /// The URL built at registration time, path-parameter tokens included.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Clones the template, applies the override and path parameters, and
    /// returns the finished request value.
    pub(crate) fn resolve(
        &self,
        overrides: Option<&CallOverride>,
        path_params: &[(&str, &str)],
    ) -> RequestOptions {
        let mut headers = self.headers.clone();
        let mut params = self.params.clone();
        let mut body = self.body.clone();
        let mut payload = self.payload.clone();

        if let Some(patch) = overrides {
            headers = merge_headers(&headers, &patch.headers);
            params = merge_fields(&params, &patch.params);
            body = merge_fields(&body, &patch.body);
            payload = Payload::derive(&body, content_type(&headers));
        }

        let mut url = self.url.clone();
        for (key, value) in path_params {
            url = url.replacen(&format!(":{key}"), value, 1);
        }

        RequestOptions {
            method: self.method.clone(),
            url,
            headers,
            params,
            body,
            payload,
        }
    }
}

/// A resolved request, ready for the transport.
///
/// Produced fresh on every directory lookup; mutating one cannot affect the
/// stored template or any other caller's copy.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestOptions {
    method: Method,
    url: String,
    headers: HeaderMap,
    params: Fields,
    body: Fields,
    payload: Payload,
}

impl RequestOptions {
    /// The HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The final URL, path parameters substituted.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// The resolved headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// The resolved query parameters.
    pub fn params(&self) -> &Fields {
        &self.params
    }

    /// The merged body fields the payload was derived from.
    pub fn body(&self) -> &Fields {
        &self.body
    }

    /// The transport-ready body.
    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Query parameters rendered as bare strings for the transport.
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        self.params
            .iter()
            .map(|(key, value)| (key.clone(), scalar(value)))
            .collect()
    }

    /// Fills in any default headers absent from this request and re-derives
    /// the payload if that changed the content type.
    pub(crate) fn merge_defaults(&mut self, defaults: &HeaderMap) {
        let before = content_type(&self.headers).map(str::to_string);
        for (name, value) in defaults {
            if !self.headers.contains_key(name) {
                self.headers.insert(name.clone(), value.clone());
            }
        }
        let after = content_type(&self.headers).map(str::to_string);
        if before != after {
            self.payload = Payload::derive(&self.body, after.as_deref());
        }
    }
}

/// The request's `Content-Type`, when present and readable as a string.
pub(crate) fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers.get(CONTENT_TYPE).and_then(|value| value.to_str().ok())
}

/// Merges `patch` over `base`; `patch` wins on name collision.
pub(crate) fn merge_headers(base: &HeaderMap, patch: &HeaderMap) -> HeaderMap {
    let mut merged = base.clone();
    for (name, value) in patch {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Merges `patch` over `base`; `patch` wins on key collision.
pub(crate) fn merge_fields(base: &Fields, patch: &Fields) -> Fields {
    let mut merged = base.clone();
    for (key, value) in patch {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

fn form_encode(body: &Fields) -> String {
    body.iter()
        .map(|(key, value)| format!("{key}={}", scalar(value)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Renders a JSON value as a bare string: strings lose their quotes, every
/// other value uses its JSON text.
fn scalar(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
