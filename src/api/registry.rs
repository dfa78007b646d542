// SPDX-License-Identifier: Apache-2.0

//! The endpoint directory: base configuration plus per-endpoint overrides.

use std::collections::HashMap;
use std::sync::LazyLock;

use log::debug;
use regex::Regex;
use reqwest::Method;
use reqwest::header::HeaderMap;
use thiserror::Error;

use crate::api::endpoint::{
    CallOverride, EndpointDef, EndpointTemplate, Fields, RequestOptions, merge_fields,
    merge_headers,
};

static SLASH_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/+").expect("slash pattern is valid"));

/// A directory error.
#[derive(Debug, Error)]
pub enum Error {
    /// Lookup of a name that was never registered.
    #[error("unknown endpoint: {0}")]
    UnknownEndpoint(String),
}

/// Base settings shared by every endpoint in a directory.
///
/// The segments concatenate to `host/prefix/version/module/<endpoint url>`;
/// empty segments collapse away. `params`, `body`, and `headers` are merged
/// into each endpoint definition at registration time.
#[derive(Debug, Clone, Default)]
pub struct ApiBase {
    /// Scheme and authority, e.g. `http://192.168.1.1`. The directory never
    /// rewrites it beyond stripping a trailing slash.
    pub host: String,

    /// Leading path segment(s), e.g. `api/admin`.
    pub prefix: String,

    /// API version segment, e.g. `v1`.
    pub version: String,

    /// Module segment, e.g. `user`.
    pub module: String,

    /// Query parameters every endpoint carries. These WIN over params in an
    /// endpoint definition on key collision.
    pub params: Fields,

    /// Body fields every endpoint carries. Endpoint definitions win on key
    /// collision.
    pub body: Fields,

    /// Headers every endpoint carries. Endpoint definitions win on name
    /// collision.
    pub headers: HeaderMap,
}

/// A directory of named endpoints.
///
/// Built once from an [`ApiBase`] and an initial endpoint map, extendable
/// with [`add`](Api::add). Looking up a name with [`get`](Api::get) returns
/// a fresh [`RequestOptions`] value ready for
/// [`HttpService::fetch`](crate::http::HttpService::fetch).
///
/// # Examples
///
/// ```
/// use apikit::{Api, ApiBase, EndpointDef};
/// use reqwest::Method;
///
/// let base = ApiBase {
///     host: "http://192.168.1.1".to_string(),
///     prefix: "api/admin".to_string(),
///     version: "v1".to_string(),
///     module: "user".to_string(),
///     ..ApiBase::default()
/// };
/// let api = Api::new(base, [
///     ("login", EndpointDef::at("login").method(Method::POST)),
///     ("profile", EndpointDef::at("profile/:id")),
/// ]);
///
/// let login = api.get("login").unwrap();
/// assert_eq!(login.url(), "http://192.168.1.1/api/admin/v1/user/login");
///
/// let profile = api.get_with("profile", None, &[("id", "42")]).unwrap();
/// assert_eq!(profile.url(), "http://192.168.1.1/api/admin/v1/user/profile/42");
/// ```
#[derive(Debug, Default)]
pub struct Api {
    base: ApiBase,
    endpoints: HashMap<String, EndpointTemplate>,
}

impl Api {
    /// Creates a directory from base settings and an initial endpoint map.
    pub fn new<I, S>(base: ApiBase, endpoints: I) -> Self
    where
        I: IntoIterator<Item = (S, EndpointDef)>,
        S: Into<String>,
    {
        let mut api = Self {
            base,
            endpoints: HashMap::new(),
        };
        api.add(endpoints);
        api
    }

    /// Registers endpoints, merging each definition with the base settings.
    ///
    /// Endpoint headers and body fields win over the base's on collision;
    /// base params win over the endpoint's. Entries with an empty name are
    /// skipped. Registering a name again replaces the earlier template.
    ///
    /// Returns `&mut Self` so registrations chain.
    pub fn add<I, S>(&mut self, endpoints: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, EndpointDef)>,
        S: Into<String>,
    {
        for (name, def) in endpoints {
            let name = name.into();
            if name.is_empty() {
                continue;
            }

            let url = self.join_url(&def.url);
            let method = def.method.unwrap_or(Method::GET);
            let headers = merge_headers(&self.base.headers, &def.headers);
            // Reversed precedence: base params are not overridable by an
            // endpoint definition.
            let params = merge_fields(&def.params, &self.base.params);
            let body = merge_fields(&self.base.body, &def.body);

            debug!("registered endpoint {name}: {method} {url}");
            self.endpoints
                .insert(name, EndpointTemplate::build(url, method, headers, params, body));
        }

        self
    }

    /// Resolves a named endpoint into a fresh [`RequestOptions`] value.
    pub fn get(&self, name: &str) -> Result<RequestOptions, Error> {
        self.get_with(name, None, &[])
    }

    /// Resolves a named endpoint, applying a per-call override and path
    /// parameters.
    ///
    /// Override headers, params, and body all win over the template's on
    /// collision, and the payload is re-derived from the merged result. Each
    /// `(key, value)` pair then replaces the first `:key` token in the URL,
    /// verbatim; callers are responsible for URL-safe values.
    pub fn get_with(
        &self,
        name: &str,
        overrides: Option<&CallOverride>,
        path_params: &[(&str, &str)],
    ) -> Result<RequestOptions, Error> {
        let template = self
            .endpoints
            .get(name)
            .ok_or_else(|| Error::UnknownEndpoint(name.to_string()))?;
        Ok(template.resolve(overrides, path_params))
    }

    /// Names of every registered endpoint, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.endpoints.keys().map(String::as_str)
    }

    /// True if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.endpoints.contains_key(name)
    }

    /// Builds the endpoint URL: the normalized path appended to the host.
    ///
    /// Only the path part is normalized (slash runs collapsed, trailing
    /// slash stripped); the host is left alone apart from a trailing slash,
    /// so `http://` survives intact.
    fn join_url(&self, endpoint_url: &str) -> String {
        let ApiBase {
            host,
            prefix,
            version,
            module,
            ..
        } = &self.base;

        let path = format!("/{prefix}/{version}/{module}/{endpoint_url}");
        let path = SLASH_RUNS.replace_all(&path, "/");
        let path = path.trim_end_matches('/');
        format!("{}{path}", host.trim_end_matches('/'))
    }
}
