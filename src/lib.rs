// SPDX-License-Identifier: Apache-2.0

//! apikit is a thin configuration and request-building layer over an HTTP
//! client. It keeps a directory of named endpoints (base URL segments plus
//! default headers, query parameters, and body fields, each overridable per
//! endpoint and per call) and a fetch service that wraps every outgoing
//! request with interceptors, an in-memory response cache, and translation
//! of failures into user-facing messages.
//!
//! It is a library for talking to backends that answer every request with
//! the same JSON envelope: an object whose integer `code` field is 0 on
//! success and whose `message` field, on failure, says what went wrong.
//!
//! # Building a directory
//!
//! An [`Api`] is built from an [`ApiBase`] (host and path segments shared
//! by every endpoint) and any number of [`EndpointDef`]s. The directory
//! concatenates `host/prefix/version/module/<endpoint url>`, collapsing
//! empty segments, and merges the base defaults into each definition:
//!
//! ```
//! use apikit::{Api, ApiBase, EndpointDef};
//! use reqwest::Method;
//!
//! let base = ApiBase {
//!     host: "http://192.168.1.1".to_string(),
//!     prefix: "api/admin".to_string(),
//!     version: "v1".to_string(),
//!     module: "user".to_string(),
//!     ..ApiBase::default()
//! };
//! let api = Api::new(base, [
//!     ("login", EndpointDef::at("login").method(Method::POST)),
//!     ("profile", EndpointDef::at("profile/:id")),
//! ]);
//!
//! let login = api.get("login").unwrap();
//! assert_eq!(login.url(), "http://192.168.1.1/api/admin/v1/user/login");
//! ```
//!
//! Lookups accept per-call overrides and `:name` path parameters; see
//! [`Api::get_with`].
//!
//! # Fetching
//!
//! [`HttpService::fetch`] takes the resolved [`RequestOptions`] value and
//! runs the full call lifecycle: pre-flight gate, cache consultation,
//! transport send, envelope validation, and interceptor dispatch.
//!
//! ```no_run
//! use apikit::{Api, ApiBase, EndpointDef, FetchOptions, HttpService, Interceptors};
//! use reqwest::Method;
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let api = Api::new(
//!     ApiBase {
//!         host: "http://192.168.1.1".to_string(),
//!         prefix: "api/admin".to_string(),
//!         version: "v1".to_string(),
//!         module: "user".to_string(),
//!         ..ApiBase::default()
//!     },
//!     [("login", EndpointDef::at("login").method(Method::POST))],
//! );
//!
//! let mut service = HttpService::new();
//! service.config(
//!     Interceptors::default()
//!         .on_error(|message, _response| eprintln!("{message}")),
//! );
//!
//! let body = service.fetch(api.get("login")?).await?;
//! println!("logged in: {body}");
//!
//! // A repeated request can be answered from the cache.
//! let cached = service
//!     .fetch_with(api.get("login")?, FetchOptions::default().from_cache())
//!     .await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Scope
//!
//! The crate deliberately stops at request composition and response
//! validation. There are no retries, no backoff, no timeouts of its own,
//! and no cancellation API; the transport's defaults apply. The response
//! cache never evicts; see [`HttpService`] for the trade-off and the
//! escape hatch.

pub mod api;
pub mod http;

pub use api::{Api, ApiBase, CallOverride, EndpointDef, RequestOptions};
pub use http::{FetchError, FetchOptions, HttpService, Interceptors};

#[cfg(test)]
mod test_utils;
