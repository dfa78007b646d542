//! The HTTP service: interceptors, response caching, envelope validation,
//! and error-message translation around a pluggable transport.

pub mod cache;
pub mod interceptor;
pub mod service;
pub mod transport;

pub use interceptor::Interceptors;
pub use service::{FetchOptions, HttpService};
pub use transport::{RawResponse, ReqwestTransport, Transport};

use std::{error, fmt};

use reqwest::StatusCode;

/// The result of a fetch call.
pub type FetchResult<T> = Result<T, FetchError>;

/// Indicates an error has occurred while fetching a response.
#[derive(Debug)]
pub enum FetchError {
    /// The pre-flight gate declined the call; the network was never touched.
    Aborted,

    /// A connection-level error while making the HTTP request.
    Request(reqwest::Error),

    /// An unsuccessful HTTP status code in the response.
    Http {
        status: StatusCode,
        response: RawResponse,
    },

    /// A 2xx response whose body failed envelope validation: not JSON, not
    /// an object, or a `code` field other than the integer 0.
    Envelope { response: RawResponse },
}

impl FetchError {
    /// The raw response behind this error, when the server produced one.
    pub fn response(&self) -> Option<&RawResponse> {
        match self {
            FetchError::Http { response, .. } | FetchError::Envelope { response } => Some(response),
            FetchError::Aborted | FetchError::Request(_) => None,
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::Aborted => write!(f, "Request aborted by the pre-flight gate"),
            FetchError::Request(err) => write!(f, "Error while making HTTP request: {err}"),
            FetchError::Http { status, .. } => write!(f, "Request returned HTTP {status}"),
            FetchError::Envelope { .. } => write!(f, "Response body failed envelope validation"),
        }
    }
}

impl error::Error for FetchError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            FetchError::Request(err) => Some(err),
            FetchError::Aborted | FetchError::Http { .. } | FetchError::Envelope { .. } => None,
        }
    }
}
