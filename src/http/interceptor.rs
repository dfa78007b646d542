//! Per-service hooks around the fetch lifecycle.
//!
//! Every [`HttpService`](crate::http::HttpService) owns its own
//! [`Interceptors`] value, so two services can carry independent hook sets;
//! nothing here is process-wide state.

use std::fmt;

use crate::http::transport::RawResponse;

type BeforeFetch = Box<dyn Fn() -> bool + Send + Sync>;
type SuccessHook = Box<dyn Fn(Option<&str>, &RawResponse) + Send + Sync>;
type ErrorHook = Box<dyn Fn(&str, Option<&RawResponse>) + Send + Sync>;

/// Replaceable hooks around a service's fetch lifecycle.
///
/// The defaults are permissive: the gate always allows the call and the
/// response hooks do nothing. Build a custom set with the setters:
///
/// ```
/// use apikit::Interceptors;
///
/// let interceptors = Interceptors::default()
///     .before_fetch(|| true)
///     .on_error(|message, _response| eprintln!("{message}"));
/// ```
pub struct Interceptors {
    pub(crate) before_fetch: BeforeFetch,
    pub(crate) on_success: SuccessHook,
    pub(crate) on_error: ErrorHook,
}

impl Default for Interceptors {
    fn default() -> Self {
        Self {
            before_fetch: Box::new(|| true),
            on_success: Box::new(|_, _| {}),
            on_error: Box::new(|_, _| {}),
        }
    }
}

impl Interceptors {
    /// Replaces the pre-flight gate. Returning `false` aborts the call
    /// before it reaches the network.
    pub fn before_fetch(self, gate: impl Fn() -> bool + Send + Sync + 'static) -> Self {
        Self {
            before_fetch: Box::new(gate),
            ..self
        }
    }

    /// Replaces the success hook, invoked with the caller-supplied success
    /// message (if any) and the raw response.
    pub fn on_success(
        self,
        hook: impl Fn(Option<&str>, &RawResponse) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_success: Box::new(hook),
            ..self
        }
    }

    /// Replaces the error hook, invoked with the translated user-facing
    /// message and the raw response. The response is `None` when the
    /// failure happened below the HTTP layer.
    pub fn on_error(
        self,
        hook: impl Fn(&str, Option<&RawResponse>) + Send + Sync + 'static,
    ) -> Self {
        Self {
            on_error: Box::new(hook),
            ..self
        }
    }
}

impl fmt::Debug for Interceptors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Interceptors").finish_non_exhaustive()
    }
}
