//! The endpoint directory: named endpoint descriptors built from a base
//! configuration and per-endpoint overrides.

pub mod endpoint;
pub mod registry;

pub use endpoint::{CallOverride, EndpointDef, Fields, Payload, RequestOptions};
pub use registry::{Api, ApiBase, Error};
