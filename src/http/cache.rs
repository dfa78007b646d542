//! Keyed storage for successful response bodies.

use std::collections::HashMap;

use serde_json::Value;

use crate::api::endpoint::{Payload, RequestOptions};

/// The identity of a request for caching purposes: method, URL, query
/// parameters, and serialized body. Headers are deliberately excluded.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    method: String,
    url: String,
    params: String,
    payload: String,
}

impl CacheKey {
    /// Derives the key for a resolved request.
    ///
    /// Field maps are ordered by key, so two structurally equal requests
    /// always produce the same key text.
    pub fn for_request(request: &RequestOptions) -> Self {
        let payload = match request.payload() {
            Payload::Json(text) | Payload::Form(text) => text.clone(),
            Payload::Fields(fields) => Value::Object(fields.clone()).to_string(),
        };
        Self {
            method: request.method().to_string(),
            url: request.url().to_string(),
            params: Value::Object(request.params().clone()).to_string(),
            payload,
        }
    }
}

/// Response bodies from successful calls, keyed by request identity.
///
/// Entries are never evicted; the store grows for the lifetime of the
/// owning service unless [`clear`](ResponseCache::clear) is called.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: HashMap<CacheKey, Value>,
}

impl ResponseCache {
    /// The body cached for `key`, if any.
    pub fn lookup(&self, key: &CacheKey) -> Option<&Value> {
        self.entries.get(key)
    }

    /// Stores a body, replacing any earlier entry for the same key.
    pub fn store(&mut self, key: CacheKey, body: Value) {
        self.entries.insert(key, body);
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached bodies.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
