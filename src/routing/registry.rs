//! Route registration and lookup.
//!
//! # Responsibilities
//! - Store one handler per (method, path)
//! - Resolve a method and request-target to a handler
//! - Fall back to the not-found handler when nothing matches
//!
//! # Design Decisions
//! - Populated at setup, read concurrently afterwards; backed by a sharded
//!   concurrent map so readers never see a half-inserted entry
//! - Re-registering an identical route silently replaces the earlier handler
//! - The not-found handler is not stored; a fresh one is built per miss

use dashmap::DashMap;

use crate::http::Handler;
use crate::routing::identifier::RouteIdentifier;

/// Owned table of routes.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    routes: DashMap<RouteIdentifier, Handler>,
}

impl RouteRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the handler for `method` and `path`.
    pub fn register(&self, method: impl Into<String>, path: impl AsRef<str>, handler: Handler) {
        let id = RouteIdentifier::new(method, path);
        tracing::debug!(route = %id, produces = handler.produces(), "Route registered");
        if self.routes.insert(id, handler).is_some() {
            tracing::debug!("Replaced previously registered handler");
        }
    }

    /// Find the handler for `method` and `target`. The query part of
    /// `target` is ignored.
    pub fn resolve(&self, method: &str, target: &str) -> Handler {
        let id = RouteIdentifier::new(method, target);
        match self.routes.get(&id) {
            Some(entry) => entry.value().clone(),
            None => {
                tracing::debug!(route = %id, "No route matched");
                Self::not_found()
            }
        }
    }

    /// Like [`resolve`](Self::resolve) but without the fallback.
    pub fn get(&self, method: &str, target: &str) -> Option<Handler> {
        self.routes
            .get(&RouteIdentifier::new(method, target))
            .map(|entry| entry.value().clone())
    }

    pub fn not_found() -> Handler {
        Handler::not_found()
    }

    pub fn contains(&self, method: &str, path: &str) -> bool {
        self.routes.contains_key(&RouteIdentifier::new(method, path))
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
