//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request (method, request-target)
//!     → identifier.rs (strip query, build RouteIdentifier)
//!     → registry.rs (exact lookup)
//!     → Return: registered Handler or the not-found Handler
//!
//! Registration (at setup):
//!     register(method, path, handler)
//!     → insert or replace in the registry
//! ```
//!
//! # Design Decisions
//! - Exact match only; no patterns, no trailing-slash folding
//! - Registry is an owned value held by the server, never global
//! - Lookup never fails: a miss yields the 404 handler

pub mod identifier;
pub mod registry;

pub use identifier::{strip_query, RouteIdentifier};
pub use registry::RouteRegistry;
