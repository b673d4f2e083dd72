//! Embeddable HTTP request dispatcher library

pub mod config;
pub mod http;
pub mod net;
pub mod routing;
pub mod lifecycle;
pub mod observability;

pub use config::ServerConfig;
pub use http::{Handler, HandlerError, HandlerOutput, HttpServer, Request, Response};
pub use lifecycle::Shutdown;
pub use routing::RouteRegistry;
