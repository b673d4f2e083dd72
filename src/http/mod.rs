//! HTTP dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (axum/hyper transport, body aggregation, request ID)
//!     → dispatcher.rs (registry lookup)
//!     → request.rs (adapt wire request → Request)
//!     → handler.rs (async handler on its own task)
//!     → response.rs / dispatcher.rs (synthesize wire response)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::{DispatchError, Dispatcher, WireResponse};
pub use handler::{Handler, HandlerError, HandlerFuture, HandlerOutput};
pub use request::Request;
pub use response::{Response, ResponseBuilder};
pub use server::{HttpServer, ServerError, ServerState};
