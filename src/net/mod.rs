//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (address, port)
//!     → listener.rs (bind)
//!     → TcpListener handed to the HTTP transport (axum/hyper)
//!     → transport frames bytes into whole, buffered requests
//! ```
//!
//! # Design Decisions
//! - Binding happens before the server reports itself as listening
//! - Connection handling and HTTP/1.1 framing belong to the transport

pub mod listener;

pub use listener::{bind, ListenerError};
