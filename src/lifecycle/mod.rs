//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Start (http/server.rs):
//!     Bind listener → install exit hook → serve
//!
//! Shutdown (shutdown.rs):
//!     Trigger → stop accepting → drain connections → Stopped
//!
//! Signals (signals.rs):
//!     SIGTERM/SIGINT → trigger graceful shutdown
//! ```
//!
//! # Server States
//! ```text
//! Created → Starting → Listening → ShuttingDown → Stopped
//! ```
//! There is no way back from Stopped.

pub mod shutdown;
pub mod signals;

pub use shutdown::{Shutdown, ShutdownSignal};
