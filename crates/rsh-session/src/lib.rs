//! # rsh-session
//!
//! Session handling for the rsh command relay.
//!
//! This crate provides:
//! - A cancellable abort signal shared by every blocking wait
//! - The response scanner that echoes remote output until the sentinel
//! - The session loop driving command/response cycles on one connection
//!
//! ## Architecture
//!
//! This is Layer 1 in the architecture - it depends on rsh-core for framing
//! and scan state, and on tokio for I/O.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod abort;
pub mod scanner;
pub mod session;

// Re-export commonly used types
pub use abort::AbortSignal;
pub use scanner::{ResponseScanner, ScanOutcome, ScanReport};
pub use session::{Session, SessionOptions};
