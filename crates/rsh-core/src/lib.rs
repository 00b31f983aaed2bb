//! # rsh-core
//!
//! Core types for the rsh command relay.
//!
//! This crate contains the synchronous, runtime-free building blocks of the
//! relay protocol:
//!
//! - Command framing (appending the sentinel-printing trailer)
//! - Scan state (classifying bytes received from the remote shell)
//! - Session identifiers and end reasons
//! - Configuration types
//! - Error types
//!
//! ## Architecture
//!
//! This is Layer 0 in the architecture - all other crates depend on this one,
//! but this crate has no dependencies on other rsh crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod framing;
pub mod scan;
pub mod session;

// Re-export commonly used types
pub use config::{ProtocolSettings, RelayConfig, ServerSettings};
pub use error::{Error, Result};
pub use framing::{
    FramedCommand, Framer, COMMAND_SEPARATOR, END_OF_TEXT, END_OF_TRANSMISSION, MAX_COMMAND_LEN,
    SENTINEL_INSTRUCTION,
};
pub use scan::{CompletionTrigger, Feed, ScanState};
pub use session::{SessionEnd, SessionId};
