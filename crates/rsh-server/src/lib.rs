//! rsh-server library
//!
//! This library contains the connection acceptor, CLI definition and signal
//! wiring. The binary entry point is in main.rs.

pub mod cli;
pub mod server;
pub mod signals;

// Re-export commonly used types
pub use cli::Cli;
pub use server::RelayServer;
