//! Session identity and end reasons.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one accepted connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Why a session loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionEnd {
    /// Operator sent the exit command
    ExitCommand,
    /// Abort was requested (signal delivery)
    Aborted,
    /// Operator input reached end of stream
    OperatorEof,
    /// Remote side closed the connection
    ConnectionClosed,
}

impl std::fmt::Display for SessionEnd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            SessionEnd::ExitCommand => "exit command",
            SessionEnd::Aborted => "aborted",
            SessionEnd::OperatorEof => "operator input closed",
            SessionEnd::ConnectionClosed => "connection closed by peer",
        };
        f.write_str(reason)
    }
}
