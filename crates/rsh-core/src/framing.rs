//! Command framing.
//!
//! The remote end is a plain shell with no prompt protocol. To find where the
//! output of a command ends, every command line is rewritten so that the shell
//! prints two control bytes once the command has finished:
//!
//! ```text
//! ls\n  ->  ls ; printf "\x03\x04"\n
//! \n    ->  printf "\x03\x04"\n
//! ```
//!
//! `;` is used rather than `&&` so the sentinel is printed whether or not the
//! command succeeded.

use crate::{Error, Result};

/// End-of-text marker, the first sentinel byte.
pub const END_OF_TEXT: u8 = 0x03;

/// End-of-transmission marker, the second sentinel byte.
pub const END_OF_TRANSMISSION: u8 = 0x04;

/// Separator placed between the operator command and the sentinel instruction.
pub const COMMAND_SEPARATOR: &[u8] = b" ; ";

/// Shell instruction that prints both sentinel bytes, newline included.
pub const SENTINEL_INSTRUCTION: &[u8] = b"printf \"\x03\x04\"\n";

/// Default upper bound on the length of a framed command.
pub const MAX_COMMAND_LEN: usize = 1024;

/// A command line rewritten for transmission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FramedCommand {
    bytes: Vec<u8>,
}

impl FramedCommand {
    /// Bytes to write to the remote endpoint.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Effective length of the framed command.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always false for a command produced by [`Framer`].
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Whether this is the bare sentinel request with no operator command.
    pub fn is_probe(&self) -> bool {
        self.bytes == SENTINEL_INSTRUCTION
    }
}

/// Rewrites operator command lines so the remote shell emits the sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Framer {
    max_len: usize,
}

impl Default for Framer {
    fn default() -> Self {
        Self::new(MAX_COMMAND_LEN)
    }
}

impl Framer {
    /// Create a framer that rejects framed commands longer than `max_len`.
    pub fn new(max_len: usize) -> Self {
        Self { max_len }
    }

    /// The standalone sentinel request.
    pub fn probe() -> FramedCommand {
        FramedCommand {
            bytes: SENTINEL_INSTRUCTION.to_vec(),
        }
    }

    /// Frame one operator line.
    ///
    /// A bare newline becomes the probe. Anything else keeps its bytes
    /// verbatim, with the trailing newline (if any) replaced by
    /// [`COMMAND_SEPARATOR`] and [`SENTINEL_INSTRUCTION`].
    ///
    /// # Errors
    /// Returns [`Error::CommandTooLong`] when the framed result would exceed
    /// the configured maximum. Nothing is truncated.
    ///
    /// # Example
    /// ```
    /// use rsh_core::Framer;
    ///
    /// let framed = Framer::default().frame(b"ls\n").unwrap();
    /// assert_eq!(framed.as_bytes(), b"ls ; printf \"\x03\x04\"\n");
    /// ```
    pub fn frame(&self, line: &[u8]) -> Result<FramedCommand> {
        let command = line.strip_suffix(b"\n").unwrap_or(line);

        let len = if command.is_empty() {
            SENTINEL_INSTRUCTION.len()
        } else {
            command.len() + COMMAND_SEPARATOR.len() + SENTINEL_INSTRUCTION.len()
        };

        if len > self.max_len {
            return Err(Error::CommandTooLong {
                len,
                max: self.max_len,
            });
        }

        let mut bytes = Vec::with_capacity(len);
        if !command.is_empty() {
            bytes.extend_from_slice(command);
            bytes.extend_from_slice(COMMAND_SEPARATOR);
        }
        bytes.extend_from_slice(SENTINEL_INSTRUCTION);

        Ok(FramedCommand { bytes })
    }
}
