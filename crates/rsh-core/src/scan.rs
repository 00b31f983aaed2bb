//! Scan state for classifying bytes received from the remote shell.

use serde::{Deserialize, Serialize};

use crate::framing::{END_OF_TEXT, END_OF_TRANSMISSION};

/// Byte that closes a response once both sentinel bytes have been seen.
const SEPARATOR_BYTE: u8 = b' ';

/// Condition that marks a response as complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionTrigger {
    /// Both sentinel bytes followed by a space byte.
    ///
    /// Shells echo a space after the injected `printf`, so the space is what
    /// actually closes a cycle in practice.
    #[default]
    SpaceAfterSentinel,
    /// Both sentinel bytes, nothing else required.
    Sentinel,
}

/// What to do with one received byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    /// Control byte: do not echo.
    Suppress,
    /// Ordinary output: echo it.
    Echo,
    /// Echo the byte, then stop scanning.
    EchoAndComplete,
    /// Stop scanning without echoing the byte.
    Complete,
}

impl Feed {
    /// Whether the byte should reach the operator's terminal.
    pub fn echoes(self) -> bool {
        matches!(self, Feed::Echo | Feed::EchoAndComplete)
    }

    /// Whether the response is complete after this byte.
    pub fn completes(self) -> bool {
        matches!(self, Feed::EchoAndComplete | Feed::Complete)
    }
}

/// Per-response scan state.
///
/// The two sentinel flags are independent: the bytes may arrive in either
/// order and with other output between them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScanState {
    /// A 0x04 byte has been received during this scan
    pub seen_end_of_transmission: bool,
    /// A 0x03 byte has been received during this scan
    pub seen_end_of_text: bool,
    /// Number of bytes echoed during this scan
    pub output_bytes: usize,
}

impl ScanState {
    /// Create a fresh scan state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear both flags and the byte count.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Whether both sentinel bytes have been received.
    pub fn sentinel_seen(&self) -> bool {
        self.seen_end_of_transmission && self.seen_end_of_text
    }

    /// Classify one byte and update the state.
    pub fn feed(&mut self, byte: u8, trigger: CompletionTrigger) -> Feed {
        let feed = match byte {
            END_OF_TRANSMISSION | END_OF_TEXT => {
                if byte == END_OF_TRANSMISSION {
                    self.seen_end_of_transmission = true;
                } else {
                    self.seen_end_of_text = true;
                }

                if trigger == CompletionTrigger::Sentinel && self.sentinel_seen() {
                    Feed::Complete
                } else {
                    Feed::Suppress
                }
            }
            SEPARATOR_BYTE
                if trigger == CompletionTrigger::SpaceAfterSentinel && self.sentinel_seen() =>
            {
                Feed::EchoAndComplete
            }
            _ => Feed::Echo,
        };

        if feed.echoes() {
            self.output_bytes += 1;
        }

        feed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(state: &mut ScanState, bytes: &[u8], trigger: CompletionTrigger) -> Vec<Feed> {
        bytes.iter().map(|&b| state.feed(b, trigger)).collect()
    }

    #[test]
    fn test_new_state_is_clear() {
        let state = ScanState::new();
        assert!(!state.seen_end_of_transmission);
        assert!(!state.seen_end_of_text);
        assert_eq!(state.output_bytes, 0);
        assert!(!state.sentinel_seen());
    }

    #[test]
    fn test_control_bytes_are_suppressed() {
        let mut state = ScanState::new();
        let trigger = CompletionTrigger::SpaceAfterSentinel;
        assert_eq!(state.feed(0x03, trigger), Feed::Suppress);
        assert!(state.seen_end_of_text);
        assert_eq!(state.feed(0x04, trigger), Feed::Suppress);
        assert!(state.seen_end_of_transmission);
        assert_eq!(state.output_bytes, 0);
    }

    #[test]
    fn test_space_completes_after_sentinel() {
        let mut state = ScanState::new();
        let feeds = feed_all(
            &mut state,
            b"ok \x03\x04 ",
            CompletionTrigger::SpaceAfterSentinel,
        );
        assert_eq!(
            feeds,
            vec![
                Feed::Echo,
                Feed::Echo,
                Feed::Echo,
                Feed::Suppress,
                Feed::Suppress,
                Feed::EchoAndComplete,
            ]
        );
        assert_eq!(state.output_bytes, 4);
    }

    #[test]
    fn test_space_before_sentinel_does_not_complete() {
        let mut state = ScanState::new();
        let feeds = feed_all(&mut state, b"a b\x03", CompletionTrigger::SpaceAfterSentinel);
        assert!(feeds.iter().all(|f| !f.completes()));
    }

    #[test]
    fn test_single_flag_is_not_enough() {
        let mut state = ScanState::new();
        let feeds = feed_all(&mut state, b"\x04 \x04 ", CompletionTrigger::SpaceAfterSentinel);
        assert!(feeds.iter().all(|f| !f.completes()));
    }

    #[test]
    fn test_sentinel_order_does_not_matter() {
        let mut state = ScanState::new();
        feed_all(&mut state, b"\x04xyz\x03", CompletionTrigger::SpaceAfterSentinel);
        assert!(state.sentinel_seen());
        assert_eq!(
            state.feed(b' ', CompletionTrigger::SpaceAfterSentinel),
            Feed::EchoAndComplete
        );
    }

    #[test]
    fn test_sentinel_trigger_completes_on_second_control_byte() {
        let mut state = ScanState::new();
        let trigger = CompletionTrigger::Sentinel;
        assert_eq!(state.feed(0x03, trigger), Feed::Suppress);
        assert_eq!(state.feed(0x04, trigger), Feed::Complete);
    }

    #[test]
    fn test_sentinel_trigger_treats_space_as_output() {
        let mut state = ScanState::new();
        state.seen_end_of_text = true;
        state.seen_end_of_transmission = true;
        assert_eq!(state.feed(b' ', CompletionTrigger::Sentinel), Feed::Echo);
    }

    #[test]
    fn test_reset_clears_flags() {
        let mut state = ScanState::new();
        feed_all(&mut state, b"x\x03\x04", CompletionTrigger::SpaceAfterSentinel);
        state.reset();
        assert_eq!(state, ScanState::new());
        assert_eq!(
            state.feed(b' ', CompletionTrigger::SpaceAfterSentinel),
            Feed::Echo
        );
    }

    #[test]
    fn test_completion_trigger_default() {
        assert_eq!(
            CompletionTrigger::default(),
            CompletionTrigger::SpaceAfterSentinel
        );
    }

    #[test]
    fn test_feed_predicates() {
        assert!(Feed::Echo.echoes());
        assert!(!Feed::Echo.completes());
        assert!(Feed::EchoAndComplete.echoes());
        assert!(Feed::EchoAndComplete.completes());
        assert!(!Feed::Complete.echoes());
        assert!(Feed::Complete.completes());
        assert!(!Feed::Suppress.echoes());
        assert!(!Feed::Suppress.completes());
    }
}
