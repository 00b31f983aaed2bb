//! Response scanning.
//!
//! Reads the remote stream, copies ordinary output to the operator's terminal
//! and stops once the sentinel written by the framed command has been seen,
//! once the remote has been silent for the configured timeout, or once an
//! abort is requested.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use rsh_core::{CompletionTrigger, Result, ScanState};

use crate::abort::AbortSignal;

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The completion trigger was observed
    Complete,
    /// No byte arrived within the timeout
    TimedOut,
    /// The abort signal fired
    Aborted,
    /// The remote side closed the stream
    Closed,
}

/// Result of one scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    /// How the scan ended
    pub outcome: ScanOutcome,
    /// Bytes echoed to the terminal during the scan
    pub output_bytes: usize,
}

/// Reads one response from the remote endpoint.
#[derive(Debug, Clone, Default)]
pub struct ResponseScanner {
    trigger: CompletionTrigger,
    state: ScanState,
}

impl ResponseScanner {
    /// Create a scanner using the given completion trigger.
    pub fn new(trigger: CompletionTrigger) -> Self {
        Self {
            trigger,
            state: ScanState::new(),
        }
    }

    /// Scan one response.
    ///
    /// The scan state is reset first. Each wait for data is bounded by
    /// `timeout` and raced against `abort`. Bytes following the completion
    /// byte are left in `endpoint` for the next cycle.
    ///
    /// # Errors
    /// Read errors on `endpoint` and write errors on `terminal` are returned
    /// as [`rsh_core::Error::Io`]; the connection should be considered broken.
    pub async fn scan<R, W>(
        &mut self,
        endpoint: &mut R,
        terminal: &mut W,
        timeout: Duration,
        abort: &AbortSignal,
    ) -> Result<ScanReport>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        self.state.reset();
        let mut echo = Vec::new();

        loop {
            if abort.is_aborted() {
                return Ok(self.finish(ScanOutcome::Aborted));
            }

            let (consumed, complete) = {
                let chunk = tokio::select! {
                    _ = abort.aborted() => return Ok(self.finish(ScanOutcome::Aborted)),
                    read = tokio::time::timeout(timeout, endpoint.fill_buf()) => match read {
                        Ok(result) => result?,
                        Err(_) => return Ok(self.finish(ScanOutcome::TimedOut)),
                    },
                };

                if chunk.is_empty() {
                    return Ok(self.finish(ScanOutcome::Closed));
                }

                self.classify(chunk, &mut echo)
            };
            endpoint.consume(consumed);

            if !echo.is_empty() {
                terminal.write_all(&echo).await?;
                terminal.flush().await?;
                echo.clear();
            }

            if complete {
                return Ok(self.finish(ScanOutcome::Complete));
            }
        }
    }

    /// Feed bytes until completion; returns bytes consumed and whether the
    /// response is complete.
    fn classify(&mut self, chunk: &[u8], echo: &mut Vec<u8>) -> (usize, bool) {
        for (i, &byte) in chunk.iter().enumerate() {
            let feed = self.state.feed(byte, self.trigger);
            if feed.echoes() {
                echo.push(byte);
            }
            if feed.completes() {
                return (i + 1, true);
            }
        }
        (chunk.len(), false)
    }

    fn finish(&self, outcome: ScanOutcome) -> ScanReport {
        debug!(
            "Scan finished: outcome={:?}, output_bytes={}",
            outcome, self.state.output_bytes
        );
        ScanReport {
            outcome,
            output_bytes: self.state.output_bytes,
        }
    }
}
