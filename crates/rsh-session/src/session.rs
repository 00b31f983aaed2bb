//! The session loop for one connected remote shell.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{debug, info, warn};

use rsh_core::{
    CompletionTrigger, Error, Framer, ProtocolSettings, Result, SessionEnd, SessionId,
};

use crate::abort::AbortSignal;
use crate::scanner::{ResponseScanner, ScanOutcome, ScanReport};

/// Tunables for a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOptions {
    /// Silence timeout for draining the remote prompt on connect
    pub prompt_timeout: Duration,
    /// Silence timeout while waiting for a command's output
    pub reply_timeout: Duration,
    /// Maximum framed command length
    pub max_command_len: usize,
    /// Operator line that ends the session once sent
    pub exit_command: Vec<u8>,
    /// What marks the end of a response
    pub trigger: CompletionTrigger,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self::from(&ProtocolSettings::default())
    }
}

impl From<&ProtocolSettings> for SessionOptions {
    fn from(settings: &ProtocolSettings) -> Self {
        Self {
            prompt_timeout: settings.prompt_timeout(),
            reply_timeout: settings.reply_timeout(),
            max_command_len: settings.max_command_len,
            exit_command: settings.exit_command.as_bytes().to_vec(),
            trigger: settings.completion,
        }
    }
}

/// Result of waiting for one operator line.
enum OperatorLine {
    Line(Vec<u8>),
    Eof,
    Aborted,
}

/// One connected remote shell and the operator driving it.
///
/// The session strictly alternates between waiting for an operator line and
/// waiting for remote output; the two sources are never awaited together.
pub struct Session<S, I, O> {
    /// Session identifier
    id: SessionId,

    /// Remote endpoint, buffered so unread bytes survive between scans
    endpoint: BufReader<S>,

    /// Operator command source
    operator: I,

    /// Operator terminal receiving remote output
    terminal: O,

    /// Shared abort flag
    abort: AbortSignal,

    framer: Framer,
    scanner: ResponseScanner,
    options: SessionOptions,

    /// Commands transmitted so far
    commands_sent: u64,
}

impl<S, I, O> Session<S, I, O>
where
    S: AsyncRead + AsyncWrite + Unpin,
    I: AsyncBufRead + Unpin,
    O: AsyncWrite + Unpin,
{
    /// Create a session over a connected endpoint.
    pub fn new(
        id: SessionId,
        endpoint: S,
        operator: I,
        terminal: O,
        abort: AbortSignal,
        options: SessionOptions,
    ) -> Self {
        Self {
            id,
            endpoint: BufReader::new(endpoint),
            operator,
            terminal,
            abort,
            framer: Framer::new(options.max_command_len),
            scanner: ResponseScanner::new(options.trigger),
            options,
            commands_sent: 0,
        }
    }

    /// Number of framed commands written to the remote so far.
    pub fn commands_sent(&self) -> u64 {
        self.commands_sent
    }

    /// Get the operator terminal.
    pub fn terminal(&self) -> &O {
        &self.terminal
    }

    /// Drive command/response cycles until the session ends.
    ///
    /// # Errors
    /// Any read or write failure on the endpoint or terminal is returned; the
    /// connection should be dropped.
    pub async fn run(&mut self) -> Result<SessionEnd> {
        debug!("Session started: id={}", self.id);

        // Drain and display the initial prompt.
        let report = self.scan(self.options.prompt_timeout).await?;
        if let Some(end) = Self::ended_by(report) {
            return Ok(end);
        }

        loop {
            if self.abort.is_aborted() {
                return Ok(SessionEnd::Aborted);
            }

            let line = match self.read_operator_line().await? {
                OperatorLine::Line(line) => line,
                OperatorLine::Eof => return Ok(SessionEnd::OperatorEof),
                OperatorLine::Aborted => return Ok(SessionEnd::Aborted),
            };

            let framed = match self.framer.frame(&line) {
                Ok(framed) => framed,
                Err(Error::CommandTooLong { len, max }) => {
                    warn!(
                        "Command rejected, not sent: framed length {} exceeds {} bytes",
                        len, max
                    );
                    let notice = format!("Command too long ({len} > {max} bytes), not sent\n");
                    self.terminal.write_all(notice.as_bytes()).await?;
                    self.terminal.flush().await?;
                    continue;
                }
                Err(e) => return Err(e),
            };

            let endpoint = self.endpoint.get_mut();
            endpoint.write_all(framed.as_bytes()).await?;
            endpoint.flush().await?;
            self.commands_sent += 1;
            debug!(
                "Command sent: id={}, {} bytes, probe={}",
                self.id,
                framed.len(),
                framed.is_probe()
            );

            if line == self.options.exit_command {
                return Ok(SessionEnd::ExitCommand);
            }

            let report = self.scan(self.options.reply_timeout).await?;
            if let Some(end) = Self::ended_by(report) {
                return Ok(end);
            }
        }
    }

    async fn scan(&mut self, timeout: Duration) -> Result<ScanReport> {
        self.scanner
            .scan(&mut self.endpoint, &mut self.terminal, timeout, &self.abort)
            .await
    }

    async fn read_operator_line(&mut self) -> Result<OperatorLine> {
        let mut line = Vec::new();

        let read = tokio::select! {
            _ = self.abort.aborted() => return Ok(OperatorLine::Aborted),
            read = self.operator.read_until(b'\n', &mut line) => read?,
        };

        // A signal that lands while the read completes still wins.
        if self.abort.is_aborted() {
            return Ok(OperatorLine::Aborted);
        }

        if read == 0 {
            info!("Operator input closed");
            return Ok(OperatorLine::Eof);
        }

        Ok(OperatorLine::Line(line))
    }

    /// Map a scan outcome to a session end, if it ends the session.
    fn ended_by(report: ScanReport) -> Option<SessionEnd> {
        match report.outcome {
            ScanOutcome::Complete | ScanOutcome::TimedOut => None,
            ScanOutcome::Aborted => Some(SessionEnd::Aborted),
            ScanOutcome::Closed => Some(SessionEnd::ConnectionClosed),
        }
    }
}

impl<S, I, O> std::fmt::Debug for Session<S, I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("options", &self.options)
            .field("commands_sent", &self.commands_sent)
            .finish_non_exhaustive()
    }
}
