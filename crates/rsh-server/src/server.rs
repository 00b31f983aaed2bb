//! Connection acceptor.
//!
//! Accepts one remote shell at a time and hands it to a [`Session`]. When the
//! session ends the acceptor goes back to waiting, so the server keeps running
//! across client disconnects and connection errors.

use std::net::SocketAddr;

use tokio::io::{AsyncBufRead, AsyncWrite};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tracing::{debug, info, info_span, warn, Instrument};

use rsh_core::{Error, Result, SessionEnd, SessionId};
use rsh_session::{AbortSignal, Session, SessionOptions};

/// TCP listener relaying operator commands to one client at a time.
#[derive(Debug)]
pub struct RelayServer {
    listener: TcpListener,
    abort: AbortSignal,
    options: SessionOptions,
}

impl RelayServer {
    /// Create the listening socket.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Socket creation, bind and listen failures are returned as
    /// [`Error::Bind`].
    pub fn bind(
        addr: SocketAddr,
        backlog: u32,
        options: SessionOptions,
        abort: AbortSignal,
    ) -> Result<Self> {
        let bind_error = |source| Error::Bind { addr, source };

        let socket = if addr.is_ipv4() {
            TcpSocket::new_v4()
        } else {
            TcpSocket::new_v6()
        }
        .map_err(bind_error)?;

        socket.set_reuseaddr(true).map_err(bind_error)?;
        socket.bind(addr).map_err(bind_error)?;
        let listener = socket.listen(backlog).map_err(bind_error)?;

        debug!("Listening on {} (backlog {})", addr, backlog);

        Ok(Self {
            listener,
            abort,
            options,
        })
    }

    /// Address the listener is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept and serve clients until aborted.
    ///
    /// Each wait for a connection races the abort signal, so shutdown does
    /// not need a client to connect. Every other way a session can end,
    /// errors included, sends the server back to accepting.
    pub async fn serve<I, O>(&self, operator: &mut I, terminal: &mut O)
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        loop {
            if self.abort.is_aborted() {
                break;
            }

            let accepted = tokio::select! {
                _ = self.abort.aborted() => break,
                accepted = self.listener.accept() => accepted,
            };

            let (stream, peer) = match accepted {
                Ok(conn) => conn,
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    continue;
                }
            };

            let end = self.handle_client(stream, peer, operator, terminal).await;
            if end == Some(SessionEnd::Aborted) {
                break;
            }
        }
    }

    /// Run one session to completion. Returns `None` if it failed with an
    /// I/O error.
    async fn handle_client<I, O>(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        operator: &mut I,
        terminal: &mut O,
    ) -> Option<SessionEnd>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let id = SessionId::new();
        let span = info_span!("session", %id, peer = %peer.ip());

        async move {
            info!("Client {} connected", peer.ip());

            let mut session = Session::new(
                id,
                stream,
                &mut *operator,
                &mut *terminal,
                self.abort.clone(),
                self.options.clone(),
            );

            let end = match session.run().await {
                Ok(end) => {
                    info!(
                        "Session ended: {} after {} command(s)",
                        end,
                        session.commands_sent()
                    );
                    Some(end)
                }
                Err(e) => {
                    warn!("Session failed: {}", e);
                    None
                }
            };

            drop(session);
            info!("Client {} disconnected", peer.ip());
            end
        }
        .instrument(span)
        .await
    }
}
