//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::parser::{request_from_reader, Error as ParserError};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::handler::{Handler, HandlerError};
use crate::server::response::{ResponseWriter, StatusCode};

/// A running HTTP server.
///
/// Every accepted connection gets its own task, which reads one request,
/// answers it and closes the connection.
pub struct Server {
    local_addr: SocketAddr,
    open: Arc<AtomicBool>,
    shutdown: Arc<Notify>,
    accept_loop: Option<JoinHandle<()>>,
}

impl Server {
    /// Bind to `config.addr` and start accepting connections in the
    /// background.
    pub async fn serve<H: Handler>(config: ServerConfig, handler: H) -> Result<Self, Error> {
        let listener = TcpListener::bind(config.addr).await?;
        let local_addr = listener.local_addr()?;
        info!("Server listening on http://{local_addr}");

        let open = Arc::new(AtomicBool::new(true));
        let shutdown = Arc::new(Notify::new());
        let handler: Arc<dyn Handler> = Arc::new(handler);

        let accept_loop = tokio::spawn(Self::accept_loop(
            listener,
            handler,
            config.read_buffer_size,
            open.clone(),
            shutdown.clone(),
        ));

        Ok(Self {
            local_addr,
            open,
            shutdown,
            accept_loop: Some(accept_loop),
        })
    }

    /// The address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_open(&self) -> bool {
        self.open.load(Ordering::Acquire)
    }

    /// Stop accepting connections and close the listener.
    ///
    /// Connections already accepted keep running to completion.
    pub async fn close(&mut self) -> Result<(), Error> {
        self.open.store(false, Ordering::Release);
        self.shutdown.notify_one();

        if let Some(accept_loop) = self.accept_loop.take() {
            accept_loop.await?;
            info!("Server on {addr} closed", addr = self.local_addr);
        }
        Ok(())
    }

    async fn accept_loop(
        listener: TcpListener,
        handler: Arc<dyn Handler>,
        read_buffer_size: usize,
        open: Arc<AtomicBool>,
        shutdown: Arc<Notify>,
    ) {
        loop {
            tokio::select! {
                _ = shutdown.notified() => {
                    debug!("Accept loop received shutdown");
                    break;
                }

                accepted = listener.accept() => {
                    match accepted {
                        Ok((socket, peer)) => {
                            debug!("Accepted connection from {peer}");
                            Self::spawn_connection(socket, peer, handler.clone(), read_buffer_size);
                        }
                        Err(e) => {
                            if !open.load(Ordering::Acquire) {
                                break;
                            }
                            Self::handle_accept_error(e).await;
                        }
                    }
                }
            }
        }
    }

    /// Log a failed accept and back off briefly before retrying.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Failed to establish a connection: {e}");
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    fn spawn_connection(mut socket: TcpStream, peer: SocketAddr, handler: Arc<dyn Handler>, read_buffer_size: usize) {
        tokio::spawn(async move {
            match Self::handle_connection(&mut socket, handler.as_ref(), read_buffer_size).await {
                Ok(()) => debug!("Finished connection from {peer}"),
                Err(Error::ParseError(e)) => warn!("Rejected request from {peer}: {e}"),
                Err(e) => error!("Error handling connection from {peer}: {e}"),
            }
        });
    }

    /// Read one request from `socket`, answer it and shut the stream down.
    ///
    /// A malformed request is answered with a 400 carrying the parse error
    /// and then reported as [`Error::ParseError`]. A transport failure
    /// aborts without a response.
    pub async fn handle_connection<S>(socket: &mut S, handler: &dyn Handler, read_buffer_size: usize) -> Result<(), Error>
    where
        S: AsyncRead + AsyncWrite + Unpin + Send,
    {
        let request = match request_from_reader(&mut *socket, read_buffer_size).await {
            Ok(request) => request,
            Err(ParserError::Io(e)) => return Err(Error::IoError(e)),
            Err(e) => {
                let mut writer = ResponseWriter::new(&mut *socket);
                HandlerError::new(StatusCode::BAD_REQUEST, e.to_string())
                    .write_to(&mut writer)
                    .await?;
                socket.shutdown().await?;
                return Err(Error::ParseError(e));
            }
        };

        debug!(
            "{method} {target}",
            method = request.request_line.method,
            target = request.request_line.target
        );

        let mut writer = ResponseWriter::new(&mut *socket);
        let result = handler.handle(&mut writer, &request).await;
        if !writer.is_done() {
            warn!("Handler returned with the response incomplete (writer in state {state})", state = writer.state());
        }

        socket.shutdown().await?;
        result
    }
}
