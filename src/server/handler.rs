//! Request handlers.

use std::future::Future;
use std::pin::Pin;

use crate::parser::Request;
use crate::server::error::Error;
use crate::server::response::{default_headers, ResponseWriter, StatusCode};

/// Type alias for the boxed future a [`Handler`] returns.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = Result<(), Error>> + Send + 'a>>;

/// Business logic invoked once per successfully parsed request.
///
/// The handler must drive the writer from the status line through to
/// [`WriterState::Done`](crate::server::WriterState::Done) before its future
/// completes. The connection is closed as soon as it does. Errors are
/// logged by the server; no second response is attempted.
pub trait Handler: Send + Sync + 'static {
    fn handle<'a>(&'a self, writer: &'a mut ResponseWriter<'_>, request: &'a Request) -> HandlerFuture<'a>;
}

/// A status and message to send as a complete plain-text response.
#[derive(Debug, Clone)]
pub struct HandlerError {
    pub status: StatusCode,
    pub message: String,
}

impl HandlerError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Write this error as status line, default headers and body.
    pub async fn write_to(&self, writer: &mut ResponseWriter<'_>) -> Result<(), Error> {
        let body = self.message.as_bytes();
        writer.write_status_line(self.status).await?;
        writer.write_headers(&default_headers(body.len())).await?;
        writer.write_body(body).await?;
        Ok(())
    }
}
