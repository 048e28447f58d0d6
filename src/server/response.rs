//! HTTP response writing.

use std::fmt;

use log::trace;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::parser::Headers;
use crate::server::error::Error;

const CRLF: &[u8] = b"\r\n";

/// A numeric HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StatusCode(u16);

impl StatusCode {
    pub const OK: StatusCode = StatusCode(200);
    pub const BAD_REQUEST: StatusCode = StatusCode(400);
    pub const INTERNAL_SERVER_ERROR: StatusCode = StatusCode(500);

    pub fn as_u16(&self) -> u16 {
        self.0
    }

    /// Get the reason phrase for this status code.
    ///
    /// Codes without a known phrase get an empty one.
    pub fn reason_phrase(&self) -> &'static str {
        match self.0 {
            200 => "OK",
            400 => "Bad Request",
            500 => "Internal Server Error",
            _ => "",
        }
    }
}

impl From<u16> for StatusCode {
    fn from(code: u16) -> Self {
        StatusCode(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.reason_phrase())
    }
}

/// The header set used for simple fixed-length plain-text responses.
pub fn default_headers(content_len: usize) -> Headers {
    let mut headers = Headers::new();
    headers.set("Content-Length", content_len.to_string());
    headers.set("Connection", "close");
    headers.set("Content-Type", "text/plain");
    headers
}

/// The next part of the response a [`ResponseWriter`] will accept.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriterState {
    StatusLine,
    Headers,
    Body,
    Trailers,
    Done,
}

impl fmt::Display for WriterState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WriterState::StatusLine => "status line",
            WriterState::Headers => "headers",
            WriterState::Body => "body",
            WriterState::Trailers => "trailers",
            WriterState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Writes one HTTP/1.1 response in order.
///
/// The status line must come first, then the headers, then either a single
/// fixed-length body or a run of chunks closed by
/// [`write_chunked_body_done`](Self::write_chunked_body_done) and the
/// trailers. Calls made out of order fail with [`Error::InvalidState`] and
/// write nothing.
pub struct ResponseWriter<'a> {
    out: &'a mut (dyn AsyncWrite + Unpin + Send),
    state: WriterState,
}

impl<'a> ResponseWriter<'a> {
    pub fn new(out: &'a mut (dyn AsyncWrite + Unpin + Send)) -> Self {
        Self {
            out,
            state: WriterState::StatusLine,
        }
    }

    pub fn state(&self) -> WriterState {
        self.state
    }

    pub fn is_done(&self) -> bool {
        self.state == WriterState::Done
    }

    fn expect_state(&self, expected: WriterState, operation: &'static str) -> Result<(), Error> {
        if self.state != expected {
            return Err(Error::InvalidState {
                operation,
                state: self.state,
            });
        }
        Ok(())
    }

    async fn send(&mut self, bytes: &[u8]) -> Result<(), Error> {
        self.out.write_all(bytes).await?;
        self.out.flush().await?;
        Ok(())
    }

    pub async fn write_status_line(&mut self, status: StatusCode) -> Result<(), Error> {
        self.expect_state(WriterState::StatusLine, "write_status_line")?;

        let line = format!("HTTP/1.1 {} {}\r\n", status.as_u16(), status.reason_phrase());
        trace!("writing status line: {}", line.trim_end());
        self.send(line.as_bytes()).await?;

        self.state = WriterState::Headers;
        Ok(())
    }

    pub async fn write_headers(&mut self, headers: &Headers) -> Result<(), Error> {
        self.expect_state(WriterState::Headers, "write_headers")?;

        let block = encode_fields(headers);
        self.send(&block).await?;

        self.state = WriterState::Body;
        Ok(())
    }

    /// Write the whole body at once. No chunks or trailers may follow.
    pub async fn write_body(&mut self, body: &[u8]) -> Result<usize, Error> {
        self.expect_state(WriterState::Body, "write_body")?;

        self.send(body).await?;

        self.state = WriterState::Done;
        Ok(body.len())
    }

    /// Write one chunk of a chunked body.
    ///
    /// An empty slice writes nothing, as a zero-length chunk would end the
    /// body.
    pub async fn write_chunked_body(&mut self, chunk: &[u8]) -> Result<usize, Error> {
        self.expect_state(WriterState::Body, "write_chunked_body")?;
        if chunk.is_empty() {
            return Ok(0);
        }

        let mut frame = format!("{:x}\r\n", chunk.len()).into_bytes();
        frame.extend_from_slice(chunk);
        frame.extend_from_slice(CRLF);
        self.send(&frame).await?;

        Ok(chunk.len())
    }

    /// Write the terminating zero-length chunk. Trailers must follow.
    pub async fn write_chunked_body_done(&mut self) -> Result<usize, Error> {
        self.expect_state(WriterState::Body, "write_chunked_body_done")?;

        const LAST_CHUNK: &[u8] = b"0\r\n";
        self.send(LAST_CHUNK).await?;

        self.state = WriterState::Trailers;
        Ok(LAST_CHUNK.len())
    }

    /// Write the trailer fields and the blank line ending the message.
    pub async fn write_trailers(&mut self, trailers: &Headers) -> Result<(), Error> {
        self.expect_state(WriterState::Trailers, "write_trailers")?;

        let block = encode_fields(trailers);
        self.send(&block).await?;

        self.state = WriterState::Done;
        Ok(())
    }
}

fn encode_fields(fields: &Headers) -> Vec<u8> {
    let mut block = Vec::new();
    for (name, value) in fields.iter() {
        trace!("writing field: {name}: {value}");
        block.extend_from_slice(name.as_bytes());
        block.extend_from_slice(b": ");
        block.extend_from_slice(value.as_bytes());
        block.extend_from_slice(CRLF);
    }
    block.extend_from_slice(CRLF);
    block
}
