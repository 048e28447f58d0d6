//! Error types for the HTTP parser.

use thiserror::Error;

use crate::parser::request::ParserState;

/// Errors that can occur while parsing an HTTP request.
#[derive(Debug, Error)]
pub enum Error {
    /// The request line does not consist of exactly three fields.
    #[error("malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The method contains something other than uppercase ASCII letters.
    #[error("invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// Only HTTP/1.1 is accepted.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(String),

    /// A header line is missing its colon separator or is not valid UTF-8.
    #[error("malformed header: {0}")]
    MalformedHeader(String),

    /// Whitespace between a header name and its colon.
    #[error("invalid header key contains trailing whitespace: {0:?}")]
    HeaderKeyTrailingWhitespace(String),

    /// A header name contains characters outside the token set.
    #[error("invalid header key: {0:?}")]
    InvalidHeaderKey(String),

    /// Content-Length is not a non-negative integer.
    #[error("invalid Content-Length header value: {0:?}")]
    InvalidContentLength(String),

    /// More body bytes arrived than Content-Length declared.
    #[error("request body too large: {read} of {declared} bytes read, {received} more received")]
    BodyTooLarge {
        declared: usize,
        read: usize,
        received: usize,
    },

    /// `feed` was called after the request was complete.
    #[error("attempted parse after completion")]
    ParseAfterDone,

    /// The stream ended before the request was complete.
    #[error("incomplete request: connection closed in state {state} with {buffered} bytes buffered")]
    IncompleteRequest { state: ParserState, buffered: usize },

    /// Reading from the transport failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
