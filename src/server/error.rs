//! Error types for the HTTP server.

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::server::response::WriterState;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A response writer method was called out of order.
    #[error("cannot {operation} in writer state {state}")]
    InvalidState {
        operation: &'static str,
        state: WriterState,
    },

    /// The accept loop task failed.
    #[error("accept loop failed: {0}")]
    JoinError(#[from] tokio::task::JoinError),
}
