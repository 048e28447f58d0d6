//! HTTP server implementation for httpfromtcp.
//!
//! This module drives the parser over accepted TCP connections and hands
//! each parsed request to a [`Handler`] together with a [`ResponseWriter`]
//! that enforces the order of the response parts.

mod response;
mod config;
mod error;
mod handler;
mod http_server;

// Re-export public items
pub use response::{default_headers, ResponseWriter, StatusCode, WriterState};
pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::Error;
pub use handler::{Handler, HandlerError, HandlerFuture};
pub use http_server::Server;
