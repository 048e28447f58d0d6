//! HTTP request parsing.
//!
//! The parser is incremental: it is fed whatever bytes have arrived so far
//! and reports how many it consumed, so a request can be assembled from any
//! sequence of partial socket reads.

mod error;
mod headers;
mod method;
mod reader;
mod request;
mod version;
mod tests;

// Re-export public items
pub use error::Error;
pub use headers::Headers;
pub use method::Method;
pub use reader::{request_from_reader, ReadBuffer};
pub use request::{ParserState, Request, RequestLine};
pub use version::HttpVersion;
