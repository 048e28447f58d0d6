//! HTTP/1.1 message framing directly on top of a TCP byte stream.
//!
//! # Features
//!
//! - Incremental request parsing that tolerates arbitrary read boundaries
//! - Case-insensitive header map that folds repeated fields
//! - A response writer that only permits the legal HTTP/1.1 output order,
//!   with fixed-length or chunked bodies and trailers
//! - A task-per-connection server built on tokio
//!
//! # Examples
//!
//! ## Feeding the parser
//!
//! ```
//! use httpfromtcp::Request;
//!
//! let mut request = Request::new();
//! let data = b"GET /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let mut offset = 0;
//! while !request.is_done() {
//!     let consumed = request.feed(&data[offset..]).unwrap();
//!     assert!(consumed > 0);
//!     offset += consumed;
//! }
//!
//! assert_eq!(request.request_line.method, "GET");
//! assert_eq!(request.request_line.target, "/index.html");
//! assert_eq!(request.headers.get("HOST"), Some("example.com"));
//! assert!(request.body.is_none());
//! ```
//!
//! ## Writing a response
//!
//! ```
//! use httpfromtcp::{Headers, ResponseWriter, StatusCode};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let mut out: Vec<u8> = Vec::new();
//! let mut writer = ResponseWriter::new(&mut out);
//!
//! let mut headers = Headers::new();
//! headers.set("Transfer-Encoding", "chunked");
//!
//! writer.write_status_line(StatusCode::OK).await.unwrap();
//! writer.write_headers(&headers).await.unwrap();
//! writer.write_chunked_body(b"hello").await.unwrap();
//! writer.write_chunked_body_done().await.unwrap();
//! writer.write_trailers(&Headers::new()).await.unwrap();
//!
//! assert_eq!(
//!     out,
//!     b"HTTP/1.1 200 OK\r\ntransfer-encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n"
//! );
//! # });
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use httpfromtcp::{Handler, HandlerFuture, Request, ResponseWriter, Server, ServerConfig, StatusCode, default_headers};
//!
//! struct Hello;
//!
//! impl Handler for Hello {
//!     fn handle<'a>(&'a self, writer: &'a mut ResponseWriter<'_>, _request: &'a Request) -> HandlerFuture<'a> {
//!         Box::pin(async move {
//!             let body = b"hello\n";
//!             writer.write_status_line(StatusCode::OK).await?;
//!             writer.write_headers(&default_headers(body.len())).await?;
//!             writer.write_body(body).await?;
//!             Ok(())
//!         })
//!     }
//! }
//!
//! # async fn run() -> Result<(), httpfromtcp::ServerError> {
//! let mut server = Server::serve(ServerConfig::default(), Hello).await?;
//! tokio::signal::ctrl_c().await?;
//! server.close().await?;
//! # Ok(())
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{
    request_from_reader, Error as ParserError, Headers, HttpVersion, Method, ParserState, Request, RequestLine,
};
pub use server::{
    default_headers, Error as ServerError, Handler, HandlerError, HandlerFuture, ResponseWriter, Server,
    ServerConfig, StatusCode, WriterState, DEFAULT_PORT,
};
