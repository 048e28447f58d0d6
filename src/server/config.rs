//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

/// The port the server listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 42069;

/// HTTP server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The initial size of each connection's read buffer. It doubles as
    /// needed.
    pub read_buffer_size: usize,
}

impl ServerConfig {
    /// Listen on all interfaces at `port`.
    pub fn with_port(port: u16) -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, port)),
            ..Self::default()
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::LOCALHOST, DEFAULT_PORT)),
            read_buffer_size: 1024,
        }
    }
}
