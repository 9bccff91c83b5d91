//! Plain TCP transport.
//!
//! Opens a `TcpStream` to the endpoint authority. `amqps` endpoints are
//! dialled the same way; TLS negotiation belongs to a transport layered on
//! top of this one.

use std::net::SocketAddr;
use tokio::io::AsyncReadExt;
use tokio::net::TcpStream;

use crate::endpoint::Endpoint;
use crate::transport::{ConnectError, Connection, DisconnectReason, Transport};

/// Transport that dials brokers over TCP.
#[derive(Debug, Clone)]
pub struct TcpTransport {
    nodelay: bool,
}

impl TcpTransport {
    pub fn new() -> Self {
        Self { nodelay: true }
    }

    /// Enable or disable Nagle's algorithm on new connections.
    pub fn with_nodelay(mut self, nodelay: bool) -> Self {
        self.nodelay = nodelay;
        self
    }
}

impl Default for TcpTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for TcpTransport {
    type Connection = TcpConnection;

    async fn connect(&self, endpoint: &Endpoint) -> Result<TcpConnection, ConnectError> {
        let stream = TcpStream::connect(endpoint.authority()).await?;
        stream.set_nodelay(self.nodelay)?;
        let peer = stream.peer_addr()?;

        tracing::debug!(endpoint = %endpoint, peer = %peer, "TCP connection established");

        Ok(TcpConnection { stream, peer })
    }
}

/// An open TCP connection to a broker.
#[derive(Debug)]
pub struct TcpConnection {
    stream: TcpStream,
    peer: SocketAddr,
}

impl TcpConnection {
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer
    }

    /// Access the underlying stream for protocol traffic.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }
}

impl Connection for TcpConnection {
    async fn closed(&mut self) -> DisconnectReason {
        // Inbound bytes are not interpreted here; only EOF and errors matter.
        let mut buf = [0u8; 1024];
        loop {
            match self.stream.read(&mut buf).await {
                Ok(0) => return DisconnectReason::Closed,
                Ok(_) => continue,
                Err(e) => return DisconnectReason::Error(e.to_string()),
            }
        }
    }
}
