//! Transport layer for Sketchparty.
//!
//! Accepts WebSocket connections and hands each one out as a pair of
//! independent halves: a [`FrameReader`] for the connection's read loop
//! and a [`FrameWriter`] owned by its outbound task. Splitting lets the
//! server push room events to a client while it is blocked reading.

#![allow(async_fn_in_trait)]

mod error;
mod websocket;

pub use error::TransportError;
pub use websocket::{
    Frame, FrameReader, FrameWriter, WebSocketConnection, WebSocketTransport,
};

use std::fmt;

/// Opaque identifier for a live connection.
///
/// Ids are never reused within a process, so an id that has
/// disconnected cannot be picked up by a later connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The connection type produced by this transport.
    type Connection: Send + 'static;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for and accepts the next incoming connection.
    async fn accept(&mut self) -> Result<Self::Connection, Self::Error>;

    /// Returns the address the transport is listening on.
    fn local_addr(&self) -> std::io::Result<std::net::SocketAddr>;
}
