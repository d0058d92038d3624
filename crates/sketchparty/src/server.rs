//! `SketchServer` builder and accept loop.
//!
//! Ties the layers together: transport → protocol → room.

use std::sync::Arc;
use std::time::Duration;

use sketchparty_protocol::{Codec, JsonCodec};
use sketchparty_room::{RoomConfig, RoomManager};
use sketchparty_transport::{Transport, WebSocketTransport};
use tokio::sync::Mutex;

use crate::SketchError;
use crate::handler::handle_connection;

/// A connection that sends nothing for this long is closed.
/// Pongs to the server's pings count, so a silent but open browser stays.
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// How often each connection is pinged. Must stay below the idle timeout.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(20);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    /// Every room operation that creates, joins, leaves, or destroys a
    /// room goes through this lock.
    pub(crate) rooms: Mutex<RoomManager>,
    pub(crate) codec: C,
    pub(crate) idle_timeout: Duration,
    pub(crate) heartbeat_interval: Duration,
}

/// Builder for configuring and starting a Sketchparty server.
///
/// # Example
///
/// ```rust,no_run
/// use sketchparty::prelude::*;
///
/// # async fn run() -> Result<(), SketchError> {
/// let server = SketchServer::builder()
///     .bind("0.0.0.0:3001")
///     .room_config(RoomConfig {
///         auto_advance: true,
///         ..RoomConfig::default()
///     })
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct SketchServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
    idle_timeout: Duration,
    heartbeat_interval: Duration,
}

impl SketchServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:3001".to_string(),
            room_config: RoomConfig::default(),
            idle_timeout: DEFAULT_IDLE_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the configuration new rooms start from.
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Sets how often connections are pinged to keep silent members alive.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }

    /// Binds the listener and builds the server with `JsonCodec`.
    pub async fn build(self) -> Result<SketchServer<JsonCodec>, SketchError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let mut heartbeat_interval = self.heartbeat_interval;
        if heartbeat_interval.is_zero() || heartbeat_interval >= self.idle_timeout {
            heartbeat_interval = (self.idle_timeout / 3).max(Duration::from_millis(1));
            tracing::warn!(
                ?heartbeat_interval,
                idle_timeout = ?self.idle_timeout,
                "heartbeat interval must be below the idle timeout, adjusting"
            );
        }

        let state = Arc::new(ServerState {
            rooms: Mutex::new(RoomManager::new(self.room_config)),
            codec: JsonCodec,
            idle_timeout: self.idle_timeout,
            heartbeat_interval,
        });

        Ok(SketchServer { transport, state })
    }
}

impl Default for SketchServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Sketchparty server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct SketchServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
}

impl SketchServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> SketchServerBuilder {
        SketchServerBuilder::new()
    }
}

impl<C> SketchServer<C>
where
    C: Codec + Clone,
{
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Runs the accept loop, spawning a handler task per connection.
    /// Runs until the process is terminated.
    pub async fn run(mut self) -> Result<(), SketchError> {
        tracing::info!("sketchparty server running");

        loop {
            match self.transport.accept().await {
                Ok(conn) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => {
                    tracing::error!(error = %e, "accept failed");
                }
            }
        }
    }
}
