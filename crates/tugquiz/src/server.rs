//! `TugquizServer` builder and accept loop.
//!
//! The server owns the listener plus the shared state every connection
//! handler needs: the session manager and the room registry. One task per
//! accepted connection; the handler does the rest.

use std::sync::Arc;

use tokio::net::TcpListener;

use tugquiz_room::{EngineFactory, RoomConfig, RoomRegistry};
use tugquiz_session::SessionManager;

use crate::TugquizError;
use crate::handler::handle_connection;

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState {
    pub(crate) sessions: SessionManager,
    pub(crate) registry: RoomRegistry,
}

/// Builder for configuring and starting a Tugquiz server.
pub struct TugquizServerBuilder {
    bind_addr: String,
    room_config: RoomConfig,
}

impl TugquizServerBuilder {
    /// Creates a builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9090".to_string(),
            room_config: RoomConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the room configuration (capacity and scheduler delays).
    pub fn room_config(mut self, config: RoomConfig) -> Self {
        self.room_config = config;
        self
    }

    /// Binds the listener and builds the server with the given engine
    /// factory.
    pub async fn build(
        self,
        factory: impl EngineFactory,
    ) -> Result<TugquizServer, TugquizError> {
        let listener = TcpListener::bind(&self.bind_addr).await?;
        tracing::info!(addr = %self.bind_addr, "listener bound");

        let sessions = SessionManager::new();
        let registry =
            RoomRegistry::new(self.room_config, factory, sessions.clone());

        Ok(TugquizServer {
            listener,
            state: Arc::new(ServerState { sessions, registry }),
        })
    }
}

impl Default for TugquizServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A running Tugquiz server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TugquizServer {
    listener: TcpListener,
    state: Arc<ServerState>,
}

impl TugquizServer {
    /// Creates a new builder.
    pub fn builder() -> TugquizServerBuilder {
        TugquizServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Runs the accept loop until the process is terminated.
    pub async fn run(self) -> Result<(), TugquizError> {
        tracing::info!("Tugquiz server running");

        loop {
            match self.listener.accept().await {
                Ok((stream, addr)) => {
                    let state = Arc::clone(&self.state);
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(stream, state).await {
                            tracing::debug!(
                                %addr,
                                error = %e,
                                "connection ended with error"
                            );
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
