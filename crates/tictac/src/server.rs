//! `TictacServer` builder and accept loop.
//!
//! This is the entry point for running a lobby. It ties the layers
//! together: transport → protocol → lobby actor → session registry.

use std::net::SocketAddr;

use tictac_lobby::{LobbyConfig, LobbyHandle, spawn_lobby};
use tictac_session::SessionConfig;
use tictac_transport::{ControlConnection, ControlListener, TransportError};

use crate::TictacError;
use crate::handler::handle_connection;

/// Builder for configuring and starting a lobby server.
///
/// # Example
///
/// ```rust,ignore
/// use tictac::prelude::*;
///
/// let server = TictacServer::builder()
///     .bind("0.0.0.0:9000")
///     .build()
///     .await?;
/// server.run().await
/// ```
pub struct TictacServerBuilder {
    bind_addr: String,
    session_config: SessionConfig,
    lobby_config: LobbyConfig,
}

impl TictacServerBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            bind_addr: "127.0.0.1:9000".to_string(),
            session_config: SessionConfig::default(),
            lobby_config: LobbyConfig::default(),
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets the registry configuration.
    pub fn session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    /// Sets the lobby actor configuration.
    pub fn lobby_config(mut self, config: LobbyConfig) -> Self {
        self.lobby_config = config;
        self
    }

    /// Binds the listener and starts the lobby actor.
    ///
    /// Must be called from within a Tokio runtime.
    pub async fn build(self) -> Result<TictacServer, TictacError> {
        let listener = ControlListener::bind(&self.bind_addr).await?;
        let lobby = spawn_lobby(self.session_config, self.lobby_config);
        Ok(TictacServer { listener, lobby })
    }
}

impl Default for TictacServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A lobby server ready to accept clients.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct TictacServer {
    listener: ControlListener,
    lobby: LobbyHandle,
}

impl TictacServer {
    /// Creates a new builder.
    pub fn builder() -> TictacServerBuilder {
        TictacServerBuilder::new()
    }

    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr, TictacError> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a handle to the lobby actor.
    pub fn lobby(&self) -> LobbyHandle {
        self.lobby.clone()
    }

    /// Runs the accept loop.
    ///
    /// Spawns a handler task for each connected client. Runs until the
    /// process is terminated or accepting fails; an accept error is fatal.
    pub async fn run(self) -> Result<(), TictacError> {
        tracing::info!(addr = ?self.listener.local_addr().ok(), "tictac lobby running");

        let TictacServer { listener, lobby } = self;
        let listener = &listener;
        accept_loop(move || listener.accept(), lobby).await
    }
}

/// Hands every accepted connection to its own handler task. Returns the
/// first accept error.
async fn accept_loop<A, F>(mut accept: A, lobby: LobbyHandle) -> Result<(), TictacError>
where
    A: FnMut() -> F,
    F: Future<Output = Result<ControlConnection, TransportError>>,
{
    loop {
        match accept().await {
            Ok(conn) => {
                let lobby = lobby.clone();
                tokio::spawn(async move {
                    if let Err(e) = handle_connection(conn, lobby).await {
                        tracing::debug!(error = %e, "connection ended with error");
                    }
                });
            }
            Err(e) => {
                tracing::error!(error = %e, "accept failed");
                return Err(e.into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_accept_loop_accept_error_is_fatal() {
        let lobby = spawn_lobby(SessionConfig::default(), LobbyConfig::default());
        let accept = || async {
            Err::<ControlConnection, _>(TransportError::AcceptFailed(std::io::Error::from(
                std::io::ErrorKind::Other,
            )))
        };

        let result = accept_loop(accept, lobby).await;

        assert!(matches!(
            result,
            Err(TictacError::Transport(TransportError::AcceptFailed(_)))
        ));
    }
}
