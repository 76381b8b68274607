//! # Tictac
//!
//! A matchmaking lobby for tic-tac-toe.
//!
//! Clients keep a TCP control connection to the lobby, browse the roster
//! and invite each other. When an invite is accepted the lobby hands each
//! side the other's UDP endpoint, and the match is played directly
//! between the two clients. The result is reported back to the lobby.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tictac::prelude::*;
//!
//! # async fn serve() -> Result<(), TictacError> {
//! let server = TictacServer::builder()
//!     .bind("0.0.0.0:9000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

pub mod client;
mod error;
mod handler;
mod server;

pub use error::TictacError;
pub use server::{TictacServer, TictacServerBuilder};

/// Installs the `tracing` subscriber used by the binaries: formatted
/// output on stderr, filtered by `RUST_LOG` or `default_filter`.
pub fn init_tracing(default_filter: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

pub mod prelude {
    pub use crate::client::{ClientConfig, run_client};
    pub use crate::{TictacError, TictacServer, TictacServerBuilder};
    pub use tictac_game::{GameResult, GameSession, Mark, Move, Outcome, PeerLink};
    pub use tictac_lobby::{LobbyConfig, LobbyHandle, LobbyInfo};
    pub use tictac_protocol::{ClientId, ClientMessage, Roster, RosterEntry, ServerMessage};
    pub use tictac_session::SessionConfig;
}
