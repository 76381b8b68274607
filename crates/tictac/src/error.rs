//! Unified error type for the tictac lobby.

use tictac_game::GameError;
use tictac_lobby::LobbyError;
use tictac_protocol::ProtocolError;
use tictac_session::SessionError;
use tictac_transport::TransportError;

/// Top-level error that wraps all crate-specific errors.
///
/// The `#[from]` attribute on each variant generates the `From` impls, so
/// `?` converts sub-crate errors automatically.
#[derive(Debug, thiserror::Error)]
pub enum TictacError {
    /// A transport-level error (bind, connect, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (unknown tag, truncated frame).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// A registry error (lobby full, unknown client).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The lobby actor refused or is gone.
    #[error(transparent)]
    Lobby(#[from] LobbyError),

    /// A match-level error (bad move, bad peer address).
    #[error(transparent)]
    Game(#[from] GameError),

    /// Terminal I/O failed.
    #[error("terminal i/o error: {0}")]
    Io(#[from] std::io::Error),
}
