//! Error types for the lobby layer.

use tictac_session::SessionError;

/// Errors that can occur during lobby operations.
#[derive(Debug, thiserror::Error)]
pub enum LobbyError {
    /// The registry refused the operation (e.g. the lobby is full).
    #[error(transparent)]
    Session(#[from] SessionError),

    /// The lobby actor's command channel is closed.
    #[error("lobby is unavailable")]
    Unavailable,
}
