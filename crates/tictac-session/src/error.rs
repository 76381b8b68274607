//! Error types for the session layer.

use tictac_protocol::ClientId;

/// Errors that can occur during registry operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Every slot in the registry is occupied.
    #[error("lobby is full ({capacity} clients)")]
    CapacityExceeded { capacity: usize },

    /// No live client has this id.
    #[error("no client registered as {0}")]
    NotFound(ClientId),
}
