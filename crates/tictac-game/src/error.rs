//! Error types for the game layer.

use tictac_transport::TransportError;

use crate::Mark;

/// Errors that can occur while playing a match.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// The text is not two whitespace-separated integers.
    #[error("malformed move {0:?}: expected \"<line> <column>\"")]
    MalformedMove(String),

    /// Line or column outside `1..=3`.
    #[error("line = {line}, column = {column}: pick a line and a column between 1 and 3")]
    OutOfRange { line: i64, column: i64 },

    /// The target cell already holds a mark.
    #[error("line = {line}, column = {column}: pick an empty cell")]
    Occupied { line: usize, column: usize },

    /// A move arrived for the player who is not on turn.
    #[error("it is not {0}'s turn")]
    NotYourTurn(Mark),

    /// The board is already terminal.
    #[error("the game is over")]
    Finished,

    /// The rendezvous address could not be parsed as `ip:port`.
    #[error("invalid peer address {0:?}")]
    InvalidPeerAddress(String),

    /// The UDP channel failed.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
