//! Tic-tac-toe played directly between two matched clients.
//!
//! Once the lobby has exchanged their UDP endpoints, the two clients
//! talk to each other only. Each keeps its own [`GameSession`], applies
//! every move to it, and evaluates the terminal condition independently.
//!
//! - [`Board`]: the 3x3 grid and the win/draw check
//! - [`Move`]: a cell, encoded as `"<line> <column>\n"` (1-indexed)
//! - [`GameSession`]: turn order and the local player's [`GameResult`]
//! - [`PeerLink`]: the UDP endpoint moves travel over

mod board;
mod error;
mod link;
mod session;
mod turn;

pub use board::{Board, Mark, Outcome};
pub use error::GameError;
pub use link::PeerLink;
pub use session::{GameResult, GameSession};
pub use turn::Move;
