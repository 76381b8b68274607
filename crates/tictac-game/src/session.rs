//! One match as seen from one side of the table.

use std::net::SocketAddr;

use crate::{Board, GameError, Mark, Move, Outcome};

/// How the match ended for the local player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameResult {
    Win,
    Loss,
    Draw,
}

impl GameResult {
    /// Score delta reported to the lobby: a win is worth one point.
    pub fn score_delta(self) -> i32 {
        match self {
            Self::Win => 1,
            Self::Loss | Self::Draw => 0,
        }
    }
}

/// Local copy of a match in progress.
///
/// Both peers hold one and apply every move to it, their own through
/// [`play_local`](Self::play_local) and the peer's through
/// [`apply_remote`](Self::apply_remote). `X` always moves first; the
/// rendezvous `first` flag decides which mark is local.
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    local: Mark,
    turn: Mark,
    peer: SocketAddr,
}

impl GameSession {
    pub fn new(peer: SocketAddr, first: bool) -> Self {
        Self {
            board: Board::new(),
            local: if first { Mark::X } else { Mark::O },
            turn: Mark::X,
            peer,
        }
    }

    /// Builds a session from the rendezvous payload.
    ///
    /// # Errors
    /// Returns [`GameError::InvalidPeerAddress`] if `peer_address` is not
    /// a socket address.
    pub fn from_rendezvous(peer_address: &str, first: bool) -> Result<Self, GameError> {
        let peer = peer_address
            .parse()
            .map_err(|_| GameError::InvalidPeerAddress(peer_address.to_string()))?;
        Ok(Self::new(peer, first))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn local_mark(&self) -> Mark {
        self.local
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn is_my_turn(&self) -> bool {
        self.board.outcome().is_none() && self.turn == self.local
    }

    pub fn is_over(&self) -> bool {
        self.board.outcome().is_some()
    }

    /// Places the local player's mark. Returns the outcome if this move
    /// ended the game.
    pub fn play_local(&mut self, mv: Move) -> Result<Option<Outcome>, GameError> {
        self.play(self.local, mv)
    }

    /// Places the peer's mark. Returns the outcome if this move ended the
    /// game.
    pub fn apply_remote(&mut self, mv: Move) -> Result<Option<Outcome>, GameError> {
        self.play(self.local.opponent(), mv)
    }

    /// The local player's result, once the board is terminal.
    pub fn result(&self) -> Option<GameResult> {
        self.board.outcome().map(|outcome| match outcome {
            Outcome::Winner(mark) if mark == self.local => GameResult::Win,
            Outcome::Winner(_) => GameResult::Loss,
            Outcome::Draw => GameResult::Draw,
        })
    }

    fn play(&mut self, mark: Mark, mv: Move) -> Result<Option<Outcome>, GameError> {
        if self.is_over() {
            return Err(GameError::Finished);
        }
        if self.turn != mark {
            return Err(GameError::NotYourTurn(mark));
        }
        self.board.place(mv, mark)?;
        self.turn = mark.opponent();

        let outcome = self.board.outcome();
        tracing::debug!(%mark, %mv, ?outcome, "move applied");
        Ok(outcome)
    }
}
