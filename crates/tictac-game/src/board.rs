//! The 3x3 board and its terminal conditions.

use std::fmt;

use crate::{GameError, Move};

/// A player's symbol. `X` is always the first player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other player's mark.
    pub fn opponent(self) -> Self {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    /// The character drawn on the board.
    pub fn symbol(self) -> char {
        match self {
            Self::X => 'X',
            Self::O => 'O',
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

/// How a finished board ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Winner(Mark),
    Draw,
}

/// The playing grid, indexed `[row][col]` from the top-left corner.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Board {
    cells: [[Option<Mark>; 3]; 3],
}

impl Board {
    pub fn new() -> Self {
        Self::default()
    }

    /// The mark at `mv`, if any.
    pub fn get(&self, mv: Move) -> Option<Mark> {
        self.cells[mv.row()][mv.col()]
    }

    /// Rows top to bottom, for rendering.
    pub fn rows(&self) -> &[[Option<Mark>; 3]; 3] {
        &self.cells
    }

    /// Places `mark` on an empty cell.
    ///
    /// # Errors
    /// Returns [`GameError::Occupied`] if the cell is taken.
    pub fn place(&mut self, mv: Move, mark: Mark) -> Result<(), GameError> {
        let cell = &mut self.cells[mv.row()][mv.col()];
        if cell.is_some() {
            return Err(GameError::Occupied {
                line: mv.line(),
                column: mv.column(),
            });
        }
        *cell = Some(mark);
        Ok(())
    }

    /// The mark holding three in a row, if any.
    pub fn winner(&self) -> Option<Mark> {
        [Mark::X, Mark::O]
            .into_iter()
            .find(|&mark| has_line(&self.cells, mark))
    }

    pub fn is_full(&self) -> bool {
        self.cells.iter().flatten().all(Option::is_some)
    }

    /// `Some` once the board is terminal. A full board with a line is a
    /// win, not a draw.
    pub fn outcome(&self) -> Option<Outcome> {
        match self.winner() {
            Some(mark) => Some(Outcome::Winner(mark)),
            None if self.is_full() => Some(Outcome::Draw),
            None => None,
        }
    }
}

fn has_line(b: &[[Option<Mark>; 3]; 3], m: Mark) -> bool {
    let m = Some(m);
    (0..3).any(|i| (0..3).all(|j| b[i][j] == m))        // rows
        || (0..3).any(|j| (0..3).all(|i| b[i][j] == m)) // cols
        || (0..3).all(|i| b[i][i] == m)                 // diagonal
        || (0..3).all(|i| b[i][2 - i] == m)             // anti-diagonal
}
