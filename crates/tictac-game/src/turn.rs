//! Turn encoding for the peer-to-peer data channel.
//!
//! A turn travels as ASCII `"<line> <column>\n"`, both 1-indexed. The same
//! text is what the player types at the prompt, so one parser serves the
//! keyboard and the wire.

use std::fmt;
use std::str::FromStr;

use crate::GameError;

/// A cell on the board, stored 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    row: usize,
    col: usize,
}

impl Move {
    /// Builds a move from 0-indexed coordinates.
    ///
    /// # Errors
    /// Returns [`GameError::OutOfRange`] unless both are below 3.
    pub fn new(row: usize, col: usize) -> Result<Self, GameError> {
        if row >= 3 || col >= 3 {
            return Err(GameError::OutOfRange {
                line: row as i64 + 1,
                column: col as i64 + 1,
            });
        }
        Ok(Self { row, col })
    }

    /// 0-indexed row.
    pub fn row(self) -> usize {
        self.row
    }

    /// 0-indexed column.
    pub fn col(self) -> usize {
        self.col
    }

    /// 1-indexed line, as shown to players.
    pub fn line(self) -> usize {
        self.row + 1
    }

    /// 1-indexed column, as shown to players.
    pub fn column(self) -> usize {
        self.col + 1
    }

    /// The datagram payload for this move.
    pub fn to_wire(self) -> Vec<u8> {
        format!("{} {}\n", self.line(), self.column()).into_bytes()
    }

    /// Decodes a datagram payload.
    pub fn from_wire(bytes: &[u8]) -> Result<Self, GameError> {
        let text = std::str::from_utf8(bytes)
            .map_err(|_| GameError::MalformedMove(String::from_utf8_lossy(bytes).into_owned()))?;
        text.parse()
    }
}

impl FromStr for Move {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || GameError::MalformedMove(s.trim_end().to_string());

        let mut parts = s.split_whitespace();
        let (Some(line), Some(column), None) = (parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };
        let line: i64 = line.parse().map_err(|_| malformed())?;
        let column: i64 = column.parse().map_err(|_| malformed())?;

        if !(1..=3).contains(&line) || !(1..=3).contains(&column) {
            return Err(GameError::OutOfRange { line, column });
        }
        Ok(Self {
            row: (line - 1) as usize,
            col: (column - 1) as usize,
        })
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.line(), self.column())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_one_indexed_to_zero_indexed() {
        let mv: Move = "1 3\n".parse().unwrap();
        assert_eq!((mv.row(), mv.col()), (0, 2));
    }

    #[test]
    fn test_parse_tolerates_extra_whitespace() {
        let mv: Move = "  2\t2  \r\n".parse().unwrap();
        assert_eq!(mv, Move::new(1, 1).unwrap());
    }

    #[test]
    fn test_parse_out_of_range_reports_values() {
        let err = "0 4".parse::<Move>().unwrap_err();
        assert!(matches!(err, GameError::OutOfRange { line: 0, column: 4 }));
    }

    #[test]
    fn test_parse_garbage_is_malformed() {
        for input in ["", "1", "a b", "1 2 3", "1,2"] {
            let err = input.parse::<Move>().unwrap_err();
            assert!(matches!(err, GameError::MalformedMove(_)), "{input:?}");
        }
    }

    #[test]
    fn test_to_wire_is_one_indexed_newline_terminated() {
        let mv = Move::new(2, 0).unwrap();
        assert_eq!(mv.to_wire(), b"3 1\n");
        assert_eq!(Move::from_wire(&mv.to_wire()).unwrap(), mv);
    }

    #[test]
    fn test_from_wire_invalid_utf8_is_malformed() {
        let err = Move::from_wire(&[0xff, b' ', b'1']).unwrap_err();
        assert!(matches!(err, GameError::MalformedMove(_)));
    }

    #[test]
    fn test_new_out_of_range_rejected() {
        assert!(Move::new(3, 0).is_err());
        assert!(Move::new(0, 3).is_err());
    }
}
