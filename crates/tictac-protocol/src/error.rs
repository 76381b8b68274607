//! Error types for the protocol layer.
//!
//! Any of these ends the connection it was raised on: the stream is no
//! longer at a known frame boundary, so nothing after it can be trusted.

use crate::Tag;

/// Errors that can occur while encoding or decoding frames.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    /// The first byte of a frame is not a known tag.
    #[error("unknown message tag {0}")]
    UnknownTag(u8),

    /// A known tag that is not valid in this direction, e.g. a client
    /// receiving `FinishGame`.
    #[error("unexpected {0} frame for this direction")]
    UnexpectedTag(Tag),

    /// The stream ended in the middle of a frame.
    #[error("stream closed mid-frame")]
    Truncated,

    /// A length prefix declares more data than the protocol allows.
    #[error("{field} length {len} exceeds limit of {max}")]
    FieldTooLarge {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// A flag byte is neither `0` nor `1`.
    #[error("{field} must be 0 or 1, got {value}")]
    InvalidFlag { field: &'static str, value: u8 },

    /// A text field is not valid UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// The underlying stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}
