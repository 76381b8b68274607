//! Binary framing for the control channel.
//!
//! Encoding is synchronous and infallible: a message is appended to a
//! `Vec<u8>` in one go. Decoding is async and reads straight from the
//! stream, suspending until every field of the frame has arrived, so a
//! caller never observes a partial message.
//!
//! The readers are NOT cancel safe: dropping one mid-frame loses the bytes
//! already consumed. Run them in a dedicated task (as the lobby handler and
//! the client reactor do) rather than inside a `tokio::select!` branch.

use std::io::ErrorKind;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::{
    ClientId, ClientMessage, ProtocolError, Roster, RosterEntry,
    ServerMessage, Tag,
};

/// Longest display address a frame may carry.
pub const MAX_ADDRESS_LEN: usize = 256;

/// Most entries an `UpdateList` reply may carry.
pub const MAX_ROSTER_ENTRIES: usize = 4096;

/// Types that can be written as a single frame.
pub trait Encode {
    /// Appends the frame (tag included) to `buf`.
    fn encode_to(&self, buf: &mut Vec<u8>);

    /// Encodes the frame into a fresh buffer.
    fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        self.encode_to(&mut buf);
        buf
    }
}

impl Encode for ClientMessage {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag().as_byte());
        match self {
            Self::NewGame { peer }
            | Self::Accept { peer }
            | Self::Deny { peer } => put_id(buf, *peer),
            Self::UpdateList => {}
            Self::FinishGame { score_delta } => {
                buf.extend_from_slice(&score_delta.to_be_bytes());
            }
        }
    }
}

impl Encode for ServerMessage {
    fn encode_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.tag().as_byte());
        match self {
            Self::NewGame { from } => put_id(buf, *from),
            Self::Accept {
                peer_address,
                first,
            } => {
                buf.push(u8::from(*first));
                put_str(buf, peer_address);
            }
            Self::Deny => {}
            Self::UpdateList(roster) => {
                put_id(buf, roster.requester);
                put_u32(buf, roster.entries.len() as u32);
                for entry in &roster.entries {
                    put_id(buf, entry.id);
                    buf.extend_from_slice(&entry.score.to_be_bytes());
                    buf.push(u8::from(entry.available));
                    put_str(buf, &entry.address);
                }
            }
            Self::Expired { peer } => put_id(buf, *peer),
        }
    }
}

fn put_u32(buf: &mut Vec<u8>, value: u32) {
    buf.extend_from_slice(&value.to_be_bytes());
}

fn put_id(buf: &mut Vec<u8>, id: ClientId) {
    put_u32(buf, id.0);
}

fn put_str(buf: &mut Vec<u8>, s: &str) {
    put_u32(buf, s.len() as u32);
    buf.extend_from_slice(s.as_bytes());
}

// ---------------------------------------------------------------------------
// Decoding
// ---------------------------------------------------------------------------

/// Reads one client → server frame.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new frame
/// starts (the peer closed the connection).
pub async fn read_client_message<R>(
    r: &mut R,
) -> Result<Option<ClientMessage>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let Some(tag) = read_tag(r).await? else {
        return Ok(None);
    };
    let msg = match tag {
        Tag::NewGame => ClientMessage::NewGame {
            peer: read_id(r).await?,
        },
        Tag::Accept => ClientMessage::Accept {
            peer: read_id(r).await?,
        },
        Tag::Deny => ClientMessage::Deny {
            peer: read_id(r).await?,
        },
        Tag::UpdateList => ClientMessage::UpdateList,
        Tag::FinishGame => ClientMessage::FinishGame {
            score_delta: read_i32(r).await?,
        },
        Tag::Expired => return Err(ProtocolError::UnexpectedTag(tag)),
    };
    Ok(Some(msg))
}

/// Reads one server → client frame.
///
/// Returns `Ok(None)` if the stream ends cleanly before a new frame
/// starts (the lobby closed the connection).
pub async fn read_server_message<R>(
    r: &mut R,
) -> Result<Option<ServerMessage>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let Some(tag) = read_tag(r).await? else {
        return Ok(None);
    };
    let msg = match tag {
        Tag::NewGame => ServerMessage::NewGame {
            from: read_id(r).await?,
        },
        Tag::Accept => {
            let first = read_flag(r, "first-player flag").await?;
            let peer_address = read_str(r, "peer address").await?;
            ServerMessage::Accept {
                peer_address,
                first,
            }
        }
        Tag::Deny => ServerMessage::Deny,
        Tag::UpdateList => ServerMessage::UpdateList(read_roster(r).await?),
        Tag::Expired => ServerMessage::Expired {
            peer: read_id(r).await?,
        },
        Tag::FinishGame => return Err(ProtocolError::UnexpectedTag(tag)),
    };
    Ok(Some(msg))
}

/// Writes one frame and flushes it.
pub async fn write_message<W, M>(w: &mut W, msg: &M) -> Result<(), ProtocolError>
where
    W: AsyncWrite + Unpin,
    M: Encode,
{
    w.write_all(&msg.encode()).await?;
    w.flush().await?;
    Ok(())
}

async fn read_roster<R>(r: &mut R) -> Result<Roster, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let requester = read_id(r).await?;
    let count = read_u32(r).await? as usize;
    if count > MAX_ROSTER_ENTRIES {
        return Err(ProtocolError::FieldTooLarge {
            field: "roster",
            len: count,
            max: MAX_ROSTER_ENTRIES,
        });
    }

    let mut entries = Vec::with_capacity(count);
    for _ in 0..count {
        let id = read_id(r).await?;
        let score = read_i32(r).await?;
        let available = read_flag(r, "availability flag").await?;
        let address = read_str(r, "display address").await?;
        entries.push(RosterEntry {
            id,
            address,
            score,
            available,
        });
    }
    Ok(Roster { requester, entries })
}

async fn read_tag<R>(r: &mut R) -> Result<Option<Tag>, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let mut byte = [0u8; 1];
    if r.read(&mut byte).await? == 0 {
        return Ok(None);
    }
    Tag::try_from(byte[0])
        .map(Some)
        .map_err(ProtocolError::UnknownTag)
}

async fn read_u32<R>(r: &mut R) -> Result<u32, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    r.read_u32().await.map_err(mid_frame)
}

async fn read_i32<R>(r: &mut R) -> Result<i32, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    r.read_i32().await.map_err(mid_frame)
}

async fn read_id<R>(r: &mut R) -> Result<ClientId, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    read_u32(r).await.map(ClientId)
}

/// Flags are exactly `0` or `1`, so a decoded frame re-encodes to the
/// same bytes.
async fn read_flag<R>(r: &mut R, field: &'static str) -> Result<bool, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    match r.read_u8().await.map_err(mid_frame)? {
        0 => Ok(false),
        1 => Ok(true),
        value => Err(ProtocolError::InvalidFlag { field, value }),
    }
}

async fn read_str<R>(
    r: &mut R,
    field: &'static str,
) -> Result<String, ProtocolError>
where
    R: AsyncRead + Unpin,
{
    let len = read_u32(r).await? as usize;
    if len > MAX_ADDRESS_LEN {
        return Err(ProtocolError::FieldTooLarge {
            field,
            len,
            max: MAX_ADDRESS_LEN,
        });
    }
    let mut bytes = vec![0u8; len];
    r.read_exact(&mut bytes).await.map_err(mid_frame)?;
    String::from_utf8(bytes).map_err(|_| ProtocolError::InvalidUtf8 { field })
}

/// EOF after the tag means the frame was cut short.
fn mid_frame(e: std::io::Error) -> ProtocolError {
    if e.kind() == ErrorKind::UnexpectedEof {
        ProtocolError::Truncated
    } else {
        ProtocolError::Io(e)
    }
}

// =========================================================================
// Tests
// =========================================================================
