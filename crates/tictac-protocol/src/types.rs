//! Core protocol types for the control channel.
//!
//! Every type here travels on the wire between a client and the lobby.
//! The byte layout of each variant is documented next to it and
//! implemented in `codec.rs`.

use std::fmt;

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// A client's lobby id.
///
/// Ids are 1-based slot numbers handed out by the session registry and
/// reused after a disconnect. `0` never names a client: the client UI
/// uses it to mean "refresh the roster".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClientId(pub u32);

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "C-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Tag
// ---------------------------------------------------------------------------

/// The one-byte discriminant at the start of every frame.
///
/// Tags are shared by both directions; what follows the tag depends on
/// who sent it (see [`ClientMessage`] and [`ServerMessage`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Tag {
    NewGame = 0,
    Accept = 1,
    Deny = 2,
    UpdateList = 3,
    FinishGame = 4,
    Expired = 5,
}

impl Tag {
    /// Returns the byte written on the wire.
    pub fn as_byte(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for Tag {
    type Error = u8;

    fn try_from(byte: u8) -> Result<Self, Self::Error> {
        match byte {
            0 => Ok(Self::NewGame),
            1 => Ok(Self::Accept),
            2 => Ok(Self::Deny),
            3 => Ok(Self::UpdateList),
            4 => Ok(Self::FinishGame),
            5 => Ok(Self::Expired),
            other => Err(other),
        }
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NewGame => "NewGame",
            Self::Accept => "Accept",
            Self::Deny => "Deny",
            Self::UpdateList => "UpdateList",
            Self::FinishGame => "FinishGame",
            Self::Expired => "Expired",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Roster
// ---------------------------------------------------------------------------

/// One row of the roster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub id: ClientId,
    /// `ip:port` of the client's peer-facing UDP endpoint.
    pub address: String,
    pub score: i32,
    /// `false` while the client is in a match.
    pub available: bool,
}

/// A full snapshot of every registered client, built on demand.
///
/// Always sent whole; there is no incremental diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    /// The id of the client that asked for this snapshot.
    pub requester: ClientId,
    /// Entries in ascending id order. The requester is included.
    pub entries: Vec<RosterEntry>,
}

impl Roster {
    /// Looks up an entry by id.
    pub fn get(&self, id: ClientId) -> Option<&RosterEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    /// The requester's own entry.
    pub fn me(&self) -> Option<&RosterEntry> {
        self.get(self.requester)
    }

    /// Every entry except the requester's.
    pub fn others(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries.iter().filter(move |e| e.id != self.requester)
    }
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Frames a client sends to the lobby.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientMessage {
    /// "Invite `peer` to a match." `[0][u32 peer]`
    NewGame { peer: ClientId },

    /// "I accept the invite `peer` sent me." `[1][u32 peer]`
    Accept { peer: ClientId },

    /// "I decline the invite `peer` sent me." `[2][u32 peer]`
    Deny { peer: ClientId },

    /// "Send me the roster." `[3]`
    UpdateList,

    /// "My match is over; add this to my score." `[4][i32 delta]`
    FinishGame { score_delta: i32 },
}

impl ClientMessage {
    /// The frame tag for this message.
    pub fn tag(&self) -> Tag {
        match self {
            Self::NewGame { .. } => Tag::NewGame,
            Self::Accept { .. } => Tag::Accept,
            Self::Deny { .. } => Tag::Deny,
            Self::UpdateList => Tag::UpdateList,
            Self::FinishGame { .. } => Tag::FinishGame,
        }
    }
}

/// Frames the lobby sends to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    /// "Client `from` invites you." `[0][u32 from]`
    NewGame { from: ClientId },

    /// Rendezvous: "your match is on; your peer's UDP endpoint is
    /// `peer_address`, and you move first iff `first`."
    /// `[1][u8 first][u32 len][address]`
    Accept { peer_address: String, first: bool },

    /// "Your invite was refused" (or the lobby is full). `[2]`
    Deny,

    /// The roster snapshot. `[3][u32 requester][u32 count]` then per entry
    /// `[u32 id][i32 score][u8 available][u32 len][address]`.
    UpdateList(Roster),

    /// "Your accept of `peer`'s invite could not be honoured": the peer
    /// left or got matched elsewhere. `[5][u32 peer]`
    Expired { peer: ClientId },
}

impl ServerMessage {
    /// The frame tag for this message.
    pub fn tag(&self) -> Tag {
        match self {
            Self::NewGame { .. } => Tag::NewGame,
            Self::Accept { .. } => Tag::Accept,
            Self::Deny => Tag::Deny,
            Self::UpdateList(_) => Tag::UpdateList,
            Self::Expired { .. } => Tag::Expired,
        }
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: u32, available: bool) -> RosterEntry {
        RosterEntry {
            id: ClientId(id),
            address: format!("127.0.0.1:{}", 5000 + id),
            score: 0,
            available,
        }
    }

    #[test]
    fn test_client_id_display() {
        assert_eq!(ClientId(3).to_string(), "C-3");
    }

    #[test]
    fn test_tag_try_from_known_bytes() {
        for tag in [
            Tag::NewGame,
            Tag::Accept,
            Tag::Deny,
            Tag::UpdateList,
            Tag::FinishGame,
            Tag::Expired,
        ] {
            assert_eq!(Tag::try_from(tag.as_byte()), Ok(tag));
        }
    }

    #[test]
    fn test_tag_try_from_unknown_byte_returns_byte() {
        assert_eq!(Tag::try_from(6), Err(6));
        assert_eq!(Tag::try_from(0xff), Err(0xff));
    }

    #[test]
    fn test_roster_others_excludes_requester() {
        let roster = Roster {
            requester: ClientId(2),
            entries: vec![entry(1, true), entry(2, true), entry(3, false)],
        };

        let others: Vec<u32> = roster.others().map(|e| e.id.0).collect();

        assert_eq!(others, vec![1, 3]);
        assert_eq!(roster.me().map(|e| e.id), Some(ClientId(2)));
    }

    #[test]
    fn test_roster_get_unknown_returns_none() {
        let roster = Roster {
            requester: ClientId(1),
            entries: vec![entry(1, true)],
        };
        assert!(roster.get(ClientId(9)).is_none());
    }

    #[test]
    fn test_message_tags_match_variants() {
        assert_eq!(ClientMessage::UpdateList.tag(), Tag::UpdateList);
        assert_eq!(
            ClientMessage::FinishGame { score_delta: 1 }.tag(),
            Tag::FinishGame
        );
        assert_eq!(ServerMessage::Deny.tag(), Tag::Deny);
        assert_eq!(
            ServerMessage::Expired { peer: ClientId(1) }.tag(),
            Tag::Expired
        );
    }
}
