//! The matchmaking state machine.
//!
//! [`Matchmaker::handle`] interprets one inbound control frame against
//! the registry and returns the frames to send in reaction. It does no
//! I/O, so every transition can be tested without sockets; the lobby
//! actor delivers the returned [`Outbound`]s.
//!
//! ```text
//! NewGame(p) from c   both available      → NewGame(c) to p
//!                     otherwise           → Deny to c
//! Accept(p) from c    both still available → mark both Playing,
//!                                           Accept(addr, first) to each
//!                     otherwise           → Expired(p) to c
//! Deny(p) from c      p registered        → Deny to p
//! UpdateList from c                       → UpdateList(roster) to c
//! FinishGame(d) from c                    → score += d, c Idle
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tictac_protocol::{ClientId, ClientMessage, ServerMessage};
use tictac_session::{
    ClientKey, ClientRecord, ClientState, Registry, SessionConfig, SessionError,
};

/// A frame the lobby must send to a client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub to: ClientId,
    pub msg: ServerMessage,
}

impl Outbound {
    fn new(to: ClientId, msg: ServerMessage) -> Self {
        Self { to, msg }
    }
}

/// Owns the registry and applies the lobby rules to it.
///
/// `C` is the per-client connection handle stored in the registry.
pub struct Matchmaker<C> {
    registry: Registry<C>,
    rng: StdRng,
}

impl<C> Matchmaker<C> {
    /// Creates a matchmaker whose coin flips are seeded from the OS.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            registry: Registry::new(config),
            rng: StdRng::from_os_rng(),
        }
    }

    /// Creates a matchmaker with a reproducible coin.
    pub fn with_seed(config: SessionConfig, seed: u64) -> Self {
        Self {
            registry: Registry::new(config),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Read access to the registry, e.g. to reach a client's connection.
    pub fn registry(&self) -> &Registry<C> {
        &self.registry
    }

    /// Registers a newly connected client.
    pub fn connect(
        &mut self,
        connection: C,
        address: String,
    ) -> Result<ClientKey, SessionError> {
        self.registry.register(connection, address)
    }

    /// Removes a client. A stale key is a no-op.
    ///
    /// A match the client was in is abandoned; its peer is not told.
    pub fn disconnect(&mut self, key: ClientKey) -> Option<ClientRecord<C>> {
        let record = self.registry.unregister(key)?;
        if record.state.is_playing() {
            tracing::info!(client_id = %key.id, "client left mid-match");
        }
        Some(record)
    }

    /// Applies one inbound frame from `from`.
    ///
    /// Frames from a stale key are dropped. All availability checks and
    /// the marks that follow them happen inside this one call.
    pub fn handle(&mut self, from: ClientKey, msg: ClientMessage) -> Vec<Outbound> {
        if !self.registry.is_current(from) {
            tracing::debug!(client = %from, tag = %msg.tag(), "frame from stale client dropped");
            return Vec::new();
        }
        let from = from.id;

        match msg {
            ClientMessage::NewGame { peer } => self.on_new_game(from, peer),
            ClientMessage::Accept { peer } => self.on_accept(from, peer),
            ClientMessage::Deny { peer } => self.on_deny(from, peer),
            ClientMessage::UpdateList => {
                vec![Outbound::new(
                    from,
                    ServerMessage::UpdateList(self.registry.snapshot(from)),
                )]
            }
            ClientMessage::FinishGame { score_delta } => {
                self.on_finish_game(from, score_delta);
                Vec::new()
            }
        }
    }

    fn on_new_game(&mut self, from: ClientId, peer: ClientId) -> Vec<Outbound> {
        let allowed = peer != from
            && self.registry.is_available(from)
            && self.registry.is_available(peer);

        if !allowed {
            tracing::info!(client_id = %from, %peer, "invite denied");
            return vec![Outbound::new(from, ServerMessage::Deny)];
        }

        self.set_advisory(from, ClientState::Inviting);
        self.set_advisory(peer, ClientState::Invited);
        tracing::info!(client_id = %from, %peer, "invite forwarded");
        vec![Outbound::new(peer, ServerMessage::NewGame { from })]
    }

    fn on_accept(&mut self, from: ClientId, peer: ClientId) -> Vec<Outbound> {
        let addresses = if peer != from
            && self.registry.is_available(from)
            && self.registry.is_available(peer)
        {
            self.registry
                .get(from)
                .zip(self.registry.get(peer))
                .map(|(a, b)| (a.address.clone(), b.address.clone()))
        } else {
            None
        };

        let Some((from_address, peer_address)) = addresses else {
            tracing::info!(client_id = %from, %peer, "accept expired");
            self.settle(from);
            return vec![Outbound::new(from, ServerMessage::Expired { peer })];
        };

        // Both ids were just checked live, so neither mark can fail.
        if let Err(e) = self
            .registry
            .mark_playing(from)
            .and_then(|()| self.registry.mark_playing(peer))
        {
            tracing::error!(client_id = %from, %peer, error = %e, "failed to start match");
            return Vec::new();
        }

        let from_first: bool = self.rng.random();
        tracing::info!(client_id = %from, %peer, from_first, "match started");

        vec![
            Outbound::new(
                from,
                ServerMessage::Accept {
                    peer_address,
                    first: from_first,
                },
            ),
            Outbound::new(
                peer,
                ServerMessage::Accept {
                    peer_address: from_address,
                    first: !from_first,
                },
            ),
        ]
    }

    fn on_deny(&mut self, from: ClientId, peer: ClientId) -> Vec<Outbound> {
        self.settle(from);
        if self.registry.get(peer).is_none() {
            tracing::debug!(client_id = %from, %peer, "deny for unknown client dropped");
            return Vec::new();
        }
        self.settle(peer);
        tracing::info!(client_id = %from, %peer, "invite declined");
        vec![Outbound::new(peer, ServerMessage::Deny)]
    }

    fn on_finish_game(&mut self, from: ClientId, score_delta: i32) {
        let result = self
            .registry
            .apply_score(from, score_delta)
            .and_then(|score| self.registry.mark_idle(from).map(|()| score));
        match result {
            Ok(score) => {
                tracing::info!(client_id = %from, score_delta, score, "match finished");
            }
            Err(e) => {
                tracing::warn!(client_id = %from, error = %e, "finish from unknown client");
            }
        }
    }

    /// Records an invite state unless the client is already in a match.
    fn set_advisory(&mut self, id: ClientId, state: ClientState) {
        if self.registry.is_available(id) {
            if let Err(e) = self.registry.set_state(id, state) {
                tracing::debug!(client_id = %id, %state, error = %e, "invite state not recorded");
            }
        }
    }

    /// Clears a pending invite state back to Idle.
    fn settle(&mut self, id: ClientId) {
        let pending = self
            .registry
            .get(id)
            .is_some_and(|r| matches!(r.state, ClientState::Inviting | ClientState::Invited));
        if pending {
            if let Err(e) = self.registry.mark_idle(id) {
                tracing::debug!(client_id = %id, error = %e, "pending invite not cleared");
            }
        }
    }
}

// =========================================================================
// Tests
// =========================================================================
