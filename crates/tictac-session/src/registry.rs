//! The registry: a fixed-capacity arena of client records.
//!
//! Responsibilities:
//! - Handing out the lowest free id when a client connects
//! - Freeing the slot (and bumping its generation) when it disconnects
//! - Answering "is this client available for a match?" in O(1)
//! - Building roster snapshots
//!
//! # Invariants
//!
//! - At most one live record per id.
//! - `playing` contains exactly the ids whose record is in
//!   [`ClientState::Playing`]. Every state change goes through
//!   [`Registry::set_state`], which keeps the two in step.

use std::collections::HashSet;

use tictac_protocol::{ClientId, Roster, RosterEntry};

use crate::{ClientKey, ClientRecord, ClientState, SessionConfig, SessionError};

/// One arena slot. The generation survives the record so a freed slot
/// still remembers how many times it has been used.
#[derive(Debug)]
struct Slot<C> {
    generation: u32,
    record: Option<ClientRecord<C>>,
}

/// Registry of every connected client.
///
/// ## Lifecycle
///
/// ```text
/// register() ──→ [Idle] ⇄ set_state() ⇄ [Inviting|Invited|Playing]
///                   │
///                   ▼
///              unregister()  ──→ slot free, generation + 1
/// ```
#[derive(Debug)]
pub struct Registry<C> {
    /// Slots in id order: `slots[i]` holds the client with id `i + 1`.
    /// Grows up to `config.capacity`; never shrinks.
    slots: Vec<Slot<C>>,

    /// Ids currently in a match.
    playing: HashSet<ClientId>,

    /// Number of occupied slots.
    live: usize,

    config: SessionConfig,
}

impl<C> Registry<C> {
    /// Creates a new, empty registry.
    pub fn new(config: SessionConfig) -> Self {
        Self {
            slots: Vec::with_capacity(config.capacity),
            playing: HashSet::new(),
            live: 0,
            config,
        }
    }

    /// Registers a new client in the first free slot.
    ///
    /// Freed slots are reused lowest-first before the table grows.
    ///
    /// # Errors
    /// Returns [`SessionError::CapacityExceeded`] when every slot is taken.
    pub fn register(
        &mut self,
        connection: C,
        address: String,
    ) -> Result<ClientKey, SessionError> {
        let index = match self.slots.iter().position(|s| s.record.is_none()) {
            Some(index) => index,
            None if self.slots.len() < self.config.capacity => {
                self.slots.push(Slot {
                    generation: 0,
                    record: None,
                });
                self.slots.len() - 1
            }
            None => {
                return Err(SessionError::CapacityExceeded {
                    capacity: self.config.capacity,
                });
            }
        };

        let id = ClientId(index as u32 + 1);
        let slot = &mut self.slots[index];
        slot.record = Some(ClientRecord {
            id,
            connection,
            address,
            score: 0,
            state: ClientState::Idle,
        });
        self.live += 1;

        let key = ClientKey {
            id,
            generation: slot.generation,
        };
        tracing::info!(client = %key, "client registered");
        Ok(key)
    }

    /// Frees the slot `key` refers to and returns its record.
    ///
    /// Returns `None` if the key is stale (the slot was already freed, or
    /// now belongs to someone else).
    pub fn unregister(&mut self, key: ClientKey) -> Option<ClientRecord<C>> {
        let slot = self.slot_mut(key.id)?;
        if slot.generation != key.generation {
            return None;
        }
        let record = slot.record.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.playing.remove(&key.id);
        self.live -= 1;

        tracing::info!(client = %key, "client unregistered");
        Some(record)
    }

    /// Returns `true` if `key` still names a live client.
    pub fn is_current(&self, key: ClientKey) -> bool {
        self.slot(key.id).is_some_and(|slot| {
            slot.generation == key.generation && slot.record.is_some()
        })
    }

    /// Looks up a live client by id.
    pub fn get(&self, id: ClientId) -> Option<&ClientRecord<C>> {
        self.slot(id).and_then(|slot| slot.record.as_ref())
    }

    /// Sets a client's state, keeping the playing set in step.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no live client has this id.
    pub fn set_state(
        &mut self,
        id: ClientId,
        state: ClientState,
    ) -> Result<(), SessionError> {
        let record = self.record_mut(id)?;
        let previous = record.state;
        record.state = state;

        if state.is_playing() {
            self.playing.insert(id);
        } else {
            self.playing.remove(&id);
        }

        if previous != state {
            tracing::debug!(client = %id, from = %previous, to = %state, "state changed");
        }
        Ok(())
    }

    /// Marks a client as in a match.
    pub fn mark_playing(&mut self, id: ClientId) -> Result<(), SessionError> {
        self.set_state(id, ClientState::Playing)
    }

    /// Returns a client to the roster.
    pub fn mark_idle(&mut self, id: ClientId) -> Result<(), SessionError> {
        self.set_state(id, ClientState::Idle)
    }

    /// Returns `true` iff `id` is registered and not in a match.
    pub fn is_available(&self, id: ClientId) -> bool {
        self.get(id).is_some() && !self.playing.contains(&id)
    }

    /// Adds `delta` to a client's score and returns the new score.
    ///
    /// # Errors
    /// Returns [`SessionError::NotFound`] if no live client has this id.
    pub fn apply_score(
        &mut self,
        id: ClientId,
        delta: i32,
    ) -> Result<i32, SessionError> {
        let record = self.record_mut(id)?;
        record.score = record.score.saturating_add(delta);
        Ok(record.score)
    }

    /// Builds a roster of every live client, in id order.
    pub fn snapshot(&self, requester: ClientId) -> Roster {
        let entries = self
            .records()
            .map(|record| RosterEntry {
                id: record.id,
                address: record.address.clone(),
                score: record.score,
                available: !self.playing.contains(&record.id),
            })
            .collect();
        Roster { requester, entries }
    }

    /// Iterates over every live record in id order.
    pub fn records(&self) -> impl Iterator<Item = &ClientRecord<C>> {
        self.slots.iter().filter_map(|slot| slot.record.as_ref())
    }

    /// Number of live clients.
    pub fn len(&self) -> usize {
        self.live
    }

    /// Returns `true` if nobody is connected.
    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// Number of clients currently in a match.
    pub fn playing_count(&self) -> usize {
        self.playing.len()
    }

    /// Maximum number of simultaneous clients.
    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    fn slot(&self, id: ClientId) -> Option<&Slot<C>> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.slots.get(index)
    }

    fn slot_mut(&mut self, id: ClientId) -> Option<&mut Slot<C>> {
        let index = (id.0 as usize).checked_sub(1)?;
        self.slots.get_mut(index)
    }

    fn record_mut(
        &mut self,
        id: ClientId,
    ) -> Result<&mut ClientRecord<C>, SessionError> {
        self.slot_mut(id)
            .and_then(|slot| slot.record.as_mut())
            .ok_or(SessionError::NotFound(id))
    }
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    //! Unit tests for `Registry`.
    //!
    //! Naming convention: `test_{function}_{scenario}_{expected}`.
    //! The connection handle is `()` throughout; the registry never looks
    //! inside it.

    use super::*;

    // -- Helpers ----------------------------------------------------------

    fn registry(capacity: usize) -> Registry<()> {
        Registry::new(SessionConfig { capacity })
    }

    fn connect(reg: &mut Registry<()>) -> ClientKey {
        let n = reg.len() + 1;
        reg.register((), format!("127.0.0.1:{}", 6000 + n))
            .expect("should have room")
    }

    fn cid(id: u32) -> ClientId {
        ClientId(id)
    }

    fn live_ids(reg: &Registry<()>) -> Vec<u32> {
        reg.records().map(|r| r.id.0).collect()
    }

    // =====================================================================
    // register()
    // =====================================================================

    #[test]
    fn test_register_first_client_gets_id_one_idle() {
        let mut reg = registry(4);

        let key = connect(&mut reg);

        assert_eq!(key.id, cid(1));
        let record = reg.get(cid(1)).expect("registered");
        assert_eq!(record.state, ClientState::Idle);
        assert_eq!(record.score, 0);
        assert!(reg.is_available(cid(1)));
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut reg = registry(4);
        let ids: Vec<u32> = (0..3).map(|_| connect(&mut reg).id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(reg.len(), 3);
    }

    #[test]
    fn test_register_full_returns_capacity_exceeded() {
        let mut reg = registry(2);
        connect(&mut reg);
        connect(&mut reg);

        let result = reg.register((), "x:1".into());

        assert!(matches!(
            result,
            Err(SessionError::CapacityExceeded { capacity: 2 })
        ));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn test_register_reuses_lowest_freed_id_before_growing() {
        let mut reg = registry(8);
        let keys: Vec<ClientKey> = (0..4).map(|_| connect(&mut reg)).collect();
        reg.unregister(keys[2]).unwrap(); // frees id 3
        reg.unregister(keys[1]).unwrap(); // frees id 2

        let a = connect(&mut reg);
        let b = connect(&mut reg);
        let c = connect(&mut reg);

        assert_eq!((a.id, b.id, c.id), (cid(2), cid(3), cid(5)));
    }

    #[test]
    fn test_register_reused_slot_gets_new_generation() {
        let mut reg = registry(2);
        let old = connect(&mut reg);
        reg.unregister(old).unwrap();

        let new = connect(&mut reg);

        assert_eq!(new.id, old.id);
        assert_ne!(new.generation, old.generation);
    }

    #[test]
    fn test_register_after_free_at_capacity_succeeds() {
        let mut reg = registry(1);
        let key = connect(&mut reg);
        assert!(reg.register((), "x:1".into()).is_err());

        reg.unregister(key).unwrap();

        assert_eq!(connect(&mut reg).id, cid(1));
    }

    // =====================================================================
    // unregister()
    // =====================================================================

    #[test]
    fn test_unregister_returns_record_and_frees_slot() {
        let mut reg = registry(4);
        let key = connect(&mut reg);

        let record = reg.unregister(key).expect("should be live");

        assert_eq!(record.id, cid(1));
        assert!(reg.get(cid(1)).is_none());
        assert!(!reg.is_available(cid(1)));
        assert!(reg.is_empty());
    }

    #[test]
    fn test_unregister_clears_playing_mark() {
        let mut reg = registry(4);
        let key = connect(&mut reg);
        reg.mark_playing(key.id).unwrap();

        reg.unregister(key).unwrap();

        assert_eq!(reg.playing_count(), 0);
        // The next occupant of the slot starts available.
        let next = connect(&mut reg);
        assert!(reg.is_available(next.id));
    }

    #[test]
    fn test_unregister_stale_key_leaves_new_occupant_alone() {
        let mut reg = registry(4);
        let stale = connect(&mut reg);
        reg.unregister(stale).unwrap();
        let current = connect(&mut reg);

        assert!(reg.unregister(stale).is_none());

        assert!(reg.is_current(current));
        assert!(!reg.is_current(stale));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn test_unregister_twice_returns_none() {
        let mut reg = registry(4);
        let key = connect(&mut reg);
        reg.unregister(key).unwrap();
        assert!(reg.unregister(key).is_none());
    }

    // =====================================================================
    // Slot reuse property
    // =====================================================================

    #[test]
    fn test_slot_reuse_live_ids_equal_connects_minus_disconnects() {
        // Deterministic sweep over many connect/disconnect interleavings:
        // the live ids are never duplicated, always equal what is still
        // connected, and a new id never skips a freed one.
        for seed in 0u32..64 {
            let mut reg = registry(16);
            let mut live: Vec<ClientKey> = Vec::new();
            let mut state = seed.wrapping_mul(2654435761).wrapping_add(1);

            for _ in 0..40 {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                let disconnect = !live.is_empty() && state % 3 == 0;

                if disconnect {
                    let victim = live.remove(state as usize % live.len());
                    assert!(reg.unregister(victim).is_some());
                } else if live.len() < 16 {
                    let expected_id = (1..)
                        .find(|id| !live.iter().any(|k| k.id.0 == *id))
                        .unwrap();
                    let key = connect(&mut reg);
                    assert_eq!(key.id.0, expected_id, "seed {seed}");
                    live.push(key);
                }

                let mut expected: Vec<u32> = live.iter().map(|k| k.id.0).collect();
                expected.sort_unstable();
                assert_eq!(live_ids(&reg), expected, "seed {seed}");
            }
        }
    }

    // =====================================================================
    // set_state() / availability
    // =====================================================================

    #[test]
    fn test_mark_playing_makes_unavailable() {
        let mut reg = registry(4);
        let key = connect(&mut reg);

        reg.mark_playing(key.id).unwrap();

        assert!(!reg.is_available(key.id));
        assert_eq!(reg.get(key.id).unwrap().state, ClientState::Playing);
        assert_eq!(reg.playing_count(), 1);
    }

    #[test]
    fn test_mark_idle_restores_availability() {
        let mut reg = registry(4);
        let key = connect(&mut reg);
        reg.mark_playing(key.id).unwrap();

        reg.mark_idle(key.id).unwrap();

        assert!(reg.is_available(key.id));
        assert_eq!(reg.playing_count(), 0);
    }

    #[test]
    fn test_set_state_invite_states_do_not_affect_availability() {
        let mut reg = registry(4);
        let a = connect(&mut reg);
        let b = connect(&mut reg);

        reg.set_state(a.id, ClientState::Inviting).unwrap();
        reg.set_state(b.id, ClientState::Invited).unwrap();

        assert!(reg.is_available(a.id));
        assert!(reg.is_available(b.id));
    }

    #[test]
    fn test_set_state_unknown_returns_not_found() {
        let mut reg = registry(4);
        let result = reg.mark_playing(cid(3));
        assert!(matches!(result, Err(SessionError::NotFound(id)) if id == cid(3)));
    }

    #[test]
    fn test_is_available_id_zero_is_never_valid() {
        let mut reg = registry(4);
        connect(&mut reg);
        assert!(!reg.is_available(cid(0)));
        assert!(reg.get(cid(0)).is_none());
    }

    // =====================================================================
    // apply_score()
    // =====================================================================

    #[test]
    fn test_apply_score_accumulates() {
        let mut reg = registry(4);
        let key = connect(&mut reg);

        reg.apply_score(key.id, 1).unwrap();
        let score = reg.apply_score(key.id, 2).unwrap();

        assert_eq!(score, 3);
        assert_eq!(reg.get(key.id).unwrap().score, 3);
    }

    #[test]
    fn test_apply_score_saturates() {
        let mut reg = registry(4);
        let key = connect(&mut reg);
        reg.apply_score(key.id, i32::MAX).unwrap();

        assert_eq!(reg.apply_score(key.id, 1).unwrap(), i32::MAX);
    }

    // =====================================================================
    // snapshot()
    // =====================================================================

    #[test]
    fn test_snapshot_lists_exactly_live_clients_with_availability() {
        let mut reg = registry(8);
        let a = connect(&mut reg);
        let b = connect(&mut reg);
        let c = connect(&mut reg);
        reg.unregister(b).unwrap();
        reg.mark_playing(c.id).unwrap();
        reg.apply_score(a.id, 5).unwrap();

        let roster = reg.snapshot(a.id);

        assert_eq!(roster.requester, a.id);
        let rows: Vec<(u32, i32, bool)> = roster
            .entries
            .iter()
            .map(|e| (e.id.0, e.score, e.available))
            .collect();
        assert_eq!(rows, vec![(1, 5, true), (3, 0, false)]);
        assert_eq!(roster.entries[0].address, reg.get(a.id).unwrap().address);
    }

    #[test]
    fn test_snapshot_empty_registry() {
        let reg = registry(4);
        let roster = reg.snapshot(cid(1));
        assert!(roster.entries.is_empty());
    }
}
