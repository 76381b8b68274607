//! Lobby configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the lobby actor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LobbyConfig {
    /// Capacity of the actor's command channel. When it fills up,
    /// connection handlers wait (bounded channel backpressure).
    pub channel_size: usize,

    /// Seed for the first-player coin flip. `None` seeds from the OS;
    /// tests set it to get a reproducible sequence.
    pub seed: Option<u64>,
}

impl Default for LobbyConfig {
    fn default() -> Self {
        Self {
            channel_size: 256,
            seed: None,
        }
    }
}
