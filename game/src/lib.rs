#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Game orchestration for the tower defense engine.
//!
//! A [`Game`] owns one world, its economy, and the fixed system [`Pipeline`],
//! all behind a single lock. Commands and scheduler ticks serialize on that
//! lock. The [`GameManager`] is a registry of independent games, and
//! [`SaveRepository`] is the persistence port for serialized snapshots.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

mod error;
mod game;
mod manager;
mod pipeline;
pub mod repository;

pub use error::{CommandError, DecodeError, ManagerError};
pub use game::Game;
pub use manager::{GameManager, GameSummary, ManagerStats};
pub use pipeline::Pipeline;
pub use repository::{
    extract_metadata, GameSave, InMemorySaveRepository, RepositoryError, SaveId, SaveMetadata,
    SaveRepository,
};

/// Upper bound on the simulated time a single tick may advance.
pub const MAX_TICK_STEP: Duration = Duration::from_millis(50);

/// Identifier of the well-known game returned by
/// [`GameManager::get_or_create_default`].
pub const DEFAULT_GAME_ID: &str = "default";

/// Identifier of a game instance.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Allocates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Identifier of the default game.
    #[must_use]
    pub fn default_game() -> Self {
        Self(DEFAULT_GAME_ID.to_owned())
    }

    /// Borrows the identifier text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Aggregate counts reported after every tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    /// Alive enemies.
    pub enemies: usize,
    /// Placed towers.
    pub towers: usize,
    /// Projectiles in flight.
    pub projectiles: usize,
    /// Simulated time the tick advanced, after clamping.
    pub dt: Duration,
}
