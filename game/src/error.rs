use thiserror::Error;
use tower_defense_core::{ConfigError, EntityId, PlacementError};

use crate::{repository::RepositoryError, GameId};

/// Errors returned by game instance commands.
///
/// A failed command never leaves the instance partially mutated.
#[derive(Debug, Error)]
pub enum CommandError {
    /// No tower archetype with the requested name is configured.
    #[error("unknown tower archetype `{0}`")]
    UnknownArchetype(String),
    /// The tower costs more gold than is available.
    #[error("not enough gold: tower costs {cost}, {gold} available")]
    InsufficientFunds {
        /// Cost of the requested tower.
        cost: u32,
        /// Gold available when the request was made.
        gold: u32,
    },
    /// The requested position violates a placement rule.
    #[error("invalid tower placement: {0}")]
    InvalidPlacement(#[from] PlacementError),
    /// A saved state could not be decoded or failed validation.
    #[error("failed to decode game state: {0}")]
    Decode(#[from] DecodeError),
    /// The current state could not be serialized.
    #[error("failed to encode game state")]
    Encode(#[source] serde_json::Error),
    /// The save repository rejected the request.
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    /// The tick scheduler needs a Tokio runtime and none is running.
    #[error("no tokio runtime available to drive the tick scheduler")]
    RuntimeUnavailable,
}

/// Reasons a saved state is rejected before it replaces a running game.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not a well-formed snapshot.
    #[error("malformed snapshot")]
    Json(#[from] serde_json::Error),
    /// Two entities share one identifier.
    #[error("duplicate entity id {0}")]
    DuplicateId(EntityId),
    /// An enemy records more hit points than its maximum.
    #[error("enemy {id} has {hp} hp, above its maximum of {max_hp}")]
    HpAboveMaximum {
        /// Offending enemy.
        id: EntityId,
        /// Recorded hit points.
        hp: u32,
        /// Recorded maximum hit points.
        max_hp: u32,
    },
    /// An enemy records a waypoint index beyond the end of the path.
    #[error("enemy {id} is at waypoint {path_index}, past the last waypoint {last}")]
    PathIndexOutOfRange {
        /// Offending enemy.
        id: EntityId,
        /// Recorded waypoint index.
        path_index: usize,
        /// Index of the final waypoint.
        last: usize,
    },
    /// An entity refers to an archetype the configuration does not know.
    #[error(transparent)]
    Archetype(#[from] ConfigError),
}

/// Errors returned by the game manager.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ManagerError {
    /// No game is registered under the identifier.
    #[error("game not found: {0}")]
    NotFound(GameId),
}
