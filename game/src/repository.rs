//! Persistence port for serialized game states.

use std::{
    collections::HashMap,
    fmt,
    str::FromStr,
    sync::{PoisonError, RwLock},
    time::SystemTime,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::GameId;

/// Identifier of a stored save.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(Uuid);

impl SaveId {
    /// Allocates a fresh save identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SaveId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// A serialized game state together with its bookkeeping.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GameSave {
    /// Identifier of this save.
    pub id: SaveId,
    /// Game the state was taken from.
    pub game_id: GameId,
    /// Serialized snapshot.
    pub data: Vec<u8>,
    /// Wall-clock time the save was stored.
    pub created_at: SystemTime,
}

/// Errors reported by save repositories.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RepositoryError {
    /// No save matches the request.
    #[error("save not found")]
    SaveNotFound,
    /// The repository lock was poisoned by a panicking writer.
    #[error("save repository lock poisoned")]
    LockPoisoned,
}

impl<T> From<PoisonError<T>> for RepositoryError {
    fn from(_: PoisonError<T>) -> Self {
        Self::LockPoisoned
    }
}

/// Storage for serialized game states.
pub trait SaveRepository: Send + Sync {
    /// Stores `data` for `game_id` and returns the new save id.
    fn save(&self, game_id: &GameId, data: &[u8]) -> Result<SaveId, RepositoryError>;

    /// Retrieves one save by id.
    fn load(&self, save_id: SaveId) -> Result<GameSave, RepositoryError>;

    /// Retrieves the most recent save of a game.
    fn load_latest(&self, game_id: &GameId) -> Result<GameSave, RepositoryError>;

    /// Lists every save of a game, oldest first.
    fn list(&self, game_id: &GameId) -> Result<Vec<GameSave>, RepositoryError>;

    /// Deletes one save.
    fn delete(&self, save_id: SaveId) -> Result<(), RepositoryError>;

    /// Deletes every save of a game. Unknown games are ignored.
    fn delete_all(&self, game_id: &GameId) -> Result<(), RepositoryError>;
}

#[derive(Debug, Default)]
struct Store {
    saves: HashMap<SaveId, GameSave>,
    by_game: HashMap<GameId, Vec<SaveId>>,
}

/// Process-local [`SaveRepository`] that keeps saves in memory.
#[derive(Debug, Default)]
pub struct InMemorySaveRepository {
    store: RwLock<Store>,
}

/// Aggregate size of an [`InMemorySaveRepository`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RepositoryStats {
    /// Stored saves.
    pub saves: usize,
    /// Games with at least one recorded save.
    pub games: usize,
    /// Total payload bytes.
    pub bytes: usize,
}

impl InMemorySaveRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reports how much the repository holds.
    pub fn stats(&self) -> Result<RepositoryStats, RepositoryError> {
        let store = self.store.read()?;
        Ok(RepositoryStats {
            saves: store.saves.len(),
            games: store.by_game.len(),
            bytes: store.saves.values().map(|save| save.data.len()).sum(),
        })
    }
}

impl SaveRepository for InMemorySaveRepository {
    fn save(&self, game_id: &GameId, data: &[u8]) -> Result<SaveId, RepositoryError> {
        let mut store = self.store.write()?;
        let id = SaveId::generate();
        let save = GameSave {
            id,
            game_id: game_id.clone(),
            data: data.to_vec(),
            created_at: SystemTime::now(),
        };
        let _ = store.saves.insert(id, save);
        store.by_game.entry(game_id.clone()).or_default().push(id);
        Ok(id)
    }

    fn load(&self, save_id: SaveId) -> Result<GameSave, RepositoryError> {
        let store = self.store.read()?;
        store
            .saves
            .get(&save_id)
            .cloned()
            .ok_or(RepositoryError::SaveNotFound)
    }

    fn load_latest(&self, game_id: &GameId) -> Result<GameSave, RepositoryError> {
        let store = self.store.read()?;
        store
            .by_game
            .get(game_id)
            .and_then(|ids| ids.last())
            .and_then(|id| store.saves.get(id))
            .cloned()
            .ok_or(RepositoryError::SaveNotFound)
    }

    fn list(&self, game_id: &GameId) -> Result<Vec<GameSave>, RepositoryError> {
        let store = self.store.read()?;
        let saves = store
            .by_game
            .get(game_id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| store.saves.get(id))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(saves)
    }

    fn delete(&self, save_id: SaveId) -> Result<(), RepositoryError> {
        let mut store = self.store.write()?;
        let save = store
            .saves
            .remove(&save_id)
            .ok_or(RepositoryError::SaveNotFound)?;
        if let Some(ids) = store.by_game.get_mut(&save.game_id) {
            ids.retain(|id| *id != save_id);
        }
        Ok(())
    }

    fn delete_all(&self, game_id: &GameId) -> Result<(), RepositoryError> {
        let mut store = self.store.write()?;
        let ids = store.by_game.remove(game_id).unwrap_or_default();
        for id in ids {
            let _ = store.saves.remove(&id);
        }
        Ok(())
    }
}

/// Scalar progress recorded in a save, readable without restoring it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveMetadata {
    /// Wave number.
    #[serde(default)]
    pub wave: u32,
    /// Gold.
    #[serde(default)]
    pub gold: u32,
    /// Remaining lives.
    #[serde(default)]
    pub lives: i32,
    /// Score.
    #[serde(default)]
    pub score: u32,
    /// Whether the game had ended.
    #[serde(default)]
    pub game_over: bool,
}

/// Reads the scalar fields of a serialized snapshot.
pub fn extract_metadata(data: &[u8]) -> Result<SaveMetadata, serde_json::Error> {
    serde_json::from_slice(data)
}
