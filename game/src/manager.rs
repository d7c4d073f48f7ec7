use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use serde::Serialize;
use tower_defense_core::GameConfig;

use crate::{error::ManagerError, Game, GameId};

/// Registry of independently ticking games sharing one configuration.
///
/// The registry lock only guards the id map; game commands always run after
/// it has been released.
#[derive(Debug)]
pub struct GameManager {
    config: Arc<GameConfig>,
    games: RwLock<HashMap<GameId, Arc<Game>>>,
}

/// Progress summary of one registered game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    /// Game identifier.
    pub id: GameId,
    /// Current wave.
    pub wave: u32,
    /// Remaining lives.
    pub lives: i32,
    /// Accumulated score.
    pub score: u32,
    /// Whether the game has ended.
    pub game_over: bool,
}

/// Aggregate view over every registered game.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManagerStats {
    /// Number of registered games.
    pub total_games: usize,
    /// Per-game summaries ordered by id.
    #[serde(rename = "perGame")]
    pub games: Vec<GameSummary>,
}

impl GameManager {
    /// Creates an empty registry.
    #[must_use]
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self {
            config,
            games: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a new stopped game under a fresh identifier.
    pub fn create(&self) -> Arc<Game> {
        let id = GameId::generate();
        let game = Arc::new(Game::new(id.clone(), Arc::clone(&self.config)));
        let mut games = self.write();
        let _ = games.insert(id.clone(), Arc::clone(&game));
        tracing::info!(game = %id, total_games = games.len(), "game created");
        game
    }

    /// Looks up a game by id.
    pub fn get(&self, id: &GameId) -> Result<Arc<Game>, ManagerError> {
        self.read()
            .get(id)
            .cloned()
            .ok_or_else(|| ManagerError::NotFound(id.clone()))
    }

    /// Returns the well-known default game, creating it on first access.
    pub fn get_or_create_default(&self) -> Arc<Game> {
        let id = GameId::default_game();
        if let Some(game) = self.read().get(&id) {
            return Arc::clone(game);
        }

        let mut games = self.write();
        if let Some(game) = games.get(&id) {
            return Arc::clone(game);
        }
        let game = Arc::new(Game::new(id.clone(), Arc::clone(&self.config)));
        let _ = games.insert(id.clone(), Arc::clone(&game));
        tracing::info!(game = %id, "default game created");
        game
    }

    /// Stops a game and removes it from the registry.
    pub fn remove(&self, id: &GameId) -> Result<(), ManagerError> {
        let mut games = self.write();
        let game = games
            .get(id)
            .ok_or_else(|| ManagerError::NotFound(id.clone()))?;
        game.stop();
        let _ = games.remove(id);
        tracing::info!(game = %id, remaining_games = games.len(), "game removed");
        Ok(())
    }

    /// Identifiers of every registered game, sorted.
    #[must_use]
    pub fn list(&self) -> Vec<GameId> {
        let mut ids: Vec<GameId> = self.read().keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of registered games.
    #[must_use]
    pub fn game_count(&self) -> usize {
        self.read().len()
    }

    /// Confirms that a game with the id is registered.
    pub fn validate_game_id(&self, id: &GameId) -> Result<(), ManagerError> {
        if self.read().contains_key(id) {
            Ok(())
        } else {
            Err(ManagerError::NotFound(id.clone()))
        }
    }

    /// Summarizes every registered game.
    #[must_use]
    pub fn stats(&self) -> ManagerStats {
        let mut games: Vec<Arc<Game>> = self.read().values().cloned().collect();
        games.sort_by(|a, b| a.id().cmp(b.id()));

        let summaries = games
            .iter()
            .map(|game| {
                let state = game.state();
                GameSummary {
                    id: game.id().clone(),
                    wave: state.wave,
                    lives: state.lives,
                    score: state.score,
                    game_over: state.game_over,
                }
            })
            .collect::<Vec<_>>();
        ManagerStats {
            total_games: summaries.len(),
            games: summaries,
        }
    }

    /// Stops every game and empties the registry.
    pub fn shutdown(&self) {
        let mut games = self.write();
        tracing::info!(game_count = games.len(), "manager shutdown");
        for game in games.values() {
            game.stop();
        }
        games.clear();
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<GameId, Arc<Game>>> {
        self.games.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<GameId, Arc<Game>>> {
        self.games.write().unwrap_or_else(PoisonError::into_inner)
    }
}
