use std::{
    collections::HashSet,
    fmt,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Instant,
};

use tokio::{
    sync::oneshot,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tower_defense_core::{
    EntityId, Event, GameConfig, GameSnapshot, GameState, Position, Tick,
};
use tower_defense_system_builder::Builder;
use tower_defense_world::{query, Enemy, EntityFactory, Projectile, Tower, World};

use crate::{
    error::{CommandError, DecodeError},
    pipeline::Pipeline,
    repository::{SaveId, SaveRepository},
    GameId, TickStats, MAX_TICK_STEP,
};

type TickObserver = Box<dyn Fn(TickStats) + Send>;

/// Mutable state of a game, guarded as a whole by one lock.
struct Session {
    id: GameId,
    world: World,
    state: GameState,
    pipeline: Pipeline,
    events: Vec<Event>,
    last_tick: Instant,
    on_tick: Option<TickObserver>,
}

impl Session {
    fn tick(&mut self, now: Instant) -> Option<TickStats> {
        if self.state.game_over {
            return None;
        }

        let dt = now
            .saturating_duration_since(self.last_tick)
            .min(MAX_TICK_STEP);
        self.last_tick = now;
        self.state.wave = self.pipeline.current_wave();

        self.events.clear();
        self.pipeline
            .run(&mut self.world, Tick::new(now, dt), &mut self.events);
        for event in &self.events {
            self.state.apply(event);
        }
        if self.state.game_over {
            tracing::info!(
                game = %self.id,
                wave = self.state.wave,
                score = self.state.score,
                "game over"
            );
        }

        let counts = query::counts(&self.world);
        let stats = TickStats {
            enemies: counts.enemies,
            towers: counts.towers,
            projectiles: counts.projectiles,
            dt,
        };
        if let Some(observer) = &self.on_tick {
            observer(stats);
        }
        Some(stats)
    }
}

/// Handle to a running tick loop.
struct Scheduler {
    stop: oneshot::Sender<()>,
    _task: JoinHandle<()>,
}

/// Entities decoded from a snapshot, validated and ready to replace a world.
struct Restored {
    towers: Vec<Tower>,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
}

/// One independently ticking tower defense game.
pub struct Game {
    id: GameId,
    config: Arc<GameConfig>,
    factory: EntityFactory,
    builder: Builder,
    session: Arc<Mutex<Session>>,
    scheduler: Mutex<Option<Scheduler>>,
}

impl Game {
    /// Creates a stopped game with the starting economy of `config`.
    #[must_use]
    pub fn new(id: GameId, config: Arc<GameConfig>) -> Self {
        Self::new_at(id, config, Instant::now())
    }

    /// Creates a stopped game whose clock starts at `now`.
    ///
    /// The first wave becomes due one wave interval after `now`.
    #[must_use]
    pub fn new_at(id: GameId, config: Arc<GameConfig>, now: Instant) -> Self {
        let session = Session {
            id: id.clone(),
            world: World::new(),
            state: GameState::starting(config.game.starting_gold, config.game.starting_lives),
            pipeline: Pipeline::new(Arc::clone(&config), now),
            events: Vec::new(),
            last_tick: now,
            on_tick: None,
        };
        Self {
            id,
            factory: EntityFactory::new(Arc::clone(&config)),
            builder: Builder::from_game_config(&config),
            config,
            session: Arc::new(Mutex::new(session)),
            scheduler: Mutex::new(None),
        }
    }

    /// Identifier of the game.
    #[must_use]
    pub fn id(&self) -> &GameId {
        &self.id
    }

    /// Configuration the game was built from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Starts the periodic tick loop on the ambient Tokio runtime.
    ///
    /// Starting a running game does nothing.
    pub fn start(&self) -> Result<(), CommandError> {
        let mut scheduler = lock(&self.scheduler);
        if scheduler.is_some() {
            return Ok(());
        }

        let runtime =
            tokio::runtime::Handle::try_current().map_err(|_| CommandError::RuntimeUnavailable)?;
        lock(&self.session).last_tick = Instant::now();

        let (stop, mut stopped) = oneshot::channel();
        let session = Arc::clone(&self.session);
        let period = self.config.tick_interval();
        let id = self.id.clone();
        let task = runtime.spawn(async move {
            let mut interval = time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stopped => break,
                    _ = interval.tick() => run_tick(&session),
                }
            }
            tracing::debug!(game = %id, "tick loop exited");
        });

        *scheduler = Some(Scheduler { stop, _task: task });
        tracing::info!(
            game = %self.id,
            tick_ms = self.config.game.tick_rate_ms,
            "game started"
        );
        Ok(())
    }

    /// Halts the tick loop. State is kept as it is; stopping a stopped game
    /// does nothing.
    pub fn stop(&self) {
        let Some(scheduler) = lock(&self.scheduler).take() else {
            return;
        };
        let _ = scheduler.stop.send(());
        tracing::info!(game = %self.id, "game stopped");
    }

    /// Reports whether the tick loop is active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.scheduler).is_some()
    }

    /// Runs one pipeline pass observed at `now`.
    ///
    /// Returns `None` once the game is over.
    pub fn step(&self, now: Instant) -> Option<TickStats> {
        lock(&self.session).tick(now)
    }

    /// Runs one pipeline pass observed at the current instant.
    pub fn tick(&self) -> Option<TickStats> {
        self.step(Instant::now())
    }

    /// Registers the observer that receives [`TickStats`] after every tick.
    ///
    /// The observer runs while the game lock is held and must not call back
    /// into this game.
    pub fn set_on_tick(&self, observer: impl Fn(TickStats) + Send + 'static) {
        lock(&self.session).on_tick = Some(Box::new(observer));
    }

    /// Places a tower of archetype `kind` at `position` and charges its cost.
    pub fn add_tower(&self, kind: &str, position: Position) -> Result<EntityId, CommandError> {
        let mut session = lock(&self.session);

        let cost = self
            .config
            .tower(kind)
            .map_err(|_| CommandError::UnknownArchetype(kind.to_owned()))?
            .cost;
        if session.state.gold < cost {
            return Err(CommandError::InsufficientFunds {
                cost,
                gold: session.state.gold,
            });
        }
        self.builder.validate(&session.world, position)?;

        let tower = self
            .factory
            .create_tower(kind, position)
            .map_err(|_| CommandError::UnknownArchetype(kind.to_owned()))?;
        let id = tower.id();
        session.world.add(tower);
        session.state.gold -= cost;

        tracing::info!(
            game = %self.id,
            tower = %id,
            kind,
            x = position.x,
            y = position.y,
            gold = session.state.gold,
            "tower placed"
        );
        Ok(id)
    }

    /// Clears every entity and restores the starting economy.
    pub fn reset(&self) {
        let now = Instant::now();
        let mut session = lock(&self.session);
        session.world.clear();
        session.state = GameState::starting(
            self.config.game.starting_gold,
            self.config.game.starting_lives,
        );
        session.pipeline.reset(now);
        session.last_tick = now;
        tracing::info!(game = %self.id, "game reset");
    }

    /// Scalar economy state.
    #[must_use]
    pub fn state(&self) -> GameState {
        lock(&self.session).state
    }

    /// Captures every entity and the scalar state in transfer form.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        let session = lock(&self.session);
        let state = session.state;
        GameSnapshot {
            towers: query::tower_view(&session.world),
            enemies: query::enemy_view(&session.world),
            projectiles: query::projectile_view(&session.world),
            wave: state.wave,
            gold: state.gold,
            lives: state.lives,
            score: state.score,
            game_over: state.game_over,
            path: self.config.map.path.clone(),
            map_width: self.config.map.width,
            map_height: self.config.map.height,
        }
    }

    /// Serializes the current snapshot.
    pub fn save_state(&self) -> Result<Vec<u8>, CommandError> {
        serde_json::to_vec(&self.snapshot()).map_err(CommandError::Encode)
    }

    /// Replaces the world and economy with a serialized snapshot.
    ///
    /// The payload is fully decoded and validated before anything is
    /// touched; on error the game keeps its previous state. Entity ids are
    /// preserved and the wave machine restarts idle at the loaded wave.
    pub fn load_state(&self, data: &[u8]) -> Result<(), CommandError> {
        let snapshot: GameSnapshot = serde_json::from_slice(data).map_err(DecodeError::from)?;
        let now = Instant::now();
        let restored = self.restore(&snapshot, now)?;

        let mut session = lock(&self.session);
        session.world.clear();
        for tower in restored.towers {
            session.world.add(tower);
        }
        for enemy in restored.enemies {
            session.world.add(enemy);
        }
        for projectile in restored.projectiles {
            session.world.add(projectile);
        }
        session.state = snapshot.state();
        session.pipeline.resume_at_wave(snapshot.wave, now);

        tracing::info!(
            game = %self.id,
            wave = snapshot.wave,
            gold = snapshot.gold,
            entities = snapshot.entity_count(),
            "game loaded"
        );
        Ok(())
    }

    /// Stores the current state in `repository`.
    pub fn save_to(&self, repository: &dyn SaveRepository) -> Result<SaveId, CommandError> {
        let data = self.save_state()?;
        let id = repository.save(&self.id, &data)?;
        tracing::info!(game = %self.id, save = %id, bytes = data.len(), "game saved");
        Ok(id)
    }

    /// Restores the save `save_id` from `repository`.
    pub fn load_from(
        &self,
        repository: &dyn SaveRepository,
        save_id: SaveId,
    ) -> Result<(), CommandError> {
        let save = repository.load(save_id)?;
        self.load_state(&save.data)
    }

    /// Restores the most recent save of this game from `repository`.
    pub fn load_latest_from(&self, repository: &dyn SaveRepository) -> Result<(), CommandError> {
        let save = repository.load_latest(&self.id)?;
        self.load_state(&save.data)
    }

    fn restore(&self, snapshot: &GameSnapshot, now: Instant) -> Result<Restored, DecodeError> {
        let mut seen = HashSet::with_capacity(snapshot.entity_count());
        let ids = snapshot
            .towers
            .iter()
            .map(|tower| tower.id)
            .chain(snapshot.enemies.iter().map(|enemy| enemy.id))
            .chain(snapshot.projectiles.iter().map(|projectile| projectile.id));
        for id in ids {
            if !seen.insert(id) {
                return Err(DecodeError::DuplicateId(id));
            }
        }

        let towers = snapshot
            .towers
            .iter()
            .map(|tower| self.factory.restore_tower(tower, now))
            .collect();

        let last = self.config.map.path.len().saturating_sub(1);
        let mut enemies = Vec::with_capacity(snapshot.enemies.len());
        for enemy in &snapshot.enemies {
            if enemy.path_index > last {
                return Err(DecodeError::PathIndexOutOfRange {
                    id: enemy.id,
                    path_index: enemy.path_index,
                    last,
                });
            }
            if enemy.hp > enemy.max_hp {
                return Err(DecodeError::HpAboveMaximum {
                    id: enemy.id,
                    hp: enemy.hp,
                    max_hp: enemy.max_hp,
                });
            }
            enemies.push(self.factory.restore_enemy(enemy)?);
        }

        let projectiles = snapshot
            .projectiles
            .iter()
            .map(|projectile| self.factory.restore_projectile(projectile))
            .collect();

        Ok(Restored {
            towers,
            enemies,
            projectiles,
        })
    }
}

impl fmt::Debug for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Game")
            .field("id", &self.id)
            .field("running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl Drop for Game {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_tick(session: &Mutex<Session>) {
    let _ = lock(session).tick(Instant::now());
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
