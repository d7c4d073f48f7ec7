#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the tower defense engine.
//!
//! This crate defines the vocabulary that connects the entity store, the
//! per-tick systems, and the game orchestration layer. Systems mutate the
//! world for a single [`Tick`] and report what happened through [`Event`]
//! values; the owning game instance folds those events into its
//! [`GameState`]. Static balance data lives in [`GameConfig`] and the
//! serializable transfer form of a running game lives in [`GameSnapshot`].

use std::{
    fmt,
    str::FromStr,
    time::{Duration, Instant},
};

use glam::DVec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

pub mod config;
pub mod snapshot;

pub use config::{
    ConfigError, EnemyArchetype, GameConfig, GameSettings, MapConfig, PlacementConfig,
    ProjectileArchetype, TowerArchetype, WaveComposition, WaveConfig,
};
pub use snapshot::{EnemySnapshot, GameSnapshot, ProjectileSnapshot, TowerSnapshot};

/// Number of simulation frames per second that entity speeds are expressed in.
///
/// Speeds are configured in path units per 1/60 s frame and scaled by real
/// elapsed seconds, so a travel distance is `speed * dt * FRAMES_PER_SECOND`.
pub const FRAMES_PER_SECOND: f64 = 60.0;

/// Two-dimensional point measured in map units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

impl Position {
    /// Creates a new position from its coordinates.
    #[must_use]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Straight-line distance between two positions.
    #[must_use]
    pub fn distance(self, other: Position) -> f64 {
        DVec2::from(self).distance(DVec2::from(other))
    }

    /// Moves from `self` toward `target` by at most `step` units.
    ///
    /// The result never overshoots `target`.
    #[must_use]
    pub fn step_toward(self, target: Position, step: f64) -> Position {
        let from = DVec2::from(self);
        let to = DVec2::from(target);
        let offset = to - from;
        let distance = offset.length();
        if distance <= step || distance == 0.0 {
            return target;
        }
        Position::from(from + offset * (step / distance))
    }

    /// Distance from `self` to the nearest point on the segment `start..end`.
    #[must_use]
    pub fn distance_to_segment(self, start: Position, end: Position) -> f64 {
        let point = DVec2::from(self);
        let a = DVec2::from(start);
        let b = DVec2::from(end);
        let segment = b - a;
        let length_sq = segment.length_squared();
        if length_sq == 0.0 {
            return point.distance(a);
        }

        let t = ((point - a).dot(segment) / length_sq).clamp(0.0, 1.0);
        point.distance(a + segment * t)
    }
}

impl From<Position> for DVec2 {
    fn from(position: Position) -> Self {
        DVec2::new(position.x, position.y)
    }
}

impl From<DVec2> for Position {
    fn from(vector: DVec2) -> Self {
        Position::new(vector.x, vector.y)
    }
}

/// Unique identifier assigned to every entity.
///
/// Identifiers survive a save/load round trip unchanged, so they are stored
/// as UUIDs rather than dense counters that would need re-allocation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(Uuid);

impl EntityId {
    /// Allocates a fresh random identifier.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wraps an existing UUID.
    #[must_use]
    pub const fn from_uuid(value: Uuid) -> Self {
        Self(value)
    }

    /// Retrieves the underlying UUID.
    #[must_use]
    pub const fn get(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EntityId {
    type Err = uuid::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(value).map(Self)
    }
}

/// Discriminates the three entity families stored in a world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Stationary defensive structure.
    Tower,
    /// Hostile unit walking the path.
    Enemy,
    /// Shot travelling from a tower to an enemy.
    Projectile,
}

impl EntityKind {
    /// Lowercase label used in logs and errors.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tower => "tower",
            Self::Enemy => "enemy",
            Self::Projectile => "projectile",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Enemy archetypes that wave compositions are expressed in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnemyKind {
    /// Baseline enemy.
    Basic,
    /// Quick, fragile enemy.
    Fast,
    /// Slow, durable enemy.
    Tank,
    /// Rare, very durable enemy.
    Boss,
}

impl EnemyKind {
    /// Every enemy kind in the fixed batch and tie-break order.
    pub const ALL: [EnemyKind; 4] = [Self::Basic, Self::Fast, Self::Tank, Self::Boss];

    /// Archetype name used by the configuration tables.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Fast => "fast",
            Self::Tank => "tank",
            Self::Boss => "boss",
        }
    }
}

impl fmt::Display for EnemyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wave-number bucket selecting which composition table applies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveTier {
    /// Waves 1 through 5.
    Early,
    /// Waves 6 through 9.
    Mid,
    /// Waves 11 and later that are not boss waves.
    Late,
    /// Every tenth wave.
    Boss,
}

impl WaveTier {
    /// Resolves the tier for a one-based wave number.
    #[must_use]
    pub const fn for_wave(wave: u32) -> Self {
        if wave % 10 == 0 {
            Self::Boss
        } else if wave <= 5 {
            Self::Early
        } else if wave <= 10 {
            Self::Mid
        } else {
            Self::Late
        }
    }
}

/// Timing information shared by every stage within one pipeline pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Tick {
    now: Instant,
    dt: Duration,
}

impl Tick {
    /// Creates a tick observed at `now` that advances the simulation by `dt`.
    #[must_use]
    pub const fn new(now: Instant, dt: Duration) -> Self {
        Self { now, dt }
    }

    /// Instant at which the tick was taken.
    #[must_use]
    pub const fn now(&self) -> Instant {
        self.now
    }

    /// Simulated time advanced by the tick.
    #[must_use]
    pub const fn dt(&self) -> Duration {
        self.dt
    }

    /// Distance covered during this tick by something moving at `speed`
    /// path units per frame.
    #[must_use]
    pub fn travel(&self, speed: f64) -> f64 {
        speed * self.dt.as_secs_f64() * FRAMES_PER_SECOND
    }
}

/// Target assignment computed for a tower that is ready to fire.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TowerTarget {
    /// Tower that should fire.
    pub tower: EntityId,
    /// Enemy selected as the target.
    pub enemy: EntityId,
    /// Distance between the tower and the enemy when selected.
    pub distance: f64,
}

/// Notifications emitted by systems while processing a tick.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new wave was constructed and began releasing enemies.
    WaveStarted {
        /// One-based number of the wave.
        wave: u32,
        /// Total enemies in the wave batch.
        enemies: usize,
    },
    /// An enemy was admitted into the world.
    EnemySpawned {
        /// Identifier of the admitted enemy.
        enemy: EntityId,
        /// Archetype of the admitted enemy.
        kind: EnemyKind,
    },
    /// A tower launched a projectile.
    ProjectileFired {
        /// Tower that fired.
        tower: EntityId,
        /// Projectile that was created.
        projectile: EntityId,
        /// Enemy the projectile is aimed at.
        target: EntityId,
    },
    /// A projectile reached its target.
    ProjectileHit {
        /// Projectile that struck.
        projectile: EntityId,
        /// Primary target.
        target: EntityId,
        /// Direct damage applied to the primary target.
        damage: u32,
        /// Number of other enemies hit by splash damage.
        splashed: usize,
    },
    /// An enemy was defeated and its bounty was paid out.
    RewardGranted {
        /// Enemy that was defeated.
        enemy: EntityId,
        /// Gold awarded.
        gold: u32,
        /// Score awarded.
        score: u32,
    },
    /// An enemy reached the end of the path.
    LifeLost {
        /// Enemy that escaped.
        enemy: EntityId,
        /// Lives deducted.
        amount: u32,
    },
    /// Dead entities were purged from the world.
    EntitiesRemoved {
        /// Number of entities removed.
        count: usize,
    },
}

/// Scalar economy and progress state of a game.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Current wave number, zero before the first wave.
    pub wave: u32,
    /// Gold available for tower placement.
    pub gold: u32,
    /// Remaining lives; may drop below zero within the tick that ends the game.
    pub lives: i32,
    /// Accumulated score.
    pub score: u32,
    /// Latched once lives reach zero.
    pub game_over: bool,
}

impl GameState {
    /// Creates the state a fresh game starts with.
    #[must_use]
    pub const fn starting(gold: u32, lives: i32) -> Self {
        Self {
            wave: 0,
            gold,
            lives,
            score: 0,
            game_over: false,
        }
    }

    /// Folds a single system event into the economy.
    ///
    /// Only reward and life-loss events carry economic meaning; everything
    /// else is ignored.
    pub fn apply(&mut self, event: &Event) {
        match *event {
            Event::RewardGranted { gold, score, .. } => {
                self.gold = self.gold.saturating_add(gold);
                self.score = self.score.saturating_add(score);
            }
            Event::LifeLost { amount, .. } => {
                let amount = i32::try_from(amount).unwrap_or(i32::MAX);
                self.lives = self.lives.saturating_sub(amount);
                if self.lives <= 0 {
                    self.game_over = true;
                }
            }
            _ => {}
        }
    }
}

/// Reasons a tower placement request may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error, Serialize, Deserialize)]
pub enum PlacementError {
    /// The requested point has a coordinate that is NaN or infinite.
    #[error("position ({x}, {y}) is not a finite point")]
    NonFinitePosition {
        /// Requested x coordinate.
        x: f64,
        /// Requested y coordinate.
        y: f64,
    },
    /// The requested point lies too close to a path segment.
    #[error("position is {distance:.1} units from the path, minimum is {minimum:.1}")]
    TooCloseToPath {
        /// Distance from the nearest path segment.
        distance: f64,
        /// Configured minimum distance.
        minimum: f64,
    },
    /// The requested point lies too close to an existing tower.
    #[error("position is {distance:.1} units from another tower, minimum is {minimum:.1}")]
    TooCloseToTower {
        /// Distance from the nearest tower.
        distance: f64,
        /// Configured minimum spacing.
        minimum: f64,
    },
    /// The tower cap has been reached.
    #[error("tower limit of {maximum} reached")]
    TowerLimitReached {
        /// Configured maximum tower count.
        maximum: usize,
    },
}
