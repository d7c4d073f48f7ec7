//! Static game-balance configuration.
//!
//! A [`GameConfig`] is parsed once from TOML, validated, and then shared
//! read-only (usually behind an `Arc`) by every component that needs balance
//! data. Nothing in the simulation mutates it.

use std::{collections::BTreeMap, fs, path::Path, path::PathBuf, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{EnemyKind, EntityKind, Position, WaveTier};

/// Balance table compiled into the binary.
const DEFAULT_BALANCE: &str = include_str!("../balance.toml");

/// Projectile archetype every tower falls back to.
pub const BASIC_PROJECTILE: &str = "basic";

/// Spawn point used when a map carries no path.
const FALLBACK_START: Position = Position::new(0.0, 250.0);

/// Errors raised while loading or querying configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The requested archetype name is not present in the tables.
    #[error("unknown {kind} archetype `{name}`")]
    UnknownArchetype {
        /// Entity family that was looked up.
        kind: EntityKind,
        /// Name that failed to resolve.
        name: String,
    },
    /// A wave composition resolved to zero enemies.
    #[error("wave {wave} resolved to an empty enemy batch")]
    EmptyWave {
        /// Wave that produced no enemies.
        wave: u32,
    },
    /// The configuration parsed but violates a structural rule.
    #[error("invalid configuration: {0}")]
    Invalid(String),
    /// The TOML document could not be parsed.
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),
    /// The configuration file could not be read.
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        /// File that was being read.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Complete balance configuration for a game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Economy and scheduling settings.
    pub game: GameSettings,
    /// Tower archetypes keyed by name.
    pub towers: BTreeMap<String, TowerArchetype>,
    /// Enemy archetypes keyed by [`EnemyKind`] name.
    pub enemies: BTreeMap<String, EnemyArchetype>,
    /// Projectile archetypes keyed by name.
    pub projectiles: BTreeMap<String, ProjectileArchetype>,
    /// Wave sizing and composition tables.
    pub waves: WaveConfig,
    /// Map dimensions and the enemy path.
    pub map: MapConfig,
    /// Tower placement constraints.
    pub placement: PlacementConfig,
}

/// Economy and scheduling settings.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameSettings {
    /// Gold granted at game start and after a reset.
    pub starting_gold: u32,
    /// Lives granted at game start and after a reset.
    pub starting_lives: i32,
    /// Interval between scheduled ticks in milliseconds.
    pub tick_rate_ms: u64,
    /// Interval hosts use when broadcasting snapshots, in milliseconds.
    #[serde(default = "default_broadcast_interval_ms")]
    pub broadcast_interval_ms: u64,
}

/// Base statistics of a tower archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TowerArchetype {
    /// Gold deducted on placement.
    pub cost: u32,
    /// Targeting radius.
    pub range: f64,
    /// Damage carried by each projectile.
    pub damage: u32,
    /// Shots per second.
    pub fire_rate: f64,
    /// Splash radius of fired projectiles, zero when the tower has none.
    #[serde(default)]
    pub splash_radius: f64,
}

/// Base statistics of an enemy archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnemyArchetype {
    /// Hit points before wave scaling.
    pub hp: u32,
    /// Movement speed in path units per frame.
    pub speed: f64,
    /// Gold paid out when defeated.
    pub gold_reward: u32,
    /// Score paid out when defeated.
    pub score_reward: u32,
}

/// Base statistics of a projectile archetype.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProjectileArchetype {
    /// Travel speed in path units per frame.
    pub speed: f64,
}

/// Wave sizing, pacing, and composition tables.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WaveConfig {
    /// Enemy count of the first wave.
    pub enemies_per_wave_base: u32,
    /// Linear growth factor applied to the enemy count per wave.
    pub enemies_per_wave_multiplier: f64,
    /// Linear growth factor applied to enemy hit points per wave.
    pub hp_scale_per_wave: f64,
    /// Minimum time between the starts of consecutive waves.
    #[serde(default = "default_wave_interval_ms")]
    pub wave_interval_ms: u64,
    /// Lower bound of the randomized delay between dripped enemies.
    #[serde(default = "default_spawn_delay_min_ms")]
    pub spawn_delay_min_ms: u64,
    /// Upper bound (inclusive) of the randomized delay between dripped enemies.
    #[serde(default = "default_spawn_delay_max_ms")]
    pub spawn_delay_max_ms: u64,
    /// Seed for the spawn-delay generator; entropy is used when absent.
    #[serde(default)]
    pub rng_seed: Option<u64>,
    /// Composition weights for waves 1 through 5.
    pub early: WaveComposition,
    /// Composition weights for waves 6 through 9.
    pub mid: WaveComposition,
    /// Composition weights for later non-boss waves.
    pub late: WaveComposition,
    /// Composition weights for every tenth wave.
    pub boss: WaveComposition,
}

/// Per-kind enemy quantities.
///
/// In the configuration tables the values are relative weights; once resolved
/// for a specific wave they are literal counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WaveComposition {
    /// Basic enemies.
    #[serde(default)]
    pub basic: u32,
    /// Fast enemies.
    #[serde(default)]
    pub fast: u32,
    /// Tank enemies.
    #[serde(default)]
    pub tank: u32,
    /// Boss enemies.
    #[serde(default)]
    pub boss: u32,
}

impl WaveComposition {
    /// Quantity recorded for `kind`.
    #[must_use]
    pub const fn count(&self, kind: EnemyKind) -> u32 {
        match kind {
            EnemyKind::Basic => self.basic,
            EnemyKind::Fast => self.fast,
            EnemyKind::Tank => self.tank,
            EnemyKind::Boss => self.boss,
        }
    }

    /// Returns a copy with the quantity for `kind` replaced.
    #[must_use]
    pub const fn with(mut self, kind: EnemyKind, value: u32) -> Self {
        match kind {
            EnemyKind::Basic => self.basic = value,
            EnemyKind::Fast => self.fast = value,
            EnemyKind::Tank => self.tank = value,
            EnemyKind::Boss => self.boss = value,
        }
        self
    }

    /// Sum of all quantities.
    #[must_use]
    pub const fn total(&self) -> u32 {
        self.basic
            .saturating_add(self.fast)
            .saturating_add(self.tank)
            .saturating_add(self.boss)
    }

    /// Converts these weights into literal counts summing to `total`.
    ///
    /// Each kind receives `total * weight / sum` enemies; the rounding
    /// remainder goes to the first kind with a non-zero weight in
    /// [`EnemyKind::ALL`] order. All-zero weights count as pure basic.
    #[must_use]
    pub fn apportion(&self, total: u32) -> WaveComposition {
        let weights = if self.total() == 0 {
            WaveComposition::default().with(EnemyKind::Basic, 1)
        } else {
            *self
        };
        let sum = u64::from(weights.total());

        let mut counts = WaveComposition::default();
        let mut assigned = 0u32;
        for kind in EnemyKind::ALL {
            let share = u64::from(total) * u64::from(weights.count(kind)) / sum;
            let share = u32::try_from(share).unwrap_or(u32::MAX);
            counts = counts.with(kind, share);
            assigned = assigned.saturating_add(share);
        }

        if assigned < total {
            if let Some(kind) = EnemyKind::ALL
                .into_iter()
                .find(|kind| weights.count(*kind) > 0)
            {
                counts = counts.with(kind, counts.count(kind) + (total - assigned));
            }
        }

        counts
    }
}

/// Map dimensions and the enemy path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Map width in map units.
    pub width: u32,
    /// Map height in map units.
    pub height: u32,
    /// Ordered waypoints enemies walk along.
    pub path: Vec<Position>,
    /// Visual half-width of the path; informational only.
    #[serde(default)]
    pub path_half_width: f64,
}

impl MapConfig {
    /// Point where enemies enter the map.
    #[must_use]
    pub fn start(&self) -> Position {
        self.path.first().copied().unwrap_or(FALLBACK_START)
    }
}

/// Tower placement constraints.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlacementConfig {
    /// Minimum distance between a tower and every path segment.
    pub min_distance_from_path: f64,
    /// Minimum distance between two towers.
    pub min_tower_spacing: f64,
    /// Maximum number of towers on the map.
    pub max_towers: usize,
}

impl GameConfig {
    /// Parses and validates the balance table compiled into the crate.
    pub fn default_balance() -> Result<Self, ConfigError> {
        Self::from_toml_str(DEFAULT_BALANCE)
    }

    /// Parses and validates a TOML document.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses, and validates a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Checks structural rules that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.map.path.len() < 2 {
            return Err(ConfigError::Invalid(
                "map path needs at least two waypoints".to_owned(),
            ));
        }
        if self.game.tick_rate_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_rate_ms must be positive".to_owned(),
            ));
        }
        if self.waves.spawn_delay_min_ms > self.waves.spawn_delay_max_ms {
            return Err(ConfigError::Invalid(format!(
                "spawn delay bounds are inverted ({} > {})",
                self.waves.spawn_delay_min_ms, self.waves.spawn_delay_max_ms
            )));
        }
        if !self.projectiles.contains_key(BASIC_PROJECTILE) {
            return Err(ConfigError::Invalid(format!(
                "projectile archetype `{BASIC_PROJECTILE}` is required"
            )));
        }
        for (name, tower) in &self.towers {
            if tower.fire_rate <= 0.0 || !tower.fire_rate.is_finite() {
                return Err(ConfigError::Invalid(format!(
                    "tower `{name}` must have a positive fire_rate"
                )));
            }
        }
        Ok(())
    }

    /// Looks up a tower archetype by name.
    pub fn tower(&self, name: &str) -> Result<&TowerArchetype, ConfigError> {
        self.towers
            .get(name)
            .ok_or_else(|| unknown(EntityKind::Tower, name))
    }

    /// Looks up the archetype of an enemy kind.
    pub fn enemy(&self, kind: EnemyKind) -> Result<&EnemyArchetype, ConfigError> {
        self.enemies
            .get(kind.as_str())
            .ok_or_else(|| unknown(EntityKind::Enemy, kind.as_str()))
    }

    /// Looks up a projectile archetype by name.
    pub fn projectile(&self, name: &str) -> Result<&ProjectileArchetype, ConfigError> {
        self.projectiles
            .get(name)
            .ok_or_else(|| unknown(EntityKind::Projectile, name))
    }

    /// Projectile archetype fired by towers of the named archetype.
    ///
    /// A tower fires the projectile archetype sharing its name when one
    /// exists and falls back to [`BASIC_PROJECTILE`] otherwise.
    #[must_use]
    pub fn projectile_for_tower<'a>(&'a self, tower: &'a str) -> &'a str {
        if self.projectiles.contains_key(tower) {
            tower
        } else {
            BASIC_PROJECTILE
        }
    }

    /// Composition weights of a tier.
    #[must_use]
    pub const fn tier_weights(&self, tier: WaveTier) -> &WaveComposition {
        match tier {
            WaveTier::Early => &self.waves.early,
            WaveTier::Mid => &self.waves.mid,
            WaveTier::Late => &self.waves.late,
            WaveTier::Boss => &self.waves.boss,
        }
    }

    /// Tier a one-based wave number belongs to.
    #[must_use]
    pub const fn tier_for_wave(&self, wave: u32) -> WaveTier {
        WaveTier::for_wave(wave)
    }

    /// Literal per-kind enemy counts for a one-based wave number.
    #[must_use]
    pub fn composition_for_wave(&self, wave: u32) -> WaveComposition {
        self.tier_weights(self.tier_for_wave(wave))
            .apportion(self.enemies_for_wave(wave))
    }

    /// Number of enemies in a wave: `base * (1 + (wave-1) * (multiplier-1))`,
    /// truncated.
    #[must_use]
    pub fn enemies_for_wave(&self, wave: u32) -> u32 {
        let base = f64::from(self.waves.enemies_per_wave_base);
        let growth = self.waves.enemies_per_wave_multiplier - 1.0;
        let count = base * (1.0 + (f64::from(wave) - 1.0) * growth);
        truncate(count)
    }

    /// Scales an enemy's base hit points linearly with the wave number.
    ///
    /// Waves up to and including the first use the base value unscaled.
    #[must_use]
    pub fn scale_enemy_hp(&self, base_hp: u32, wave: u32) -> u32 {
        if wave <= 1 {
            return base_hp;
        }
        let growth = self.waves.hp_scale_per_wave - 1.0;
        let scaled = f64::from(base_hp) * (1.0 + f64::from(wave - 1) * growth);
        truncate(scaled)
    }

    /// Interval between scheduled ticks.
    #[must_use]
    pub const fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.game.tick_rate_ms)
    }

    /// Minimum time between consecutive wave starts.
    #[must_use]
    pub const fn wave_interval(&self) -> Duration {
        Duration::from_millis(self.waves.wave_interval_ms)
    }
}

fn unknown(kind: EntityKind, name: &str) -> ConfigError {
    ConfigError::UnknownArchetype {
        kind,
        name: name.to_owned(),
    }
}

fn truncate(value: f64) -> u32 {
    if value.is_nan() || value <= 0.0 {
        0
    } else if value >= f64::from(u32::MAX) {
        u32::MAX
    } else {
        value as u32
    }
}

const fn default_broadcast_interval_ms() -> u64 {
    100
}

const fn default_wave_interval_ms() -> u64 {
    10_000
}

const fn default_spawn_delay_min_ms() -> u64 {
    120
}

const fn default_spawn_delay_max_ms() -> u64 {
    300
}
