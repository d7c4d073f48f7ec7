#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Wave spawning system that releases enemy batches into the world.
//!
//! The system idles until the previous batch has been fully released and the
//! inter-wave interval has elapsed. It then builds the whole batch for the
//! next wave at once, admits the first enemy immediately, and drip-feeds the
//! rest one at a time after randomized delays.

use std::{
    collections::VecDeque,
    ops::RangeInclusive,
    time::{Duration, Instant},
};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_defense_core::{Event, GameConfig, Tick};
use tower_defense_world::{Enemy, EntityFactory, World};

/// Configuration parameters required to construct the spawning system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    wave_interval: Duration,
    spawn_delay_ms: RangeInclusive<u64>,
    rng_seed: Option<u64>,
}

impl Config {
    /// Creates a configuration from an explicit wave interval and drip delay
    /// range in milliseconds.
    #[must_use]
    pub const fn new(
        wave_interval: Duration,
        spawn_delay_ms: RangeInclusive<u64>,
        rng_seed: Option<u64>,
    ) -> Self {
        Self {
            wave_interval,
            spawn_delay_ms,
            rng_seed,
        }
    }

    /// Derives the configuration from the wave table of a game configuration.
    #[must_use]
    pub fn from_game_config(config: &GameConfig) -> Self {
        Self::new(
            config.wave_interval(),
            config.waves.spawn_delay_min_ms..=config.waves.spawn_delay_max_ms,
            config.waves.rng_seed,
        )
    }
}

/// Externally observable state of the wave machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next wave to become due.
    Idle,
    /// Releasing the enemies of the current wave.
    Spawning,
}

/// Stateful system that introduces waves of enemies over time.
#[derive(Debug)]
pub struct Spawning {
    factory: EntityFactory,
    wave_interval: Duration,
    spawn_delay_ms: RangeInclusive<u64>,
    rng: ChaCha8Rng,
    current_wave: u32,
    last_wave_started: Instant,
    next_release: Instant,
    pending: VecDeque<Enemy>,
}

impl Spawning {
    /// Creates a new spawning system whose first wave becomes due one wave
    /// interval after `now`.
    #[must_use]
    pub fn new(config: Config, factory: EntityFactory, now: Instant) -> Self {
        let rng = match config.rng_seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            factory,
            wave_interval: config.wave_interval,
            spawn_delay_ms: config.spawn_delay_ms,
            rng,
            current_wave: 0,
            last_wave_started: now,
            next_release: now,
            pending: VecDeque::new(),
        }
    }

    /// Advances the wave machine for one tick.
    pub fn handle(&mut self, world: &mut World, tick: Tick, out_events: &mut Vec<Event>) {
        let now = tick.now();

        if self.pending.is_empty()
            && now.saturating_duration_since(self.last_wave_started) >= self.wave_interval
        {
            self.start_wave(world, now, out_events);
            return;
        }

        if !self.pending.is_empty() && now >= self.next_release {
            self.release_next(world, now, out_events);
        }
    }

    /// Number of the most recently started wave, zero before the first.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.current_wave
    }

    /// Overrides the wave counter, leaving timers and pending enemies intact.
    pub fn set_current_wave(&mut self, wave: u32) {
        self.current_wave = wave;
    }

    /// Number of enemies of the current wave that have not been released yet.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Current state of the wave machine.
    #[must_use]
    pub fn phase(&self) -> Phase {
        if self.pending.is_empty() {
            Phase::Idle
        } else {
            Phase::Spawning
        }
    }

    /// Returns to idle at wave zero with the inter-wave timer restarted at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.current_wave = 0;
        self.pending.clear();
        self.last_wave_started = now;
        self.next_release = now;
    }

    fn start_wave(&mut self, world: &mut World, now: Instant, out_events: &mut Vec<Event>) {
        let wave = self.current_wave.saturating_add(1);
        self.last_wave_started = now;

        let enemies = match self.factory.create_wave(wave) {
            Ok(enemies) => enemies,
            Err(error) => {
                tracing::error!(wave, %error, "wave construction failed");
                return;
            }
        };

        self.current_wave = wave;
        out_events.push(Event::WaveStarted {
            wave,
            enemies: enemies.len(),
        });
        tracing::info!(wave, enemy_count = enemies.len(), "wave started");

        self.pending.extend(enemies);
        self.release_next(world, now, out_events);
    }

    fn release_next(&mut self, world: &mut World, now: Instant, out_events: &mut Vec<Event>) {
        let Some(enemy) = self.pending.pop_front() else {
            return;
        };

        out_events.push(Event::EnemySpawned {
            enemy: enemy.id(),
            kind: enemy.kind(),
        });
        world.add(enemy);

        if !self.pending.is_empty() {
            self.next_release = now + self.next_delay();
        }
    }

    fn next_delay(&mut self) -> Duration {
        if self.spawn_delay_ms.is_empty() {
            return Duration::from_millis(*self.spawn_delay_ms.start());
        }
        Duration::from_millis(self.rng.gen_range(self.spawn_delay_ms.clone()))
    }
}
