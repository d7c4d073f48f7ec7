use std::{sync::Arc, time::Instant};

use tower_defense_core::{Event, GameConfig, Tick, TowerTarget};
use tower_defense_system_lifecycle::Lifecycle;
use tower_defense_system_movement::Movement;
use tower_defense_system_projectiles::Projectiles;
use tower_defense_system_reward::Reward;
use tower_defense_system_spawning::{Config as SpawningConfig, Spawning};
use tower_defense_system_tower_combat::TowerCombat;
use tower_defense_system_tower_targeting::TowerTargeting;
use tower_defense_world::{EntityFactory, World};

/// Fixed-order sequence of systems executed once per tick.
///
/// Stages run strictly one after another: spawning, movement, targeting and
/// firing, projectile resolution, rewards, and finally lifecycle cleanup.
#[derive(Debug)]
pub struct Pipeline {
    spawning: Spawning,
    movement: Movement,
    targeting: TowerTargeting,
    combat: TowerCombat,
    projectiles: Projectiles,
    reward: Reward,
    lifecycle: Lifecycle,
    tower_targets: Vec<TowerTarget>,
}

impl Pipeline {
    /// Builds every stage from the shared configuration. The first wave
    /// becomes due one wave interval after `now`.
    #[must_use]
    pub fn new(config: Arc<GameConfig>, now: Instant) -> Self {
        let factory = EntityFactory::new(Arc::clone(&config));
        Self {
            spawning: Spawning::new(
                SpawningConfig::from_game_config(&config),
                factory.clone(),
                now,
            ),
            movement: Movement::new(config.map.path.clone()),
            targeting: TowerTargeting::new(),
            combat: TowerCombat::new(factory),
            projectiles: Projectiles::new(),
            reward: Reward::new(),
            lifecycle: Lifecycle::new(config.map.path.len()),
            tower_targets: Vec::new(),
        }
    }

    /// Runs one pass of every stage against `world`.
    pub fn run(&mut self, world: &mut World, tick: Tick, out_events: &mut Vec<Event>) {
        self.spawning.handle(world, tick, out_events);
        self.movement.handle(world, tick);
        self.targeting
            .handle(world, tick.now(), &mut self.tower_targets);
        self.combat
            .handle(world, tick, &self.tower_targets, out_events);
        self.projectiles.handle(world, tick, out_events);
        self.reward.handle(world, out_events);
        self.lifecycle.handle(world, out_events);
    }

    /// Number of the most recently started wave.
    #[must_use]
    pub const fn current_wave(&self) -> u32 {
        self.spawning.current_wave()
    }

    /// Number of enemies of the current wave still waiting to be released.
    #[must_use]
    pub fn pending_spawns(&self) -> usize {
        self.spawning.pending()
    }

    /// Returns the wave machine to wave zero, idle, with its timer restarted.
    pub fn reset(&mut self, now: Instant) {
        self.spawning.reset(now);
        self.tower_targets.clear();
    }

    /// Restarts the wave machine idle at `wave`, as after loading a save.
    pub fn resume_at_wave(&mut self, wave: u32, now: Instant) {
        self.reset(now);
        self.spawning.set_current_wave(wave);
    }
}
