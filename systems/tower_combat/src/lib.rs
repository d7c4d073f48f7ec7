#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that fires projectiles for towers with a selected target.

use tower_defense_core::{Event, Tick, TowerTarget};
use tower_defense_world::{EntityFactory, World};

/// Tower combat system that spawns projectiles for ready towers.
#[derive(Debug)]
pub struct TowerCombat {
    factory: EntityFactory,
}

impl TowerCombat {
    /// Creates a combat system that builds projectiles through `factory`.
    #[must_use]
    pub fn new(factory: EntityFactory) -> Self {
        Self { factory }
    }

    /// Fires one projectile per target assignment.
    ///
    /// A tower's cooldown restarts only when its projectile was created.
    /// Assignments whose tower vanished, is still cooling down, or whose
    /// target is no longer active are skipped.
    pub fn handle(
        &mut self,
        world: &mut World,
        tick: Tick,
        tower_targets: &[TowerTarget],
        out_events: &mut Vec<Event>,
    ) {
        let now = tick.now();

        for target in tower_targets {
            let Some(tower) = world.tower(target.tower) else {
                continue;
            };
            if !tower.can_fire(now) {
                continue;
            }
            if !world
                .enemy(target.enemy)
                .is_some_and(|enemy| enemy.is_active())
            {
                continue;
            }

            let kind = self.factory.config().projectile_for_tower(tower.kind());
            let projectile = match self.factory.create_projectile(
                kind,
                tower.position(),
                target.enemy,
                tower.stats().payload,
            ) {
                Ok(projectile) => projectile,
                Err(error) => {
                    tracing::warn!(tower = %target.tower, %error, "projectile creation failed");
                    continue;
                }
            };

            let projectile_id = projectile.id();
            world.add(projectile);
            if let Some(tower) = world.tower_mut(target.tower) {
                tower.record_shot(now);
            }
            out_events.push(Event::ProjectileFired {
                tower: target.tower,
                projectile: projectile_id,
                target: target.enemy,
            });
        }
    }
}
