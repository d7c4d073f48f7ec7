#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Projectile resolution system: homing flight, impacts, and splash damage.

use tower_defense_core::{EntityId, Event, Position, Tick};
use tower_defense_world::{Payload, World};

/// Pure system that advances projectiles and applies damage on impact.
#[derive(Debug, Default)]
pub struct Projectiles {
    in_flight: Vec<EntityId>,
}

impl Projectiles {
    /// Creates a new projectile system with an empty scratch buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every alive projectile for one tick.
    ///
    /// Projectiles whose target is missing, dead, or already defeated are
    /// retired without dealing damage. A projectile whose travel this tick
    /// reaches its target deals its damage and is retired; otherwise it moves
    /// toward the target's current position.
    pub fn handle(&mut self, world: &mut World, tick: Tick, out_events: &mut Vec<Event>) {
        self.in_flight.clear();
        self.in_flight.extend(world.projectile_ids());

        for &id in &self.in_flight {
            let Some(projectile) = world.projectile(id) else {
                continue;
            };
            let target_id = projectile.target();
            let origin = projectile.position();
            let travel = tick.travel(projectile.speed());
            let payload = *projectile.payload();

            let target_position = world
                .enemy(target_id)
                .filter(|enemy| enemy.is_active())
                .map(|enemy| enemy.position());

            let Some(target_position) = target_position else {
                retire(world, id);
                continue;
            };

            if travel >= origin.distance(target_position) {
                if let Some(enemy) = world.enemy_mut(target_id) {
                    enemy.apply_damage(payload.damage);
                }
                let splashed = if payload.splashes() {
                    apply_splash(world, target_id, target_position, &payload)
                } else {
                    0
                };
                retire(world, id);
                out_events.push(Event::ProjectileHit {
                    projectile: id,
                    target: target_id,
                    damage: payload.damage,
                    splashed,
                });
            } else if let Some(projectile) = world.projectile_mut(id) {
                projectile.set_position(origin.step_toward(target_position, travel));
            }
        }
    }
}

fn retire(world: &mut World, id: EntityId) {
    if let Some(projectile) = world.projectile_mut(id) {
        projectile.mark_dead();
    }
}

/// Damages every other active enemy within the splash radius of `impact`.
fn apply_splash(world: &mut World, primary: EntityId, impact: Position, payload: &Payload) -> usize {
    let damage = payload.splash_damage();
    let mut splashed = 0;
    for enemy in world.enemies_mut() {
        if enemy.id() == primary || !enemy.is_active() {
            continue;
        }
        if enemy.position().distance(impact) <= payload.splash_radius {
            enemy.apply_damage(damage);
            splashed += 1;
        }
    }
    splashed
}
