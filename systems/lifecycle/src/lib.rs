#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lifecycle system: resolves escaped enemies and purges dead entities.

use tower_defense_core::Event;
use tower_defense_world::World;

/// Lives deducted for every enemy that reaches the end of the path.
pub const LIVES_PER_ESCAPE: u32 = 1;

/// Pure system that runs last in every tick.
#[derive(Clone, Copy, Debug)]
pub struct Lifecycle {
    final_waypoint: usize,
}

impl Lifecycle {
    /// Creates a lifecycle system for a path with `path_len` waypoints.
    #[must_use]
    pub const fn new(path_len: usize) -> Self {
        Self {
            final_waypoint: path_len.saturating_sub(1),
        }
    }

    /// Marks escaped enemies dead, emitting one life loss each, then removes
    /// every dead entity from the world.
    pub fn handle(&self, world: &mut World, out_events: &mut Vec<Event>) {
        for enemy in world.enemies_mut() {
            if enemy.path_index() < self.final_waypoint {
                continue;
            }

            enemy.mark_dead();
            out_events.push(Event::LifeLost {
                enemy: enemy.id(),
                amount: LIVES_PER_ESCAPE,
            });
            tracing::warn!(enemy = %enemy.id(), kind = %enemy.kind(), "enemy reached end");
        }

        let removed = world.cleanup_dead();
        if !removed.is_empty() {
            tracing::debug!(count = removed.len(), "entities cleaned");
            out_events.push(Event::EntitiesRemoved {
                count: removed.len(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tower_defense_core::{EnemyKind, EntityId, Position};
    use tower_defense_world::{Bounty, Enemy, Payload, Projectile};

    fn enemy(world: &mut World, path_index: usize) -> EntityId {
        let enemy = Enemy::new(
            EntityId::generate(),
            EnemyKind::Basic,
            Position::default(),
            50,
            1.0,
            Bounty::default(),
        )
        .with_path_index(path_index);
        let id = enemy.id();
        world.add(enemy);
        id
    }

    #[test]
    fn escaped_enemy_costs_one_life_and_is_removed() {
        let mut world = World::new();
        let escaped = enemy(&mut world, 3);
        let walking = enemy(&mut world, 2);
        let mut events = Vec::new();

        Lifecycle::new(4).handle(&mut world, &mut events);

        assert_eq!(
            events,
            vec![
                Event::LifeLost {
                    enemy: escaped,
                    amount: 1,
                },
                Event::EntitiesRemoved { count: 1 },
            ]
        );
        assert!(world.get(escaped).is_none());
        assert!(world.get(walking).is_some());
    }

    #[test]
    fn escape_is_counted_only_once() {
        let mut world = World::new();
        let _ = enemy(&mut world, 5);
        let lifecycle = Lifecycle::new(4);
        let mut events = Vec::new();

        lifecycle.handle(&mut world, &mut events);
        lifecycle.handle(&mut world, &mut events);

        let losses = events
            .iter()
            .filter(|event| matches!(event, Event::LifeLost { .. }))
            .count();
        assert_eq!(losses, 1);
    }

    #[test]
    fn rewarded_enemies_at_the_end_do_not_cost_lives() {
        let mut world = World::new();
        let defeated = enemy(&mut world, 3);
        world.enemy_mut(defeated).expect("stored").mark_dead();
        let mut events = Vec::new();

        Lifecycle::new(4).handle(&mut world, &mut events);

        assert_eq!(events, vec![Event::EntitiesRemoved { count: 1 }]);
    }

    #[test]
    fn retired_projectiles_are_purged() {
        let mut world = World::new();
        let mut projectile = Projectile::new(
            EntityId::generate(),
            "basic",
            Position::default(),
            EntityId::generate(),
            5.0,
            Payload {
                damage: 10,
                splash_radius: 0.0,
            },
        );
        projectile.mark_dead();
        world.add(projectile);
        let mut events = Vec::new();

        Lifecycle::new(4).handle(&mut world, &mut events);

        assert_eq!(world.entity_count(), 0);
        assert_eq!(events, vec![Event::EntitiesRemoved { count: 1 }]);
    }
}
