#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Movement system that walks enemies along the configured path.

use tower_defense_core::{Position, Tick};
use tower_defense_world::World;

/// Distance below which an enemy is considered to have reached a waypoint.
pub const WAYPOINT_SNAP_DISTANCE: f64 = 1.0;

/// Pure system that advances every alive enemy toward its next waypoint.
#[derive(Clone, Debug)]
pub struct Movement {
    path: Vec<Position>,
}

impl Movement {
    /// Creates a movement system for the provided waypoint sequence.
    #[must_use]
    pub fn new(path: Vec<Position>) -> Self {
        Self { path }
    }

    /// Waypoints enemies follow.
    #[must_use]
    pub fn path(&self) -> &[Position] {
        &self.path
    }

    /// Moves enemies for one tick.
    ///
    /// Enemies that already reached the final waypoint are left in place for
    /// the lifecycle stage. An enemy within [`WAYPOINT_SNAP_DISTANCE`] of its
    /// next waypoint advances its path index and does not move this tick.
    pub fn handle(&self, world: &mut World, tick: Tick) {
        let last_index = self.path.len().saturating_sub(1);

        for enemy in world.enemies_mut() {
            if enemy.path_index() >= last_index {
                continue;
            }
            let Some(&waypoint) = self.path.get(enemy.path_index() + 1) else {
                continue;
            };

            let position = enemy.position();
            if position.distance(waypoint) < WAYPOINT_SNAP_DISTANCE {
                enemy.advance_waypoint();
                continue;
            }

            enemy.set_position(position.step_toward(waypoint, tick.travel(enemy.speed())));
        }
    }
}
