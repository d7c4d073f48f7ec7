#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that selects the nearest enemy for every ready tower.

use std::time::Instant;

use tower_defense_core::{EntityId, Position, TowerTarget};
use tower_defense_world::World;

/// Tower targeting system that reuses scratch buffers to avoid repeated allocations.
#[derive(Debug, Default)]
pub struct TowerTargeting {
    enemy_workspace: Vec<EnemyCandidate>,
}

impl TowerTargeting {
    /// Creates a new tower targeting system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes targets for towers whose cooldown has elapsed at `now`.
    ///
    /// The output buffer is cleared before populating it. Each tower selects
    /// the closest active enemy strictly inside its range; on equal distance
    /// the enemy encountered first in spawn order wins. Towers without a
    /// candidate produce no entry.
    pub fn handle(&mut self, world: &World, now: Instant, out: &mut Vec<TowerTarget>) {
        out.clear();

        if world.tower_count() == 0 {
            return;
        }

        self.prepare_enemy_workspace(world);
        if self.enemy_workspace.is_empty() {
            return;
        }

        for tower in world.towers() {
            if !tower.can_fire(now) {
                continue;
            }

            let origin = tower.position();
            let mut best: Option<TowerTarget> = None;
            let mut best_distance = tower.stats().range;

            for candidate in &self.enemy_workspace {
                let distance = origin.distance(candidate.position);
                if distance < best_distance {
                    best_distance = distance;
                    best = Some(TowerTarget {
                        tower: tower.id(),
                        enemy: candidate.id,
                        distance,
                    });
                }
            }

            if let Some(target) = best {
                out.push(target);
            }
        }
    }

    fn prepare_enemy_workspace(&mut self, world: &World) {
        self.enemy_workspace.clear();
        self.enemy_workspace.extend(
            world
                .enemies()
                .filter(|enemy| enemy.is_active())
                .map(|enemy| EnemyCandidate {
                    id: enemy.id(),
                    position: enemy.position(),
                }),
        );
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct EnemyCandidate {
    id: EntityId,
    position: Position,
}
