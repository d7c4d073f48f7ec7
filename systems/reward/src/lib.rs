#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Reward system that pays out bounties for defeated enemies.

use tower_defense_core::Event;
use tower_defense_world::World;

/// Pure system that converts defeated enemies into reward events.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reward;

impl Reward {
    /// Creates a new reward system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Emits one [`Event::RewardGranted`] per enemy that is still alive but
    /// has no hit points left, then clears its alive flag.
    ///
    /// Clearing the flag makes the grant idempotent: a second pass over the
    /// same world emits nothing.
    pub fn handle(&self, world: &mut World, out_events: &mut Vec<Event>) {
        for enemy in world.enemies_mut() {
            if !enemy.is_defeated() {
                continue;
            }

            let bounty = enemy.bounty();
            out_events.push(Event::RewardGranted {
                enemy: enemy.id(),
                gold: bounty.gold,
                score: bounty.score,
            });
            tracing::debug!(
                enemy = %enemy.id(),
                kind = %enemy.kind(),
                gold = bounty.gold,
                score = bounty.score,
                "enemy defeated"
            );
            enemy.mark_dead();
        }
    }
}
