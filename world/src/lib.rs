#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative entity store for a single tower defense game.
//!
//! The [`World`] owns every tower, enemy, and projectile of one game. Entities
//! are reachable by identifier and iterable by kind in insertion order. The
//! world performs no locking of its own; the owning game serializes access.

use std::collections::HashMap;

use tower_defense_core::{EntityId, EntityKind};

mod entity;
mod factory;

pub use entity::{Bounty, Enemy, Entity, EntityRef, Payload, Projectile, Tower, TowerStats};
pub use factory::EntityFactory;

/// Location of an entity inside its kind-specific storage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Slot {
    kind: EntityKind,
    index: usize,
}

/// Represents the authoritative entity state of one game.
#[derive(Debug, Default)]
pub struct World {
    slots: HashMap<EntityId, Slot>,
    towers: Vec<Tower>,
    enemies: Vec<Enemy>,
    projectiles: Vec<Projectile>,
}

impl World {
    /// Creates an empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an entity, replacing any entity already stored under its id.
    pub fn add(&mut self, entity: impl Into<Entity>) {
        let entity = entity.into();
        let id = entity.id();
        if self.slots.contains_key(&id) {
            self.remove(id);
        }

        let slot = match entity {
            Entity::Tower(tower) => {
                self.towers.push(tower);
                Slot {
                    kind: EntityKind::Tower,
                    index: self.towers.len() - 1,
                }
            }
            Entity::Enemy(enemy) => {
                self.enemies.push(enemy);
                Slot {
                    kind: EntityKind::Enemy,
                    index: self.enemies.len() - 1,
                }
            }
            Entity::Projectile(projectile) => {
                self.projectiles.push(projectile);
                Slot {
                    kind: EntityKind::Projectile,
                    index: self.projectiles.len() - 1,
                }
            }
        };
        let _ = self.slots.insert(id, slot);
    }

    /// Removes the entity with the given id. Absent ids are ignored.
    pub fn remove(&mut self, id: EntityId) {
        let Some(slot) = self.slots.remove(&id) else {
            return;
        };

        match slot.kind {
            EntityKind::Tower => {
                let _ = self.towers.remove(slot.index);
            }
            EntityKind::Enemy => {
                let _ = self.enemies.remove(slot.index);
            }
            EntityKind::Projectile => {
                let _ = self.projectiles.remove(slot.index);
            }
        }
        self.reindex(slot.kind, slot.index);
    }

    /// Looks up an entity of any kind, alive or not.
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<EntityRef<'_>> {
        let slot = self.slots.get(&id)?;
        let entity = match slot.kind {
            EntityKind::Tower => EntityRef::Tower(self.towers.get(slot.index)?),
            EntityKind::Enemy => EntityRef::Enemy(self.enemies.get(slot.index)?),
            EntityKind::Projectile => EntityRef::Projectile(self.projectiles.get(slot.index)?),
        };
        Some(entity)
    }

    /// Reports whether an entity with the given id is stored.
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.slots.contains_key(&id)
    }

    /// Looks up a tower by id.
    #[must_use]
    pub fn tower(&self, id: EntityId) -> Option<&Tower> {
        let index = self.index_of(id, EntityKind::Tower)?;
        self.towers.get(index)
    }

    /// Looks up an enemy by id, alive or not.
    #[must_use]
    pub fn enemy(&self, id: EntityId) -> Option<&Enemy> {
        let index = self.index_of(id, EntityKind::Enemy)?;
        self.enemies.get(index)
    }

    /// Looks up a projectile by id, alive or not.
    #[must_use]
    pub fn projectile(&self, id: EntityId) -> Option<&Projectile> {
        let index = self.index_of(id, EntityKind::Projectile)?;
        self.projectiles.get(index)
    }

    /// Mutable access to a tower by id.
    pub fn tower_mut(&mut self, id: EntityId) -> Option<&mut Tower> {
        let index = self.index_of(id, EntityKind::Tower)?;
        self.towers.get_mut(index)
    }

    /// Mutable access to an enemy by id.
    pub fn enemy_mut(&mut self, id: EntityId) -> Option<&mut Enemy> {
        let index = self.index_of(id, EntityKind::Enemy)?;
        self.enemies.get_mut(index)
    }

    /// Mutable access to a projectile by id.
    pub fn projectile_mut(&mut self, id: EntityId) -> Option<&mut Projectile> {
        let index = self.index_of(id, EntityKind::Projectile)?;
        self.projectiles.get_mut(index)
    }

    /// Iterates towers in placement order.
    pub fn towers(&self) -> impl Iterator<Item = &Tower> + '_ {
        self.towers.iter()
    }

    /// Iterates alive enemies in spawn order.
    pub fn enemies(&self) -> impl Iterator<Item = &Enemy> + '_ {
        self.enemies.iter().filter(|enemy| enemy.is_alive())
    }

    /// Iterates alive projectiles in firing order.
    pub fn projectiles(&self) -> impl Iterator<Item = &Projectile> + '_ {
        self.projectiles
            .iter()
            .filter(|projectile| projectile.is_alive())
    }

    /// Mutably iterates towers in placement order.
    pub fn towers_mut(&mut self) -> impl Iterator<Item = &mut Tower> + '_ {
        self.towers.iter_mut()
    }

    /// Mutably iterates alive enemies in spawn order.
    pub fn enemies_mut(&mut self) -> impl Iterator<Item = &mut Enemy> + '_ {
        self.enemies.iter_mut().filter(|enemy| enemy.is_alive())
    }

    /// Collects the ids of alive projectiles in firing order.
    ///
    /// The returned list is freshly allocated and stays valid while the
    /// world is mutated.
    #[must_use]
    pub fn projectile_ids(&self) -> Vec<EntityId> {
        self.projectiles().map(Projectile::id).collect()
    }

    /// Number of towers.
    #[must_use]
    pub fn tower_count(&self) -> usize {
        self.towers.len()
    }

    /// Number of alive enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.enemies().count()
    }

    /// Number of alive projectiles.
    #[must_use]
    pub fn projectile_count(&self) -> usize {
        self.projectiles().count()
    }

    /// Number of stored entities, including those awaiting cleanup.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.slots.len()
    }

    /// Removes every entity whose alive flag is cleared and returns their ids.
    pub fn cleanup_dead(&mut self) -> Vec<EntityId> {
        let mut removed = Vec::new();
        self.enemies.retain(|enemy| {
            if enemy.is_alive() {
                true
            } else {
                removed.push(enemy.id());
                false
            }
        });
        self.projectiles.retain(|projectile| {
            if projectile.is_alive() {
                true
            } else {
                removed.push(projectile.id());
                false
            }
        });

        if !removed.is_empty() {
            for id in &removed {
                let _ = self.slots.remove(id);
            }
            self.reindex(EntityKind::Enemy, 0);
            self.reindex(EntityKind::Projectile, 0);
        }
        removed
    }

    /// Removes every entity.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.towers.clear();
        self.enemies.clear();
        self.projectiles.clear();
    }

    fn index_of(&self, id: EntityId, kind: EntityKind) -> Option<usize> {
        self.slots
            .get(&id)
            .filter(|slot| slot.kind == kind)
            .map(|slot| slot.index)
    }

    fn reindex(&mut self, kind: EntityKind, from: usize) {
        let ids: Vec<EntityId> = match kind {
            EntityKind::Tower => self.towers.iter().skip(from).map(Tower::id).collect(),
            EntityKind::Enemy => self.enemies.iter().skip(from).map(Enemy::id).collect(),
            EntityKind::Projectile => self
                .projectiles
                .iter()
                .skip(from)
                .map(Projectile::id)
                .collect(),
        };
        for (offset, id) in ids.into_iter().enumerate() {
            let _ = self.slots.insert(
                id,
                Slot {
                    kind,
                    index: from + offset,
                },
            );
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use tower_defense_core::{EnemySnapshot, ProjectileSnapshot, TowerSnapshot};

    use super::World;

    /// Aggregate entity counts of a world.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct EntityCounts {
        /// Towers placed.
        pub towers: usize,
        /// Alive enemies.
        pub enemies: usize,
        /// Alive projectiles.
        pub projectiles: usize,
    }

    /// Counts alive entities per kind.
    #[must_use]
    pub fn counts(world: &World) -> EntityCounts {
        EntityCounts {
            towers: world.tower_count(),
            enemies: world.enemy_count(),
            projectiles: world.projectile_count(),
        }
    }

    /// Captures the transfer form of every tower.
    #[must_use]
    pub fn tower_view(world: &World) -> Vec<TowerSnapshot> {
        world.towers().map(|tower| tower.to_snapshot()).collect()
    }

    /// Captures the transfer form of every alive enemy.
    #[must_use]
    pub fn enemy_view(world: &World) -> Vec<EnemySnapshot> {
        world.enemies().map(|enemy| enemy.to_snapshot()).collect()
    }

    /// Captures the transfer form of every alive projectile.
    #[must_use]
    pub fn projectile_view(world: &World) -> Vec<ProjectileSnapshot> {
        world
            .projectiles()
            .map(|projectile| projectile.to_snapshot())
            .collect()
    }
}
