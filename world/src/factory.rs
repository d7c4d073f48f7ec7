//! Construction of fully initialised entities from configuration.

use std::{sync::Arc, time::Instant};

use tower_defense_core::{
    ConfigError, EnemyKind, EnemySnapshot, EntityId, GameConfig, Position, ProjectileSnapshot,
    TowerSnapshot, WaveComposition,
};

use crate::{Bounty, Enemy, Payload, Projectile, Tower, TowerStats};

/// Builds towers, enemies, and projectiles from archetype tables.
#[derive(Clone, Debug)]
pub struct EntityFactory {
    config: Arc<GameConfig>,
}

impl EntityFactory {
    /// Creates a factory backed by the provided configuration.
    #[must_use]
    pub fn new(config: Arc<GameConfig>) -> Self {
        Self { config }
    }

    /// Configuration the factory reads archetypes from.
    #[must_use]
    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Creates a tower of the named archetype that can fire immediately.
    pub fn create_tower(&self, kind: &str, position: Position) -> Result<Tower, ConfigError> {
        let archetype = self.config.tower(kind)?;
        Ok(Tower::new(
            EntityId::generate(),
            kind,
            position,
            TowerStats::from(archetype),
        ))
    }

    /// Creates a full-health enemy with hit points scaled for `wave`.
    pub fn create_enemy(
        &self,
        kind: EnemyKind,
        position: Position,
        wave: u32,
    ) -> Result<Enemy, ConfigError> {
        let archetype = self.config.enemy(kind)?;
        Ok(Enemy::new(
            EntityId::generate(),
            kind,
            position,
            self.config.scale_enemy_hp(archetype.hp, wave),
            archetype.speed,
            Bounty {
                gold: archetype.gold_reward,
                score: archetype.score_reward,
            },
        ))
    }

    /// Creates a projectile of the named archetype aimed at `target`.
    pub fn create_projectile(
        &self,
        kind: &str,
        position: Position,
        target: EntityId,
        payload: Payload,
    ) -> Result<Projectile, ConfigError> {
        let archetype = self.config.projectile(kind)?;
        Ok(Projectile::new(
            EntityId::generate(),
            kind,
            position,
            target,
            archetype.speed,
            payload,
        ))
    }

    /// Creates one enemy per unit of `composition`, grouped by kind in the
    /// order basic, fast, tank, boss.
    pub fn create_enemies_for_wave(
        &self,
        wave: u32,
        composition: &WaveComposition,
        start: Position,
    ) -> Result<Vec<Enemy>, ConfigError> {
        let mut enemies = Vec::with_capacity(composition.total() as usize);
        for kind in EnemyKind::ALL {
            for _ in 0..composition.count(kind) {
                enemies.push(self.create_enemy(kind, start, wave)?);
            }
        }

        if enemies.is_empty() {
            return Err(ConfigError::EmptyWave { wave });
        }
        Ok(enemies)
    }

    /// Creates the configured batch for `wave` at the start of the path.
    pub fn create_wave(&self, wave: u32) -> Result<Vec<Enemy>, ConfigError> {
        let composition = self.config.composition_for_wave(wave);
        self.create_enemies_for_wave(wave, &composition, self.config.map.start())
    }

    /// Rebuilds a tower from its transfer form, restarting its cooldown at `now`.
    #[must_use]
    pub fn restore_tower(&self, snapshot: &TowerSnapshot, now: Instant) -> Tower {
        Tower::new(
            snapshot.id,
            snapshot.kind.clone(),
            snapshot.position,
            TowerStats {
                range: snapshot.range,
                fire_rate: snapshot.fire_rate,
                payload: Payload {
                    damage: snapshot.damage,
                    splash_radius: snapshot.splash_radius,
                },
            },
        )
        .with_cooldown_from(now)
    }

    /// Rebuilds an enemy from its transfer form.
    ///
    /// Rewards are not part of the transfer form and are taken from the
    /// archetype of the stored kind.
    pub fn restore_enemy(&self, snapshot: &EnemySnapshot) -> Result<Enemy, ConfigError> {
        let archetype = self.config.enemy(snapshot.kind)?;
        Ok(Enemy::new(
            snapshot.id,
            snapshot.kind,
            snapshot.position,
            snapshot.max_hp,
            snapshot.speed,
            Bounty {
                gold: archetype.gold_reward,
                score: archetype.score_reward,
            },
        )
        .with_hp(snapshot.hp)
        .with_path_index(snapshot.path_index))
    }

    /// Rebuilds a projectile from its transfer form.
    #[must_use]
    pub fn restore_projectile(&self, snapshot: &ProjectileSnapshot) -> Projectile {
        Projectile::new(
            snapshot.id,
            snapshot.kind.clone(),
            snapshot.position,
            snapshot.target_id,
            snapshot.speed,
            Payload {
                damage: snapshot.damage,
                splash_radius: snapshot.splash_radius,
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tower_defense_core::EntityKind;

    fn factory() -> EntityFactory {
        EntityFactory::new(Arc::new(
            GameConfig::default_balance().expect("embedded balance parses"),
        ))
    }

    #[test]
    fn tower_carries_archetype_stats() {
        let factory = factory();
        let tower = factory
            .create_tower("splash", Position::new(10.0, 10.0))
            .expect("splash tower configured");
        assert_eq!(tower.kind(), "splash");
        assert_eq!(tower.stats().payload.damage, 15);
        assert!((tower.stats().payload.splash_radius - 30.0).abs() < f64::EPSILON);
        assert!(tower.can_fire(Instant::now()));
    }

    #[test]
    fn unknown_tower_archetype_is_rejected() {
        let error = factory()
            .create_tower("laser", Position::default())
            .expect_err("laser not configured");
        assert!(matches!(
            error,
            ConfigError::UnknownArchetype {
                kind: EntityKind::Tower,
                ..
            }
        ));
    }

    #[test]
    fn enemy_hp_scales_with_wave() {
        let factory = factory();
        let base = factory
            .create_enemy(EnemyKind::Basic, Position::default(), 1)
            .expect("basic enemy");
        let scaled = factory
            .create_enemy(EnemyKind::Basic, Position::default(), 3)
            .expect("basic enemy");
        assert_eq!(base.hp(), 50);
        assert_eq!(scaled.hp(), factory.config().scale_enemy_hp(50, 3));
        assert_eq!(scaled.hp(), scaled.max_hp());
    }

    #[test]
    fn wave_batch_follows_fixed_kind_order() {
        let composition = WaveComposition {
            basic: 1,
            fast: 0,
            tank: 2,
            boss: 1,
        };
        let enemies = factory()
            .create_enemies_for_wave(10, &composition, Position::new(0.0, 250.0))
            .expect("non-empty wave");
        let kinds: Vec<EnemyKind> = enemies.iter().map(Enemy::kind).collect();
        assert_eq!(
            kinds,
            vec![
                EnemyKind::Basic,
                EnemyKind::Tank,
                EnemyKind::Tank,
                EnemyKind::Boss
            ]
        );
    }

    #[test]
    fn seven_basic_and_three_fast_make_ten_enemies_basic_first() {
        let composition = WaveComposition {
            basic: 7,
            fast: 3,
            tank: 0,
            boss: 0,
        };
        let enemies = factory()
            .create_enemies_for_wave(1, &composition, Position::new(0.0, 250.0))
            .expect("non-empty wave");
        let kinds: Vec<EnemyKind> = enemies.iter().map(Enemy::kind).collect();

        let mut expected = vec![EnemyKind::Basic; 7];
        expected.extend([EnemyKind::Fast; 3]);
        assert_eq!(kinds, expected);
    }

    #[test]
    fn empty_composition_is_an_error() {
        let error = factory()
            .create_enemies_for_wave(4, &WaveComposition::default(), Position::default())
            .expect_err("empty wave");
        assert!(matches!(error, ConfigError::EmptyWave { wave: 4 }));
    }

    #[test]
    fn configured_wave_starts_on_path() {
        let factory = factory();
        let enemies = factory.create_wave(1).expect("first wave");
        assert_eq!(enemies.len() as u32, factory.config().enemies_for_wave(1));
        let start = factory.config().map.start();
        assert!(enemies.iter().all(|enemy| enemy.position() == start));
    }

    #[test]
    fn restored_enemy_regains_archetype_bounty() {
        let factory = factory();
        let original = factory
            .create_enemy(EnemyKind::Fast, Position::new(3.0, 4.0), 2)
            .expect("fast enemy");
        let restored = factory
            .restore_enemy(&original.to_snapshot())
            .expect("fast configured");
        assert_eq!(restored, original);
    }

    #[test]
    fn restored_tower_waits_a_full_cooldown() {
        let factory = factory();
        let tower = factory
            .create_tower("basic", Position::new(50.0, 50.0))
            .expect("basic tower");
        let now = Instant::now();
        let restored = factory.restore_tower(&tower.to_snapshot(), now);
        assert_eq!(restored.id(), tower.id());
        assert!(!restored.can_fire(now));
        assert!(restored.can_fire(now + Duration::from_secs(1)));
    }
}
