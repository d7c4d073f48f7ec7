use std::time::{Duration, Instant};

use tower_defense_core::{EnemyKind, EntityId, Event, Position, Tick};
use tower_defense_system_projectiles::Projectiles;
use tower_defense_world::{Bounty, Enemy, Payload, Projectile, World};

fn enemy(world: &mut World, position: Position, hp: u32) -> EntityId {
    let enemy = Enemy::new(
        EntityId::generate(),
        EnemyKind::Basic,
        position,
        hp,
        1.0,
        Bounty { gold: 10, score: 5 },
    );
    let id = enemy.id();
    world.add(enemy);
    id
}

fn projectile(
    world: &mut World,
    position: Position,
    target: EntityId,
    speed: f64,
    damage: u32,
    splash_radius: f64,
) -> EntityId {
    let projectile = Projectile::new(
        EntityId::generate(),
        "basic",
        position,
        target,
        speed,
        Payload {
            damage,
            splash_radius,
        },
    );
    let id = projectile.id();
    world.add(projectile);
    id
}

fn tick() -> Tick {
    Tick::new(Instant::now(), Duration::from_millis(50))
}

#[test]
fn projectile_moves_toward_target_when_out_of_reach() {
    let mut world = World::new();
    let target = enemy(&mut world, Position::new(100.0, 0.0), 50);
    let id = projectile(&mut world, Position::new(0.0, 0.0), target, 5.0, 10, 0.0);
    let mut events = Vec::new();

    Projectiles::new().handle(&mut world, tick(), &mut events);

    let projectile = world.projectile(id).expect("still stored");
    assert!(projectile.is_alive());
    assert!((projectile.position().x - 15.0).abs() < 1e-9);
    assert_eq!(world.enemy(target).map(Enemy::hp), Some(50));
    assert!(events.is_empty());
}

#[test]
fn hit_applies_direct_damage_and_retires_projectile() {
    let mut world = World::new();
    let target = enemy(&mut world, Position::new(10.0, 0.0), 50);
    let id = projectile(&mut world, Position::new(0.0, 0.0), target, 5.0, 20, 0.0);
    let mut events = Vec::new();

    Projectiles::new().handle(&mut world, tick(), &mut events);

    assert!(!world.projectile(id).expect("awaiting cleanup").is_alive());
    assert_eq!(world.enemy(target).map(Enemy::hp), Some(30));
    assert_eq!(
        events,
        vec![Event::ProjectileHit {
            projectile: id,
            target,
            damage: 20,
            splashed: 0,
        }]
    );
}

#[test]
fn splash_hits_neighbours_within_radius_only() {
    let mut world = World::new();
    let primary = enemy(&mut world, Position::new(10.0, 0.0), 100);
    let near = enemy(&mut world, Position::new(30.0, 0.0), 100);
    let edge = enemy(&mut world, Position::new(10.0, 30.0), 100);
    let far = enemy(&mut world, Position::new(45.0, 0.0), 100);
    let dead = enemy(&mut world, Position::new(15.0, 0.0), 100);
    world.enemy_mut(dead).expect("stored").mark_dead();
    let _ = projectile(&mut world, Position::new(0.0, 0.0), primary, 5.0, 20, 30.0);
    let mut events = Vec::new();

    Projectiles::new().handle(&mut world, tick(), &mut events);

    let hp = |id| world.enemy(id).map(Enemy::hp);
    assert_eq!(hp(primary), Some(80));
    assert_eq!(hp(near), Some(90));
    assert_eq!(hp(edge), Some(90));
    assert_eq!(hp(far), Some(100));
    assert_eq!(hp(dead), Some(100));
    assert!(matches!(
        events.as_slice(),
        [Event::ProjectileHit { splashed: 2, .. }]
    ));
}

#[test]
fn splash_damage_has_a_floor_of_one() {
    let mut world = World::new();
    let primary = enemy(&mut world, Position::new(5.0, 0.0), 10);
    let neighbour = enemy(&mut world, Position::new(8.0, 0.0), 10);
    let _ = projectile(&mut world, Position::new(0.0, 0.0), primary, 5.0, 1, 10.0);

    Projectiles::new().handle(&mut world, tick(), &mut Vec::new());

    assert_eq!(world.enemy(neighbour).map(Enemy::hp), Some(9));
}

#[test]
fn missing_target_retires_projectile_without_damage() {
    let mut world = World::new();
    let id = projectile(
        &mut world,
        Position::new(0.0, 0.0),
        EntityId::generate(),
        5.0,
        10,
        0.0,
    );
    let mut events = Vec::new();

    Projectiles::new().handle(&mut world, tick(), &mut events);

    assert!(!world.projectile(id).expect("awaiting cleanup").is_alive());
    assert!(events.is_empty());
}

#[test]
fn defeated_target_retires_trailing_projectiles() {
    let mut world = World::new();
    let target = enemy(&mut world, Position::new(5.0, 0.0), 10);
    let first = projectile(&mut world, Position::new(0.0, 0.0), target, 5.0, 10, 0.0);
    let second = projectile(&mut world, Position::new(0.0, 0.0), target, 5.0, 10, 0.0);
    let mut events = Vec::new();

    Projectiles::new().handle(&mut world, tick(), &mut events);

    let target = world.enemy(target).expect("awaiting reward");
    assert_eq!(target.hp(), 0);
    assert!(target.is_alive(), "reward stage clears the alive flag");
    assert!(!world.projectile(first).expect("stored").is_alive());
    assert!(!world.projectile(second).expect("stored").is_alive());
    assert_eq!(events.len(), 1, "only the first projectile deals damage");
}

#[test]
fn damage_never_underflows_hit_points() {
    let mut world = World::new();
    let target = enemy(&mut world, Position::new(1.0, 0.0), 5);
    let _ = projectile(&mut world, Position::new(0.0, 0.0), target, 5.0, 500, 0.0);

    Projectiles::new().handle(&mut world, tick(), &mut Vec::new());

    assert_eq!(world.enemy(target).map(Enemy::hp), Some(0));
}
