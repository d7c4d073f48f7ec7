use std::time::{Duration, Instant};

use tower_defense_core::{EnemyKind, EntityId, Position, Tick};
use tower_defense_system_movement::Movement;
use tower_defense_world::{Bounty, Enemy, World};

fn straight_path() -> Vec<Position> {
    vec![
        Position::new(0.0, 0.0),
        Position::new(100.0, 0.0),
        Position::new(100.0, 100.0),
    ]
}

fn spawn(world: &mut World, position: Position, speed: f64, path_index: usize) -> EntityId {
    let enemy = Enemy::new(
        EntityId::generate(),
        EnemyKind::Basic,
        position,
        50,
        speed,
        Bounty::default(),
    )
    .with_path_index(path_index);
    let id = enemy.id();
    world.add(enemy);
    id
}

fn tick(dt_ms: u64) -> Tick {
    Tick::new(Instant::now(), Duration::from_millis(dt_ms))
}

#[test]
fn moves_toward_next_waypoint_by_frame_scaled_speed() {
    let mut world = World::new();
    let id = spawn(&mut world, Position::new(0.0, 0.0), 1.0, 0);
    let movement = Movement::new(straight_path());

    movement.handle(&mut world, tick(50));

    let enemy = world.enemy(id).expect("enemy stored");
    assert!((enemy.position().x - 3.0).abs() < 1e-9);
    assert!(enemy.position().y.abs() < 1e-9);
    assert_eq!(enemy.path_index(), 0);
}

#[test]
fn movement_never_overshoots_waypoint() {
    let mut world = World::new();
    let id = spawn(&mut world, Position::new(98.0, 0.0), 5.0, 0);
    let movement = Movement::new(straight_path());

    movement.handle(&mut world, tick(50));

    let enemy = world.enemy(id).expect("enemy stored");
    assert_eq!(enemy.position(), Position::new(100.0, 0.0));
}

#[test]
fn snapping_advances_index_without_moving() {
    let mut world = World::new();
    let start = Position::new(99.5, 0.0);
    let id = spawn(&mut world, start, 1.0, 0);
    let movement = Movement::new(straight_path());

    movement.handle(&mut world, tick(16));

    let enemy = world.enemy(id).expect("enemy stored");
    assert_eq!(enemy.path_index(), 1);
    assert_eq!(enemy.position(), start);
}

#[test]
fn enemies_at_final_waypoint_are_left_alone() {
    let mut world = World::new();
    let end = Position::new(100.0, 100.0);
    let id = spawn(&mut world, end, 1.0, 2);
    let movement = Movement::new(straight_path());

    movement.handle(&mut world, tick(16));

    let enemy = world.enemy(id).expect("enemy stored");
    assert_eq!(enemy.path_index(), 2);
    assert_eq!(enemy.position(), end);
    assert!(enemy.is_alive(), "escape is resolved by the lifecycle stage");
}

#[test]
fn path_index_is_monotonic_over_many_ticks() {
    let mut world = World::new();
    let id = spawn(&mut world, Position::new(0.0, 0.0), 2.0, 0);
    let movement = Movement::new(straight_path());

    let mut previous = 0;
    for _ in 0..400 {
        movement.handle(&mut world, tick(16));
        let index = world.enemy(id).expect("enemy stored").path_index();
        assert!(index >= previous);
        assert!(index < movement.path().len());
        previous = index;
    }
    assert_eq!(previous, 2, "enemy reaches the end of the path");
}

#[test]
fn dead_enemies_do_not_move() {
    let mut world = World::new();
    let start = Position::new(10.0, 0.0);
    let id = spawn(&mut world, start, 1.0, 0);
    world.enemy_mut(id).expect("enemy stored").mark_dead();

    Movement::new(straight_path()).handle(&mut world, tick(50));

    assert_eq!(world.enemy(id).expect("enemy stored").position(), start);
}
