use std::{
    sync::Arc,
    time::{Duration, Instant},
};

use tower_defense_core::{EnemyKind, Event, GameConfig, Tick, WaveComposition};
use tower_defense_system_spawning::{Config, Phase, Spawning};
use tower_defense_world::{EntityFactory, World};

const WAVE_INTERVAL: Duration = Duration::from_secs(10);
const FRAME: Duration = Duration::from_millis(16);

fn config_with_basic_waves(enemies: u32) -> GameConfig {
    let mut config = GameConfig::default_balance().expect("embedded balance parses");
    config.waves.enemies_per_wave_base = enemies;
    config.waves.enemies_per_wave_multiplier = 1.0;
    let basic = WaveComposition::default().with(EnemyKind::Basic, 1);
    config.waves.early = basic;
    config.waves.mid = basic;
    config.waves.late = basic;
    config.waves.boss = basic;
    config
}

fn spawning(config: GameConfig, start: Instant) -> Spawning {
    Spawning::new(
        Config::new(WAVE_INTERVAL, 120..=300, Some(0x4d59_5df4_d0f3_3173)),
        EntityFactory::new(Arc::new(config)),
        start,
    )
}

fn run(
    spawning: &mut Spawning,
    world: &mut World,
    now: Instant,
    events: &mut Vec<Event>,
) {
    spawning.handle(world, Tick::new(now, FRAME), events);
}

#[test]
fn stays_idle_before_wave_interval() {
    let start = Instant::now();
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(3), start);
    let mut events = Vec::new();

    run(
        &mut spawning,
        &mut world,
        start + WAVE_INTERVAL - Duration::from_millis(1),
        &mut events,
    );

    assert!(events.is_empty());
    assert_eq!(spawning.current_wave(), 0);
    assert_eq!(spawning.phase(), Phase::Idle);
    assert_eq!(world.enemy_count(), 0);
}

#[test]
fn first_enemy_is_admitted_when_wave_starts() {
    let start = Instant::now();
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(3), start);
    let mut events = Vec::new();

    run(&mut spawning, &mut world, start + WAVE_INTERVAL, &mut events);

    assert_eq!(spawning.current_wave(), 1);
    assert_eq!(spawning.phase(), Phase::Spawning);
    assert_eq!(spawning.pending(), 2);
    assert_eq!(world.enemy_count(), 1);
    assert!(matches!(
        events.as_slice(),
        [
            Event::WaveStarted {
                wave: 1,
                enemies: 3
            },
            Event::EnemySpawned {
                kind: EnemyKind::Basic,
                ..
            }
        ]
    ));
}

#[test]
fn remaining_enemies_drip_within_delay_bounds() {
    let start = Instant::now();
    let wave_start = start + WAVE_INTERVAL;
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(3), start);
    let mut events = Vec::new();

    run(&mut spawning, &mut world, wave_start, &mut events);

    // Nothing is released before the minimum drip delay.
    run(
        &mut spawning,
        &mut world,
        wave_start + Duration::from_millis(119),
        &mut events,
    );
    assert_eq!(world.enemy_count(), 1);

    // At most one enemy per tick once the maximum delay has passed.
    let second = wave_start + Duration::from_millis(300);
    run(&mut spawning, &mut world, second, &mut events);
    assert_eq!(world.enemy_count(), 2);

    run(
        &mut spawning,
        &mut world,
        second + Duration::from_millis(300),
        &mut events,
    );
    assert_eq!(world.enemy_count(), 3);
    assert_eq!(spawning.phase(), Phase::Idle);
}

#[test]
fn next_wave_waits_for_interval_after_previous_start() {
    let start = Instant::now();
    let wave_start = start + WAVE_INTERVAL;
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(1), start);
    let mut events = Vec::new();

    run(&mut spawning, &mut world, wave_start, &mut events);
    assert_eq!(spawning.phase(), Phase::Idle);

    run(
        &mut spawning,
        &mut world,
        wave_start + Duration::from_secs(9),
        &mut events,
    );
    assert_eq!(spawning.current_wave(), 1);

    run(
        &mut spawning,
        &mut world,
        wave_start + WAVE_INTERVAL,
        &mut events,
    );
    assert_eq!(spawning.current_wave(), 2);
    assert_eq!(world.enemy_count(), 2);
}

#[test]
fn empty_wave_is_skipped_and_retried_next_interval() {
    let start = Instant::now();
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(0), start);
    let mut events = Vec::new();

    run(&mut spawning, &mut world, start + WAVE_INTERVAL, &mut events);

    assert!(events.is_empty());
    assert_eq!(spawning.current_wave(), 0);
    assert_eq!(spawning.phase(), Phase::Idle);

    run(
        &mut spawning,
        &mut world,
        start + WAVE_INTERVAL + Duration::from_secs(1),
        &mut events,
    );
    assert!(events.is_empty(), "retry waits for a full interval");
}

#[test]
fn reset_returns_to_wave_zero_and_restarts_timer() {
    let start = Instant::now();
    let wave_start = start + WAVE_INTERVAL;
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(5), start);
    let mut events = Vec::new();

    run(&mut spawning, &mut world, wave_start, &mut events);
    assert_eq!(spawning.pending(), 4);

    spawning.reset(wave_start);
    assert_eq!(spawning.current_wave(), 0);
    assert_eq!(spawning.pending(), 0);

    events.clear();
    run(
        &mut spawning,
        &mut world,
        wave_start + Duration::from_secs(5),
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn set_current_wave_continues_numbering() {
    let start = Instant::now();
    let mut world = World::new();
    let mut spawning = spawning(config_with_basic_waves(2), start);
    let mut events = Vec::new();

    spawning.set_current_wave(9);
    run(&mut spawning, &mut world, start + WAVE_INTERVAL, &mut events);

    assert_eq!(spawning.current_wave(), 10);
    assert!(matches!(
        events.first(),
        Some(Event::WaveStarted { wave: 10, .. })
    ));
}

#[test]
fn boss_wave_uses_boss_composition() {
    let start = Instant::now();
    let mut config = config_with_basic_waves(4);
    config.waves.boss = WaveComposition::default().with(EnemyKind::Boss, 1);
    let mut world = World::new();
    let mut spawning = spawning(config, start);
    let mut events = Vec::new();

    spawning.set_current_wave(9);
    run(&mut spawning, &mut world, start + WAVE_INTERVAL, &mut events);

    let kinds: Vec<EnemyKind> = world.enemies().map(|enemy| enemy.kind()).collect();
    assert_eq!(kinds, vec![EnemyKind::Boss]);
}
