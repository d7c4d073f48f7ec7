use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
    time::Duration,
};

use tower_defense_core::GameConfig;
use tower_defense_game::{CommandError, Game, GameId, GameManager};

fn config() -> Arc<GameConfig> {
    Arc::new(GameConfig::default_balance().expect("default balance"))
}

fn counting_game() -> (Game, Arc<AtomicUsize>) {
    let game = Game::new(GameId::generate(), config());
    let ticks = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&ticks);
    game.set_on_tick(move |_| {
        let _ = counter.fetch_add(1, Ordering::SeqCst);
    });
    (game, ticks)
}

#[tokio::test]
async fn scheduler_ticks_until_stopped() {
    let (game, ticks) = counting_game();

    game.start().expect("start");
    game.start().expect("second start is a no-op");
    assert!(game.is_running());

    tokio::time::sleep(Duration::from_millis(120)).await;
    game.stop();
    assert!(!game.is_running());
    let observed = ticks.load(Ordering::SeqCst);
    assert!(observed > 0, "the loop should have ticked at least once");

    tokio::time::sleep(Duration::from_millis(60)).await;
    assert_eq!(ticks.load(Ordering::SeqCst), observed);
}

#[tokio::test]
async fn stopped_game_can_be_restarted() {
    let (game, ticks) = counting_game();

    game.start().expect("start");
    tokio::time::sleep(Duration::from_millis(40)).await;
    game.stop();
    game.stop();
    let first_run = ticks.load(Ordering::SeqCst);

    game.start().expect("restart");
    tokio::time::sleep(Duration::from_millis(40)).await;
    game.stop();

    assert!(ticks.load(Ordering::SeqCst) > first_run);
}

#[tokio::test]
async fn removing_a_game_stops_its_loop() {
    let manager = GameManager::new(config());
    let game = manager.create();
    game.start().expect("start");

    manager.remove(game.id()).expect("remove");

    assert!(!game.is_running());
}

#[tokio::test]
async fn shutdown_stops_every_game() {
    let manager = GameManager::new(config());
    let games = [manager.create(), manager.create(), manager.get_or_create_default()];
    for game in &games {
        game.start().expect("start");
    }

    manager.shutdown();

    assert!(games.iter().all(|game| !game.is_running()));
    assert_eq!(manager.game_count(), 0);
}

#[test]
fn start_requires_a_runtime() {
    let game = Game::new(GameId::generate(), config());
    assert!(matches!(game.start(), Err(CommandError::RuntimeUnavailable)));
    assert!(!game.is_running());
}
