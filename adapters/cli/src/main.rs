#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line host that runs a tower defense game.

mod save_transfer;

use std::{
    path::PathBuf,
    str::FromStr,
    sync::{Arc, Mutex, PoisonError},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use tower_defense_core::{GameConfig, Position};
use tower_defense_game::{extract_metadata, Game, GameManager, TickStats};
use tracing_subscriber::EnvFilter;

/// How often the host checks whether the game ended early.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Command-line arguments accepted by the tower defense host.
#[derive(Debug, Parser)]
#[command(name = "tower-defense", about = "Runs a headless tower defense simulation")]
struct CliArgs {
    /// Balance file to load instead of the embedded defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Wall-clock seconds to simulate before stopping.
    #[arg(long, default_value_t = 30)]
    seconds: u64,

    /// Places a tower before the simulation starts. May be repeated.
    #[arg(long = "place", value_name = "KIND@X,Y")]
    placements: Vec<Placement>,

    /// Prints a transfer string of the final state to stdout.
    #[arg(long)]
    export_save: bool,

    /// Loads a transfer string produced by `--export-save` before starting.
    #[arg(long, value_name = "SAVE")]
    import_save: Option<String>,

    /// Minimum spacing between tick statistics log lines.
    #[arg(long, default_value_t = 1000, value_name = "MS")]
    stats_interval_ms: u64,
}

/// Tower placement request parsed from the command line.
#[derive(Clone, Debug, PartialEq)]
struct Placement {
    kind: String,
    position: Position,
}

impl FromStr for Placement {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let (kind, coordinates) = value
            .split_once('@')
            .ok_or_else(|| format!("expected KIND@X,Y, got '{value}'"))?;
        let (x, y) = coordinates
            .split_once(',')
            .ok_or_else(|| format!("expected X,Y coordinates, got '{coordinates}'"))?;

        let kind = kind.trim();
        if kind.is_empty() {
            return Err(format!("tower kind is missing in '{value}'"));
        }
        let x = x
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid x coordinate '{x}'"))?;
        let y = y
            .trim()
            .parse::<f64>()
            .map_err(|_| format!("invalid y coordinate '{y}'"))?;

        Ok(Self {
            kind: kind.to_owned(),
            position: Position::new(x, y),
        })
    }
}

/// Entry point for the tower defense command-line interface.
#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load balance file {}", path.display()))?,
        None => GameConfig::default_balance().context("embedded balance is invalid")?,
    };

    let manager = GameManager::new(Arc::new(config));
    let game = manager.get_or_create_default();

    if let Some(save) = &args.import_save {
        import_save(&game, save)?;
    }
    for placement in &args.placements {
        if let Err(error) = game.add_tower(&placement.kind, placement.position) {
            tracing::warn!(
                kind = %placement.kind,
                x = placement.position.x,
                y = placement.position.y,
                %error,
                "tower rejected"
            );
        }
    }

    game.set_on_tick(stats_logger(Duration::from_millis(args.stats_interval_ms)));
    game.start().context("failed to start the tick scheduler")?;

    let deadline = Instant::now() + Duration::from_secs(args.seconds);
    while Instant::now() < deadline && !game.state().game_over {
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    game.stop();

    let snapshot = game.snapshot();
    tracing::info!(
        wave = snapshot.wave,
        gold = snapshot.gold,
        lives = snapshot.lives,
        score = snapshot.score,
        game_over = snapshot.game_over,
        towers = snapshot.towers.len(),
        enemies = snapshot.enemies.len(),
        "simulation finished"
    );

    if args.export_save {
        let data = game.save_state().context("failed to serialize the game")?;
        println!("{}", save_transfer::encode(&data));
    }

    manager.shutdown();
    Ok(())
}

fn import_save(game: &Game, save: &str) -> Result<()> {
    let data = save_transfer::decode(save).context("failed to decode the save string")?;
    let metadata = extract_metadata(&data).context("save string does not hold a game state")?;
    game.load_state(&data)
        .context("failed to restore the imported save")?;
    tracing::info!(
        wave = metadata.wave,
        gold = metadata.gold,
        lives = metadata.lives,
        score = metadata.score,
        "save imported"
    );
    Ok(())
}

/// Builds a tick observer that logs statistics at most once per `interval`.
fn stats_logger(interval: Duration) -> impl Fn(TickStats) + Send + 'static {
    let last_logged: Mutex<Option<Instant>> = Mutex::new(None);
    move |stats| {
        let now = Instant::now();
        let mut last = last_logged.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(logged) = *last {
            if now.duration_since(logged) < interval {
                return;
            }
        }
        *last = Some(now);
        tracing::info!(
            enemies = stats.enemies,
            towers = stats.towers,
            projectiles = stats.projectiles,
            dt_ms = stats.dt.as_secs_f64() * 1000.0,
            "tick"
        );
    }
}
