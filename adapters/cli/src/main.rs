#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless Waveguard match.

mod account_file;
mod headless;
mod layout;

use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use waveguard_core::{
    maps::{MAP_HEIGHT, MAP_WIDTH},
    Difficulty, MapId, MatchSetup,
};
use waveguard_rendering::{Color, Presentation, PlayfieldPresentation, RenderingBackend, Scene};
use waveguard_simulation::{
    AccountRecord, AuthToken, LobbyMessage, Notification, Simulation, SimulationConfig,
};
use waveguard_world::query;

use crate::{account_file::JsonFileAccountStore, headless::HeadlessBackend, layout::TowerLayout};

/// Frames the headless backend presents per simulated second.
const FRAMES_PER_SECOND: u32 = 60;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum MapArg {
    Meadow,
    Canyon,
    Volcano,
    Citadel,
}

impl From<MapArg> for MapId {
    fn from(map: MapArg) -> Self {
        match map {
            MapArg::Meadow => Self::Meadow,
            MapArg::Canyon => Self::Canyon,
            MapArg::Volcano => Self::Volcano,
            MapArg::Citadel => Self::Citadel,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DifficultyArg {
    Easy,
    Normal,
    Hard,
}

impl From<DifficultyArg> for Difficulty {
    fn from(difficulty: DifficultyArg) -> Self {
        match difficulty {
            DifficultyArg::Easy => Self::Easy,
            DifficultyArg::Normal => Self::Normal,
            DifficultyArg::Hard => Self::Hard,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "waveguard", about = "Runs a headless Waveguard match")]
struct CliArgs {
    /// Map to play on.
    #[arg(long, value_enum, default_value_t = MapArg::Meadow)]
    map: MapArg,

    /// Difficulty of the match.
    #[arg(long, value_enum, default_value_t = DifficultyArg::Normal)]
    difficulty: DifficultyArg,

    /// Lobby start message in JSON; overrides --map and --difficulty.
    #[arg(long)]
    lobby_message: Option<String>,

    /// Seed of every random stream; overrides the config file.
    #[arg(long)]
    seed: Option<u64>,

    /// Simulated seconds to run before stopping.
    #[arg(long, default_value_t = 120)]
    seconds: u64,

    /// Run at double game speed.
    #[arg(long)]
    fast: bool,

    /// Simulation config in TOML.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Tower layout in TOML, placed before the first tick.
    #[arg(long)]
    layout: Option<PathBuf>,

    /// JSON account file holding money and unlocks between runs.
    #[arg(long)]
    account: Option<PathBuf>,

    /// Account token used with --account.
    #[arg(long, default_value = "local")]
    token: String,
}

/// Entry point for the Waveguard command-line interface.
fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = CliArgs::parse();
    let config = load_config(&args)?;
    let setup = match_setup(&args)?;
    let mut simulation = start_simulation(&args, setup, &config)?;

    println!("{}", query::welcome_banner(simulation.world()));

    let playfield = PlayfieldPresentation::new(
        MAP_WIDTH,
        MAP_HEIGHT,
        query::path(simulation.world()),
        Color::from_rgb_u8(196, 170, 110),
    )?;
    let mut scene = Scene::new(playfield);

    if let Some(path) = &args.layout {
        let layout = TowerLayout::from_path(path)
            .with_context(|| format!("failed to load layout {}", path.display()))?;
        for feedback in layout.apply(&mut simulation) {
            warn!(%feedback, "layout entry skipped");
            scene.feedback = Some(feedback);
        }
    }

    let presentation = Presentation::new(
        format!("Waveguard: {:?} ({:?})", setup.map, setup.difficulty),
        Color::from_rgb_u8(40, 90, 40),
        scene,
    );
    HeadlessBackend::new(FRAMES_PER_SECOND, args.seconds, args.fast).run(
        presentation,
        |dt, input, scene| headless::drive_frame(&mut simulation, dt, input, scene),
    )?;

    simulation.sync_money();
    report_notifications(simulation.drain_notifications());

    let hud = simulation.hud();
    info!(
        score = hud.score,
        money = hud.money,
        wave = hud.wave,
        outcome = ?hud.outcome,
        "run finished"
    );
    Ok(())
}

fn load_config(args: &CliArgs) -> Result<SimulationConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read config {}", path.display()))?;
            SimulationConfig::from_toml_str(&source)
                .with_context(|| format!("failed to parse config {}", path.display()))?
        }
        None => SimulationConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    Ok(config)
}

fn match_setup(args: &CliArgs) -> Result<MatchSetup> {
    let Some(json) = &args.lobby_message else {
        return Ok(MatchSetup::new(args.map.into(), args.difficulty.into()));
    };
    LobbyMessage::parse(json)?
        .match_setup()
        .context("lobby message does not start a game")
}

fn start_simulation(
    args: &CliArgs,
    setup: MatchSetup,
    config: &SimulationConfig,
) -> Result<Simulation> {
    let Some(path) = &args.account else {
        return Ok(Simulation::new(setup, config));
    };

    let token = AuthToken::new(args.token.clone());
    let mut store = JsonFileAccountStore::open(path)
        .with_context(|| format!("failed to open account file {}", path.display()))?;
    store.register(
        &token,
        AccountRecord {
            money: config.starting_money,
            ..AccountRecord::default()
        },
    )?;

    let mut simulation = Simulation::with_account(setup, config, Box::new(store), token);
    report_notifications(simulation.drain_notifications());
    Ok(simulation)
}

fn report_notifications(notifications: Vec<Notification>) {
    for notification in notifications {
        match notification {
            Notification::AccountUnavailable { reason } => {
                eprintln!("account unavailable, playing with defaults: {reason}");
            }
            Notification::PersistenceFailed { operation, reason } => {
                eprintln!("could not save progress ({operation}): {reason}");
            }
        }
    }
}
