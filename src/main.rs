use std::io;
use std::panic;
use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use clap::Parser;
use log::{LevelFilter, info, warn};
use psnake::clock::SystemClock;
use psnake::config::{
    ConfigError, ConfigOverrides, Difficulty, GameConfig, MAX_APPLES, parse_resolution,
};
use psnake::engine::SimulationEngine;
use psnake::input::{GameInput, InputHandler};
use psnake::logging::init_file_logger;
use psnake::renderer;
use psnake::terminal_runtime::{TerminalSession, restore_terminal};
use psnake::ui::hud::{FrameRate, HudInfo};
use thiserror::Error;

/// Pacing for the input/update/render loop, about 120 frames per second.
const FRAME_INTERVAL: Duration = Duration::from_millis(8);

#[derive(Debug, Parser)]
#[command(name = "psnake", version, about = "Classic Snake in the terminal")]
struct Cli {
    /// JSON settings file. Defaults to the per-user config when present.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Field size in pixels at 16 pixels per cell, e.g. 800x600 or 1024x768.
    #[arg(long, value_parser = parse_resolution)]
    resolution: Option<(u32, u32)>,

    /// Wrap around the field edges instead of dying on them.
    #[arg(long)]
    wall_mode: Option<bool>,

    /// Apples kept on the field at once.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=MAX_APPLES as i64))]
    apples: Option<u8>,

    /// Game speed from 1 (easy) to 3 (hard). Level 3 disables wall mode.
    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=3))]
    difficulty: Option<u8>,

    /// Show frames per second in the HUD.
    #[arg(short, long)]
    fps: bool,

    /// Write diagnostics to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log verbosity when --log-file is set.
    #[arg(long, default_value = "info", value_parser = parse_level)]
    log_level: LevelFilter,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("psnake: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), AppError> {
    if let Some(path) = &cli.log_file {
        init_file_logger(path, cli.log_level)?;
    }

    let config = resolve_config(cli)?;
    let mut engine = SimulationEngine::new(config, SystemClock)?;

    install_panic_hook();
    let mut session = TerminalSession::enter()?;
    let mut input = InputHandler::new();
    let mut frame_rate = FrameRate::new(Instant::now());

    'game: loop {
        while let Some(game_input) = input.poll_input()? {
            if game_input == GameInput::Quit {
                break 'game;
            }
            engine.handle_input(game_input);
        }

        engine.update();

        let info = HudInfo {
            fps: cli.fps.then(|| frame_rate.tick(Instant::now())),
        };
        session.draw(|frame| renderer::render(frame, &engine, &info))?;

        thread::sleep(FRAME_INTERVAL);
    }

    info!("quit with score {}", engine.hud().score);
    Ok(())
}

fn resolve_config(cli: &Cli) -> Result<GameConfig, ConfigError> {
    let base = match &cli.config {
        Some(path) => GameConfig::load(path)?,
        None => GameConfig::load_default()?,
    };

    let difficulty = cli.difficulty.map(Difficulty::try_from).transpose()?;
    let config = base.with_overrides(ConfigOverrides {
        resolution: cli.resolution,
        wall_mode: cli.wall_mode,
        max_apples: cli.apples.map(usize::from),
        difficulty,
    });

    if config.wall_mode && !config.wraps() {
        warn!("wall mode is unavailable on difficulty 3; playing on a bounded field");
    }

    Ok(config)
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse::<LevelFilter>()
        .map_err(|_| format!("unknown log level `{raw}`"))
}

fn install_panic_hook() {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        default_hook(panic_info);
    }));
}
