mod border;
mod cell;
mod collision;
mod config;
mod food;
mod game;
mod input;
mod object;
mod screen;
mod signal;
mod snake;
mod term;

use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{info, warn};

pub type TermInt = u16;
pub type Coords = (u16, u16);

const LOG_FILE_NAME: &str = "snake.log";

fn main() -> Result<()> {
    let log_path = init_logging();
    info!("Starting snake, logging to {:?}", log_path);

    let config = config::GameConfig::from_env();
    let stop = signal::StopFlag::new();
    signal::install(&stop).context("Failed to install interrupt handlers")?;

    let mut term = term::TermManager::new().context("Failed to query the terminal")?;
    let (width, height) = term.board_size();
    let mut game = game::Game::new(width, height, config, stop)?;

    term.setup().context("Failed to prepare the terminal")?;
    let res = game.run(&mut term);

    // The terminal goes back to normal before anything is printed
    term.restore();
    res?;

    println!("Final score: {}", game.score());
    Ok(())
}

/// Logs go to a file next to the executable, since the game owns the terminal.
fn init_logging() -> Option<PathBuf> {
    let env = env_logger::Env::default().default_filter_or("info");
    let mut builder = env_logger::Builder::from_env(env);
    builder.format_timestamp_micros();

    let path = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(LOG_FILE_NAME)));
    let file = path.as_ref().and_then(|p| File::create(p).ok());

    match file {
        Some(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
            builder.init();
            path
        }
        None => {
            builder.init();
            warn!("Could not open {}, logging to stderr", LOG_FILE_NAME);
            None
        }
    }
}
