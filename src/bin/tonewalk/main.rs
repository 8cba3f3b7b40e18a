//! tonewalk - walk a canvas of tone nodes from the terminal
//!
//! Run with: cargo run -- --log-file tonewalk.log

mod app;
mod demo;
mod ui;

use std::{fs::File, path::PathBuf, sync::Mutex};

use clap::Parser;
use color_eyre::eyre::{Result as EyreResult, WrapErr};
use tonewalk::Config;

#[derive(Debug, Parser)]
#[command(name = "tonewalk", version, about = "Distributed canvas step-sequencer")]
struct Cli {
    /// TOML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Tempo in beats per minute
    #[arg(short, long)]
    tempo: Option<f64>,

    /// Play every session's tones, not only your own
    #[arg(short, long)]
    multiplayer: bool,

    /// Attenuate tones by canvas distance
    #[arg(short, long)]
    proximity: bool,

    /// Write logs here; the terminal belongs to the UI
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> EyreResult<()> {
    color_eyre::install()?;
    let cli = Cli::parse();

    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .wrap_err_with(|| format!("failed to create log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("tonewalk=debug")),
            )
            .with_writer(Mutex::new(file))
            .with_ansi(false)
            .init();
    }

    let mut config = match &cli.config {
        Some(path) => Config::load(path)
            .wrap_err_with(|| format!("failed to load config {}", path.display()))?,
        None => Config::default(),
    };
    if let Some(tempo) = cli.tempo {
        config = config.tempo(tempo);
    }
    if cli.multiplayer {
        config = config.multiplayer(true);
    }
    if cli.proximity {
        config = config.proximity(true);
    }
    config.validate()?;

    app::run(config, demo::canvas())
}
