//! Studyboard command-line entry point.

use clap::{Parser, Subcommand};
use kurbo::Size;
use std::path::PathBuf;
use std::process::ExitCode;
use studyboard_core::{BoardConfig, Whiteboard};
use studyboard_media::ImageFetcher;

mod commands;
mod error;

use error::CliError;

#[derive(Parser, Debug)]
#[command(name = "studyboard")]
#[command(version, about = "Whiteboard with a focus timer and a music panel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Apply a JSON event script to a fresh board and print the result
    Replay {
        /// JSON array of board events
        events: PathBuf,

        /// Board configuration (TOML)
        #[arg(long, short = 'c', value_name = "FILE")]
        config: Option<PathBuf>,

        /// Grid style: none, lines or dots
        #[arg(long, default_value = "dots")]
        grid: String,

        #[arg(long, default_value_t = 800.0)]
        width: f64,

        #[arg(long, default_value_t = 600.0)]
        height: f64,

        /// Download pasted image URLs
        #[arg(long)]
        fetch_images: bool,

        /// Write the board JSON here instead of stdout
        #[arg(long, short = 'o', value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Search for music and optionally resolve a result's player
    Search {
        query: String,

        /// Resolve the player for this result (1-based)
        #[arg(long, value_name = "N")]
        choose: Option<usize>,

        /// Resolve players through Iframely with this key instead of oEmbed
        #[arg(long, value_name = "KEY")]
        iframely_key: Option<String>,
    },

    /// Show a pomodoro timer after some running time
    Timer {
        /// Duration as mm:ss
        #[arg(default_value = "25:00")]
        duration: String,

        /// Seconds the timer has been running
        #[arg(long, default_value_t = 0)]
        elapsed: u64,
    },
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            eprintln!("studyboard: {err}");
            ExitCode::FAILURE
        }
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, CliError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Replay {
            events,
            config,
            grid,
            width,
            height,
            fetch_images,
            output,
        } => {
            let grid = commands::parse_grid(&grid)?;
            let config = match config {
                Some(path) => BoardConfig::load(path)?,
                None => BoardConfig::default(),
            };
            let events = commands::load_events(&events)?;
            log::info!("Replaying {} event(s)", events.len());

            let mut board = Whiteboard::new(config, Size::new(width, height));
            let fetcher = if fetch_images {
                Some(ImageFetcher::new()?)
            } else {
                None
            };
            let redraws =
                runtime()?.block_on(commands::replay(&mut board, events, fetcher.as_ref()));
            log::info!("{redraws} event(s) changed the frame");

            print!("{}", commands::frame_report(&board, grid)?);
            let json = board.to_json()?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .map_err(|source| CliError::Write { path, source })?,
                None => println!("{json}"),
            }
            Ok(())
        }
        Command::Search {
            query,
            choose,
            iframely_key,
        } => runtime()?.block_on(commands::search(&query, choose, iframely_key)),
        Command::Timer { duration, elapsed } => {
            println!("{}", commands::timer(&duration, elapsed)?);
            Ok(())
        }
    }
}
