//! DROPFOUR CLI - Command-line interface
//!
//! Commands:
//! - play: Play Connect Four against the MCTS engine
//! - match: Pit the MCTS engine against the random player

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod engine_args;
mod match_cmd;
mod play_cmd;

#[derive(Parser)]
#[command(name = "dropfour")]
#[command(about = "Connect Four against a Monte Carlo Tree Search engine")]
struct Cli {
    /// Random seed for reproducible engine play
    #[arg(long, global = true)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game at the console against the engine
    Play(play_cmd::PlayArgs),
    /// Play the engine against the uniform random player
    Match(match_cmd::MatchArgs),
}

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so they never interleave with the board
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Play(args) => play_cmd::run(args, cli.seed),
        Commands::Match(args) => match_cmd::run(args, cli.seed),
    }
}
