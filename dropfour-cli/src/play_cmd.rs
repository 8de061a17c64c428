//! Play command - a human at the console against the engine

use anyhow::{Context, Result};
use clap::Args;

use dropfour_core::{GameState, HumanPlayer, Player};
use dropfour_mcts::MctsPlayer;

use crate::engine_args::{BoardArgs, EngineArgs};

#[derive(Args)]
pub struct PlayArgs {
    /// Let the engine make the first move
    #[arg(long)]
    pub engine_first: bool,

    #[command(flatten)]
    pub board: BoardArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Run play command
pub fn run(args: PlayArgs, seed: Option<u64>) -> Result<()> {
    let config = args.engine.to_config(seed)?;
    let mut state = args.board.build()?;

    tracing::info!(
        "Starting game on a {}x{} board, budget {:?}",
        state.rows(),
        state.columns(),
        config.budget
    );

    let engine_player = if args.engine_first { Player::One } else { Player::Two };
    let mut engine = MctsPlayer::new(config);
    let mut human = HumanPlayer::stdio();

    while !state.is_terminal() {
        println!("\n{}\n", state);

        let mv = if state.current_player() == engine_player {
            let result = engine.search(&state)?;
            println!(
                "Engine plays column {} ({} iterations, {} nodes)",
                result.best_move,
                result.iterations,
                result.tree.len()
            );
            result.best_move
        } else {
            human
                .read_move(&state.legal_moves())
                .context("Failed to read a move from the console")?
        };

        state
            .apply_move(mv)
            .with_context(|| format!("Column {} could not be played", mv))?;

        if !state.is_terminal() {
            state.switch_player();
        }
    }

    println!("\n{}\n", state);
    let outcome = state.outcome()?;
    match outcome.winner() {
        Some(winner) if winner == engine_player => println!("Game over: the engine wins."),
        Some(_) => println!("Game over: you win!"),
        None => println!("Game over: draw."),
    }

    Ok(())
}
