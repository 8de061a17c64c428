//! Shared command-line options for the engine and the board

use std::path::PathBuf;

use anyhow::{ensure, Result};
use clap::Args;

use dropfour_core::{Connect4, DEFAULT_COLUMNS, DEFAULT_ROWS};
use dropfour_mcts::{MctsConfig, SearchBudget};

/// Largest board side accepted from the command line
const MAX_BOARD_SIDE: usize = 32;

#[derive(Args, Clone, Debug)]
pub struct EngineArgs {
    /// JSON file with MCTS settings (flags below override it)
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Thinking time per move in milliseconds
    #[arg(long, conflicts_with = "iterations")]
    pub time_ms: Option<u64>,

    /// Fixed number of search iterations per move
    #[arg(long)]
    pub iterations: Option<u64>,

    /// UCB1 exploration constant
    #[arg(long)]
    pub exploration: Option<f64>,
}

impl EngineArgs {
    /// Merge config file, flags and seed into one engine configuration
    pub fn to_config(&self, seed: Option<u64>) -> Result<MctsConfig> {
        let mut config = match &self.config {
            Some(path) => MctsConfig::load(path)?,
            None => MctsConfig::default(),
        };

        if let Some(ms) = self.time_ms {
            config.budget = SearchBudget::TimeMs(ms);
        }
        if let Some(iterations) = self.iterations {
            config.budget = SearchBudget::Iterations(iterations);
        }
        if let Some(exploration) = self.exploration {
            config.exploration = exploration;
        }
        if seed.is_some() {
            config.seed = seed;
        }

        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Clone, Debug)]
pub struct BoardArgs {
    /// Board height
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: usize,

    /// Board width
    #[arg(long, default_value_t = DEFAULT_COLUMNS)]
    pub columns: usize,
}

impl BoardArgs {
    /// Empty board of the requested size
    pub fn build(&self) -> Result<Connect4> {
        let side = 1..=MAX_BOARD_SIDE;
        ensure!(
            side.contains(&self.rows) && side.contains(&self.columns),
            "board must be between 1x1 and {0}x{0}, got {1}x{2}",
            MAX_BOARD_SIDE,
            self.rows,
            self.columns
        );
        Ok(Connect4::new(self.rows, self.columns)?)
    }
}
