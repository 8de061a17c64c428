//! Search configuration

use std::path::Path;

use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};

/// UCB1 exploration constant used when none is configured
pub const DEFAULT_EXPLORATION: f64 = std::f64::consts::SQRT_2;

/// Default thinking time per move
pub const DEFAULT_TIME_LIMIT_MS: u64 = 1000;

/// When the iteration controller stops
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchBudget {
    /// Wall-clock milliseconds measured from loop start
    TimeMs(u64),
    /// Exact number of completed iterations
    Iterations(u64),
}

impl SearchBudget {
    /// A budget that allows no iterations at all
    pub fn is_zero(&self) -> bool {
        matches!(self, SearchBudget::TimeMs(0) | SearchBudget::Iterations(0))
    }
}

impl Default for SearchBudget {
    fn default() -> Self {
        SearchBudget::TimeMs(DEFAULT_TIME_LIMIT_MS)
    }
}

/// MCTS configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MctsConfig {
    /// Exploration constant C in UCB1
    pub exploration: f64,
    /// Per-move search budget
    pub budget: SearchBudget,
    /// Random seed (None = entropy)
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration: DEFAULT_EXPLORATION,
            budget: SearchBudget::default(),
            seed: None,
        }
    }
}

impl MctsConfig {
    /// Config that thinks for `ms` milliseconds per move
    pub fn time_limited(ms: u64) -> Self {
        Self {
            budget: SearchBudget::TimeMs(ms),
            ..Default::default()
        }
    }

    /// Config that runs exactly `iterations` per move
    pub fn fixed_iterations(iterations: u64) -> Self {
        Self {
            budget: SearchBudget::Iterations(iterations),
            ..Default::default()
        }
    }

    /// Set random seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set exploration constant
    pub fn with_exploration(mut self, exploration: f64) -> Self {
        self.exploration = exploration;
        self
    }

    /// Replace the budget
    pub fn with_budget(mut self, budget: SearchBudget) -> Self {
        self.budget = budget;
        self
    }

    /// Load from JSON file. Missing fields fall back to defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read MCTS config: {}", path.display()))?;
        let config: MctsConfig = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse MCTS config: {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("Invalid MCTS config: {}", path.display()))?;

        Ok(config)
    }

    /// Reject settings the search cannot run with
    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(
            self.exploration.is_finite() && self.exploration >= 0.0,
            "exploration constant must be a non-negative number, got {}",
            self.exploration
        );
        ensure!(
            !self.budget.is_zero(),
            "search budget must allow at least one iteration, got {:?}",
            self.budget
        );
        Ok(())
    }
}
