//! DROPFOUR MCTS - Monte Carlo Tree Search for two-player games
//!
//! This crate provides a rollout-based MCTS over any `GameState`:
//! - Tree policy (UCB1 with random tie-breaking)
//! - Uniform random rollouts
//! - Two-pass backpropagation
//! - Time- or iteration-bounded search with most-visited move selection

pub mod config;
pub mod rollout;
pub mod search;
pub mod tree;

use dropfour_core::{Agent, GameError, GameState};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

pub use config::{MctsConfig, SearchBudget, DEFAULT_EXPLORATION};
pub use rollout::{rollout, RolloutResult};
pub use search::{run_iterations, run_search, SearchResult};
pub use tree::{ucb1, MoveStatistics, Node, NodeId, NodeStats, SearchTree};

/// Error types for search operations
#[derive(Debug, thiserror::Error)]
pub enum MctsError {
    #[error("no move to choose: the root position has no children (already terminal)")]
    EmptyDecision,

    #[error("search budget {0:?} allows no iterations")]
    ZeroBudget(SearchBudget),

    #[error(transparent)]
    Game(#[from] GameError),
}

/// MCTS player.
///
/// Owns the single random source used for selection tie-breaks, rollouts
/// and the final move choice. Every call searches a brand-new tree.
pub struct MctsPlayer {
    config: MctsConfig,
    rng: ChaCha8Rng,
}

impl MctsPlayer {
    pub fn new(config: MctsConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self { config, rng }
    }

    /// Search from `state` and report the full result
    pub fn search<G: GameState>(&mut self, state: &G) -> Result<SearchResult<G>, MctsError> {
        let tree = SearchTree::new(state.clone(), self.config.exploration);
        run_search(tree, &mut self.rng, self.config.budget)
    }

    /// Get best move using MCTS
    pub fn best_move<G: GameState>(&mut self, state: &G) -> Result<G::Move, MctsError> {
        self.search(state).map(|result| result.best_move)
    }
}

impl<G: GameState> Agent<G> for MctsPlayer {
    fn name(&self) -> &str {
        "mcts"
    }

    fn choose_move(&mut self, state: &G) -> anyhow::Result<G::Move> {
        let result = self.search(state)?;
        tracing::debug!(
            "mcts chose {} after {} iterations ({:.0}/s)",
            result.best_move,
            result.iterations,
            result.iterations_per_second()
        );
        Ok(result.best_move)
    }
}

// ============================================================================
// TESTS
// ============================================================================
