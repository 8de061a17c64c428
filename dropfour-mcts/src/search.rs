//! MCTS Search Loop
//!
//! Implements the core MCTS algorithm:
//! 1. Selection - Use cached UCB1 scores to traverse tree
//! 2. Expansion - Attach all children of a visited leaf
//! 3. Simulation - Rollout to terminal state
//! 4. Backpropagation - Update statistics, then scores
//!
//! ## Architecture
//! - Level 2: Search loop coordination
//! - Level 3: Individual MCTS phases
//! - Level 4: Utilities

use std::time::{Duration, Instant};

use dropfour_core::{GameError, GameState, Outcome};
use rand::Rng;

use crate::config::SearchBudget;
use crate::rollout::rollout;
use crate::tree::{MoveStatistics, NodeId, SearchTree};
use crate::MctsError;

// ============================================================================
// SEARCH RESULT
// ============================================================================

/// Result of MCTS search
#[derive(Clone, Debug)]
pub struct SearchResult<G: GameState> {
    /// Recommended move (most visited root child)
    pub best_move: G::Move,
    /// Completed select/expand/simulate/backpropagate cycles
    pub iterations: u64,
    /// Wall-clock time spent iterating
    pub elapsed: Duration,
    /// Statistics for each root move
    pub move_stats: Vec<MoveStatistics<G::Move>>,
    /// The final tree after search
    pub tree: SearchTree<G>,
}

impl<G: GameState> SearchResult<G> {
    /// Get all moves sorted by visits
    pub fn moves_by_visits(&self) -> Vec<(G::Move, u32)> {
        let mut moves: Vec<_> = self.move_stats.iter().map(|s| (s.mv, s.visits)).collect();
        moves.sort_by(|a, b| b.1.cmp(&a.1));
        moves
    }

    /// Iterations per second over the search
    pub fn iterations_per_second(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.iterations as f64 / secs
        } else {
            0.0
        }
    }
}

// ============================================================================
// SEARCH LOOP (Level 2 - Main Coordination)
// ============================================================================

/// Run MCTS search on a fresh tree and pick the move.
///
/// Fails with [`MctsError::ZeroBudget`] before searching if the budget allows
/// no iterations, and with [`MctsError::EmptyDecision`] if the root position
/// is terminal.
pub fn run_search<G: GameState, R: Rng>(
    mut tree: SearchTree<G>,
    rng: &mut R,
    budget: SearchBudget,
) -> Result<SearchResult<G>, MctsError> {
    if budget.is_zero() {
        return Err(MctsError::ZeroBudget(budget));
    }

    let start = Instant::now();
    let iterations = run_iterations(&mut tree, rng, budget)?;
    let elapsed = start.elapsed();

    let best_move = tree.best_move(rng)?;
    let move_stats = tree.move_statistics();

    tracing::debug!(
        "MCTS: {} iterations in {:.1}ms, {} nodes, best move {}",
        iterations,
        elapsed.as_secs_f64() * 1000.0,
        tree.len(),
        best_move
    );

    Ok(SearchResult {
        best_move,
        iterations,
        elapsed,
        move_stats,
        tree,
    })
}

/// Iteration controller.
///
/// Runs complete iterations until the budget is spent and returns how many
/// completed. The deadline is only checked between iterations, so a timed
/// search can overrun by up to one iteration.
pub fn run_iterations<G: GameState, R: Rng>(
    tree: &mut SearchTree<G>,
    rng: &mut R,
    budget: SearchBudget,
) -> Result<u64, GameError> {
    let mut iterations = 0u64;

    match budget {
        SearchBudget::TimeMs(ms) => {
            let limit = Duration::from_millis(ms);
            let start = Instant::now();
            while start.elapsed() < limit {
                tree.run_iteration(rng)?;
                iterations += 1;
            }
        }
        SearchBudget::Iterations(count) => {
            while iterations < count {
                tree.run_iteration(rng)?;
                iterations += 1;
            }
        }
    }

    Ok(iterations)
}

// ============================================================================
// PHASES (Level 3)
// ============================================================================

impl<G: GameState> SearchTree<G> {
    /// Single MCTS iteration.
    ///
    /// Returns the node that was simulated.
    pub fn run_iteration<R: Rng>(&mut self, rng: &mut R) -> Result<NodeId, GameError> {
        // Phase 1: Selection
        let leaf_id = self.select(rng);

        // Phase 2: Expansion
        let simulation_node = self.expand(leaf_id)?;

        // Phase 3: Simulation
        let outcome = self.simulate(simulation_node, rng)?;

        // Phase 4: Backpropagation
        self.backpropagate(simulation_node, outcome);

        Ok(simulation_node)
    }

    /// Roll out a copy of the node's position; tree data is not modified
    pub fn simulate<R: Rng>(&self, node_id: NodeId, rng: &mut R) -> Result<Outcome, GameError> {
        rollout(&self.get(node_id).state, rng).map(|result| result.outcome)
    }
}

// ============================================================================
// TESTS
// ============================================================================
