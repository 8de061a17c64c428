//! Rollout (simulation) for MCTS
//!
//! Uniform random playout from a node's position to the end of the game.
//!
//! ## Architecture
//! - Level 3: Single rollout implementation
//! - Level 4: Random move selection

use dropfour_core::{GameError, GameState, Outcome};
use rand::prelude::*;

// ============================================================================
// ROLLOUT RESULT
// ============================================================================

/// Result of a rollout simulation
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RolloutResult {
    /// Final game result
    pub outcome: Outcome,
    /// Number of moves played
    pub moves_played: u32,
}

// ============================================================================
// ROLLOUT (Level 3 - Single Rollout)
// ============================================================================

/// Play random legal moves on a private copy of `state` until the game ends.
///
/// The state marks the player who moved into it, so the turn passes before
/// every move. The caller's state is never touched.
pub fn rollout<G: GameState, R: Rng>(state: &G, rng: &mut R) -> Result<RolloutResult, GameError> {
    let mut current = state.clone();
    let mut moves_played = 0;

    while !current.is_terminal() {
        current.switch_player();

        let legal_moves = current.legal_moves();
        let Some(mv) = select_random_move(&legal_moves, rng) else {
            // A live position without moves breaks the contract; outcome() reports it
            break;
        };

        current.apply_move(mv)?;
        moves_played += 1;
    }

    Ok(RolloutResult {
        outcome: current.outcome()?,
        moves_played,
    })
}

/// Select a random move uniformly from the list
fn select_random_move<M: Copy, R: Rng>(moves: &[M], rng: &mut R) -> Option<M> {
    moves.choose(rng).copied()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dropfour_core::{Connect4, Player};
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_rollout_reaches_terminal() {
        let state = Connect4::default();
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        for _ in 0..20 {
            let result = rollout(&state, &mut rng).unwrap();
            assert!(result.moves_played >= 7);
            assert!(result.moves_played <= 42);
        }
    }

    #[test]
    fn test_rollout_does_not_mutate_input() {
        let mut state = Connect4::default();
        state.apply_move(3).unwrap();
        let before = state.clone();

        let mut rng = ChaCha8Rng::seed_from_u64(1);
        rollout(&state, &mut rng).unwrap();
        assert_eq!(state, before);
    }

    #[test]
    fn test_rollout_seeded_is_deterministic() {
        let state = Connect4::default();
        let mut a = ChaCha8Rng::seed_from_u64(5);
        let mut b = ChaCha8Rng::seed_from_u64(5);

        for _ in 0..10 {
            assert_eq!(rollout(&state, &mut a).unwrap(), rollout(&state, &mut b).unwrap());
        }
    }

    #[test]
    fn test_rollout_of_terminal_state() {
        let mut state = Connect4::default();
        for other in [0, 1, 2] {
            state.apply_move(3).unwrap();
            state.switch_player();
            state.apply_move(other).unwrap();
            state.switch_player();
        }
        state.apply_move(3).unwrap();

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = rollout(&state, &mut rng).unwrap();
        assert_eq!(result.moves_played, 0);
        assert_eq!(result.outcome, Outcome::Win(Player::One));
    }

    #[test]
    fn test_rollout_switches_before_moving() {
        // Single column of height 4 holding three of player one's pieces.
        // The opponent moves first in the rollout, so the column fills
        // without a line and the game is drawn.
        let mut state = Connect4::new(4, 1).unwrap();
        for _ in 0..3 {
            state.apply_move(0).unwrap();
        }
        assert_eq!(state.current_player(), Player::One);

        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let result = rollout(&state, &mut rng).unwrap();
        assert_eq!(result.moves_played, 1);
        assert_eq!(result.outcome, Outcome::Draw);
    }

    #[test]
    fn test_select_random_move() {
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let moves = [2usize, 4, 6];
        for _ in 0..20 {
            let mv = select_random_move(&moves, &mut rng).unwrap();
            assert!(moves.contains(&mv));
        }
        assert_eq!(select_random_move::<usize, _>(&[], &mut rng), None);
    }
}
