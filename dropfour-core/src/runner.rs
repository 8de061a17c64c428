//! Game runner - plays one game between two agents

use anyhow::Context;

use crate::game::{GameState, Outcome, Player};
use crate::players::Agent;

/// Finished game
#[derive(Clone, Debug)]
pub struct GameRecord<G: GameState> {
    /// Final result
    pub outcome: Outcome,
    /// Moves in play order
    pub moves: Vec<G::Move>,
    /// Position after the last move
    pub final_state: G,
}

impl<G: GameState> GameRecord<G> {
    /// Number of half-moves played
    pub fn plies(&self) -> usize {
        self.moves.len()
    }
}

/// Play `initial` to completion.
///
/// `first` moves for the player active in `initial`, `second` for the other.
/// The active player is switched after every non-final move, so whenever an
/// agent is asked to move the state's marker names the player to move.
pub fn play_game<G: GameState>(
    initial: G,
    first: &mut dyn Agent<G>,
    second: &mut dyn Agent<G>,
) -> anyhow::Result<GameRecord<G>> {
    let first_player = initial.current_player();
    let mut state = initial;
    let mut moves = Vec::new();

    while !state.is_terminal() {
        let mover = state.current_player();
        let agent: &mut dyn Agent<G> = if mover == first_player {
            &mut *first
        } else {
            &mut *second
        };

        let mv = agent
            .choose_move(&state)
            .with_context(|| format!("{} failed to choose a move", agent.name()))?;
        state
            .apply_move(mv)
            .with_context(|| format!("{} chose an illegal move {}", agent.name(), mv))?;
        moves.push(mv);

        tracing::debug!("{} ({}) plays {}", agent.name(), mover, mv);

        if !state.is_terminal() {
            state.switch_player();
        }
    }

    let outcome = state.outcome()?;
    Ok(GameRecord {
        outcome,
        moves,
        final_state: state,
    })
}

/// Which seat won, if any
pub fn winning_seat(outcome: Outcome, first_player: Player) -> Option<usize> {
    outcome
        .winner()
        .map(|winner| if winner == first_player { 0 } else { 1 })
}

// ============================================================================
// TESTS
// ============================================================================
