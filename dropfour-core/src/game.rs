//! Game contract consumed by the search engine

use std::fmt;
use std::hash::Hash;

use serde::{Deserialize, Serialize};

// ============================================================================
// CORE TYPES
// ============================================================================

/// Player marker
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    One = 0,
    Two = 1,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::One => Player::Two,
            Player::Two => Player::One,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::One => write!(f, "player one"),
            Player::Two => write!(f, "player two"),
        }
    }
}

/// Result of a finished game
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Draw,
    Win(Player),
}

impl Outcome {
    /// Winner, if any
    pub fn winner(self) -> Option<Player> {
        match self {
            Outcome::Draw => None,
            Outcome::Win(player) => Some(player),
        }
    }

    /// True only when `player` won
    pub fn favors(self, player: Player) -> bool {
        self.winner() == Some(player)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Draw => write!(f, "draw"),
            Outcome::Win(player) => write!(f, "{} wins", player),
        }
    }
}

/// Precondition violations on the game contract
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("column {column} is out of range (board has {columns} columns)")]
    ColumnOutOfRange { column: usize, columns: usize },

    #[error("column {0} is full")]
    ColumnFull(usize),

    #[error("outcome requested for a position that is not terminal")]
    NotTerminal,

    #[error("board must have at least one row and one column, got {rows}x{columns}")]
    InvalidSize { rows: usize, columns: usize },
}

// ============================================================================
// GAME STATE CONTRACT
// ============================================================================

/// Snapshot of a two-player, zero-sum, perfect-information position.
///
/// The active player is never switched implicitly: `apply_move` places a
/// move for `current_player()` and leaves the marker alone, so callers
/// decide when the turn passes. Clones are independent deep copies.
pub trait GameState: Clone + fmt::Display {
    type Move: Copy + Eq + Hash + fmt::Debug + fmt::Display;

    /// Player whose marker is currently active
    fn current_player(&self) -> Player;

    /// Toggle the active player
    fn switch_player(&mut self);

    /// Legal moves in a stable order. Empty when the position is exhausted.
    fn legal_moves(&self) -> Vec<Self::Move>;

    /// Apply a move for the active player
    fn apply_move(&mut self, mv: Self::Move) -> Result<(), GameError>;

    /// Clone-and-apply
    fn with_move(&self, mv: Self::Move) -> Result<Self, GameError> {
        let mut next = self.clone();
        next.apply_move(mv)?;
        Ok(next)
    }

    fn is_terminal(&self) -> bool;

    /// Final result. Fails with [`GameError::NotTerminal`] on a live position.
    fn outcome(&self) -> Result<Outcome, GameError>;
}

// ============================================================================
// TESTS
// ============================================================================
