//! Connect Four board
//!
//! Pieces fall to the lowest empty cell of a column. Row 0 is the top row,
//! so "lowest" means the largest row index:
//! ```text
//!  0 1 2 3 4 5 6
//! | | | | | | | |   <- row 0
//! | | | | | | | |
//! | | | | | | | |
//! | | | | | | | |
//! | | | |o| | | |
//! | | |x|x| | | |   <- row 5
//! ---------------
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::game::{GameError, GameState, Outcome, Player};

/// Standard board height
pub const DEFAULT_ROWS: usize = 6;

/// Standard board width
pub const DEFAULT_COLUMNS: usize = 7;

/// Pieces in a row needed to win
pub const CONNECT: usize = 4;

/// Line directions as (row step, column step): vertical, horizontal, both diagonals
const DIRECTIONS: [(isize, isize); 4] = [(1, 0), (0, 1), (1, 1), (1, -1)];

/// Contents of a single cell
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    #[default]
    Empty,
    One,
    Two,
}

impl Cell {
    /// Owner of the piece in this cell
    pub fn owner(self) -> Option<Player> {
        match self {
            Cell::Empty => None,
            Cell::One => Some(Player::One),
            Cell::Two => Some(Player::Two),
        }
    }

    fn symbol(self) -> char {
        match self {
            Cell::Empty => ' ',
            Cell::One => 'x',
            Cell::Two => 'o',
        }
    }
}

impl From<Player> for Cell {
    fn from(player: Player) -> Self {
        match player {
            Player::One => Cell::One,
            Player::Two => Cell::Two,
        }
    }
}

/// Connect Four position (clone to branch)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connect4 {
    rows: usize,
    columns: usize,
    /// Row-major cells, row 0 at the top
    cells: Vec<Cell>,
    /// Active player marker
    player: Player,
    /// (row, column) of the most recent drop
    last_move: Option<(usize, usize)>,
}

impl Default for Connect4 {
    fn default() -> Self {
        Self::empty(DEFAULT_ROWS, DEFAULT_COLUMNS)
    }
}

impl Connect4 {
    /// Empty board with player one active.
    ///
    /// Fails with [`GameError::InvalidSize`] when either side is zero.
    pub fn new(rows: usize, columns: usize) -> Result<Self, GameError> {
        if rows == 0 || columns == 0 {
            return Err(GameError::InvalidSize { rows, columns });
        }
        Ok(Self::empty(rows, columns))
    }

    fn empty(rows: usize, columns: usize) -> Self {
        Self {
            rows,
            columns,
            cells: vec![Cell::Empty; rows * columns],
            player: Player::One,
            last_move: None,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Cell contents. Panics if out of bounds.
    pub fn cell(&self, row: usize, column: usize) -> Cell {
        self.cells[self.index(row, column)]
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    #[inline]
    fn index(&self, row: usize, column: usize) -> usize {
        row * self.columns + column
    }

    fn is_column_open(&self, column: usize) -> bool {
        self.cell(0, column) == Cell::Empty
    }

    /// Drop the active player's piece into `column`.
    ///
    /// Returns the row the piece landed in.
    pub fn drop_piece(&mut self, column: usize) -> Result<usize, GameError> {
        if column >= self.columns {
            return Err(GameError::ColumnOutOfRange {
                column,
                columns: self.columns,
            });
        }

        let row = (0..self.rows)
            .rev()
            .find(|&row| self.cell(row, column) == Cell::Empty)
            .ok_or(GameError::ColumnFull(column))?;

        let idx = self.index(row, column);
        self.cells[idx] = Cell::from(self.player);
        self.last_move = Some((row, column));
        Ok(row)
    }

    /// Does the piece at (row, column) complete a line of four or more?
    pub fn check_win_from(&self, row: usize, column: usize) -> bool {
        let piece = self.cell(row, column);
        if piece == Cell::Empty {
            return false;
        }

        DIRECTIONS.iter().any(|&(dr, dc)| {
            1 + self.run_length(row, column, dr, dc, piece)
                + self.run_length(row, column, -dr, -dc, piece)
                >= CONNECT
        })
    }

    /// Count matching pieces stepping away from (row, column), excluding the origin
    fn run_length(&self, row: usize, column: usize, dr: isize, dc: isize, piece: Cell) -> usize {
        let mut count = 0;
        let mut r = row as isize + dr;
        let mut c = column as isize + dc;

        while r >= 0 && r < self.rows as isize && c >= 0 && c < self.columns as isize {
            if self.cell(r as usize, c as usize) != piece {
                break;
            }
            count += 1;
            r += dr;
            c += dc;
        }

        count
    }

    fn last_move_wins(&self) -> bool {
        self.last_move
            .map(|(row, column)| self.check_win_from(row, column))
            .unwrap_or(false)
    }
}

impl GameState for Connect4 {
    type Move = usize;

    fn current_player(&self) -> Player {
        self.player
    }

    fn switch_player(&mut self) {
        self.player = self.player.opponent();
    }

    fn legal_moves(&self) -> Vec<usize> {
        (0..self.columns)
            .filter(|&column| self.is_column_open(column))
            .collect()
    }

    fn apply_move(&mut self, column: usize) -> Result<(), GameError> {
        self.drop_piece(column).map(|_| ())
    }

    fn is_terminal(&self) -> bool {
        if self.last_move.is_none() {
            return false;
        }
        self.last_move_wins() || self.legal_moves().is_empty()
    }

    fn outcome(&self) -> Result<Outcome, GameError> {
        if let Some((row, column)) = self.last_move {
            if self.check_win_from(row, column) {
                if let Some(winner) = self.cell(row, column).owner() {
                    return Ok(Outcome::Win(winner));
                }
            }
            if self.legal_moves().is_empty() {
                return Ok(Outcome::Draw);
            }
        }
        Err(GameError::NotTerminal)
    }
}

impl fmt::Display for Connect4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for column in 0..self.columns {
            write!(f, " {}", column)?;
        }
        writeln!(f)?;

        for row in 0..self.rows {
            write!(f, "|")?;
            for column in 0..self.columns {
                write!(f, "{}|", self.cell(row, column).symbol())?;
            }
            writeln!(f)?;
        }

        write!(f, "{}", "-".repeat(self.columns * 2 + 1))
    }
}

// ============================================================================
// TESTS
// ============================================================================
