//! Baseline players the engine is measured against

use std::io::{self, BufRead, Write};

use rand::prelude::*;
use rand_chacha::ChaCha8Rng;

use crate::game::GameState;

/// Anything that can pick a move for the active player
pub trait Agent<G: GameState> {
    /// Short label for logs and reports
    fn name(&self) -> &str;

    /// Choose a move for `state.current_player()`
    fn choose_move(&mut self, state: &G) -> anyhow::Result<G::Move>;
}

// ============================================================================
// RANDOM PLAYER
// ============================================================================

/// Uniformly random legal move
pub struct RandomPlayer {
    rng: ChaCha8Rng,
}

impl RandomPlayer {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl<G: GameState> Agent<G> for RandomPlayer {
    fn name(&self) -> &str {
        "random"
    }

    fn choose_move(&mut self, state: &G) -> anyhow::Result<G::Move> {
        state
            .legal_moves()
            .choose(&mut self.rng)
            .copied()
            .ok_or_else(|| anyhow::anyhow!("no legal moves to choose from"))
    }
}

// ============================================================================
// HUMAN PLAYER
// ============================================================================

/// Rejected console input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("input {0:?} is not an integer")]
    NotAnInteger(String),

    #[error("column {0} is an invalid column")]
    IllegalColumn(i64),
}

/// Parse a column number and check it against the legal set
pub fn parse_move(input: &str, legal: &[usize]) -> Result<usize, InputError> {
    let trimmed = input.trim();
    let value: i64 = trimmed
        .parse()
        .map_err(|_| InputError::NotAnInteger(trimmed.to_string()))?;

    usize::try_from(value)
        .ok()
        .filter(|column| legal.contains(column))
        .ok_or(InputError::IllegalColumn(value))
}

/// Console player: prompts until a legal column is entered
pub struct HumanPlayer<R, W> {
    input: R,
    output: W,
}

impl HumanPlayer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> HumanPlayer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Read lines until one parses to a legal move.
    ///
    /// Bad input is reported and retried; only I/O failures escape.
    pub fn read_move(&mut self, legal: &[usize]) -> io::Result<usize> {
        writeln!(self.output, "Legal moves: {:?}", legal)?;

        loop {
            write!(self.output, "Enter a column number to drop your piece: ")?;
            self.output.flush()?;

            let mut line = String::new();
            if self.input.read_line(&mut line)? == 0 {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "input closed before a legal move was entered",
                ));
            }

            match parse_move(&line, legal) {
                Ok(column) => return Ok(column),
                Err(e) => writeln!(self.output, "Failed: {}. Try again.", e)?,
            }
        }
    }
}

impl<G, R, W> Agent<G> for HumanPlayer<R, W>
where
    G: GameState<Move = usize>,
    R: BufRead,
    W: Write,
{
    fn name(&self) -> &str {
        "human"
    }

    fn choose_move(&mut self, state: &G) -> anyhow::Result<usize> {
        Ok(self.read_move(&state.legal_moves())?)
    }
}

// ============================================================================
// TESTS
// ============================================================================
