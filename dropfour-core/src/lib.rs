//! DROPFOUR Core - game contract and Connect Four
//!
//! This crate provides everything the search engine plays against:
//! - The `GameState` contract and two-player types
//! - A configurable Connect Four board
//! - Baseline players (uniform random, console human)
//! - A game runner that alternates two agents

pub mod board;
pub mod game;
pub mod players;
pub mod runner;

// Re-exports for convenient access
pub use board::{Cell, Connect4, CONNECT, DEFAULT_COLUMNS, DEFAULT_ROWS};
pub use game::{GameError, GameState, Outcome, Player};
pub use players::{parse_move, Agent, HumanPlayer, InputError, RandomPlayer};
pub use runner::{play_game, winning_seat, GameRecord};
