//! Match command - the engine against the uniform random player
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::{Context, Result};
use clap::Args;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use dropfour_core::{play_game, winning_seat, Connect4, GameState, Outcome, RandomPlayer};
use dropfour_mcts::{MctsConfig, MctsPlayer};

use crate::engine_args::{BoardArgs, EngineArgs};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Number of games to play (the engine alternates between first and second)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    #[command(flatten)]
    pub board: BoardArgs,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// How a game ended from the engine's side
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EngineResult {
    Win,
    Loss,
    Draw,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    engine_first: bool,
    outcome: Outcome,
    result: EngineResult,
    plies: usize,
}

/// Aggregated match results
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    engine_wins: usize,
    random_wins: usize,
    draws: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Build engine configuration and board
/// 2. Play the match (multiple games)
/// 3. Report results
pub fn run(args: MatchArgs, seed: Option<u64>) -> Result<()> {
    let config = args.engine.to_config(None)?;
    let initial = args.board.build()?;

    tracing::info!(
        "Starting match: mcts vs random ({} games, {}x{} board, budget {:?})",
        args.games,
        initial.rows(),
        initial.columns(),
        config.budget
    );

    let results = play_match(&initial, &config, args.games, seed)?;

    report_results(&results, args.json);

    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(
    initial: &Connect4,
    config: &MctsConfig,
    games: usize,
    seed: Option<u64>,
) -> Result<MatchResults> {
    let mut rng = create_rng(seed.or(config.seed));
    let mut records = Vec::with_capacity(games);

    for game_num in 0..games {
        // Alternate seats for fairness
        let engine_first = game_num % 2 == 0;

        let record = play_single_game(initial, config, game_num + 1, engine_first, &mut rng)?;

        tracing::info!(
            "Game {}: {} ({} plies, engine {})",
            record.game_number,
            record.outcome,
            record.plies,
            if record.engine_first { "first" } else { "second" }
        );

        records.push(record);
    }

    Ok(compute_match_statistics(records))
}

/// Report match results
fn report_results(results: &MatchResults, json: bool) {
    if json {
        print_json_results(results);
    } else {
        print_text_results(results);
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game with fresh players seeded from the match RNG
fn play_single_game(
    initial: &Connect4,
    config: &MctsConfig,
    game_number: usize,
    engine_first: bool,
    rng: &mut ChaCha8Rng,
) -> Result<GameRecord> {
    let mut engine = MctsPlayer::new(config.clone().with_seed(rng.gen()));
    let mut random = RandomPlayer::new(rng.gen());

    let record = if engine_first {
        play_game(initial.clone(), &mut engine, &mut random)
    } else {
        play_game(initial.clone(), &mut random, &mut engine)
    }
    .with_context(|| format!("Game {} failed", game_number))?;

    let engine_seat = if engine_first { 0 } else { 1 };
    let result = match winning_seat(record.outcome, initial.current_player()) {
        Some(seat) if seat == engine_seat => EngineResult::Win,
        Some(_) => EngineResult::Loss,
        None => EngineResult::Draw,
    };

    Ok(GameRecord {
        game_number,
        engine_first,
        outcome: record.outcome,
        result,
        plies: record.plies(),
    })
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let count = |wanted: EngineResult| games.iter().filter(|g| g.result == wanted).count();
    let engine_wins = count(EngineResult::Win);
    let random_wins = count(EngineResult::Loss);
    let draws = count(EngineResult::Draw);

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        engine_wins,
        random_wins,
        draws,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Create RNG from seed or random
fn create_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s),
        None => ChaCha8Rng::from_entropy(),
    }
}

fn percent(part: usize, total: usize) -> f32 {
    if total > 0 {
        part as f32 / total as f32 * 100.0
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults) {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        engine_first: bool,
        outcome: String,
        plies: usize,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        total_games: usize,
        engine_wins: usize,
        random_wins: usize,
        draws: usize,
        avg_plies: f32,
        engine_win_rate: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        total_games: total,
        engine_wins: results.engine_wins,
        random_wins: results.random_wins,
        draws: results.draws,
        avg_plies: results.avg_plies,
        engine_win_rate: percent(results.engine_wins, total) / 100.0,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                engine_first: g.engine_first,
                outcome: g.outcome.to_string(),
                plies: g.plies,
            })
            .collect(),
    };

    if let Ok(json) = serde_json::to_string_pretty(&output) {
        println!("{}", json);
    }
}

/// Print results as text
fn print_text_results(results: &MatchResults) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!(
        "Engine wins: {} ({:.1}%)",
        results.engine_wins,
        percent(results.engine_wins, total)
    );
    println!(
        "Random wins: {} ({:.1}%)",
        results.random_wins,
        percent(results.random_wins, total)
    );
    println!("Draws:       {} ({:.1}%)", results.draws, percent(results.draws, total));
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {} in {} plies (engine {})",
            game.game_number,
            game.outcome,
            game.plies,
            if game.engine_first { "first" } else { "second" }
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use dropfour_core::Player;

    fn record(game_number: usize, result: EngineResult, plies: usize) -> GameRecord {
        GameRecord {
            game_number,
            engine_first: game_number % 2 == 1,
            outcome: match result {
                EngineResult::Draw => Outcome::Draw,
                _ => Outcome::Win(Player::One),
            },
            result,
            plies,
        }
    }

    #[test]
    fn test_compute_match_statistics_empty() {
        let results = compute_match_statistics(vec![]);
        assert_eq!(results.engine_wins, 0);
        assert_eq!(results.random_wins, 0);
        assert_eq!(results.draws, 0);
        assert_eq!(results.avg_plies, 0.0);
    }

    #[test]
    fn test_compute_match_statistics() {
        let games = vec![
            record(1, EngineResult::Win, 10),
            record(2, EngineResult::Loss, 20),
            record(3, EngineResult::Win, 30),
            record(4, EngineResult::Draw, 40),
        ];

        let results = compute_match_statistics(games);
        assert_eq!(results.engine_wins, 2);
        assert_eq!(results.random_wins, 1);
        assert_eq!(results.draws, 1);
        assert_eq!(results.avg_plies, 25.0);
    }

    #[test]
    fn test_create_rng_deterministic() {
        let mut rng1 = create_rng(Some(42));
        let mut rng2 = create_rng(Some(42));
        assert_eq!(rng1.gen::<u64>(), rng2.gen::<u64>());
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(1, 4), 25.0);
        assert_eq!(percent(3, 0), 0.0);
    }

    #[test]
    fn test_play_match_engine_beats_random() {
        let config = MctsConfig::fixed_iterations(300);
        let results = play_match(&Connect4::default(), &config, 4, Some(7)).unwrap();

        assert_eq!(results.games.len(), 4);
        assert!(results.games[0].engine_first);
        assert!(!results.games[1].engine_first);
        assert!(results.engine_wins >= 3, "engine won only {} of 4", results.engine_wins);
    }

    #[test]
    fn test_play_match_is_reproducible() {
        let config = MctsConfig::fixed_iterations(50);
        let a = play_match(&Connect4::default(), &config, 2, Some(11)).unwrap();
        let b = play_match(&Connect4::default(), &config, 2, Some(11)).unwrap();

        let summary = |r: &MatchResults| -> Vec<(Outcome, usize)> {
            r.games.iter().map(|g| (g.outcome, g.plies)).collect()
        };
        assert_eq!(summary(&a), summary(&b));
    }
}
