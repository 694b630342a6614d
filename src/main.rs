//! CRUSHRS - headless autoplay
//!
//! Plays one session with the engine's own hints and prints the result.
//! Logs go to a per-session file in the temp directory.

use crushrs::score::{MoveOutcome, Score};
use crushrs::settings::Settings;
use crushrs::{EngineError, Game};
use std::thread;
use std::time::Duration;

/// Get the crushrs temp directory, creating it if needed
fn crushrs_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("crushrs");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn main() {
    // Generate session ID for this instance
    let session_id: u32 = rand::random();

    let log_dir = crushrs_temp_dir();
    let log_file = format!("{:08x}.log", session_id);

    // Setup tracing to log file
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("crushrs=debug".parse().expect("valid directive")),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "CRUSHRS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let settings = Settings::load();

    if let Err(e) = run(&settings) {
        tracing::error!("Session aborted: {}", e);
        eprintln!("crushrs: {}", e);
        std::process::exit(1);
    }
}

fn run(settings: &Settings) -> Result<(), EngineError> {
    let mut game = Game::from_settings(settings)?;
    let mut score = Score::new(
        settings.session.moves,
        settings.session.target_score,
        settings.session.target_step,
    );
    let delay = Duration::from_millis(settings.engine.pass_delay_ms);

    println!("Seed: {}", game.source().seed());
    println!("Starting board:\n{}", game.board());

    while !score.is_out_of_moves() {
        let (a, b) = game.next_hint(settings.engine.reseed_limit, settings.engine.seed_attempts)?;

        let result = game.attempt_move_with(a, b, |report| {
            tracing::debug!(pass = report.pass, cleared = report.cleared, "cascade pass");
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        })?;

        if settings.output.json {
            match serde_json::to_string(&result) {
                Ok(line) => println!("{}", line),
                Err(e) => tracing::warn!("Could not encode turn: {}", e),
            }
        } else {
            println!(
                "Swap {} <-> {}: cleared {} in {} pass(es)",
                a, b, result.total_cleared, result.passes
            );
        }

        if let MoveOutcome::LevelUp(level) = score.record(&result) {
            println!("Level {} reached!", level);
        }
    }

    println!("\nFinal board:\n{}", game.board());
    println!("Final Score: {}", score.points);
    println!(
        "Level: {} | Moves: {} | Best chain: {}",
        score.level, score.turns, score.best_chain
    );
    Ok(())
}
