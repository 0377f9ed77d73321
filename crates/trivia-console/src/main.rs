//! Hex Trivia console game.

use anyhow::{bail, Context};
use std::io::{self, Write};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use trivia_core::game::{
    validate_player_ids, MAX_PLAYERS, MAX_TIME_LIMIT_SECS, MIN_TIME_LIMIT_SECS,
};
use trivia_core::{Die, Game, GameSettings, Prompt, QuestionBank, SnapshotStore, TurnIo};

mod config;
mod console;

use config::ConsoleConfig;
use console::ConsolePrompt;

fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let config = ConsoleConfig::from_env()?;
    info!(?config, "Starting Hex Trivia");

    let store = SnapshotStore::new(&config.save_path);
    let mut questions = QuestionBank::load(&config.questions_path)
        .with_context(|| format!("loading {}", config.questions_path.display()))?;
    let mut prompt = ConsolePrompt::stdio().context("starting the input reader")?;
    let mut dice = Die::new();

    let (mut game, resumed) = match resume(&store, &mut prompt)? {
        Some(game) => (game, true),
        None => (new_game(&config, &mut prompt)?, false),
    };

    if !resumed {
        let mut io = TurnIo {
            prompt: &mut prompt,
            questions: &mut questions,
            dice: &mut dice,
            store: Some(&store),
        };
        game.determine_first_player(&mut io);
    }

    let winner = loop {
        if let Some(winner) = game.winner() {
            break winner;
        }
        let mut io = TurnIo {
            prompt: &mut prompt,
            questions: &mut questions,
            dice: &mut dice,
            store: Some(&store),
        };
        game.play_action(&mut io)?;

        if prompt.input_closed() {
            info!("Input closed, leaving the game saved");
            prompt.notify("\nInput closed. The game is saved; start again to resume it.");
            return Ok(());
        }
    };

    print_results(&game, winner, &mut io::stdout())?;
    Ok(())
}

const UNUSABLE_SAVE: &str = "The saved game could not be read. Starting a new game.";

/// Offer to continue a saved game. A save that cannot be restored means a
/// fresh game, never an exit.
fn resume(store: &SnapshotStore, prompt: &mut dyn Prompt) -> anyhow::Result<Option<Game>> {
    if !store.exists() || !prompt.confirm("A saved game was found. Resume it?") {
        return Ok(None);
    }

    match store.load()?.map(Game::from_snapshot) {
        Some(Ok(game)) => Ok(Some(game)),
        Some(Err(e)) => {
            warn!(path = %store.path().display(), error = %e, "Saved game cannot be restored");
            prompt.notify(UNUSABLE_SAVE);
            Ok(None)
        }
        None => {
            prompt.notify(UNUSABLE_SAVE);
            Ok(None)
        }
    }
}

fn new_game(config: &ConsoleConfig, prompt: &mut ConsolePrompt) -> anyhow::Result<Game> {
    let counts: Vec<String> = (1..=MAX_PLAYERS).map(|n| n.to_string()).collect();
    let count = prompt.choose_one("How many players?", &counts) + 1;

    let mut ids: Vec<String> = Vec::with_capacity(count);
    while ids.len() < count {
        let id = prompt.read_free_text(&format!("Identifier for player {}", ids.len() + 1));
        if prompt.input_closed() {
            bail!("input closed during game setup");
        }
        let mut candidate = ids.clone();
        candidate.push(id.trim().to_string());
        match validate_player_ids(&candidate) {
            Ok(()) => ids = candidate,
            Err(e) => prompt.notify(&e.to_string()),
        }
    }

    let mut settings = GameSettings {
        board_radius: config.board_radius,
        ..GameSettings::default()
    };
    if prompt.confirm("Play with a time limit per question?") {
        settings.timed = true;
        settings.time_limit_secs = loop {
            let text = prompt.read_free_text(&format!(
                "Seconds per question ({MIN_TIME_LIMIT_SECS}-{MAX_TIME_LIMIT_SECS})"
            ));
            if prompt.input_closed() {
                bail!("input closed during game setup");
            }
            match text.trim().parse::<u32>() {
                Ok(secs) if (MIN_TIME_LIMIT_SECS..=MAX_TIME_LIMIT_SECS).contains(&secs) => {
                    break secs
                }
                _ => prompt.notify("Please enter a number in range."),
            }
        };
    }

    Ok(Game::new(ids, settings)?)
}

fn print_results(game: &Game, winner: usize, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "\nGame over. {} wins!\n", game.players()[winner].id)?;
    for player in game.players() {
        let stats = &player.stats;
        writeln!(
            out,
            "{}: pie {}, {} correct answers, {:.1}s answering, {} games won",
            player.id,
            player.pie,
            stats.total_correct(),
            stats.answer_time_ms as f64 / 1000.0,
            stats.games_won
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use trivia_core::GameSnapshot;

    /// Says yes to resuming and records every message
    #[derive(Default)]
    struct Resumer {
        notes: Vec<String>,
    }

    impl Prompt for Resumer {
        fn choose_one(&mut self, _title: &str, _options: &[String]) -> usize {
            0
        }
        fn read_free_text(&mut self, _prompt: &str) -> String {
            String::new()
        }
        fn read_free_text_timed(&mut self, _prompt: &str, _seconds: u32) -> Option<String> {
            None
        }
        fn confirm(&mut self, _question: &str) -> bool {
            true
        }
        fn notify(&mut self, message: &str) {
            self.notes.push(message.to_string());
        }
    }

    fn saved_game(dir: &tempfile::TempDir) -> (SnapshotStore, String) {
        let store = SnapshotStore::new(dir.path().join("saved_game.json"));
        let game = Game::new(
            vec!["ana".to_string(), "ben".to_string()],
            GameSettings::timed(20),
        )
        .unwrap();
        store.save(&game.snapshot()).unwrap();
        let text = fs::read_to_string(store.path()).unwrap();
        (store, text)
    }

    #[test]
    fn test_resume_restores_saved_game() {
        let dir = tempfile::tempdir().unwrap();
        let (store, text) = saved_game(&dir);
        let mut prompt = Resumer::default();

        let game = resume(&store, &mut prompt).unwrap().unwrap();
        assert_eq!(Some(game.snapshot()), GameSnapshot::decode(&text).ok());
        assert!(prompt.notes.is_empty());
    }

    #[test]
    fn test_unrestorable_save_starts_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let (store, text) = saved_game(&dir);
        let broken = [
            text.replace("\"time_limit_secs\": 20", "\"time_limit_secs\": 0"),
            text.replace("\"board_radius\": 3", "\"board_radius\": 3000000000"),
            text.replace("\"ben\"", "\"ANA\""),
        ];

        for contents in broken {
            fs::write(store.path(), contents).unwrap();
            let mut prompt = Resumer::default();
            assert!(resume(&store, &mut prompt).unwrap().is_none());
            assert_eq!(prompt.notes, vec![UNUSABLE_SAVE.to_string()]);
        }
    }
}
