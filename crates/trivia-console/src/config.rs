//! Console configuration read from the environment.

use std::path::PathBuf;
use thiserror::Error;
use trivia_core::Board;

const SAVE_PATH_VAR: &str = "TRIVIA_SAVE_PATH";
const QUESTIONS_PATH_VAR: &str = "TRIVIA_QUESTIONS_PATH";
const BOARD_RADIUS_VAR: &str = "TRIVIA_BOARD_RADIUS";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var} must be a whole number from 1 to {}, got {value:?}", Board::MAX_RADIUS)]
    InvalidRadius { var: &'static str, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    /// Where the in-progress game is saved
    pub save_path: PathBuf,
    /// JSON question file
    pub questions_path: PathBuf,
    pub board_radius: u32,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            save_path: PathBuf::from("saved_game.json"),
            questions_path: PathBuf::from("questions.json"),
            board_radius: Board::DEFAULT_RADIUS,
        }
    }
}

impl ConsoleConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = lookup(SAVE_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.save_path = PathBuf::from(path);
        }
        if let Some(path) = lookup(QUESTIONS_PATH_VAR).filter(|p| !p.trim().is_empty()) {
            config.questions_path = PathBuf::from(path);
        }
        if let Some(value) = lookup(BOARD_RADIUS_VAR) {
            config.board_radius = match value.trim().parse::<u32>() {
                Ok(radius) if Board::check_radius(radius).is_ok() => radius,
                _ => {
                    return Err(ConfigError::InvalidRadius {
                        var: BOARD_RADIUS_VAR,
                        value,
                    })
                }
            };
        }

        Ok(config)
    }
}
