//! Hex Trivia - a trivia race across a hexagonal board
//!
//! This crate provides the core game logic:
//! - Hex coordinate system over a square backing grid
//! - Board of category, re-roll and center cells
//! - Straight-line movement driven by a die roll
//! - Player pies and statistics
//! - Turn state machine with crash-safe saves after every action
//!
//! # Architecture
//!
//! The engine does no terminal I/O of its own. Player input goes through the
//! [`Prompt`] trait, questions through [`QuestionProvider`] and dice through
//! [`DiceRoller`], so the same engine runs under a console shell or a test
//! script.
//!
//! # Modules
//!
//! - [`hex`]: Offset and cube coordinates, neighbors and distance
//! - [`board`]: Categories, cells and the hexagonal board
//! - [`movement`]: Linear moves, exact moves to the center
//! - [`game`]: Turn state machine
//! - [`snapshot`] and [`store`]: Saved games
//! - [`countdown`]: Deadline-bounded answers

pub mod actions;
pub mod board;
pub mod countdown;
pub mod dice;
pub mod game;
pub mod hex;
pub mod movement;
pub mod player;
pub mod prompt;
pub mod question;
pub mod snapshot;
pub mod store;

// Re-export commonly used types
pub use actions::{ActionOutcome, ActionReport, GameEvent, PlayerIndex};
pub use board::{Board, BoardError, Category, Cell};
pub use countdown::Countdown;
pub use dice::{DiceRoller, Die};
pub use game::{Game, GameError, GameSettings, TurnIo, TurnPhase};
pub use hex::{CubeCoord, HexCoord, HexDirection};
pub use movement::{ExactMove, LinearMove, MovementError};
pub use player::{Pie, Player, PlayerId, PlayerStats};
pub use prompt::Prompt;
pub use question::{
    Question, QuestionBank, QuestionBankError, QuestionProvider, QuestionRecord, QuestionStatus,
};
pub use snapshot::{GameSnapshot, SnapshotError};
pub use store::{SaveOutcome, SnapshotStore, StoreError};
