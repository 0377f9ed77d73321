//! Outcomes and events of a player's actions.
//!
//! A turn is a sequence of actions (roll, move, resolve the landing). Each
//! action reports how it ended and the events that happened along the way.

use crate::board::Category;
use crate::hex::HexCoord;
use serde::{Deserialize, Serialize};

/// Index of a player in the game's player list
pub type PlayerIndex = usize;

/// How a single action ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// Same player acts again
    Reroll,
    /// Turn passed to the next player
    TurnEnded,
    /// Game over
    Won { winner: PlayerIndex },
}

/// What one action produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionReport {
    pub outcome: ActionOutcome,
    pub events: Vec<GameEvent>,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Everyone rolled to decide who starts
    StartingOrderRolled {
        rolls: Vec<u8>,
        first: PlayerIndex,
    },

    /// Die was rolled for a move
    DiceRolled { player: PlayerIndex, roll: u8 },

    /// Token moved along a straight line
    Moved {
        player: PlayerIndex,
        from: HexCoord,
        to: HexCoord,
        /// The board edge cut the move short
        blocked: bool,
    },

    /// A complete-pie player missed the exact roll to the center
    ExactRollMissed {
        player: PlayerIndex,
        needed: u32,
        rolled: u8,
    },

    /// Landed on the center cell
    ReachedCenter { player: PlayerIndex },

    /// Landed on a re-roll cell
    LandedOnReroll { player: PlayerIndex, at: HexCoord },

    /// A question was put to the player
    QuestionAsked {
        player: PlayerIndex,
        category: Category,
    },

    /// The provider had nothing for this category
    NoQuestionAvailable {
        player: PlayerIndex,
        category: Category,
    },

    AnsweredCorrectly {
        player: PlayerIndex,
        category: Category,
    },

    AnsweredIncorrectly {
        player: PlayerIndex,
        category: Category,
    },

    /// Timed mode deadline passed without an answer
    AnswerTimedOut {
        player: PlayerIndex,
        category: Category,
    },

    /// A wedge was added to the player's pie
    WedgeEarned {
        player: PlayerIndex,
        category: Category,
    },

    /// Landing coordinate had no cell; the action was forfeited
    MissingCell { player: PlayerIndex, at: HexCoord },

    /// Turn passed to the next player
    TurnPassed { from: PlayerIndex, to: PlayerIndex },

    /// Game over
    GameWon { player: PlayerIndex },
}
