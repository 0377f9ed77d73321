//! Player state and progress.
//!
//! This module contains:
//! - Pie: the six category wedges a player must earn
//! - PlayerStats: answer time, correct answers per category, games won
//! - Player: identifier, position, pie and stats

use crate::board::Category;
use crate::hex::HexCoord;
use std::fmt;
use std::time::Duration;

/// Opaque player identifier, as handed out by the user directory
pub type PlayerId = String;

/// Which categories a player has earned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pie {
    wedges: [bool; 6],
}

impl Pie {
    /// Create an empty pie
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the wedge for `category` is earned
    pub fn has(&self, category: Category) -> bool {
        self.wedges[category.index()]
    }

    /// Earn a wedge. Idempotent.
    pub fn mark(&mut self, category: Category) {
        self.wedges[category.index()] = true;
    }

    /// Earn every wedge
    pub fn fill_all(&mut self) {
        self.wedges = [true; 6];
    }

    /// All six wedges earned
    pub fn is_complete(&self) -> bool {
        self.wedges.iter().all(|w| *w)
    }

    /// Number of earned wedges
    pub fn count(&self) -> usize {
        self.wedges.iter().filter(|w| **w).count()
    }

    /// Earned categories, in catalogue order
    pub fn obtained(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| self.has(*c))
    }

    /// Categories still missing, in catalogue order
    pub fn missing(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL.into_iter().filter(|c| !self.has(*c))
    }
}

impl fmt::Display for Pie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.count() == 0 {
            return write!(f, "[empty]");
        }
        let wedges: Vec<String> = self
            .obtained()
            .map(|c| c.display_name().chars().take(3).collect::<String>().to_uppercase())
            .collect();
        write!(f, "[{}]", wedges.join(" "))
    }
}

/// Running statistics for one player
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    /// Total answer time in milliseconds (timed games only)
    pub answer_time_ms: u64,
    /// Correct answers, indexed by [`Category::index`]
    pub correct_by_category: [u32; 6],
    pub games_won: u32,
}

impl PlayerStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the time taken for one answer. Zero durations are ignored.
    pub fn add_answer_time(&mut self, elapsed: Duration) {
        let ms = elapsed.as_millis() as u64;
        if ms > 0 {
            self.answer_time_ms += ms;
        }
    }

    pub fn record_correct(&mut self, category: Category) {
        self.correct_by_category[category.index()] += 1;
    }

    pub fn correct_in(&self, category: Category) -> u32 {
        self.correct_by_category[category.index()]
    }

    pub fn total_correct(&self) -> u32 {
        self.correct_by_category.iter().sum()
    }

    pub fn record_win(&mut self) {
        self.games_won += 1;
    }
}

/// A player in the game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: PlayerId,
    pub position: HexCoord,
    pub pie: Pie,
    pub stats: PlayerStats,
}

impl Player {
    /// Create a new player standing at `position` with an empty pie
    pub fn new(id: impl Into<PlayerId>, position: HexCoord) -> Self {
        Self {
            id: id.into(),
            position,
            pie: Pie::new(),
            stats: PlayerStats::new(),
        }
    }

    pub fn has_complete_pie(&self) -> bool {
        self.pie.is_complete()
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {} pie {}", self.id, self.position, self.pie)
    }
}
