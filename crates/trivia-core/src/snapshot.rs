//! Saved-game snapshots and their on-disk format.
//!
//! A [`GameSnapshot`] is a deep copy of everything needed to resume a game.
//! It is written through explicit record types rather than by serializing
//! the live structs, so the file format only changes when these records do.
//! Every file carries a format version.

use crate::board::Category;
use crate::game::{validate_player_ids, GameError, GameSettings};
use crate::hex::HexCoord;
use crate::player::{Pie, Player, PlayerStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("Unsupported snapshot format version {0}")]
    UnsupportedVersion(u32),

    #[error("Snapshot has no players")]
    NoPlayers,

    #[error("Active player {index} out of range for {players} players")]
    ActivePlayerOutOfRange { index: usize, players: usize },

    #[error("Snapshot cannot be restored: {0}")]
    Rejected(#[from] GameError),

    #[error("Snapshot JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything needed to resume a game
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSnapshot {
    pub players: Vec<Player>,
    /// Index of the player whose turn it is
    pub active_player: usize,
    pub settings: GameSettings,
}

impl GameSnapshot {
    /// Encode to the JSON file format
    pub fn encode(&self) -> Result<String, SnapshotError> {
        Ok(serde_json::to_string_pretty(&SnapshotRecord::from(self))?)
    }

    /// Decode and validate the JSON file format
    pub fn decode(text: &str) -> Result<Self, SnapshotError> {
        let record: SnapshotRecord = serde_json::from_str(text)?;
        record.try_into()
    }
}

/// Coordinate as stored on disk, tagged with its addressing scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
enum CoordRecord {
    EvenQ { row: i32, col: i32 },
}

impl From<HexCoord> for CoordRecord {
    fn from(coord: HexCoord) -> Self {
        CoordRecord::EvenQ {
            row: coord.row,
            col: coord.col,
        }
    }
}

impl From<CoordRecord> for HexCoord {
    fn from(record: CoordRecord) -> Self {
        match record {
            CoordRecord::EvenQ { row, col } => HexCoord::new(row, col),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct StatsRecord {
    answer_time_ms: u64,
    correct_by_category: BTreeMap<Category, u32>,
    games_won: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct PlayerRecord {
    id: String,
    position: CoordRecord,
    pie: BTreeMap<Category, bool>,
    stats: StatsRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct SnapshotRecord {
    version: u32,
    players: Vec<PlayerRecord>,
    active_player: usize,
    timed: bool,
    time_limit_secs: u32,
    board_radius: u32,
    #[serde(default)]
    strict_final_question: bool,
}

impl From<&Player> for PlayerRecord {
    fn from(player: &Player) -> Self {
        Self {
            id: player.id.clone(),
            position: player.position.into(),
            pie: Category::ALL
                .into_iter()
                .map(|c| (c, player.pie.has(c)))
                .collect(),
            stats: StatsRecord {
                answer_time_ms: player.stats.answer_time_ms,
                correct_by_category: Category::ALL
                    .into_iter()
                    .map(|c| (c, player.stats.correct_in(c)))
                    .collect(),
                games_won: player.stats.games_won,
            },
        }
    }
}

impl From<PlayerRecord> for Player {
    fn from(record: PlayerRecord) -> Self {
        let mut pie = Pie::new();
        for (category, obtained) in record.pie {
            if obtained {
                pie.mark(category);
            }
        }

        let mut stats = PlayerStats {
            answer_time_ms: record.stats.answer_time_ms,
            games_won: record.stats.games_won,
            ..PlayerStats::default()
        };
        for (category, count) in record.stats.correct_by_category {
            stats.correct_by_category[category.index()] = count;
        }

        Player {
            id: record.id,
            position: record.position.into(),
            pie,
            stats,
        }
    }
}

impl From<&GameSnapshot> for SnapshotRecord {
    fn from(snapshot: &GameSnapshot) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            players: snapshot.players.iter().map(PlayerRecord::from).collect(),
            active_player: snapshot.active_player,
            timed: snapshot.settings.timed,
            time_limit_secs: snapshot.settings.time_limit_secs,
            board_radius: snapshot.settings.board_radius,
            strict_final_question: snapshot.settings.strict_final_question,
        }
    }
}

impl TryFrom<SnapshotRecord> for GameSnapshot {
    type Error = SnapshotError;

    fn try_from(record: SnapshotRecord) -> Result<Self, Self::Error> {
        if record.version == 0 || record.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(record.version));
        }
        if record.players.is_empty() {
            return Err(SnapshotError::NoPlayers);
        }
        if record.active_player >= record.players.len() {
            return Err(SnapshotError::ActivePlayerOutOfRange {
                index: record.active_player,
                players: record.players.len(),
            });
        }

        let settings = GameSettings {
            board_radius: record.board_radius,
            timed: record.timed,
            time_limit_secs: record.time_limit_secs,
            strict_final_question: record.strict_final_question,
        };
        settings.validate()?;
        let ids: Vec<&str> = record.players.iter().map(|p| p.id.as_str()).collect();
        validate_player_ids(&ids)?;

        Ok(GameSnapshot {
            players: record.players.into_iter().map(Player::from).collect(),
            active_player: record.active_player,
            settings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::BoardError;
    use pretty_assertions::assert_eq;

    fn sample() -> GameSnapshot {
        let mut ana = Player::new("ana@example.com", HexCoord::new(0, 3));
        ana.pie.mark(Category::History);
        ana.pie.mark(Category::Entertainment);
        ana.stats.record_correct(Category::History);
        ana.stats.answer_time_ms = 4200;

        let mut ben = Player::new("ben@example.com", HexCoord::new(3, 3));
        ben.pie.fill_all();
        ben.stats.games_won = 2;

        GameSnapshot {
            players: vec![ana, ben],
            active_player: 1,
            settings: GameSettings {
                board_radius: 3,
                timed: true,
                time_limit_secs: 20,
                strict_final_question: false,
            },
        }
    }

    #[test]
    fn test_decode_restores_everything() {
        let snapshot = sample();
        let decoded = GameSnapshot::decode(&snapshot.encode().unwrap()).unwrap();
        assert_eq!(decoded, snapshot);
    }

    #[test]
    fn test_encoding_is_stable() {
        let first = sample().encode().unwrap();
        let second = GameSnapshot::decode(&first).unwrap().encode().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_format_is_tagged_and_versioned() {
        let value: serde_json::Value = serde_json::from_str(&sample().encode().unwrap()).unwrap();
        assert_eq!(value["version"], SNAPSHOT_VERSION);
        assert_eq!(value["players"][0]["position"]["layout"], "even_q");
        assert_eq!(value["players"][0]["pie"]["history"], true);
        assert_eq!(value["players"][0]["pie"]["sports"], false);
        assert_eq!(value["players"][1]["stats"]["games_won"], 2);
    }

    #[test]
    fn test_future_version_rejected() {
        let text = sample().encode().unwrap().replace(
            &format!("\"version\": {SNAPSHOT_VERSION}"),
            "\"version\": 99",
        );
        assert!(matches!(
            GameSnapshot::decode(&text),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn test_active_player_out_of_range_rejected() {
        let mut snapshot = sample();
        snapshot.active_player = 5;
        let text = snapshot.encode().unwrap();
        assert!(matches!(
            GameSnapshot::decode(&text),
            Err(SnapshotError::ActivePlayerOutOfRange { index: 5, players: 2 })
        ));
    }

    #[test]
    fn test_unusable_settings_rejected() {
        let text = sample().encode().unwrap();
        let huge_radius = text.replace("\"board_radius\": 3", "\"board_radius\": 3000000000");
        assert!(matches!(
            GameSnapshot::decode(&huge_radius),
            Err(SnapshotError::Rejected(GameError::Board(BoardError::InvalidRadius(
                3_000_000_000
            ))))
        ));

        let no_time = text.replace("\"time_limit_secs\": 20", "\"time_limit_secs\": 0");
        assert!(matches!(
            GameSnapshot::decode(&no_time),
            Err(SnapshotError::Rejected(GameError::InvalidTimeLimit(0)))
        ));
    }

    #[test]
    fn test_duplicate_players_rejected() {
        let text = sample()
            .encode()
            .unwrap()
            .replace("ben@example.com", "ANA@example.com");
        assert!(matches!(
            GameSnapshot::decode(&text),
            Err(SnapshotError::Rejected(GameError::DuplicatePlayer(_)))
        ));
    }

    #[test]
    fn test_truncated_file_rejected() {
        let text = sample().encode().unwrap();
        let truncated = &text[..text.len() / 2];
        assert!(matches!(
            GameSnapshot::decode(truncated),
            Err(SnapshotError::Json(_))
        ));
    }

    #[test]
    fn test_missing_pie_entries_default_to_not_obtained() {
        let text = r#"{
            "version": 1,
            "players": [{
                "id": "solo",
                "position": {"layout": "even_q", "row": 1, "col": 1},
                "pie": {"sports": true},
                "stats": {"answer_time_ms": 0, "correct_by_category": {}, "games_won": 0}
            }],
            "active_player": 0,
            "timed": false,
            "time_limit_secs": 30,
            "board_radius": 1
        }"#;
        let snapshot = GameSnapshot::decode(text).unwrap();
        let player = &snapshot.players[0];
        assert!(player.pie.has(Category::Sports));
        assert_eq!(player.pie.count(), 1);
        assert!(!snapshot.settings.strict_final_question);
    }
}
