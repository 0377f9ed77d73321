//! Core game state machine.
//!
//! [`Game`] owns the board and the players and runs one action at a time:
//! roll, move, resolve the landing. Collaborators (input, questions, dice and
//! the save file) are passed in through [`TurnIo`] on every call so the engine
//! itself holds no I/O state.

use crate::actions::{ActionOutcome, ActionReport, GameEvent, PlayerIndex};
use crate::board::{Board, BoardError, Category};
use crate::dice::DiceRoller;
use crate::hex::HexCoord;
use crate::movement::{
    exit_center, resolve_exact_move_to_center, resolve_linear_move, LinearMove, MovementError,
};
use crate::player::Player;
use crate::prompt::Prompt;
use crate::question::{Question, QuestionProvider};
use crate::snapshot::GameSnapshot;
use crate::store::{SaveOutcome, SnapshotStore};
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Most players a game accepts
pub const MAX_PLAYERS: usize = 6;

/// Shortest time limit the console offers
pub const MIN_TIME_LIMIT_SECS: u32 = 10;

/// Longest time limit the console offers
pub const MAX_TIME_LIMIT_SECS: u32 = 60;

/// Where the current turn is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Waiting for the current player to start
    AwaitingTurnStart,
    RollingDice,
    Moving,
    ResolvingLanding,
    AnsweringQuestion,
    /// Current player acts again
    RerollGranted,
    TurnEnds,
    /// Game is over
    GameOver { winner: PlayerIndex },
}

/// Errors that stop a game from being built or played
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("A game needs at least one player")]
    NoPlayers,

    #[error("At most 6 players can play, got {0}")]
    TooManyPlayers(usize),

    #[error("Player identifier {0:?} is used twice")]
    DuplicatePlayer(String),

    #[error("Player identifiers cannot be blank")]
    EmptyPlayerId,

    #[error("Invalid time limit of {0} seconds")]
    InvalidTimeLimit(u32),

    #[error("Center cell {0} has no neighbors on the board; check the board radius")]
    IsolatedCenter(HexCoord),

    #[error("Active player {index} out of range for {players} players")]
    InvalidActivePlayer { index: usize, players: usize },

    #[error("Game is over")]
    GameOver,
}

impl From<MovementError> for GameError {
    fn from(err: MovementError) -> Self {
        match err {
            MovementError::IsolatedCenter(center) => GameError::IsolatedCenter(center),
        }
    }
}

/// Game-wide settings chosen at setup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameSettings {
    pub board_radius: u32,
    /// Answers must arrive within `time_limit_secs`
    pub timed: bool,
    pub time_limit_secs: u32,
    /// A wrong answer to the final question ends the turn instead of winning
    pub strict_final_question: bool,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            board_radius: Board::DEFAULT_RADIUS,
            timed: false,
            time_limit_secs: 30,
            strict_final_question: false,
        }
    }
}

impl GameSettings {
    /// Timed game with the given per-question limit
    pub fn timed(time_limit_secs: u32) -> Self {
        Self {
            timed: true,
            time_limit_secs,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), GameError> {
        Board::check_radius(self.board_radius)?;
        if self.timed && self.time_limit_secs == 0 {
            return Err(GameError::InvalidTimeLimit(self.time_limit_secs));
        }
        Ok(())
    }
}

/// Check a roster: 1..=6 non-blank identifiers, unique ignoring case
pub fn validate_player_ids<S: AsRef<str>>(ids: &[S]) -> Result<(), GameError> {
    if ids.is_empty() {
        return Err(GameError::NoPlayers);
    }
    if ids.len() > MAX_PLAYERS {
        return Err(GameError::TooManyPlayers(ids.len()));
    }
    let mut seen = HashSet::new();
    for id in ids {
        let id = id.as_ref().trim();
        if id.is_empty() {
            return Err(GameError::EmptyPlayerId);
        }
        if !seen.insert(id.to_lowercase()) {
            return Err(GameError::DuplicatePlayer(id.to_string()));
        }
    }
    Ok(())
}

/// Collaborators the engine talks to while playing
pub struct TurnIo<'a> {
    pub prompt: &'a mut dyn Prompt,
    pub questions: &'a mut dyn QuestionProvider,
    pub dice: &'a mut dyn DiceRoller,
    /// Saved after every action when present
    pub store: Option<&'a SnapshotStore>,
}

/// How a posed question was answered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Answer {
    Correct,
    Incorrect,
    TimedOut,
}

/// The complete game state
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    players: Vec<Player>,
    current: PlayerIndex,
    settings: GameSettings,
    phase: TurnPhase,
}

impl Game {
    /// Start a new game with every player on the center cell
    pub fn new(player_ids: Vec<String>, settings: GameSettings) -> Result<Self, GameError> {
        settings.validate()?;
        validate_player_ids(&player_ids)?;

        let board = Self::build_board(&settings)?;
        let center = board.center();
        let players = player_ids
            .into_iter()
            .map(|id| Player::new(id.trim(), center))
            .collect();

        let mut game = Self {
            board,
            players,
            current: 0,
            settings,
            phase: TurnPhase::AwaitingTurnStart,
        };
        game.place_all();

        info!(
            players = game.players.len(),
            radius = settings.board_radius,
            timed = settings.timed,
            "New game created"
        );
        Ok(game)
    }

    /// Resume a saved game
    pub fn from_snapshot(snapshot: GameSnapshot) -> Result<Self, GameError> {
        let GameSnapshot {
            mut players,
            active_player,
            settings,
        } = snapshot;

        settings.validate()?;
        validate_player_ids(&players.iter().map(|p| p.id.as_str()).collect::<Vec<_>>())?;
        if active_player >= players.len() {
            return Err(GameError::InvalidActivePlayer {
                index: active_player,
                players: players.len(),
            });
        }

        let board = Self::build_board(&settings)?;
        for player in &mut players {
            if !board.contains(&player.position) {
                warn!(
                    player = %player.id,
                    position = %player.position,
                    "Restored position is off the board, moving player to the center"
                );
                player.position = board.center();
            }
        }

        let mut game = Self {
            board,
            players,
            current: active_player,
            settings,
            phase: TurnPhase::AwaitingTurnStart,
        };
        game.place_all();

        info!(
            players = game.players.len(),
            active = active_player,
            "Game restored"
        );
        Ok(game)
    }

    fn build_board(settings: &GameSettings) -> Result<Board, GameError> {
        let board = Board::new(settings.board_radius)?;
        let center = board.center();
        if board.neighbors_on_board(&center).is_empty() {
            return Err(GameError::IsolatedCenter(center));
        }
        Ok(board)
    }

    fn place_all(&mut self) {
        for player in &self.players {
            self.board.place_player(&player.id, &player.position);
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn current_player_index(&self) -> PlayerIndex {
        self.current
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current]
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn phase(&self) -> TurnPhase {
        self.phase
    }

    pub fn winner(&self) -> Option<PlayerIndex> {
        match self.phase {
            TurnPhase::GameOver { winner } => Some(winner),
            _ => None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.winner().is_some()
    }

    /// Deep copy of the resumable state
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            players: self.players.clone(),
            active_player: self.current,
            settings: self.settings,
        }
    }

    /// Everyone rolls once; the highest roll starts and ties go to the
    /// earlier player. A single player just starts.
    pub fn determine_first_player(&mut self, io: &mut TurnIo<'_>) -> Option<GameEvent> {
        if self.players.len() < 2 {
            self.current = 0;
            return None;
        }

        io.prompt
            .notify("Each player rolls the die. The highest roll goes first.");
        let mut rolls = Vec::with_capacity(self.players.len());
        for player in &self.players {
            let roll = io.dice.roll();
            io.prompt.notify(&format!("{} rolled {}", player.id, roll));
            rolls.push(roll);
        }

        let mut first = 0;
        for (i, roll) in rolls.iter().enumerate() {
            if *roll > rolls[first] {
                first = i;
            }
        }
        if rolls.iter().filter(|r| **r == rolls[first]).count() > 1 {
            io.prompt.notify(&format!(
                "Tie on {}! The first tied player in the list starts.",
                rolls[first]
            ));
        }

        self.current = first;
        io.prompt
            .notify(&format!("{} starts", self.players[first].id));
        info!(first, ?rolls, "Starting player decided");
        self.checkpoint(io);

        Some(GameEvent::StartingOrderRolled { rolls, first })
    }

    /// Play one action for the current player and save the result
    pub fn play_action(&mut self, io: &mut TurnIo<'_>) -> Result<ActionReport, GameError> {
        if self.is_finished() {
            return Err(GameError::GameOver);
        }

        let player = self.current;
        let mut events = Vec::new();

        if self.phase == TurnPhase::RerollGranted {
            io.prompt
                .notify(&format!("{} goes again", self.players[player].id));
        } else {
            io.prompt.notify(&self.board.to_string());
            io.prompt
                .notify(&format!("Turn of {}", self.players[player]));
        }

        let outcome = if self.players[player].position == self.board.center() {
            self.center_action(player, io, &mut events)?
        } else {
            self.board_action(player, io, &mut events)
        };

        self.finish_action(player, outcome, io, &mut events);
        self.checkpoint(io);

        Ok(ActionReport { outcome, events })
    }

    /// Play actions until the turn passes or the game ends
    pub fn play_turn(&mut self, io: &mut TurnIo<'_>) -> Result<Vec<ActionReport>, GameError> {
        let mut reports = Vec::new();
        loop {
            let report = self.play_action(io)?;
            let again = report.outcome == ActionOutcome::Reroll;
            reports.push(report);
            if !again {
                return Ok(reports);
            }
        }
    }

    /// Play until someone wins; returns the winner
    pub fn run(&mut self, io: &mut TurnIo<'_>) -> Result<PlayerIndex, GameError> {
        loop {
            if let Some(winner) = self.winner() {
                return Ok(winner);
            }
            self.play_turn(io)?;
        }
    }

    fn enter(&mut self, phase: TurnPhase) {
        debug!(player = self.current, ?phase, "Turn phase");
        self.phase = phase;
    }

    fn roll(&mut self, player: PlayerIndex, io: &mut TurnIo<'_>, events: &mut Vec<GameEvent>) -> u8 {
        self.enter(TurnPhase::RollingDice);
        let roll = io.dice.roll();
        events.push(GameEvent::DiceRolled { player, roll });
        io.prompt
            .notify(&format!("{} rolled {}", self.players[player].id, roll));
        roll
    }

    /// Action for a player standing on the center cell
    fn center_action(
        &mut self,
        player: PlayerIndex,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> Result<ActionOutcome, GameError> {
        if self.players[player].has_complete_pie() {
            return Ok(self.final_question(player, io, events));
        }

        let roll = self.roll(player, io, events);
        self.enter(TurnPhase::Moving);
        let mv = exit_center(&self.board, u32::from(roll), &mut *io.prompt)?;
        self.apply_move(player, &mv, io, events);
        Ok(self.resolve_landing(player, io, events))
    }

    /// Action for a player anywhere off the center
    fn board_action(
        &mut self,
        player: PlayerIndex,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> ActionOutcome {
        let roll = self.roll(player, io, events);
        self.enter(TurnPhase::Moving);
        let start = self.players[player].position;

        if self.players[player].has_complete_pie() {
            let exact = resolve_exact_move_to_center(&self.board, start, u32::from(roll));
            if !exact.matched {
                events.push(GameEvent::ExactRollMissed {
                    player,
                    needed: exact.needed,
                    rolled: roll,
                });
                io.prompt.notify(&format!(
                    "You need exactly {} to reach the center. You stay where you are.",
                    exact.needed
                ));
                return ActionOutcome::TurnEnded;
            }

            self.move_player(player, exact.end);
            events.push(GameEvent::Moved {
                player,
                from: start,
                to: exact.end,
                blocked: false,
            });
            events.push(GameEvent::ReachedCenter { player });
            io.prompt.notify("Exact roll! You reached the center.");
            return self.final_question(player, io, events);
        }

        let mv = resolve_linear_move(&self.board, start, u32::from(roll), &mut *io.prompt);
        self.apply_move(player, &mv, io, events);
        self.resolve_landing(player, io, events)
    }

    fn apply_move(
        &mut self,
        player: PlayerIndex,
        mv: &LinearMove,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        if mv.direction.is_none() {
            io.prompt.notify("There is nowhere to move.");
            return;
        }

        self.move_player(player, mv.end);
        events.push(GameEvent::Moved {
            player,
            from: mv.start,
            to: mv.end,
            blocked: mv.blocked,
        });

        if mv.blocked {
            io.prompt.notify(&format!(
                "The edge of the board stopped you after {} steps at {}",
                mv.steps_taken, mv.end
            ));
        } else {
            io.prompt.notify(&format!("Moved to {}", mv.end));
        }
    }

    fn move_player(&mut self, player: PlayerIndex, to: HexCoord) {
        let from = self.players[player].position;
        if from == to {
            return;
        }

        self.board.remove_player(&from);
        // Anyone else still on the old cell keeps it marked
        for (i, other) in self.players.iter().enumerate() {
            if i != player && other.position == from {
                self.board.place_player(&other.id, &from);
            }
        }

        self.players[player].position = to;
        if !self.board.place_player(&self.players[player].id, &to) {
            error!(player, position = %to, "Moved onto a coordinate with no cell");
        }
        debug!(player, %from, %to, "Player moved");
    }

    fn resolve_landing(
        &mut self,
        player: PlayerIndex,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> ActionOutcome {
        self.enter(TurnPhase::ResolvingLanding);
        let at = self.players[player].position;

        let landing = self
            .board
            .cell_at(&at)
            .map(|cell| (cell.is_center, cell.is_reroll, cell.category));
        let category = match landing {
            Some((true, _, _)) => {
                events.push(GameEvent::ReachedCenter { player });
                io.prompt
                    .notify("You reached the center. Collect every wedge to try for the win.");
                return ActionOutcome::TurnEnded;
            }
            Some((false, true, _)) => {
                events.push(GameEvent::LandedOnReroll { player, at });
                io.prompt.notify("Re-roll cell! Roll again.");
                return ActionOutcome::Reroll;
            }
            Some((false, false, Some(category))) => category,
            _ => {
                error!(player, position = %at, "Landed on a coordinate with no cell");
                events.push(GameEvent::MissingCell { player, at });
                io.prompt
                    .notify("Something went wrong with that move. The turn is forfeited.");
                return ActionOutcome::TurnEnded;
            }
        };

        self.ask_category_question(player, category, io, events)
    }

    fn ask_category_question(
        &mut self,
        player: PlayerIndex,
        category: Category,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> ActionOutcome {
        self.enter(TurnPhase::AnsweringQuestion);

        let Some(question) = io.questions.next_question(category) else {
            events.push(GameEvent::NoQuestionAvailable { player, category });
            io.prompt.notify(&format!(
                "No {category} questions are available. The wedge is yours, roll again."
            ));
            self.award_wedge(player, category, io, events);
            return ActionOutcome::Reroll;
        };

        match self.pose(player, category, &question, io, events) {
            Answer::Correct => {
                self.players[player].stats.record_correct(category);
                self.award_wedge(player, category, io, events);
                ActionOutcome::Reroll
            }
            Answer::Incorrect | Answer::TimedOut => ActionOutcome::TurnEnded,
        }
    }

    /// The decisive question for a complete pie on the center
    fn final_question(
        &mut self,
        player: PlayerIndex,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> ActionOutcome {
        self.enter(TurnPhase::AnsweringQuestion);

        let labels: Vec<String> = Category::ALL
            .iter()
            .map(|c| c.display_name().to_string())
            .collect();
        let choice = io
            .prompt
            .choose_one("Choose the category of your final question", &labels)
            .min(labels.len() - 1);
        let category = Category::ALL[choice];

        let Some(question) = io.questions.next_question(category) else {
            events.push(GameEvent::NoQuestionAvailable { player, category });
            io.prompt.notify(&format!(
                "No {category} questions are available. Victory is yours!"
            ));
            return ActionOutcome::Won { winner: player };
        };

        match self.pose(player, category, &question, io, events) {
            Answer::Correct => {
                self.players[player].stats.record_correct(category);
                ActionOutcome::Won { winner: player }
            }
            Answer::Incorrect | Answer::TimedOut if self.settings.strict_final_question => {
                ActionOutcome::TurnEnded
            }
            Answer::Incorrect | Answer::TimedOut => {
                io.prompt
                    .notify("Not quite, but a complete pie on the center still takes the game.");
                ActionOutcome::Won { winner: player }
            }
        }
    }

    /// Ask `question`, collect and score the answer
    fn pose(
        &mut self,
        player: PlayerIndex,
        category: Category,
        question: &Question,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) -> Answer {
        events.push(GameEvent::QuestionAsked { player, category });
        let text = format!("[{}] {}", category.display_name(), question.text);

        let answer = if self.settings.timed {
            let started = Instant::now();
            let answer = io
                .prompt
                .read_free_text_timed(&text, self.settings.time_limit_secs);
            if answer.is_some() {
                self.players[player].stats.add_answer_time(started.elapsed());
            }
            answer
        } else {
            Some(io.prompt.read_free_text(&text))
        };

        match answer {
            None => {
                events.push(GameEvent::AnswerTimedOut { player, category });
                io.prompt.notify(&format!(
                    "Time's up! The answer was: {}",
                    question.expected_answer
                ));
                Answer::TimedOut
            }
            Some(given) if question.is_answered_by(&given) => {
                events.push(GameEvent::AnsweredCorrectly { player, category });
                io.prompt.notify("Correct!");
                Answer::Correct
            }
            Some(_) => {
                events.push(GameEvent::AnsweredIncorrectly { player, category });
                io.prompt.notify(&format!(
                    "Incorrect. The answer was: {}",
                    question.expected_answer
                ));
                Answer::Incorrect
            }
        }
    }

    fn award_wedge(
        &mut self,
        player: PlayerIndex,
        category: Category,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        let pie = &mut self.players[player].pie;
        if pie.has(category) {
            return;
        }
        pie.mark(category);
        events.push(GameEvent::WedgeEarned { player, category });
        io.prompt
            .notify(&format!("{category} wedge earned. Pie: {pie}"));
    }

    fn finish_action(
        &mut self,
        player: PlayerIndex,
        outcome: ActionOutcome,
        io: &mut TurnIo<'_>,
        events: &mut Vec<GameEvent>,
    ) {
        match outcome {
            ActionOutcome::Won { winner } => {
                self.players[winner].stats.record_win();
                self.phase = TurnPhase::GameOver { winner };
                events.push(GameEvent::GameWon { player: winner });
                info!(winner = %self.players[winner].id, "Game won");
                io.prompt
                    .notify(&format!("{} wins the game!", self.players[winner].id));
            }
            ActionOutcome::Reroll => {
                self.enter(TurnPhase::RerollGranted);
            }
            ActionOutcome::TurnEnded => {
                self.enter(TurnPhase::TurnEnds);
                let next = (player + 1) % self.players.len();
                self.current = next;
                events.push(GameEvent::TurnPassed {
                    from: player,
                    to: next,
                });
                self.phase = TurnPhase::AwaitingTurnStart;
            }
        }
    }

    /// Persist after an action. Failures are reported, never fatal.
    fn checkpoint(&self, io: &mut TurnIo<'_>) {
        let Some(store) = io.store else {
            return;
        };

        if self.is_finished() {
            if let Err(e) = store.clear() {
                warn!(error = %e, "Could not remove the saved game");
            }
            return;
        }

        match store.save(&self.snapshot()) {
            Ok(SaveOutcome::Atomic) => {}
            Ok(SaveOutcome::Fallback) => {
                io.prompt
                    .notify("Warning: the game was saved without an atomic replace.");
            }
            Err(e) => {
                warn!(error = %e, "Saving the game failed");
                io.prompt
                    .notify(&format!("Could not save the game ({e}). Play continues."));
            }
        }
    }
}
