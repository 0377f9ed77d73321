//! Abstract player interaction.
//!
//! The engine never reads or writes a terminal. Every decision a player makes
//! and every status message goes through a [`Prompt`] supplied by the caller.

/// Requests the engine can make of whoever is driving the game.
pub trait Prompt {
    /// Pick one of `options`; returns its index. Implementations must return
    /// an index below `options.len()`.
    fn choose_one(&mut self, title: &str, options: &[String]) -> usize;

    /// Read a free-text answer
    fn read_free_text(&mut self, prompt: &str) -> String;

    /// Read a free-text answer within `seconds`; None on timeout
    fn read_free_text_timed(&mut self, prompt: &str, seconds: u32) -> Option<String>;

    /// Yes/no question
    fn confirm(&mut self, question: &str) -> bool;

    /// Plain status message for the players
    fn notify(&mut self, message: &str);
}
