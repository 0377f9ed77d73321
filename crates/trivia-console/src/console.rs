//! Terminal implementation of the engine's [`Prompt`].
//!
//! A single background thread pumps stdin lines into a channel for the life
//! of the process; it is never joined. Every read pulls from that channel,
//! and timed reads poll it through a [`Countdown`]. Lines typed ahead of a
//! question are discarded before it is asked.

use std::io::{self, BufRead, Stdout, Write};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};
use trivia_core::{Countdown, Prompt};

pub struct ConsolePrompt<W: Write = Stdout> {
    lines: Receiver<String>,
    out: W,
    /// Input reached end of file
    closed: bool,
}

impl ConsolePrompt<Stdout> {
    /// Prompt on stdin/stdout
    pub fn stdio() -> io::Result<Self> {
        let (tx, rx) = mpsc::channel();
        thread::Builder::new()
            .name("stdin-reader".into())
            .spawn(move || {
                for line in io::stdin().lock().lines() {
                    match line {
                        Ok(line) => {
                            if tx.send(line).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!(error = %e, "Reading stdin failed");
                            break;
                        }
                    }
                }
                debug!("Stdin closed");
            })?;
        Ok(Self::new(rx, io::stdout()))
    }
}

impl<W: Write> ConsolePrompt<W> {
    pub fn new(lines: Receiver<String>, out: W) -> Self {
        Self {
            lines,
            out,
            closed: false,
        }
    }

    /// Input has reached end of file
    pub fn input_closed(&self) -> bool {
        self.closed
    }

    fn say(&mut self, text: &str) {
        if writeln!(self.out, "{text}").and_then(|_| self.out.flush()).is_err() {
            debug!("Console output unavailable");
        }
    }

    fn ask(&mut self, text: &str) {
        if write!(self.out, "{text} > ").and_then(|_| self.out.flush()).is_err() {
            debug!("Console output unavailable");
        }
    }

    fn discard_typed_ahead(&mut self) {
        while self.lines.try_recv().is_ok() {}
    }

    fn read_line(&mut self) -> Option<String> {
        if self.closed {
            return None;
        }
        match self.lines.recv() {
            Ok(line) => Some(line),
            Err(_) => {
                self.closed = true;
                None
            }
        }
    }
}

impl<W: Write> Prompt for ConsolePrompt<W> {
    fn choose_one(&mut self, title: &str, options: &[String]) -> usize {
        self.discard_typed_ahead();
        self.say(title);
        for (i, option) in options.iter().enumerate() {
            self.say(&format!("  {}. {}", i + 1, option));
        }

        loop {
            self.ask(&format!("Choose 1-{}", options.len()));
            let Some(line) = self.read_line() else {
                return 0;
            };
            match line.trim().parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return n - 1,
                _ => self.say("Please enter one of the listed numbers."),
            }
        }
    }

    fn read_free_text(&mut self, prompt: &str) -> String {
        self.discard_typed_ahead();
        self.ask(prompt);
        self.read_line().unwrap_or_default()
    }

    fn read_free_text_timed(&mut self, prompt: &str, seconds: u32) -> Option<String> {
        self.discard_typed_ahead();
        self.say(&format!("You have {seconds} seconds."));
        self.ask(prompt);
        if self.closed {
            return None;
        }

        let mut last_shown = u64::from(seconds);
        let lines = &self.lines;
        let out = &mut self.out;
        let answer = Countdown::new(seconds).wait(lines, |left: Duration| {
            let secs = left.as_secs() + u64::from(left.subsec_nanos() > 0);
            if secs < last_shown && (secs % 10 == 0 || secs <= 5) {
                last_shown = secs;
                let _ = write!(out, "[{secs}s] ");
                let _ = out.flush();
            }
        });

        // No answer may also mean stdin hung up mid-question
        if answer.is_none() && matches!(self.lines.try_recv(), Err(TryRecvError::Disconnected)) {
            self.closed = true;
        }
        answer
    }

    fn confirm(&mut self, question: &str) -> bool {
        self.discard_typed_ahead();
        loop {
            self.ask(&format!("{question} (y/n)"));
            let Some(line) = self.read_line() else {
                return false;
            };
            match line.trim().to_lowercase().as_str() {
                "y" | "yes" => return true,
                "n" | "no" => return false,
                _ => self.say("Please answer y or n."),
            }
        }
    }

    fn notify(&mut self, message: &str) {
        self.say(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc::Sender;

    fn console() -> (Sender<String>, ConsolePrompt<Vec<u8>>) {
        let (tx, rx) = mpsc::channel();
        (tx, ConsolePrompt::new(rx, Vec::new()))
    }

    fn output(prompt: &ConsolePrompt<Vec<u8>>) -> String {
        String::from_utf8_lossy(&prompt.out).into_owned()
    }

    fn options(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_choose_one_retries_until_valid() {
        let (tx, mut prompt) = console();
        let opts = options(&["North", "South"]);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            for line in ["x", "9", " 2 "] {
                tx.send(line.to_string()).unwrap();
            }
        });
        assert_eq!(prompt.choose_one("Direction", &opts), 1);
        handle.join().unwrap();
        assert!(output(&prompt).contains("  2. South"));
        assert!(output(&prompt).contains("Please enter one of the listed numbers."));
    }

    #[test]
    fn test_closed_input_falls_back() {
        let (tx, mut prompt) = console();
        drop(tx);
        assert_eq!(prompt.choose_one("Pick", &options(&["a", "b"])), 0);
        assert!(!prompt.confirm("Resume?"));
        assert_eq!(prompt.read_free_text("Answer"), "");
        assert_eq!(prompt.read_free_text_timed("Answer", 5), None);
        assert!(prompt.input_closed());
    }

    #[test]
    fn test_timed_read_notices_closed_input() {
        let (tx, mut prompt) = console();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            drop(tx);
        });
        assert_eq!(prompt.read_free_text_timed("Capital of Peru?", 5), None);
        handle.join().unwrap();
        assert!(prompt.input_closed());
    }

    #[test]
    fn test_timed_out_read_leaves_input_open() {
        let (_tx, mut prompt) = console();
        assert_eq!(prompt.read_free_text_timed("Capital of Peru?", 1), None);
        assert!(!prompt.input_closed());
    }

    #[test]
    fn test_typed_ahead_lines_are_discarded() {
        let (tx, mut prompt) = console();
        tx.send("stale".to_string()).unwrap();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            tx.send("fresh".to_string()).unwrap();
        });
        assert_eq!(prompt.read_free_text("Answer"), "fresh");
        handle.join().unwrap();
    }

    #[test]
    fn test_timed_read_gets_answer() {
        let (tx, mut prompt) = console();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            tx.send("Lima".to_string()).unwrap();
            tx
        });
        assert_eq!(
            prompt.read_free_text_timed("Capital of Peru?", 5).as_deref(),
            Some("Lima")
        );
        drop(handle.join().unwrap());
    }

    #[test]
    fn test_timed_read_times_out() {
        let (_tx, mut prompt) = console();
        assert_eq!(prompt.read_free_text_timed("Capital of Peru?", 1), None);
        assert!(output(&prompt).contains("You have 1 seconds."));
    }

    #[test]
    fn test_confirm() {
        let (tx, mut prompt) = console();
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            for line in ["maybe", "YES"] {
                tx.send(line.to_string()).unwrap();
            }
        });
        assert!(prompt.confirm("Resume?"));
        handle.join().unwrap();
    }
}
