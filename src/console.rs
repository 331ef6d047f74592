//! Operator I/O: prompts, answers and the bounded-wait read used for mode selection.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crossterm::tty::IsTty;
use tracing::warn;

/// Whoever answers prompts during a run.
pub trait Operator {
    /// Whether a human is present to answer prompts.
    fn is_interactive(&self) -> bool;

    /// Show a line of output.
    fn say(&mut self, line: &str);

    /// Ask a question. `None` means no answer is available (input closed or
    /// non-interactive), callers apply their default.
    fn ask(&mut self, prompt: &str) -> Option<String>;
}

/// Result of a read bounded by a timeout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimedAnswer {
    Line(String),
    TimedOut,
    Closed,
}

/// Wait up to `timeout` for the next line from `lines`.
pub fn read_line_within(lines: &Receiver<String>, timeout: Duration) -> TimedAnswer {
    match lines.recv_timeout(timeout) {
        Ok(line) => TimedAnswer::Line(line),
        Err(RecvTimeoutError::Timeout) => TimedAnswer::TimedOut,
        Err(RecvTimeoutError::Disconnected) => TimedAnswer::Closed,
    }
}

/// Terminal-backed operator.
///
/// Stdin is drained by one background thread into a channel so that every
/// read, timed or not, goes through the same queue and a timed-out prompt
/// never leaves a stray pending read behind.
pub struct Console {
    lines: Receiver<String>,
    interactive: bool,
}

impl Console {
    pub fn stdin() -> Self {
        let interactive = io::stdin().is_tty();
        let (tx, rx) = mpsc::channel();
        if interactive {
            thread::spawn(move || {
                let stdin = io::stdin();
                for line in stdin.lock().lines() {
                    let Ok(line) = line else {
                        break;
                    };
                    if tx.send(line).is_err() {
                        break;
                    }
                }
            });
        }
        Self {
            lines: rx,
            interactive,
        }
    }

    pub fn from_receiver(lines: Receiver<String>, interactive: bool) -> Self {
        Self { lines, interactive }
    }

    /// Prompt and wait at most `timeout`; `default` stands in for silence.
    pub fn timed_choice(&mut self, prompt: &str, timeout: Duration, default: &str) -> String {
        if !self.interactive {
            return default.to_string();
        }
        print_prompt(prompt);
        match read_line_within(&self.lines, timeout) {
            TimedAnswer::Line(line) => line,
            TimedAnswer::TimedOut => {
                println!();
                println!("No input provided. Default option {default} selected.");
                default.to_string()
            }
            TimedAnswer::Closed => default.to_string(),
        }
    }
}

impl Operator for Console {
    fn is_interactive(&self) -> bool {
        self.interactive
    }

    fn say(&mut self, line: &str) {
        println!("{line}");
    }

    fn ask(&mut self, prompt: &str) -> Option<String> {
        if !self.interactive {
            return None;
        }
        print_prompt(prompt);
        self.lines.recv().ok()
    }
}

fn print_prompt(prompt: &str) {
    let mut stdout = io::stdout();
    if let Err(err) = write!(stdout, "{prompt}").and_then(|()| stdout.flush()) {
        warn!("prompt could not be written: {err}");
    }
}

/// Operator for unattended runs: prints nothing and answers nothing.
#[derive(Debug, Default, Clone, Copy)]
pub struct Unattended;

impl Operator for Unattended {
    fn is_interactive(&self) -> bool {
        false
    }

    fn say(&mut self, _line: &str) {}

    fn ask(&mut self, _prompt: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timed_read_returns_queued_line() {
        let (tx, rx) = mpsc::channel();
        tx.send("2".to_string()).unwrap();
        assert_eq!(
            read_line_within(&rx, Duration::from_millis(10)),
            TimedAnswer::Line("2".to_string())
        );
    }

    #[test]
    fn timed_read_times_out() {
        let (_tx, rx) = mpsc::channel::<String>();
        assert_eq!(
            read_line_within(&rx, Duration::from_millis(20)),
            TimedAnswer::TimedOut
        );
    }

    #[test]
    fn timed_choice_falls_back_to_default() {
        let (_tx, rx) = mpsc::channel::<String>();
        let mut console = Console::from_receiver(rx, true);
        let choice = console.timed_choice("mode: ", Duration::from_millis(20), "3");
        assert_eq!(choice, "3");
    }

    #[test]
    fn non_interactive_choice_uses_default_without_reading() {
        let (tx, rx) = mpsc::channel::<String>();
        tx.send("1".to_string()).unwrap();
        let mut console = Console::from_receiver(rx, false);
        let choice = console.timed_choice("mode: ", Duration::from_secs(5), "3");
        assert_eq!(choice, "3");
        assert_eq!(
            read_line_within(&console.lines, Duration::from_millis(10)),
            TimedAnswer::Line("1".to_string())
        );
    }

    #[test]
    fn closed_input_is_reported() {
        let (tx, rx) = mpsc::channel::<String>();
        drop(tx);
        assert_eq!(
            read_line_within(&rx, Duration::from_millis(20)),
            TimedAnswer::Closed
        );
    }
}
