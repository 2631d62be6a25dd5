//! Presentation seam between the core pipeline and whatever renders it.
//!
//! The core hands finished text to a [`PresentationSink`] and never learns
//! how it is displayed — rendering, markdown conversion, and animation all
//! live behind this trait. Two implementations ship with the crate: a
//! terminal sink for the REPL binary and a buffering sink for tests and
//! embedders.

use std::fmt;
use std::sync::Mutex;

/// Who a presented message is from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sender::User => write!(f, "user"),
            Sender::Bot => write!(f, "bot"),
        }
    }
}

/// Display theme, flipped by the `/theme` command. Purely advisory for the
/// sink; the core only tracks and reports the current value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Theme::Dark => write!(f, "dark"),
            Theme::Light => write!(f, "light"),
        }
    }
}

/// Where finished messages go. Implementations must be cheap and
/// non-blocking; the orchestrator calls this inline.
pub trait PresentationSink: Send + Sync {
    fn present(&self, text: &str, sender: Sender);
}

/// Prints bot messages to stdout. User messages are skipped — the terminal
/// already shows what the user typed.
pub struct TerminalSink;

impl PresentationSink for TerminalSink {
    fn present(&self, text: &str, sender: Sender) {
        if sender == Sender::Bot {
            println!("{text}\n");
        }
    }
}

/// Collects presented messages behind a mutex, in order.
///
/// Used by the integration tests, and by embedders that render the
/// conversation themselves.
#[derive(Default)]
pub struct BufferSink {
    messages: Mutex<Vec<(Sender, String)>>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every presented message, in presentation order.
    pub fn messages(&self) -> Vec<(Sender, String)> {
        match self.messages.lock() {
            Ok(messages) => messages.clone(),
            Err(_) => Vec::new(),
        }
    }

    /// Just the bot-side messages, in order.
    pub fn bot_messages(&self) -> Vec<String> {
        self.messages()
            .into_iter()
            .filter(|(sender, _)| *sender == Sender::Bot)
            .map(|(_, text)| text)
            .collect()
    }
}

impl PresentationSink for BufferSink {
    fn present(&self, text: &str, sender: Sender) {
        if let Ok(mut messages) = self.messages.lock() {
            messages.push((sender, text.to_string()));
        }
    }
}
