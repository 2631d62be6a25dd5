//! The ordered turn store and the session-scoped state unit.
//!
//! [`ConversationMemory`] holds completed exchanges keyed by a monotonically
//! increasing turn index. [`SessionState`] bundles the memory with the
//! optional running summary; it is the single mutable unit the orchestrator
//! owns, and every mutation goes through its named operations (`append`,
//! `prune`, `set_summary`, `reset`).

use std::collections::BTreeMap;

/// One completed exchange: the user message and the model reply, with a
/// stable sequence index. Immutable once stored, except for bulk pruning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// Sequence index, starting at 1. Never reused, never decremented.
    pub index: u32,
    pub user: String,
    pub bot: String,
}

impl Turn {
    fn render(&self) -> String {
        format!("User: {}\nBot: {}", self.user, self.bot)
    }
}

/// Ordered store of completed turns.
///
/// Keys are iterated in ascending numeric order regardless of insertion
/// order; the stored index set is always a subset of `1..=counter`.
/// `transcript` and `recent` are pure reads — only `append`, `prune`, and
/// `reset` mutate state.
#[derive(Debug, Default)]
pub struct ConversationMemory {
    turns: BTreeMap<u32, Turn>,
    counter: u32,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of completed exchanges so far. Pruning does not decrement it.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// Number of turns currently stored.
    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// Store a completed exchange under the next turn index.
    pub fn append(&mut self, user: impl Into<String>, bot: impl Into<String>) -> &Turn {
        self.counter += 1;
        let turn = Turn {
            index: self.counter,
            user: user.into(),
            bot: bot.into(),
        };
        self.turns.entry(self.counter).or_insert(turn)
    }

    /// Render all stored turns as alternating `User:`/`Bot:` lines, ordered
    /// by ascending index. Empty memory renders as the empty string.
    pub fn transcript(&self) -> String {
        self.turns
            .values()
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Same rendering restricted to the `n` highest-indexed turns. Fewer
    /// than `n` stored turns renders them all.
    pub fn recent(&self, n: usize) -> String {
        let skip = self.turns.len().saturating_sub(n);
        self.turns
            .values()
            .skip(skip)
            .map(Turn::render)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Discard all turns except the `keep_last_n` highest-indexed ones.
    /// Irreversible; the counter is unaffected.
    pub fn prune(&mut self, keep_last_n: usize) {
        let excess = self.turns.len().saturating_sub(keep_last_n);
        if excess == 0 {
            return;
        }
        match self.turns.keys().nth(excess).copied() {
            Some(split_key) => self.turns = self.turns.split_off(&split_key),
            None => self.turns.clear(),
        }
    }

    /// Clear all turns and reset the counter to 0.
    pub fn reset(&mut self) {
        self.turns.clear();
        self.counter = 0;
    }
}

/// Session-scoped mutable state: conversation memory plus the running
/// summary. Owned exclusively by the orchestrator; no other component
/// mutates it directly.
#[derive(Debug, Default)]
pub struct SessionState {
    memory: ConversationMemory,
    summary: Option<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn memory(&self) -> &ConversationMemory {
        &self.memory
    }

    /// The running session summary, set by the first compaction and kept
    /// until a full reset.
    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    /// Record a completed exchange.
    pub fn append(&mut self, user: impl Into<String>, bot: impl Into<String>) -> &Turn {
        self.memory.append(user, bot)
    }

    /// Store the running summary.
    pub fn set_summary(&mut self, summary: impl Into<String>) {
        self.summary = Some(summary.into());
    }

    /// Prune memory to the `keep_last_n` most recent turns.
    pub fn prune(&mut self, keep_last_n: usize) {
        self.memory.prune(keep_last_n);
    }

    /// Full session reset: memory, summary, and turn counter all cleared.
    pub fn reset(&mut self) {
        self.memory.reset();
        self.summary = None;
    }

    /// Serialize the session to a plain-text export blob: an optional
    /// `[SUMMARY]` block followed by the `[CHAT LOG]` block.
    pub fn export_blob(&self) -> String {
        match &self.summary {
            Some(summary) => format!(
                "[SUMMARY]\n{summary}\n\n[CHAT LOG]\n{}",
                self.memory.transcript()
            ),
            None => format!("[CHAT LOG]\n{}", self.memory.transcript()),
        }
    }
}
