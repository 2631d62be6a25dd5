//! Context assembly: decides when to compact and builds the context string
//! sent with each request.
//!
//! The decision rule is one-shot per session: once a running summary exists,
//! summarization never re-triggers. After that point the per-request payload
//! is bounded by the summary plus a fixed recency window of verbatim turns,
//! so the payload stays small even as the counter keeps growing. This is a
//! known compaction limitation, kept deliberately.

use tracing::debug;

use crate::Transport;
use crate::context::budget::{TOKEN_BUDGET, approx_tokens};
use crate::context::memory::SessionState;
use crate::context::summarizer::Summarizer;

/// Turn count at which summarization triggers.
const SUMMARIZE_TURN_THRESHOLD: u32 = 6;

/// Turns kept verbatim after a summarization prunes memory.
const KEEP_AFTER_SUMMARY: usize = 4;

/// Recent turns included verbatim in the assembled context.
const RECENT_IN_CONTEXT: usize = 6;

/// Assembles the conversation context for each outgoing request.
#[derive(Debug)]
pub struct ContextBuilder {
    summarizer: Summarizer,
    turn_threshold: u32,
    token_budget: usize,
    keep_after_summary: usize,
    recent_in_context: usize,
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self {
            summarizer: Summarizer::default(),
            turn_threshold: SUMMARIZE_TURN_THRESHOLD,
            token_budget: TOKEN_BUDGET,
            keep_after_summary: KEEP_AFTER_SUMMARY,
            recent_in_context: RECENT_IN_CONTEXT,
        }
    }
}

impl ContextBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the turn-count trigger.
    pub fn with_turn_threshold(mut self, turns: u32) -> Self {
        self.turn_threshold = turns;
        self
    }

    /// Override the estimated-token trigger.
    pub fn with_token_budget(mut self, budget: usize) -> Self {
        self.token_budget = budget;
        self
    }

    /// Whether the next build should compact memory into a summary.
    ///
    /// True iff no session summary exists yet AND the turn counter has
    /// reached the threshold OR the estimated token cost of the full
    /// transcript exceeds the budget.
    pub fn should_summarize(&self, state: &SessionState) -> bool {
        if state.summary().is_some() {
            return false;
        }
        state.memory().counter() >= self.turn_threshold
            || approx_tokens(&state.memory().transcript()) > self.token_budget
    }

    /// Assemble the context string, compacting first when due.
    ///
    /// A non-empty summary is stored and memory is pruned to a small rolling
    /// buffer of verbatim recent turns; an empty summary leaves memory
    /// untouched. With a stored summary the result is a two-section string
    /// (`[SESSION SUMMARY]` then `[RECENT TURNS]`); without one it is the
    /// full transcript, which is empty for a fresh session.
    pub async fn build(&self, transport: &dyn Transport, state: &mut SessionState) -> String {
        if self.should_summarize(state) {
            let summary = self.summarizer.summarize(transport, state.memory()).await;
            if !summary.is_empty() {
                debug!(
                    "compacted {} turns into a {}-char summary",
                    state.memory().len(),
                    summary.len()
                );
                state.set_summary(summary);
                state.prune(self.keep_after_summary);
            }
        }

        match state.summary() {
            Some(summary) => format!(
                "[SESSION SUMMARY]\n{summary}\n\n[RECENT TURNS]\n{}",
                state.memory().recent(self.recent_in_context)
            ),
            None => state.memory().transcript(),
        }
    }
}
