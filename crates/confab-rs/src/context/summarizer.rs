//! Transcript condensation for context compaction.
//!
//! A single cheap LLM call turns the full transcript into a short running
//! summary. The call can fail — the endpoint may be down, every credential
//! may be exhausted — so a deterministic local fallback built from the most
//! recent turns guarantees the context builder always receives *some*
//! summary string. The fallback performs no I/O and cannot fail.

use tracing::warn;

use crate::context::memory::ConversationMemory;
use crate::{ChatMessage, ChatRequest, Transport};

/// Model used for summarization calls (cheaper than the main chat models).
pub const SUMMARY_MODEL: &str = "provider-3/gpt-4o-mini";

/// Fixed system instruction for the condensation call.
const SUMMARIZE_PROMPT: &str = "You are Confab. Condense the following chat \
context into a short summary. Keep facts, names, decisions, and open \
questions; drop pleasantries.";

/// Prefix of the deterministic local fallback summary.
pub const FALLBACK_PREFIX: &str = "Summary: ";

/// Maximum characters of turn text carried by the fallback summary.
const FALLBACK_MAX_CHARS: usize = 800;

/// Number of recent turns the fallback summary is built from.
const FALLBACK_TURNS: usize = 2;

/// Condenses conversation memory into a running summary.
#[derive(Debug, Clone)]
pub struct Summarizer {
    /// Model identifier for the condensation call.
    pub model: String,
}

impl Default for Summarizer {
    fn default() -> Self {
        Self {
            model: SUMMARY_MODEL.to_string(),
        }
    }
}

impl Summarizer {
    /// Condense `memory` into a summary string.
    ///
    /// On transport success, returns the reply trimmed of whitespace (which
    /// may be empty if the model returned nothing — callers treat an empty
    /// summary as "do not compact"). On transport failure, falls back to
    /// [`fallback_summary`], which always succeeds.
    pub async fn summarize(&self, transport: &dyn Transport, memory: &ConversationMemory) -> String {
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(SUMMARIZE_PROMPT),
                ChatMessage::user(memory.transcript()),
            ],
        };

        match transport.send(&request).await {
            Ok(reply) => reply
                .content
                .map(|c| c.trim().to_string())
                .unwrap_or_default(),
            Err(e) => {
                warn!("summarization call failed, using local fallback: {e}");
                fallback_summary(memory)
            }
        }
    }
}

/// Deterministic local summary: the last two turns' rendering with newlines
/// collapsed to spaces, truncated to a bounded length, behind a fixed label.
///
/// Never fails and performs no I/O.
pub fn fallback_summary(memory: &ConversationMemory) -> String {
    let recent = memory.recent(FALLBACK_TURNS).replace(['\r', '\n'], " ");
    let clipped: String = recent.chars().take(FALLBACK_MAX_CHARS).collect();
    format!("{FALLBACK_PREFIX}{clipped}")
}
