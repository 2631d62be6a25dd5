//! Conversation context management: memory, token estimation, summarization,
//! and request-context assembly.
//!
//! The conversation grows without bound; the request payload must not. This
//! module keeps the two apart with a single compaction strategy:
//!
//! 1. **[`budget`]** — cheap deterministic token estimation and the budget
//!    constant that triggers compaction.
//! 2. **[`memory`]** — the ordered turn store and the session-scoped state
//!    unit (memory + running summary) that owns all mutation.
//! 3. **[`summarizer`]** — a one-shot LLM call that condenses the transcript,
//!    with an infallible local fallback.
//! 4. **[`builder`]** — the decision rule for when to compact and the
//!    two-section context string sent with each request.

pub mod budget;
pub mod builder;
pub mod memory;
pub mod summarizer;

// Re-export commonly used items at the module level.
pub use budget::{TOKEN_BUDGET, approx_tokens};
pub use builder::ContextBuilder;
pub use memory::{ConversationMemory, SessionState, Turn};
pub use summarizer::Summarizer;
