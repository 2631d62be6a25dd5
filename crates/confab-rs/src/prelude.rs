//! Convenience re-exports for common `confab-rs` types.
//!
//! Meant to be glob-imported when embedding the client core:
//!
//! ```ignore
//! use confab_rs::prelude::*;
//! ```
//!
//! This pulls in the types needed for the vast majority of programs: the
//! clients, the orchestrator and modes, the session state, and the sinks.
//! Specialized types (parser internals, registry helpers, command variants)
//! are intentionally excluded — import those from their modules directly.

// ── Core types ──────────────────────────────────────────────────────
pub use crate::{ApiClient, ChatMessage, ChatReply, ChatRequest, ChatRole, Transport};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::ClientConfig;

// ── Orchestration ───────────────────────────────────────────────────
pub use crate::chat::{ChatOrchestrator, Mode};
pub use crate::context::{ContextBuilder, SessionState};

// ── Images ──────────────────────────────────────────────────────────
pub use crate::images::{ImageBackend, ImageClient};

// ── Presentation ────────────────────────────────────────────────────
pub use crate::ui::{BufferSink, PresentationSink, Sender, TerminalSink, Theme};
