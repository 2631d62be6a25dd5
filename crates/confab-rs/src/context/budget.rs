//! Deterministic token estimation for context budgeting.
//!
//! The budget check runs on every message, so the estimator must be cheap:
//! no tokenizer, just a fixed characters-per-token ratio. Most tokenizers
//! average 3-4 characters per token for English text; 4 keeps the estimate
//! conservative.

/// Characters per estimated token.
const CHARS_PER_TOKEN: usize = 4;

/// Estimated token budget for a full transcript before compaction triggers.
pub const TOKEN_BUDGET: usize = 2200;

/// Approximate the token cost of `text`.
///
/// Deterministic, monotonic in input length, never negative. Empty input
/// yields 0.
pub fn approx_tokens(text: &str) -> usize {
    text.len().div_ceil(CHARS_PER_TOKEN)
}
