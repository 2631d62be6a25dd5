//! Separation of a `<think>` reasoning block from the displayable answer.
//!
//! Reasoning-tuned models emit their chain of thought inside a delimited
//! block ahead of the final answer. Only the first block is honored; any
//! later blocks stay inside the answer untouched.

/// Opening marker of a reasoning block.
pub const THINK_OPEN: &str = "<think>";

/// Closing marker of a reasoning block.
pub const THINK_CLOSE: &str = "</think>";

/// Shown when a reply contains a reasoning block and nothing else, so the
/// display path never receives a blank answer.
pub const EMPTY_ANSWER_PLACEHOLDER: &str =
    "The model produced a reasoning step but no explicit final answer.";

/// A model reply split into displayable answer and optional reasoning.
/// Derived transiently from raw model text, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    pub answer: String,
    pub reasoning: Option<String>,
}

/// Split `raw` into answer and reasoning.
///
/// The first `<think>…</think>` block (which may span multiple lines)
/// becomes the reasoning, trimmed; the answer is the remaining text with the
/// block removed, trimmed. Without a complete marker pair the whole input is
/// the answer. An empty answer alongside non-empty reasoning is replaced by
/// a fixed placeholder sentence.
pub fn parse_thinking(raw: &str) -> ParsedResponse {
    let unparsed = || ParsedResponse {
        answer: raw.to_string(),
        reasoning: None,
    };

    let Some((before, rest)) = raw.split_once(THINK_OPEN) else {
        return unparsed();
    };
    let Some((inner, after)) = rest.split_once(THINK_CLOSE) else {
        return unparsed();
    };

    let reasoning = inner.trim();
    let answer = format!("{before}{after}").trim().to_string();

    if answer.is_empty() && !reasoning.is_empty() {
        return ParsedResponse {
            answer: EMPTY_ANSWER_PLACEHOLDER.to_string(),
            reasoning: Some(reasoning.to_string()),
        };
    }

    ParsedResponse {
        answer,
        reasoning: (!reasoning.is_empty()).then(|| reasoning.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_marker_returns_input_unchanged() {
        let parsed = parse_thinking("just a plain answer");
        assert_eq!(parsed.answer, "just a plain answer");
        assert!(parsed.reasoning.is_none());
    }

    #[test]
    fn splits_reasoning_from_answer() {
        let parsed = parse_thinking("<think>A</think>B");
        assert_eq!(parsed.answer, "B");
        assert_eq!(parsed.reasoning.as_deref(), Some("A"));
    }

    #[test]
    fn reasoning_block_spans_lines() {
        let parsed = parse_thinking("<think>step one\nstep two\n</think>\nthe answer");
        assert_eq!(parsed.answer, "the answer");
        assert_eq!(parsed.reasoning.as_deref(), Some("step one\nstep two"));
    }

    #[test]
    fn text_before_block_is_kept_in_answer() {
        let parsed = parse_thinking("lead-in <think>why</think> tail");
        assert_eq!(parsed.answer, "lead-in  tail");
        assert_eq!(parsed.reasoning.as_deref(), Some("why"));
    }

    #[test]
    fn only_reasoning_gets_placeholder_answer() {
        let parsed = parse_thinking("<think>all thought, no answer</think>");
        assert_eq!(parsed.answer, EMPTY_ANSWER_PLACEHOLDER);
        assert_eq!(parsed.reasoning.as_deref(), Some("all thought, no answer"));
    }

    #[test]
    fn unterminated_block_is_plain_text() {
        let raw = "<think>never closed";
        let parsed = parse_thinking(raw);
        assert_eq!(parsed.answer, raw);
        assert!(parsed.reasoning.is_none());
    }

    #[test]
    fn only_first_block_is_honored() {
        let parsed = parse_thinking("<think>first</think>answer<think>second</think>");
        assert_eq!(parsed.reasoning.as_deref(), Some("first"));
        assert!(parsed.answer.contains("<think>second</think>"));
    }

    #[test]
    fn empty_block_means_no_reasoning() {
        let parsed = parse_thinking("<think></think>answer");
        assert_eq!(parsed.answer, "answer");
        assert!(parsed.reasoning.is_none());
    }
}
