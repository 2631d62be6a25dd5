//! Interpretation of raw model output.
//!
//! Two independent passes run over every reply:
//!
//! 1. **[`thinking`]** — separates a `<think>…</think>` reasoning block from
//!    the displayable answer.
//! 2. **[`directive`]** — detects the strict `Image Generated:` command
//!    pattern the model is instructed to emit in place of a normal answer.
//!
//! Both are plain string scans over fixed markers. The model is
//! contractually instructed to emit these exact patterns, so there is no
//! fuzzy recovery: anything that deviates is treated as ordinary text.

pub mod directive;
pub mod thinking;

pub use directive::{ImageDirective, parse_image_directive};
pub use thinking::{ParsedResponse, parse_thinking};

/// Strip `prefix` from the start of `text`, comparing ASCII
/// case-insensitively. Returns the remainder on a match.
pub(crate) fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut rest = text;
    for expected in prefix.chars() {
        let mut chars = rest.chars();
        let actual = chars.next()?;
        if !actual.eq_ignore_ascii_case(&expected) {
            return None;
        }
        rest = chars.as_str();
    }
    Some(rest)
}

/// Remove every ASCII case-insensitive occurrence of `token` from `text`.
/// Non-ASCII characters in the token (emoji markers) match exactly.
pub(crate) fn remove_token_ci(text: &str, token: &str) -> String {
    let token_chars: Vec<char> = token.chars().collect();
    if token_chars.is_empty() {
        return text.to_string();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if matches_at(&chars, i, &token_chars) {
            i += token_chars.len();
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    out
}

fn matches_at(chars: &[char], at: usize, token: &[char]) -> bool {
    chars.len() - at >= token.len()
        && chars[at..at + token.len()]
            .iter()
            .zip(token)
            .all(|(a, b)| a.eq_ignore_ascii_case(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_prefix_ci_matches_any_case() {
        assert_eq!(strip_prefix_ci("Image Generated:rest", "image generated:"), Some("rest"));
        assert_eq!(strip_prefix_ci("MODEL:flux", "model:"), Some("flux"));
        assert_eq!(strip_prefix_ci("prompt text", "model:"), None);
    }

    #[test]
    fn strip_prefix_ci_short_input() {
        assert_eq!(strip_prefix_ci("mod", "model:"), None);
        assert_eq!(strip_prefix_ci("", "x"), None);
    }

    #[test]
    fn remove_token_ci_removes_all_occurrences() {
        assert_eq!(remove_token_ci("a**b**c", "**"), "abc");
        assert_eq!(remove_token_ci("Flux Schnell art", "flux schnell"), " art");
    }

    #[test]
    fn remove_token_ci_handles_non_ascii_token() {
        assert_eq!(remove_token_ci("ok 🧠 done", "🧠"), "ok  done");
    }

    #[test]
    fn remove_token_ci_no_match_is_identity() {
        assert_eq!(remove_token_ci("plain text", "**"), "plain text");
    }
}
