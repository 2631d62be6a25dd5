//! Strict structural parse of the embedded image-generation directive.
//!
//! When asked for an image, the model is instructed to reply with exactly
//!
//! ```text
//! Image Generated:model:model name,prompt:prompt text
//! ```
//!
//! and nothing else. This parser enforces that contract: a single
//! normalization pass to shed formatting the model sneaks in anyway, then a
//! strict prefix/key check. Anything that deviates returns `None` and the
//! reply degrades to ordinary text display.

use crate::parse::{remove_token_ci, strip_prefix_ci};

/// Literal command prefix the directive must start with.
pub const DIRECTIVE_PREFIX: &str = "Image Generated:";

/// Key literal of the left (model) segment.
const MODEL_KEY: &str = "model:";

/// Key literal of the right (prompt) segment.
const PROMPT_KEY: &str = "prompt:";

/// Decorative markup the normalization pass strips before matching.
const DECORATIVE_TOKENS: &[&str] = &["**", "🧠", "Reasoning/Steps"];

/// An image-generation request the model embedded in its answer.
/// Derived transiently; the model token is a free-form display-name string,
/// resolved against the registry by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDirective {
    pub model: String,
    pub prompt: String,
}

/// Parse `answer` as an image directive.
///
/// Matching is case-insensitive and order-dependent: normalize, require the
/// [`DIRECTIVE_PREFIX`], split at the first comma, require the `model:` and
/// `prompt:` key literals, and require both values to be non-empty after
/// trimming. Any violation yields `None`.
pub fn parse_image_directive(answer: &str) -> Option<ImageDirective> {
    let cleaned = normalize(answer);

    let content = strip_prefix_ci(&cleaned, DIRECTIVE_PREFIX)?.trim();
    let (model_segment, prompt_segment) = content.split_once(',')?;

    let model = strip_prefix_ci(model_segment.trim(), MODEL_KEY)?.trim();
    let prompt = strip_prefix_ci(prompt_segment.trim(), PROMPT_KEY)?.trim();

    if model.is_empty() || prompt.is_empty() {
        return None;
    }

    Some(ImageDirective {
        model: model.to_string(),
        prompt: prompt.to_string(),
    })
}

/// Normalization pass: trim, collapse newlines to spaces, strip decorative
/// markup tokens, drop control characters, trim again.
fn normalize(text: &str) -> String {
    let mut cleaned = text.trim().replace(['\r', '\n'], " ");
    for token in DECORATIVE_TOKENS {
        cleaned = remove_token_ci(&cleaned, token);
    }
    cleaned.retain(|c| !c.is_control());
    cleaned.trim().to_string()
}
