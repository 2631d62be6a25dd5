//! Slash-command vocabulary and parsing.
//!
//! User-typed command strings and model-emitted image directives both
//! resolve to the same tagged [`Command`] type, dispatched by an exhaustive
//! match in [`dispatcher`]. Parsing never fails: unrecognized input becomes
//! [`Command::Unknown`], which dispatches to an informational echo.
//!
//! The two entry paths deliberately use different matching strategies. The
//! textual path serves untrusted user input, so the `/image` arguments get
//! best-effort fuzzy handling (trailing count, model-name fragment anywhere
//! in the text). The structured path serves contractually formatted model
//! output, so the model token resolves by exact display name with a fixed
//! fallback, and the count is pinned to 1 — the model may not request
//! multi-image batches.

pub mod dispatcher;

pub use dispatcher::CommandDispatcher;

use crate::chat::Mode;
use crate::images::{DEFAULT_IMAGE_MODEL, MAX_IMAGES_PER_REQUEST, resolve_exact, resolve_fragment};
use crate::parse::{ImageDirective, remove_token_ci};

/// Prefix that marks a user message as a command.
pub const COMMAND_PREFIX: char = '/';

/// Fully resolved arguments of an image-generation command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub prompt: String,
    /// Backend model identifier, already resolved against the registry.
    pub model_id: String,
    /// Number of images, clamped to `1..=4`.
    pub count: u32,
}

/// The command vocabulary. Every variant is a terminal action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/clear` — full session reset.
    Clear,
    /// `/theme` — toggle the display theme.
    Theme,
    /// `/help` — list the command vocabulary.
    Help,
    /// `/export` — write the transcript/summary blob to disk.
    Export,
    /// `/contact` — project contact info.
    Contact,
    /// `/play` — generate (if needed) and replay the session summary.
    Play,
    /// `/about` — models, modes, features.
    About,
    /// `/mode <tag>` — switch persona; `None` when the tag is missing or
    /// unknown (dispatches to a usage line).
    Mode(Option<Mode>),
    /// `/time` — local wall-clock time.
    Time,
    /// `/image …` or a model-emitted directive.
    Image(ImageRequest),
    /// Anything else starting with the command prefix.
    Unknown(String),
}

impl Command {
    /// Structured entry path: convert a parsed model directive.
    ///
    /// The free-form model token resolves by case-insensitive exact display
    /// name, falling back to the fixed default entry; the count is always 1.
    pub fn from_directive(directive: ImageDirective) -> Self {
        let model = resolve_exact(&directive.model).unwrap_or(DEFAULT_IMAGE_MODEL);
        Command::Image(ImageRequest {
            prompt: directive.prompt,
            model_id: model.id.to_string(),
            count: 1,
        })
    }
}

/// Whether `input` should be routed to the command parser.
pub fn is_command(input: &str) -> bool {
    input.trim_start().starts_with(COMMAND_PREFIX)
}

/// Textual entry path: tokenize a user-typed command string.
pub fn parse_command(input: &str) -> Command {
    let mut parts = input.trim().split_whitespace();
    let head = parts.next().unwrap_or("").to_lowercase();
    let args: Vec<&str> = parts.collect();

    match head.as_str() {
        "/clear" => Command::Clear,
        "/theme" => Command::Theme,
        "/help" => Command::Help,
        "/export" => Command::Export,
        "/contact" => Command::Contact,
        "/play" => Command::Play,
        "/about" => Command::About,
        "/time" => Command::Time,
        "/mode" => Command::Mode(args.first().and_then(|tag| tag.parse::<Mode>().ok())),
        "/image" => Command::Image(parse_image_args(&args)),
        _ => Command::Unknown(head),
    }
}

/// Parse `/image` arguments: optional trailing count, optional model-name
/// fragment anywhere in the text, remainder is the prompt.
fn parse_image_args(args: &[&str]) -> ImageRequest {
    let mut count = 1u32;
    let mut prompt_args = args;
    if let Some(last) = args.last()
        && let Ok(n) = last.parse::<u32>()
        && n > 0
    {
        count = n.min(MAX_IMAGES_PER_REQUEST);
        prompt_args = &args[..args.len() - 1];
    }

    let mut prompt = prompt_args.join(" ");
    let mut model_id = DEFAULT_IMAGE_MODEL.id.to_string();
    if let Some(model) = resolve_fragment(&prompt) {
        model_id = model.id.to_string();
        // Remove only the matched name fragment, never the id path.
        prompt = remove_token_ci(&prompt, &model.search_key());
        prompt = prompt.split_whitespace().collect::<Vec<_>>().join(" ");
    }

    ImageRequest {
        prompt: prompt.trim().to_string(),
        model_id,
        count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn is_command_checks_prefix() {
        assert!(is_command("/help"));
        assert!(is_command("  /clear"));
        assert!(!is_command("help me"));
        assert!(!is_command(""));
    }

    #[test]
    fn plain_commands_parse() {
        assert_eq!(parse_command("/clear"), Command::Clear);
        assert_eq!(parse_command("/THEME"), Command::Theme);
        assert_eq!(parse_command("  /help  "), Command::Help);
        assert_eq!(parse_command("/export"), Command::Export);
        assert_eq!(parse_command("/contact"), Command::Contact);
        assert_eq!(parse_command("/play"), Command::Play);
        assert_eq!(parse_command("/about"), Command::About);
        assert_eq!(parse_command("/time"), Command::Time);
    }

    #[test]
    fn unknown_command_keeps_token() {
        assert_eq!(
            parse_command("/frobnicate now"),
            Command::Unknown("/frobnicate".to_string())
        );
    }

    #[test]
    fn mode_parses_valid_tags() {
        assert_eq!(parse_command("/mode coding"), Command::Mode(Some(Mode::Coding)));
        assert_eq!(parse_command("/mode REASONING"), Command::Mode(Some(Mode::Reasoning)));
    }

    #[test]
    fn mode_missing_or_invalid_is_none() {
        assert_eq!(parse_command("/mode"), Command::Mode(None));
        assert_eq!(parse_command("/mode quantum"), Command::Mode(None));
    }

    #[test]
    fn image_defaults_to_one_default_model() {
        let Command::Image(request) = parse_command("/image a quiet lake") else {
            panic!("expected image command");
        };
        assert_eq!(request.prompt, "a quiet lake");
        assert_eq!(request.model_id, DEFAULT_IMAGE_MODEL.id);
        assert_eq!(request.count, 1);
    }

    #[test]
    fn image_trailing_count_is_clamped() {
        let Command::Image(request) = parse_command("/image a fox 3") else {
            panic!("expected image command");
        };
        assert_eq!(request.count, 3);
        assert_eq!(request.prompt, "a fox");

        let Command::Image(request) = parse_command("/image a fox 9") else {
            panic!("expected image command");
        };
        assert_eq!(request.count, 4);
    }

    #[test]
    fn image_zero_or_invalid_count_defaults_to_one() {
        let Command::Image(request) = parse_command("/image a fox 0") else {
            panic!("expected image command");
        };
        assert_eq!(request.count, 1);
        // 0 is not a valid count, so it stays in the prompt.
        assert_eq!(request.prompt, "a fox 0");

        let Command::Image(request) = parse_command("/image a fox 3x") else {
            panic!("expected image command");
        };
        assert_eq!(request.count, 1);
        assert_eq!(request.prompt, "a fox 3x");
    }

    #[test]
    fn image_model_fragment_is_resolved_and_removed() {
        let Command::Image(request) = parse_command("/image dragon flux schnell 3") else {
            panic!("expected image command");
        };
        assert_eq!(request.count, 3);
        assert_eq!(request.model_id, "provider-4/flux-schnell");
        assert_eq!(request.prompt, "dragon");
    }

    #[test]
    fn image_fragment_matches_case_insensitively() {
        let Command::Image(request) = parse_command("/image PHOENIX rising over a city") else {
            panic!("expected image command");
        };
        assert_eq!(request.model_id, "provider-4/phoenix");
        assert_eq!(request.prompt, "rising over a city");
    }

    #[test]
    fn image_empty_prompt_survives_parse() {
        // Empty prompt is caught at dispatch time with a usage message.
        let Command::Image(request) = parse_command("/image") else {
            panic!("expected image command");
        };
        assert!(request.prompt.is_empty());
        assert_eq!(request.count, 1);
    }

    #[test]
    fn directive_resolves_exact_name() {
        let directive = ImageDirective {
            model: "phoenix".into(),
            prompt: "a red fox".into(),
        };
        let Command::Image(request) = Command::from_directive(directive) else {
            panic!("expected image command");
        };
        assert_eq!(request.model_id, "provider-4/phoenix");
        assert_eq!(request.prompt, "a red fox");
        assert_eq!(request.count, 1);
    }

    #[test]
    fn directive_unknown_model_falls_back_to_default() {
        let directive = ImageDirective {
            model: "does-not-exist".into(),
            prompt: "a red fox".into(),
        };
        let Command::Image(request) = Command::from_directive(directive) else {
            panic!("expected image command");
        };
        assert_eq!(request.model_id, DEFAULT_IMAGE_MODEL.id);
        assert_eq!(request.count, 1);
    }
}
