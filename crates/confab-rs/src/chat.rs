//! Conversation personas and the per-message orchestration flow.
//!
//! [`Mode`] maps each persona tag to a backend model identifier and a
//! persona name. [`ChatOrchestrator`] runs the linear per-message flow:
//! build context (compacting when due), call the transport, record the
//! exchange, parse the reply, and route to display or image dispatch. It
//! owns the session triple (state, mode, theme); all mutation happens here
//! or in the dispatcher it delegates to.

use std::path::PathBuf;
use std::str::FromStr;
use tracing::{debug, warn};

use crate::command::{Command, CommandDispatcher, is_command, parse_command};
use crate::context::{ContextBuilder, SessionState};
use crate::images::{ImageBackend, model_names};
use crate::parse::{ParsedResponse, parse_image_directive, parse_thinking};
use crate::ui::{PresentationSink, Sender, Theme};
use crate::{ChatMessage, ChatRequest, Transport};

/// Recorded and displayed when the model returns no content at all.
pub const NO_RESPONSE_FALLBACK: &str = "No response.";

// ── Modes ──────────────────────────────────────────────────────────

/// Conversation persona. Selects the backend model identifier and the
/// persona name used in the system instruction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Chat,
    Reasoning,
    Fast,
    Math,
    Korean,
    General,
    Coding,
    Arabic,
}

impl Mode {
    /// Every mode, in display order.
    pub const ALL: [Mode; 8] = [
        Mode::Chat,
        Mode::Reasoning,
        Mode::Fast,
        Mode::Math,
        Mode::Korean,
        Mode::General,
        Mode::Coding,
        Mode::Arabic,
    ];

    /// Backend model identifier for this persona.
    pub fn model_id(self) -> &'static str {
        match self {
            Mode::Chat => "provider-5/gpt-5-nano",
            Mode::Reasoning => "provider-1/deepseek-r1-0528",
            Mode::Fast => "provider-2/gemini-2.5-flash",
            Mode::Math => "provider-1/qwen3-235b-a22b-instruct-2507",
            Mode::Korean => "provider-1/ax-4.0",
            Mode::General => "provider-3/glm-4.5-free",
            Mode::Coding => "provider-1/deepseek-v3-0324",
            Mode::Arabic => "provider-1/allam-7b-instruct-preview",
        }
    }

    /// Persona name injected into the system instruction.
    pub fn persona(self) -> &'static str {
        match self {
            Mode::Chat => "Confab-chat",
            Mode::Reasoning => "Confab-reasoning",
            Mode::Fast => "Confab-fast",
            Mode::Math => "Confab-math",
            Mode::Korean => "Confab-korean",
            Mode::General => "Confab-general",
            Mode::Coding => "Confab-coding",
            Mode::Arabic => "Confab-arabic",
        }
    }

    /// Short tag used on the command line and in `/mode`.
    pub fn tag(self) -> &'static str {
        match self {
            Mode::Chat => "chat",
            Mode::Reasoning => "reasoning",
            Mode::Fast => "fast",
            Mode::Math => "math",
            Mode::Korean => "korean",
            Mode::General => "general",
            Mode::Coding => "coding",
            Mode::Arabic => "arabic",
        }
    }

    /// All tags joined for usage and help text.
    pub fn usage_tags() -> String {
        Mode::ALL
            .iter()
            .map(|mode| mode.tag())
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.tag())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tag = s.trim().to_lowercase();
        Mode::ALL
            .into_iter()
            .find(|mode| mode.tag() == tag)
            .ok_or_else(|| format!("unknown mode: {s}"))
    }
}

/// System instruction for a persona: identity, the reasoning-tag contract,
/// and the exact image-directive pattern with the registry's display names.
pub fn system_prompt(mode: Mode) -> String {
    format!(
        "You are {persona}.\n\n\
         1. Reasoning: always place your reasoning steps inside <think> tags, \
         followed by the final answer, unless an image is being generated.\n\
         2. Image generation: if the user asks you to generate, create, or show \
         an image, reply with ONLY the following exact pattern. Do not add \
         greetings, explanations, emojis, periods, newlines, or follow-up text. \
         Your output must be the single raw command string:\n\
         Image Generated:model:model name,prompt:prompt text\n\
         Available image models: {models}. Use the most relevant model name.",
        persona = mode.persona(),
        models = model_names(),
    )
}

/// Format a parsed reply for presentation: reasoning (when present) ahead of
/// the answer, under a plain label. How the sink renders it is its business.
fn render_reply(parsed: &ParsedResponse) -> String {
    match &parsed.reasoning {
        Some(reasoning) => format!("[reasoning]\n{reasoning}\n\n{}", parsed.answer),
        None => parsed.answer.clone(),
    }
}

// ── Orchestrator ───────────────────────────────────────────────────

/// The top-level per-message flow.
///
/// Borrows the transport, image backend, and presentation sink; owns the
/// session triple. Each call to [`handle_input`](Self::handle_input) runs to
/// completion before the next — there are no overlapping in-flight requests
/// against the session.
///
/// ```ignore
/// let mut orchestrator = ChatOrchestrator::new(&transport, &images, &sink)
///     .with_mode(Mode::Reasoning);
/// orchestrator.handle_input("explain lifetimes").await;
/// ```
pub struct ChatOrchestrator<'a> {
    transport: &'a dyn Transport,
    sink: &'a dyn PresentationSink,
    dispatcher: CommandDispatcher<'a>,
    builder: ContextBuilder,
    state: SessionState,
    mode: Mode,
    theme: Theme,
}

impl<'a> ChatOrchestrator<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        images: &'a dyn ImageBackend,
        sink: &'a dyn PresentationSink,
    ) -> Self {
        Self {
            transport,
            sink,
            dispatcher: CommandDispatcher::new(transport, images, sink),
            builder: ContextBuilder::new(),
            state: SessionState::new(),
            mode: Mode::default(),
            theme: Theme::default(),
        }
    }

    /// Start in the given mode.
    pub fn with_mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    /// Directory `/export` writes into.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dispatcher = self.dispatcher.with_export_dir(dir);
        self
    }

    /// Override the context builder (thresholds, summarizer model).
    pub fn with_context_builder(mut self, builder: ContextBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Process one user submission to completion: slash commands go to the
    /// dispatcher, everything else through the chat flow. Never panics; all
    /// failures surface as presented messages.
    pub async fn handle_input(&mut self, input: &str) {
        let input = input.trim();
        if input.is_empty() {
            return;
        }

        if is_command(input) {
            let command = parse_command(input);
            self.dispatcher
                .dispatch(command, &mut self.state, &mut self.mode, &mut self.theme)
                .await;
            return;
        }

        self.sink.present(input, Sender::User);
        if let Err(e) = self.reply(input).await {
            warn!("chat exchange failed: {e}");
            self.sink
                .present(&format!("Request failed: {e}"), Sender::Bot);
        }
    }

    /// The chat flow: context → transport → memory → parse → route.
    /// Memory is only updated after a fully received reply; a transport
    /// failure discards the exchange.
    async fn reply(&mut self, message: &str) -> Result<(), String> {
        let context = self.builder.build(self.transport, &mut self.state).await;
        let user_content = if context.is_empty() {
            format!("User: {message}")
        } else {
            format!("{context}\n\nUser: {message}")
        };

        let request = ChatRequest {
            model: self.mode.model_id().to_string(),
            messages: vec![
                ChatMessage::system(system_prompt(self.mode)),
                ChatMessage::user(user_content),
            ],
        };

        debug!("sending chat request as {}", self.mode.persona());
        let reply = self.transport.send(&request).await?;
        let text = reply
            .content
            .filter(|content| !content.trim().is_empty())
            .unwrap_or_else(|| NO_RESPONSE_FALLBACK.to_string());

        self.state.append(message, &text);

        let parsed = parse_thinking(&text);
        if let Some(directive) = parse_image_directive(&parsed.answer) {
            debug!("reply carried an image directive for {:?}", directive.model);
            let command = Command::from_directive(directive);
            self.dispatcher
                .dispatch(command, &mut self.state, &mut self.mode, &mut self.theme)
                .await;
            return Ok(());
        }

        self.sink.present(&render_reply(&parsed), Sender::Bot);
        Ok(())
    }
}
