//! Command execution against the session.
//!
//! [`CommandDispatcher`] borrows the collaborators (transport, image
//! backend, presentation sink) and executes one [`Command`] at a time
//! against the mutable session triple (state, mode, theme). Every command is
//! a terminal action; the only asynchronous ones are image generation and
//! the summary replay, which call out through their collaborators.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::Transport;
use crate::chat::Mode;
use crate::command::{Command, ImageRequest};
use crate::context::{SessionState, Summarizer};
use crate::images::{ImageBackend, MAX_IMAGES_PER_REQUEST, display_name_for, model_names};
use crate::ui::{PresentationSink, Sender, Theme};

/// Usage line for a malformed `/image` invocation.
const IMAGE_USAGE: &str = "Usage: /image <prompt> [model name] [count 1-4]";

/// Executes parsed commands. Cheap to construct; borrows everything.
pub struct CommandDispatcher<'a> {
    transport: &'a dyn Transport,
    images: &'a dyn ImageBackend,
    sink: &'a dyn PresentationSink,
    summarizer: Summarizer,
    export_dir: PathBuf,
}

impl<'a> CommandDispatcher<'a> {
    pub fn new(
        transport: &'a dyn Transport,
        images: &'a dyn ImageBackend,
        sink: &'a dyn PresentationSink,
    ) -> Self {
        Self {
            transport,
            images,
            sink,
            summarizer: Summarizer::default(),
            export_dir: PathBuf::from("."),
        }
    }

    /// Directory `/export` writes into. Default: the current directory.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = dir.into();
        self
    }

    /// Execute one command against the session.
    pub async fn dispatch(
        &self,
        command: Command,
        state: &mut SessionState,
        mode: &mut Mode,
        theme: &mut Theme,
    ) {
        debug!("dispatching {command:?}");
        match command {
            Command::Clear => {
                state.reset();
                self.say("Chat cleared.");
            }
            Command::Theme => {
                *theme = theme.toggled();
                self.say(&format!("Theme switched to {theme}."));
            }
            Command::Help => self.say(&help_text()),
            Command::Export => match self.export(state) {
                Ok(path) => self.say(&format!("Chat exported to {}.", path.display())),
                Err(e) => self.say(&format!("Export failed: {e}")),
            },
            Command::Contact => self.say(contact_text()),
            Command::Play => self.play_summary(state).await,
            Command::About => self.say(&about_text()),
            Command::Mode(Some(new_mode)) => {
                *mode = new_mode;
                self.say(&format!("Switched mode to {new_mode}."));
            }
            Command::Mode(None) => {
                self.say(&format!("Usage: /mode {}", Mode::usage_tags()));
            }
            Command::Time => {
                let now = chrono::Local::now();
                self.say(&format!("Local time: {}", now.format("%H:%M:%S")));
            }
            Command::Image(request) => self.generate_images(request).await,
            Command::Unknown(token) => {
                self.say(&format!(
                    "Unknown command: {token}. Type /help for the command list."
                ));
            }
        }
    }

    fn say(&self, text: &str) {
        self.sink.present(text, Sender::Bot);
    }

    /// `/play`: generate the session summary if absent, then replay it.
    /// Unlike the automatic compaction path, this never prunes memory.
    async fn play_summary(&self, state: &mut SessionState) {
        if state.memory().is_empty() && state.summary().is_none() {
            self.say("Nothing to summarize yet.");
            return;
        }
        self.say("Generating chat summary...");
        if state.summary().is_none() {
            let summary = self.summarizer.summarize(self.transport, state.memory()).await;
            if !summary.is_empty() {
                state.set_summary(summary);
            }
        }
        match state.summary() {
            Some(summary) => self.say(&format!("Chat summary:\n{summary}")),
            None => self.say("Summary came back empty; nothing to replay."),
        }
    }

    /// Image generation for both entry paths. An empty or failed result
    /// produces a distinct warning instead of silently doing nothing.
    async fn generate_images(&self, request: ImageRequest) {
        if request.prompt.is_empty() {
            self.say(IMAGE_USAGE);
            return;
        }

        let model_name = display_name_for(&request.model_id);
        self.say(&format!(
            "Generating {} image(s) with {model_name} for: {}",
            request.count, request.prompt
        ));

        match self
            .images
            .generate(&request.prompt, &request.model_id, request.count)
            .await
        {
            Ok(urls) if urls.is_empty() => {
                self.say("No images were returned from the server.");
            }
            Ok(urls) => self.say(&render_image_list(&request.prompt, &model_name, &urls)),
            Err(e) => self.say(&format!("Image generation failed: {e}")),
        }
    }

    /// `/export`: write the session blob to a timestamped text file.
    fn export(&self, state: &SessionState) -> Result<PathBuf, String> {
        let filename = format!(
            "confab-chat-{}.txt",
            chrono::Local::now().format("%Y-%m-%dT%H-%M-%S")
        );
        let path = self.export_dir.join(filename);
        write_export(&path, &state.export_blob())?;
        Ok(path)
    }
}

fn write_export(path: &Path, blob: &str) -> Result<(), String> {
    std::fs::write(path, blob).map_err(|e| format!("failed to write {}: {e}", path.display()))
}

/// Multi-image display artifact: prompt header plus one numbered link line
/// per URL, in backend order.
fn render_image_list(prompt: &str, model_name: &str, urls: &[String]) -> String {
    let mut out = format!("Generated images for \"{prompt}\" ({model_name}):");
    for (i, url) in urls.iter().enumerate() {
        out.push_str(&format!("\n{}. {url}", i + 1));
    }
    out
}

fn help_text() -> String {
    let mut out = String::from("Available commands:\n");
    out.push_str("/clear — clear the current chat\n");
    out.push_str("/theme — toggle dark/light theme\n");
    out.push_str("/help — show this help\n");
    out.push_str(&format!(
        "/image <prompt> [model name] [count 1-{MAX_IMAGES_PER_REQUEST}] — generate image(s)\n"
    ));
    out.push_str(&format!("  models: {}\n", model_names()));
    out.push_str("/export — export the chat as a text file\n");
    out.push_str("/contact — project contact info\n");
    out.push_str("/play — summarize and replay the conversation\n");
    out.push_str("/about — about this client\n");
    out.push_str(&format!("/mode <{}> — change mode\n", Mode::usage_tags()));
    out.push_str("/time — show the local time");
    out
}

fn contact_text() -> &'static str {
    "Contact:\n\
     - Repository: https://github.com/confab-rs/confab\n\
     - Issues: https://github.com/confab-rs/confab/issues\n\
     - Use /export to attach chat logs to a report."
}

fn about_text() -> String {
    format!(
        "About Confab:\n\
         - Modes: {}\n\
         - Image models: {}\n\
         - Features: context memory, one-shot summarization, slash commands, \
         theme toggle, export",
        Mode::usage_tags(),
        model_names(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::images::ImageFuture;
    use crate::ui::BufferSink;
    use crate::{ChatReply, ChatRequest, TransportFuture};
    use std::sync::Mutex;

    struct FixedTransport(Result<Option<String>, String>);

    impl Transport for FixedTransport {
        fn send(&self, _request: &ChatRequest) -> TransportFuture<'_> {
            let outcome = self.0.clone();
            Box::pin(async move {
                outcome.map(|content| ChatReply {
                    content,
                    usage: None,
                })
            })
        }
    }

    /// Image backend stub: records calls, returns a scripted outcome.
    struct FakeImages {
        outcome: Result<Vec<String>, String>,
        calls: Mutex<Vec<(String, String, u32)>>,
    }

    impl FakeImages {
        fn returning(urls: &[&str]) -> Self {
            Self {
                outcome: Ok(urls.iter().map(|u| u.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(error: &str) -> Self {
            Self {
                outcome: Err(error.to_string()),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl ImageBackend for FakeImages {
        fn generate(&self, prompt: &str, model_id: &str, count: u32) -> ImageFuture<'_> {
            if let Ok(mut calls) = self.calls.lock() {
                calls.push((prompt.to_string(), model_id.to_string(), count));
            }
            let outcome = self.outcome.clone();
            Box::pin(async move { outcome })
        }
    }

    fn session_with_turn() -> SessionState {
        let mut state = SessionState::new();
        state.append("hi", "hello");
        state
    }

    async fn run(
        command: Command,
        transport: &FixedTransport,
        images: &FakeImages,
        state: &mut SessionState,
    ) -> (Vec<String>, Mode, Theme) {
        let sink = BufferSink::new();
        let dispatcher = CommandDispatcher::new(transport, images, &sink);
        let mut mode = Mode::Chat;
        let mut theme = Theme::Dark;
        dispatcher
            .dispatch(command, state, &mut mode, &mut theme)
            .await;
        (sink.bot_messages(), mode, theme)
    }

    #[tokio::test]
    async fn clear_resets_session() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = session_with_turn();
        state.set_summary("old");

        let (messages, _, _) = run(Command::Clear, &transport, &images, &mut state).await;
        assert!(state.memory().is_empty());
        assert!(state.summary().is_none());
        assert_eq!(messages, vec!["Chat cleared."]);
    }

    #[tokio::test]
    async fn theme_flips_and_reports() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, _, theme) = run(Command::Theme, &transport, &images, &mut state).await;
        assert_eq!(theme, Theme::Light);
        assert_eq!(messages, vec!["Theme switched to light."]);
    }

    #[tokio::test]
    async fn mode_change_updates_mode() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, mode, _) = run(
            Command::Mode(Some(Mode::Coding)),
            &transport,
            &images,
            &mut state,
        )
        .await;
        assert_eq!(mode, Mode::Coding);
        assert_eq!(messages, vec!["Switched mode to coding."]);
    }

    #[tokio::test]
    async fn mode_without_argument_prints_usage() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, mode, _) = run(Command::Mode(None), &transport, &images, &mut state).await;
        assert_eq!(mode, Mode::Chat);
        assert!(messages[0].starts_with("Usage: /mode "));
        assert!(messages[0].contains("reasoning"));
    }

    #[tokio::test]
    async fn unknown_command_echoes_token() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, _, _) = run(
            Command::Unknown("/frobnicate".into()),
            &transport,
            &images,
            &mut state,
        )
        .await;
        assert!(messages[0].contains("/frobnicate"));
    }

    #[tokio::test]
    async fn help_lists_every_command() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, _, _) = run(Command::Help, &transport, &images, &mut state).await;
        for token in [
            "/clear", "/theme", "/help", "/image", "/export", "/contact", "/play", "/about",
            "/mode", "/time",
        ] {
            assert!(messages[0].contains(token), "help is missing {token}");
        }
    }

    #[tokio::test]
    async fn image_success_renders_urls_in_order() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&["https://img/1", "https://img/2"]);
        let mut state = SessionState::new();

        let request = ImageRequest {
            prompt: "a fox".into(),
            model_id: "provider-4/phoenix".into(),
            count: 2,
        };
        let (messages, _, _) = run(Command::Image(request), &transport, &images, &mut state).await;

        assert!(messages[0].contains("Generating 2 image(s) with Phoenix"));
        assert!(messages[1].contains("1. https://img/1"));
        assert!(messages[1].contains("2. https://img/2"));

        let calls = images.calls.lock().unwrap();
        assert_eq!(calls[0], ("a fox".to_string(), "provider-4/phoenix".to_string(), 2));
    }

    #[tokio::test]
    async fn image_empty_result_warns_distinctly() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let request = ImageRequest {
            prompt: "a fox".into(),
            model_id: "provider-4/phoenix".into(),
            count: 1,
        };
        let (messages, _, _) = run(Command::Image(request), &transport, &images, &mut state).await;
        assert_eq!(messages[1], "No images were returned from the server.");
    }

    #[tokio::test]
    async fn image_failure_warns_with_error() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::failing("image API HTTP 500: boom");
        let mut state = SessionState::new();

        let request = ImageRequest {
            prompt: "a fox".into(),
            model_id: "provider-4/phoenix".into(),
            count: 1,
        };
        let (messages, _, _) = run(Command::Image(request), &transport, &images, &mut state).await;
        assert!(messages[1].starts_with("Image generation failed:"));
        assert!(messages[1].contains("HTTP 500"));
    }

    #[tokio::test]
    async fn image_empty_prompt_prints_usage_without_calling_backend() {
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&["https://img/1"]);
        let mut state = SessionState::new();

        let request = ImageRequest {
            prompt: String::new(),
            model_id: "provider-4/phoenix".into(),
            count: 1,
        };
        let (messages, _, _) = run(Command::Image(request), &transport, &images, &mut state).await;
        assert_eq!(messages, vec![IMAGE_USAGE]);
        assert!(images.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn play_generates_and_stores_summary_without_pruning() {
        let transport = FixedTransport(Ok(Some("we greeted each other".into())));
        let images = FakeImages::returning(&[]);
        let mut state = session_with_turn();

        let (messages, _, _) = run(Command::Play, &transport, &images, &mut state).await;
        assert_eq!(state.summary(), Some("we greeted each other"));
        assert_eq!(state.memory().len(), 1);
        assert!(messages[1].contains("we greeted each other"));
    }

    #[tokio::test]
    async fn play_on_empty_session_reports_nothing_to_do() {
        let transport = FixedTransport(Ok(Some("unused".into())));
        let images = FakeImages::returning(&[]);
        let mut state = SessionState::new();

        let (messages, _, _) = run(Command::Play, &transport, &images, &mut state).await;
        assert_eq!(messages, vec!["Nothing to summarize yet."]);
    }

    #[tokio::test]
    async fn play_reuses_existing_summary() {
        let transport = FixedTransport(Err("endpoint down".into()));
        let images = FakeImages::returning(&[]);
        let mut state = session_with_turn();
        state.set_summary("already here");

        let (messages, _, _) = run(Command::Play, &transport, &images, &mut state).await;
        assert!(messages[1].contains("already here"));
    }

    #[tokio::test]
    async fn export_writes_blob_to_directory() {
        let dir = tempfile::tempdir().unwrap();
        let transport = FixedTransport(Ok(None));
        let images = FakeImages::returning(&[]);
        let sink = BufferSink::new();
        let dispatcher =
            CommandDispatcher::new(&transport, &images, &sink).with_export_dir(dir.path());

        let mut state = session_with_turn();
        let mut mode = Mode::Chat;
        let mut theme = Theme::Dark;
        dispatcher
            .dispatch(Command::Export, &mut state, &mut mode, &mut theme)
            .await;

        let messages = sink.bot_messages();
        assert!(messages[0].starts_with("Chat exported to "));

        let entries: Vec<_> = std::fs::read_dir(dir.path()).unwrap().collect();
        assert_eq!(entries.len(), 1);
        let content = std::fs::read_to_string(entries[0].as_ref().unwrap().path()).unwrap();
        assert!(content.starts_with("[CHAT LOG]\nUser: hi"));
    }
}
