//! Conversational LLM client core: context compaction, response parsing, and
//! command dispatch.
//!
//! `confab-rs` implements the stateful pipeline behind a chat client that
//! talks to an OpenAI-style chat completions API. The core abstraction is the
//! [`ChatOrchestrator`](chat::ChatOrchestrator) — a linear per-message flow
//! that assembles conversation context (compacting it into a running summary
//! when it grows), sends the request through a [`Transport`], interprets the
//! raw reply (separating `<think>` reasoning from the answer, detecting an
//! embedded image-generation directive), and routes the result to either the
//! display path or the image-generation path.
//!
//! # Getting started
//!
//! ```ignore
//! use confab_rs::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), String> {
//!     let config = ClientConfig::from_env();
//!     let transport = ApiClient::new(&config)?;
//!     let images = ImageClient::new(&config)?;
//!     let sink = TerminalSink;
//!
//!     let mut orchestrator = ChatOrchestrator::new(&transport, &images, &sink)
//!         .with_mode(Mode::Reasoning);
//!
//!     orchestrator.handle_input("hello there").await;
//!     orchestrator.handle_input("/image a red fox flux schnell 2").await;
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`chat`] | [`Mode`](chat::Mode) personas and the [`ChatOrchestrator`](chat::ChatOrchestrator) per-message flow |
//! | [`context`] | Conversation memory, token estimation, summarization, context assembly |
//! | [`parse`] | Reasoning-block separation and strict image-directive parsing |
//! | [`command`] | Slash-command vocabulary, parsing, and the dispatcher |
//! | [`images`] | Image model registry and the image-generation client |
//! | [`ui`] | Presentation sink trait plus terminal and buffering implementations |
//! | [`config`] | Endpoint and credential configuration |
//!
//! # Design notes
//!
//! 1. **One session, one flow.** The memory / summary / counter triple lives
//!    in a single [`SessionState`](context::SessionState) owned by the
//!    orchestrator; every mutation goes through its named operations. Each
//!    submission is processed to completion before the next is accepted.
//! 2. **Failures degrade to messages.** Nothing in the core is fatal: a
//!    transport failure discards the exchange and surfaces a notice, a
//!    malformed directive falls back to plain text display, a failed
//!    summarization falls back to a deterministic local summary.
//! 3. **Strict in, fuzzy out.** Model-emitted directives are parsed with an
//!    exact structural grammar and rejected on any deviation; user-typed
//!    commands get best-effort fuzzy matching. The asymmetry is intentional.

pub mod chat;
pub mod command;
pub mod config;
pub mod context;
pub mod images;
pub mod parse;
pub mod prelude;
pub mod ui;

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Instant;
use tracing::{debug, warn};

use crate::config::ClientConfig;

// ── Message types ──────────────────────────────────────────────────

/// Role of a message in a chat completion request.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl std::fmt::Display for ChatRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChatRole::System => write!(f, "system"),
            ChatRole::User => write!(f, "user"),
            ChatRole::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a chat completion request.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Chat completion request body: a model identifier and an ordered message
/// sequence. Cloned into the transport future, so it stays `Clone`.
#[derive(Serialize, Clone, Debug)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
}

// ── Response types ─────────────────────────────────────────────────

/// Raw API response (internal deserialization target).
#[derive(Deserialize, Debug)]
struct RawChatResponse {
    choices: Option<Vec<RawChoice>>,
    error: Option<ApiErrorBody>,
    #[serde(default)]
    usage: Option<UsageInfo>,
}

#[derive(Deserialize, Debug)]
struct RawChoice {
    message: RawResponseMessage,
}

#[derive(Deserialize, Debug)]
struct RawResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize, Debug)]
struct ApiErrorBody {
    message: String,
}

/// Token usage statistics reported by the API.
#[derive(Deserialize, Debug, Clone)]
pub struct UsageInfo {
    pub prompt_tokens: Option<u32>,
    pub completion_tokens: Option<u32>,
    pub total_tokens: Option<u32>,
}

/// Clean return type from a transport call.
#[derive(Debug, Clone)]
pub struct ChatReply {
    /// Assistant text, absent when the API returned no choices or no content.
    pub content: Option<String>,
    /// Token usage, when the API reports it.
    pub usage: Option<UsageInfo>,
}

// ── Transport trait ────────────────────────────────────────────────

/// Boxed future returned by [`Transport::send`].
///
/// Type alias to keep trait signatures and implementations readable.
pub type TransportFuture<'a> = Pin<Box<dyn Future<Output = Result<ChatReply, String>> + Send + 'a>>;

/// The request/response mechanism to the language-model backend.
///
/// The orchestrator and summarizer depend on this trait rather than a
/// concrete HTTP client, so tests (and embedders) can substitute an
/// in-process fake. [`ApiClient`] is the bundled HTTP implementation.
pub trait Transport: Send + Sync {
    /// Send a chat completion request. Implementations clone what they need
    /// from `request`; the returned future borrows only `self`.
    fn send(&self, request: &ChatRequest) -> TransportFuture<'_>;
}

// ── HTTP client ────────────────────────────────────────────────────

/// Async HTTP client for an OpenAI-style chat completions endpoint.
///
/// Holds an ordered list of API credentials. Each request tries the
/// credentials in order: any non-success status or network error moves on to
/// the next one, and only after the whole list is exhausted does the call
/// fail. Requests carry a bounded timeout, so a hung connection surfaces as
/// an ordinary transport failure instead of stalling the session.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    api_keys: Vec<String>,
}

impl ApiClient {
    /// Create a new client from the given configuration.
    pub fn new(config: &ClientConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("confab/0.1")
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: config.api_base.clone(),
            api_keys: config.api_keys.clone(),
        })
    }

    /// Send a chat completion request, rotating through the credential list.
    pub async fn chat(&self, request: &ChatRequest) -> Result<ChatReply, String> {
        if self.api_keys.is_empty() {
            return Err("no API credentials configured".to_string());
        }

        debug!(
            "chat request: model={}, messages={}",
            request.model,
            request.messages.len()
        );

        let start = Instant::now();
        let mut last_err = String::new();
        for (i, key) in self.api_keys.iter().enumerate() {
            match self.attempt(key, request).await {
                Ok(reply) => {
                    debug!(
                        "chat response via credential {} of {} in {:.1}s",
                        i + 1,
                        self.api_keys.len(),
                        start.elapsed().as_secs_f64(),
                    );
                    return Ok(reply);
                }
                Err(e) => {
                    warn!("credential {} of {} failed: {e}", i + 1, self.api_keys.len());
                    last_err = e;
                }
            }
        }

        Err(format!(
            "all {} API credentials exhausted: {last_err}",
            self.api_keys.len()
        ))
    }

    /// One attempt against the endpoint with a single credential.
    async fn attempt(&self, key: &str, request: &ChatRequest) -> Result<ChatReply, String> {
        let resp = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {key}"))
            .json(request)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("chat API HTTP {status}: {text}"));
        }

        let parsed: RawChatResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        if let Some(err) = parsed.error {
            return Err(format!("chat API error: {}", err.message));
        }

        let usage = parsed.usage;
        if let Some(ref u) = usage {
            debug!(
                "token usage: prompt={}, completion={}, total={}",
                u.prompt_tokens.unwrap_or(0),
                u.completion_tokens.unwrap_or(0),
                u.total_tokens.unwrap_or(0),
            );
        }

        let content = parsed
            .choices
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.message.content);

        Ok(ChatReply { content, usage })
    }
}

impl Transport for ApiClient {
    fn send(&self, request: &ChatRequest) -> TransportFuture<'_> {
        let request = request.clone();
        Box::pin(async move { self.chat(&request).await })
    }
}
