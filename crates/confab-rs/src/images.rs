//! Image model registry and the image-generation client.
//!
//! The registry is a static ordered list consulted by both dispatch paths:
//! the textual `/image` command matches a model-name fragment fuzzily, while
//! a model-emitted directive resolves by exact display name. One fixed entry
//! is the fallback for unresolved names.

use serde::Deserialize;
use std::future::Future;
use std::pin::Pin;
use tracing::debug;

use crate::config::ClientConfig;

/// Upper bound on images per request; larger counts are rejected by the
/// client and clamped by the command parser.
pub const MAX_IMAGES_PER_REQUEST: u32 = 4;

/// Fixed output resolution requested from the backend.
pub const IMAGE_SIZE: &str = "1024x1024";

/// A known image-generation model: backend identifier plus display name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageModel {
    pub id: &'static str,
    pub name: &'static str,
}

impl ImageModel {
    /// Lowercased display name with any parenthesized qualifier removed —
    /// the fragment users actually type (`"Flux Schnell (Fast)"` matches on
    /// `"flux schnell"`).
    pub fn search_key(&self) -> String {
        let base = self
            .name
            .split_once(" (")
            .map_or(self.name, |(base, _)| base);
        base.to_lowercase()
    }
}

/// The static model registry, in display order.
pub const IMAGE_MODELS: &[ImageModel] = &[
    ImageModel { id: "provider-4/flux-schnell", name: "Flux Schnell (Fast)" },
    ImageModel { id: "provider-4/flux-dev", name: "Flux Dev" },
    ImageModel { id: "provider-4/phoenix", name: "Phoenix" },
    ImageModel { id: "provider-4/sdxl-turbo", name: "SDXL Turbo" },
    ImageModel { id: "provider-4/dall-e-3", name: "DALL-E 3" },
    ImageModel { id: "provider-4/imagen-4", name: "Imagen 4" },
];

/// The fixed fallback entry used when a directive names an unknown model.
pub const DEFAULT_IMAGE_MODEL: &ImageModel = &IMAGE_MODELS[5];

/// Resolve a display name by case-insensitive exact match.
pub fn resolve_exact(name: &str) -> Option<&'static ImageModel> {
    IMAGE_MODELS
        .iter()
        .find(|model| model.name.eq_ignore_ascii_case(name))
}

/// Find the first registry entry whose search key occurs in `text`,
/// case-insensitively.
pub fn resolve_fragment(text: &str) -> Option<&'static ImageModel> {
    let haystack = text.to_lowercase();
    IMAGE_MODELS
        .iter()
        .find(|model| haystack.contains(&model.search_key()))
}

/// Display name for a model id, falling back to the id's last path segment
/// for ids outside the registry.
pub fn display_name_for(id: &str) -> String {
    IMAGE_MODELS
        .iter()
        .find(|model| model.id == id)
        .map(|model| model.name.to_string())
        .unwrap_or_else(|| id.rsplit('/').next().unwrap_or(id).to_string())
}

/// All display names joined for help and prompt text.
pub fn model_names() -> String {
    IMAGE_MODELS
        .iter()
        .map(|model| model.name)
        .collect::<Vec<_>>()
        .join(", ")
}

// ── Image generation client ────────────────────────────────────────

/// Boxed future returned by [`ImageBackend::generate`].
pub type ImageFuture<'a> = Pin<Box<dyn Future<Output = Result<Vec<String>, String>> + Send + 'a>>;

/// The image-generation collaborator: prompt + model id + count in, ordered
/// image URLs out. [`ImageClient`] is the bundled HTTP implementation.
pub trait ImageBackend: Send + Sync {
    fn generate(&self, prompt: &str, model_id: &str, count: u32) -> ImageFuture<'_>;
}

#[derive(Deserialize, Debug)]
struct RawImageResponse {
    data: Option<Vec<RawImage>>,
}

#[derive(Deserialize, Debug)]
struct RawImage {
    url: Option<String>,
}

/// Async HTTP client for the image-generation endpoint.
pub struct ImageClient {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ImageClient {
    /// Create a new client from the given configuration. Uses the first
    /// configured credential.
    pub fn new(config: &ClientConfig) -> Result<Self, String> {
        let client = reqwest::Client::builder()
            .user_agent("confab/0.1")
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| format!("failed to build HTTP client: {e}"))?;
        Ok(Self {
            client,
            base_url: config.images_base.clone(),
            api_key: config.api_keys.first().cloned(),
        })
    }

    async fn generate_inner(
        &self,
        prompt: String,
        model_id: String,
        count: u32,
    ) -> Result<Vec<String>, String> {
        if prompt.trim().is_empty() {
            return Err("image prompt is empty".to_string());
        }
        if count == 0 || count > MAX_IMAGES_PER_REQUEST {
            return Err(format!(
                "image count {count} outside 1..={MAX_IMAGES_PER_REQUEST}"
            ));
        }
        let key = self
            .api_key
            .as_deref()
            .ok_or_else(|| "no API credentials configured".to_string())?;

        debug!("image request: model={model_id}, count={count}");

        let body = serde_json::json!({
            "model": model_id,
            "prompt": prompt,
            "n": count,
            "size": IMAGE_SIZE,
        });

        let resp = self
            .client
            .post(&self.base_url)
            .header("Authorization", format!("Bearer {key}"))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("request failed: {e}"))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| format!("failed to read response: {e}"))?;

        if !status.is_success() {
            return Err(format!("image API HTTP {status}: {text}"));
        }

        let parsed: RawImageResponse =
            serde_json::from_str(&text).map_err(|e| format!("failed to parse response: {e}"))?;

        let urls: Vec<String> = parsed
            .data
            .unwrap_or_default()
            .into_iter()
            .filter_map(|image| image.url)
            .collect();

        debug!("image response: {} url(s)", urls.len());
        Ok(urls)
    }
}

impl ImageBackend for ImageClient {
    fn generate(&self, prompt: &str, model_id: &str, count: u32) -> ImageFuture<'_> {
        let prompt = prompt.to_string();
        let model_id = model_id.to_string();
        Box::pin(async move { self.generate_inner(prompt, model_id, count).await })
    }
}
