//! Generation settings and API constants for Colloquy
//!
//! This module defines the user-tunable generation settings, the
//! partial-update type used to merge changes from the CLI, and the
//! constants describing the remote inference endpoint.

use serde::{Deserialize, Serialize};

/// Base URL of the hosted inference endpoint
///
/// Requests are issued as `POST {API_BASE_URL}/{model}`.
pub const API_BASE_URL: &str = "https://api-inference.huggingface.co/models";

/// Client-side request timeout (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Bounds for `max_tokens`
pub const MAX_TOKENS_MIN: u32 = 128;
pub const MAX_TOKENS_MAX: u32 = 1024;

/// Bounds for `temperature`
pub const TEMPERATURE_MIN: f32 = 0.1;
pub const TEMPERATURE_MAX: f32 = 1.0;

/// Bounds for `top_p`
pub const TOP_P_MIN: f32 = 0.1;
pub const TOP_P_MAX: f32 = 1.0;

/// A hosted model the settings command offers by name
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModelOption {
    /// Short label shown in listings
    pub label: &'static str,
    /// Full model identifier sent in the request path
    pub id: &'static str,
}

/// Models the client knows by a short label
///
/// Any other identifier can still be set verbatim; this catalog only
/// drives the `settings models` listing and label resolution.
pub const MODEL_CATALOG: &[ModelOption] = &[
    ModelOption {
        label: "Mistral 7B",
        id: "mistralai/Mistral-7B-Instruct-v0.2",
    },
    ModelOption {
        label: "Llama 2 7B",
        id: "meta-llama/Llama-2-7b-chat-hf",
    },
    ModelOption {
        label: "Zephyr 7B",
        id: "HuggingFaceH4/zephyr-7b-beta",
    },
    ModelOption {
        label: "Phi-2",
        id: "microsoft/phi-2",
    },
];

/// Generation settings
///
/// Initialized from defaults, overwritten per-field through
/// [`SettingsPatch`], and persisted after every change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Model identifier used in the request path
    #[serde(default = "default_model")]
    pub model: String,

    /// Sampling temperature
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Maximum number of new tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Nucleus sampling parameter
    #[serde(default = "default_top_p")]
    pub top_p: f32,
}

fn default_model() -> String {
    MODEL_CATALOG[0].id.to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    512
}

fn default_top_p() -> f32 {
    0.9
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            top_p: default_top_p(),
        }
    }
}

impl Settings {
    /// Merge a partial update into these settings, clamping numeric
    /// fields to their documented bounds.
    pub fn apply(&mut self, patch: SettingsPatch) {
        if let Some(model) = patch.model {
            self.model = model;
        }
        if let Some(temperature) = patch.temperature {
            self.temperature = temperature.clamp(TEMPERATURE_MIN, TEMPERATURE_MAX);
        }
        if let Some(max_tokens) = patch.max_tokens {
            self.max_tokens = max_tokens.clamp(MAX_TOKENS_MIN, MAX_TOKENS_MAX);
        }
        if let Some(top_p) = patch.top_p {
            self.top_p = top_p.clamp(TOP_P_MIN, TOP_P_MAX);
        }
    }
}

/// Per-request generation parameters
///
/// The request client takes these alongside the model identifier; the
/// chat command derives them from the stored [`Settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationOptions {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            max_new_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

impl From<&Settings> for GenerationOptions {
    fn from(settings: &Settings) -> Self {
        Self {
            max_new_tokens: settings.max_tokens,
            temperature: settings.temperature,
            top_p: settings.top_p,
        }
    }
}

/// Partial settings update
///
/// `None` fields are left untouched by [`Settings::apply`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsPatch {
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub top_p: Option<f32>,
}

impl SettingsPatch {
    /// Whether this patch changes anything at all
    pub fn is_empty(&self) -> bool {
        self.model.is_none()
            && self.temperature.is_none()
            && self.max_tokens.is_none()
            && self.top_p.is_none()
    }
}

/// Resolve a model identifier from either a catalog label or a raw id
///
/// Matching against labels is case-insensitive; anything that is not a
/// known label is returned verbatim so users can point the client at an
/// arbitrary hosted model.
pub fn resolve_model(input: &str) -> String {
    MODEL_CATALOG
        .iter()
        .find(|option| option.label.eq_ignore_ascii_case(input))
        .map(|option| option.id.to_string())
        .unwrap_or_else(|| input.to_string())
}

/// Basic shape check for HuggingFace credentials
///
/// Advisory only: the auth command warns on values that do not look
/// like an `hf_` token but stores them regardless.
pub fn looks_like_credential(key: &str) -> bool {
    key.len() > 10 && key.starts_with("hf_")
}
