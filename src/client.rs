//! HTTP client for the hosted text-generation endpoint
//!
//! One POST per call, bearer-authenticated, with at most one
//! generation request in flight at a time: starting a new request
//! cancels the previous one, and a result arriving after cancellation
//! is discarded rather than applied. Title generation runs outside the
//! single-flight slot because its output is cosmetic and must never
//! block or corrupt the main flow.

use crate::config::{self, GenerationOptions};
use crate::error::AppError;
use crate::prompt;
use crate::session::Message;
use anyhow::Context;
use parking_lot::Mutex;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Parameters for one title-generation request
const TITLE_MAX_NEW_TOKENS: u32 = 20;
const TITLE_TEMPERATURE: f32 = 0.5;
const TITLE_TOP_P: f32 = 0.9;

/// Request body for the generation endpoint
#[derive(Debug, Serialize)]
struct GenerationRequest<'a> {
    inputs: &'a str,
    parameters: GenerationParameters,
}

/// Generation parameters sent with every request
///
/// `return_full_text` and `do_sample` are fixed: the prompt is never
/// echoed back and sampling is always on.
#[derive(Debug, Serialize)]
struct GenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
    do_sample: bool,
}

/// One element of the success payload
#[derive(Debug, Deserialize)]
struct GenerationChunk {
    #[serde(default)]
    generated_text: String,
}

/// Error payload shape for non-2xx responses
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    estimated_time: Option<f64>,
}

/// Exclusive slot holding the cancellation token of the in-flight
/// generation request
///
/// Each request gets a generation number so a superseded call can never
/// clear its successor's token when it finally unwinds.
#[derive(Debug, Default)]
struct RequestSlot {
    current: Mutex<Option<ActiveRequest>>,
    next_id: AtomicU64,
}

#[derive(Debug)]
struct ActiveRequest {
    id: u64,
    token: CancellationToken,
}

impl RequestSlot {
    /// Cancel whatever is in flight and install a fresh token
    fn begin(&self) -> (u64, CancellationToken) {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        let mut current = self.current.lock();
        if let Some(previous) = current.take() {
            tracing::debug!("Cancelling superseded generation request");
            previous.token.cancel();
        }
        *current = Some(ActiveRequest {
            id,
            token: token.clone(),
        });
        (id, token)
    }

    /// Release the slot, but only if it still belongs to `id`
    fn finish(&self, id: u64) {
        let mut current = self.current.lock();
        if current.as_ref().map(|active| active.id) == Some(id) {
            *current = None;
        }
    }

    fn cancel(&self) {
        if let Some(active) = self.current.lock().take() {
            active.token.cancel();
        }
    }

    fn is_active(&self) -> bool {
        self.current.lock().is_some()
    }
}

/// Client for the hosted inference endpoint
///
/// Cheap to clone; clones share the HTTP connection pool and the
/// single-flight slot.
#[derive(Clone)]
pub struct ChatClient {
    http: reqwest::Client,
    base_url: String,
    slot: Arc<RequestSlot>,
}

impl ChatClient {
    /// Create a client against the production endpoint
    pub fn new() -> crate::error::Result<Self> {
        Self::with_base_url(config::API_BASE_URL)
    }

    /// Create a client against an alternate base URL
    ///
    /// This allows tests to point the client at a mock server.
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy::client::ChatClient;
    ///
    /// let client = ChatClient::with_base_url("http://localhost:9090").unwrap();
    /// assert!(!client.has_active_request());
    /// ```
    pub fn with_base_url(base_url: impl Into<String>) -> crate::error::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config::REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("colloquy/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            base_url: base_url.into(),
            slot: Arc::new(RequestSlot::default()),
        })
    }

    /// Send a message history and return the model's reply
    ///
    /// At most one of these runs at a time: a call made while another
    /// is outstanding cancels the older one, which then resolves to a
    /// [`AppError::Timeout`]. The slot is released on every outcome.
    pub async fn send_message(
        &self,
        messages: &[Message],
        credential: &str,
        model: &str,
        options: &GenerationOptions,
    ) -> Result<String, AppError> {
        let (request_id, token) = self.slot.begin();

        let inputs = prompt::format_messages(messages);
        let body = GenerationRequest {
            inputs: &inputs,
            parameters: GenerationParameters {
                max_new_tokens: options.max_new_tokens,
                temperature: options.temperature,
                top_p: options.top_p,
                return_full_text: false,
                do_sample: true,
            },
        };

        tracing::debug!(
            "Sending generation request: model={}, {} messages",
            model,
            messages.len()
        );

        let outcome = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Generation request cancelled before completion");
                Err(AppError::timeout())
            }
            result = self.execute(model, credential, &body) => result,
        };

        // A result that raced the cancellation is discarded, never
        // handed to the caller.
        let outcome = if token.is_cancelled() {
            Err(AppError::timeout())
        } else {
            outcome
        };

        self.slot.finish(request_id);

        if let Err(err) = &outcome {
            tracing::warn!("Generation request failed ({}): {}", err.kind(), err);
        }
        outcome
    }

    /// Ask the model for a 3-5 word title summarizing the first exchange
    ///
    /// Best-effort: every failure degrades to `None`. Runs outside the
    /// single-flight slot so it can overlap an ongoing generation.
    pub async fn generate_title(
        &self,
        user_text: &str,
        assistant_text: &str,
        credential: &str,
        model: &str,
    ) -> Option<String> {
        let inputs = prompt::title_prompt(user_text, assistant_text);
        let body = GenerationRequest {
            inputs: &inputs,
            parameters: GenerationParameters {
                max_new_tokens: TITLE_MAX_NEW_TOKENS,
                temperature: TITLE_TEMPERATURE,
                top_p: TITLE_TOP_P,
                return_full_text: false,
                do_sample: true,
            },
        };

        match self.execute(model, credential, &body).await {
            Ok(text) => prompt::clean_title(&text),
            Err(err) => {
                tracing::debug!("Title generation failed ({}): {}", err.kind(), err);
                None
            }
        }
    }

    /// Cancel the in-flight generation request, if any; idempotent
    pub fn cancel_current_request(&self) {
        self.slot.cancel();
    }

    /// Whether a generation request is currently outstanding
    pub fn has_active_request(&self) -> bool {
        self.slot.is_active()
    }

    async fn execute(
        &self,
        model: &str,
        credential: &str,
        body: &GenerationRequest<'_>,
    ) -> Result<String, AppError> {
        let url = format!("{}/{}", self.base_url, model);

        let response = self
            .http
            .post(&url)
            .bearer_auth(credential)
            .json(body)
            .send()
            .await
            .map_err(classify_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let error_body: ErrorBody = response.json().await.unwrap_or_default();
            return Err(classify_status(status, error_body));
        }

        let chunks: Vec<GenerationChunk> = response
            .json()
            .await
            .map_err(|err| AppError::unknown(Some(format!("Failed to parse response: {}", err))))?;

        let text = chunks
            .first()
            .map(|chunk| chunk.generated_text.trim().to_string())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AppError::empty_response());
        }
        Ok(text)
    }
}

/// Map a transport-level failure to the taxonomy
///
/// Any error on `send()` means no response was received: timeouts keep
/// their own kind, everything else is a connectivity failure.
fn classify_request_error(err: reqwest::Error) -> AppError {
    if err.is_timeout() {
        tracing::debug!("Request timed out: {}", err);
        AppError::timeout()
    } else {
        tracing::debug!("Request failed without a response: {}", err);
        AppError::network()
    }
}

/// Map a non-2xx status (and its optional error body) to the taxonomy
fn classify_status(status: StatusCode, body: ErrorBody) -> AppError {
    match status {
        StatusCode::UNAUTHORIZED => AppError::api_key(),
        StatusCode::TOO_MANY_REQUESTS => AppError::rate_limit(),
        StatusCode::SERVICE_UNAVAILABLE => {
            AppError::model_loading(body.estimated_time.map(|t| t.ceil() as u64))
        }
        _ => AppError::unknown(body.error),
    }
}
