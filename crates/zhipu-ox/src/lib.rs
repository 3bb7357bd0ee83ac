#![cfg_attr(not(test), deny(unsafe_code))]
#![warn(
    clippy::pedantic,
    clippy::unwrap_used,
    clippy::missing_docs_in_private_items
)]

//! Client for the Zhipu (BigModel) open platform.
//!
//! Chat completions (plain, streamed, multimodal, with tools or deep
//! thinking), image generation and asynchronous video generation.

pub mod error;
pub mod generation;
mod internal;
pub mod message;
pub mod model;
pub mod request;
pub mod response;
pub mod stream;
pub mod tool;
pub mod usage;

// Re-export main types
pub use error::ZhipuRequestError;
pub use generation::{
    ImageGenerationRequest, ImageGenerationResponse, TaskStatus, VideoGenerationRequest,
    VideoTask, VideoTaskResult,
};
pub use message::{ContentPart, Message, MessageContent, Messages};
pub use model::{Model, ModelCategory};
pub use request::{ChatRequest, ResponseFormat, Thinking};
pub use response::{ChatCompletionChunk, ChatResponse};
pub use stream::{StreamDecoder, StreamFrame, delta_content};
pub use tool::{Tool, ToolCall, ToolChoice, ToolFunction};
pub use usage::Usage;

use std::time::Duration;

use bon::Builder;
use core::fmt;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use serde::de::DeserializeOwned;
use serde_json::Value;
#[cfg(feature = "leaky-bucket")]
use leaky_bucket::RateLimiter;
#[cfg(feature = "leaky-bucket")]
use std::sync::Arc;

use crate::internal::ZhipuRequestHelper;

pub const BASE_URL: &str = "https://open.bigmodel.cn/api/paas/v4";

/// Variables holding the API key, in lookup order.
pub const API_KEY_VARS: [&str; 2] = ["VITE_ZHIPU_API_KEY", "ZHIPU_API_KEY"];

/// Variables overriding the base URL, in lookup order.
pub const BASE_URL_VARS: [&str; 2] = ["VITE_ZHIPU_BASE_URL", "ZHIPU_BASE_URL"];

/// Per-call deadlines used when the client has no explicit timeout.
pub mod timeouts {
    use std::time::Duration;

    pub const CHAT: Duration = Duration::from_secs(60);
    pub const THINKING: Duration = Duration::from_secs(120);
    pub const VIDEO_UNDERSTANDING: Duration = Duration::from_secs(180);
    pub const IMAGE_GENERATION: Duration = Duration::from_secs(120);
    pub const VIDEO_GENERATION: Duration = Duration::from_secs(300);
}

#[derive(Clone, Builder)]
pub struct Zhipu {
    #[builder(into)]
    pub(crate) api_key: String,
    #[builder(default)]
    pub(crate) client: reqwest::Client,
    #[cfg(feature = "leaky-bucket")]
    pub(crate) leaky_bucket: Option<Arc<RateLimiter>>,
    #[builder(default = BASE_URL.to_string(), into)]
    pub(crate) base_url: String,
    /// Overrides the per-endpoint default deadline for every call.
    pub(crate) timeout: Option<Duration>,
    /// Abort a stream after this many consecutive undecodable frames.
    pub(crate) malformed_frame_limit: Option<usize>,
}

impl Zhipu {
    /// Create a new Zhipu client with the provided API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::builder().api_key(api_key).build()
    }

    /// Build a client from `VITE_ZHIPU_API_KEY` / `ZHIPU_API_KEY` and the
    /// optional base URL override.
    pub fn load_from_env() -> Result<Self, ZhipuRequestError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`Zhipu::load_from_env`], reading variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ZhipuRequestError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let first_set = |names: &[&str]| {
            names
                .iter()
                .filter_map(|name| lookup(name))
                .find(|value| !value.trim().is_empty())
        };

        let api_key = first_set(&API_KEY_VARS[..]).ok_or(ZhipuRequestError::AuthenticationMissing)?;
        let base_url = first_set(&BASE_URL_VARS[..]).unwrap_or_else(|| BASE_URL.to_string());

        Ok(Self::builder().api_key(api_key).base_url(base_url).build())
    }

    /// A copy of this client with a fixed deadline for every call.
    #[must_use]
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self.clone()
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// The API key with all but the first 8 and last 4 characters hidden.
    pub fn masked_api_key(&self) -> String {
        let chars: Vec<char> = self.api_key.chars().collect();
        if chars.len() <= 12 {
            return "*".repeat(chars.len());
        }
        let head: String = chars[..8].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    }

    /// Create request helper for internal use
    fn request_helper(&self) -> ZhipuRequestHelper {
        ZhipuRequestHelper::new(
            self.client.clone(),
            &self.base_url,
            &self.api_key,
            self.malformed_frame_limit,
        )
    }

    /// Wait for the rate limiter, if one is configured.
    async fn acquire(&self) {
        #[cfg(feature = "leaky-bucket")]
        if let Some(ref limiter) = self.leaky_bucket {
            limiter.acquire_one().await;
        }
    }
}

impl Zhipu {
    pub async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, ZhipuRequestError> {
        self.acquire().await;

        let timeout = self.timeout.unwrap_or_else(|| request.default_timeout());
        self.request_helper().send_chat_request(request, timeout).await
    }

    /// Stream typed chunks: content, reasoning, tool-call deltas and the final usage.
    ///
    /// Frames that are valid JSON but do not fit [`ChatCompletionChunk`] are
    /// skipped; [`Zhipu::stream_text`] still reads their content.
    pub fn stream(
        &self,
        request: &ChatRequest,
    ) -> BoxStream<'static, Result<ChatCompletionChunk, ZhipuRequestError>> {
        self.stream_events(request)
    }

    fn stream_events<T>(
        &self,
        request: &ChatRequest,
    ) -> BoxStream<'static, Result<T, ZhipuRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        use async_stream::try_stream;

        let helper = self.request_helper();
        let mut request_data = request.clone();
        request_data.stream = Some(true);
        let timeout = self.timeout.unwrap_or_else(|| request.default_timeout());

        #[cfg(feature = "leaky-bucket")]
        let rate_limiter = self.leaky_bucket.clone();

        Box::pin(try_stream! {
            #[cfg(feature = "leaky-bucket")]
            if let Some(ref limiter) = rate_limiter {
                limiter.acquire_one().await;
            }

            let mut stream = helper.stream_chat_request::<T>(&request_data, timeout);
            while let Some(result) = stream.next().await {
                yield result?;
            }
        })
    }

    /// Stream only the generated text, ending with a single [`StreamFrame::StreamEnd`].
    ///
    /// The end frame is produced both for `[DONE]` and for a connection that
    /// closes without it. Errors are yielded in place of the end frame.
    pub fn stream_text(
        &self,
        request: &ChatRequest,
    ) -> BoxStream<'static, Result<StreamFrame, ZhipuRequestError>> {
        let mut chunks = self.stream_events::<Value>(request);

        Box::pin(async_stream::try_stream! {
            while let Some(chunk) = chunks.next().await {
                let chunk = chunk?;
                if let Some(text) = delta_content(&chunk) {
                    yield StreamFrame::ContentDelta(text.to_string());
                }
            }
            yield StreamFrame::StreamEnd;
        })
    }
}

impl fmt::Debug for Zhipu {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Zhipu")
            .field("api_key", &"[REDACTED]")
            .field("client", &self.client)
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
