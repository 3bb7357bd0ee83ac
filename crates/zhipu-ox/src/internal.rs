use std::time::Duration;

use serde::de::DeserializeOwned;
use zhipu_ox_common::{
    BoxStream,
    request_builder::{Endpoint, HttpMethod, RequestBuilder, RequestConfig, StreamOptions},
};

use crate::{
    ChatRequest, ChatResponse, ZhipuRequestError,
    generation::{
        ImageGenerationRequest, ImageGenerationResponse, VideoGenerationRequest, VideoTask,
        VideoTaskResult,
    },
};

const CHAT_COMPLETIONS: &str = "chat/completions";
const IMAGE_GENERATIONS: &str = "images/generations";
const VIDEO_GENERATIONS: &str = "videos/generations";
const ASYNC_RESULT: &str = "async-result";

/// Zhipu client helper methods using the common RequestBuilder
pub(crate) struct ZhipuRequestHelper {
    request_builder: RequestBuilder,
    malformed_limit: Option<usize>,
}

impl ZhipuRequestHelper {
    pub(crate) fn new(
        client: reqwest::Client,
        base_url: &str,
        api_key: &str,
        malformed_limit: Option<usize>,
    ) -> Self {
        let config = RequestConfig::new(base_url)
            .with_bearer_token(api_key)
            .with_user_agent(concat!("zhipu-ox/", env!("CARGO_PKG_VERSION")));

        Self {
            request_builder: RequestBuilder::new(client, config),
            malformed_limit,
        }
    }

    pub(crate) async fn send_chat_request(
        &self,
        request: &ChatRequest,
        timeout: Duration,
    ) -> Result<ChatResponse, ZhipuRequestError> {
        let endpoint = Endpoint::new(CHAT_COMPLETIONS, HttpMethod::Post).with_timeout(timeout);
        self.request_builder
            .request_json(&endpoint, Some(request))
            .await
    }

    pub(crate) fn stream_chat_request<T>(
        &self,
        request: &ChatRequest,
        timeout: Duration,
    ) -> BoxStream<'static, Result<T, ZhipuRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let endpoint = Endpoint::new(CHAT_COMPLETIONS, HttpMethod::Post).with_timeout(timeout);
        let options = StreamOptions {
            malformed_limit: self.malformed_limit,
            ..StreamOptions::default()
        };
        self.request_builder.stream(&endpoint, Some(request), options)
    }

    pub(crate) async fn generate_images(
        &self,
        request: &ImageGenerationRequest,
        timeout: Duration,
    ) -> Result<ImageGenerationResponse, ZhipuRequestError> {
        let endpoint = Endpoint::new(IMAGE_GENERATIONS, HttpMethod::Post).with_timeout(timeout);
        self.request_builder
            .request_json(&endpoint, Some(request))
            .await
    }

    pub(crate) async fn generate_video(
        &self,
        request: &VideoGenerationRequest,
        timeout: Duration,
    ) -> Result<VideoTask, ZhipuRequestError> {
        let endpoint = Endpoint::new(VIDEO_GENERATIONS, HttpMethod::Post).with_timeout(timeout);
        self.request_builder
            .request_json(&endpoint, Some(request))
            .await
    }

    pub(crate) async fn retrieve_video(
        &self,
        task_id: &str,
        timeout: Duration,
    ) -> Result<VideoTaskResult, ZhipuRequestError> {
        let endpoint = Endpoint::new(format!("{ASYNC_RESULT}/{task_id}"), HttpMethod::Get)
            .with_timeout(timeout);
        self.request_builder.request(&endpoint).await
    }
}
