use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use super::Quality;
use crate::{Zhipu, ZhipuRequestError, model::Model, timeouts};

/// Request for video generation. Text-to-video, or image-to-video when
/// `image_url` is set.
#[derive(Debug, Clone, Serialize, Builder)]
pub struct VideoGenerationRequest {
    /// The model to use, e.g. `cogvideox-flash`
    #[builder(into)]
    pub model: Model,

    #[builder(into)]
    pub prompt: String,

    /// First frame, as a URL or a base64 data URL
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    /// `WIDTHxHEIGHT`, e.g. `1920x1080`
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub fps: Option<u32>,

    /// Length in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub with_audio: Option<bool>,

    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Processing,
    Success,
    #[serde(alias = "FAILED")]
    Fail,
    #[serde(other)]
    Unknown,
}

impl TaskStatus {
    pub fn is_finished(self) -> bool {
        !matches!(self, Self::Processing)
    }
}

/// Handle returned when a generation task is accepted
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTask {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(alias = "status", default = "processing")]
    pub task_status: TaskStatus,
}

fn processing() -> TaskStatus {
    TaskStatus::Processing
}

/// State of a generation task, from `GET /async-result/{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoTaskResult {
    #[serde(alias = "status")]
    pub task_status: TaskStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
    #[serde(default)]
    pub video_result: Vec<GeneratedVideo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedVideo {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_image_url: Option<String>,
}

impl VideoTaskResult {
    pub fn video_url(&self) -> Option<&str> {
        self.video_result.first().map(|video| video.url.as_str())
    }
}

impl Zhipu {
    /// Submit a video generation task. The video is produced asynchronously.
    pub async fn generate_video(
        &self,
        request: &VideoGenerationRequest,
    ) -> Result<VideoTask, ZhipuRequestError> {
        self.acquire().await;

        let timeout = self.timeout.unwrap_or(timeouts::VIDEO_GENERATION);
        self.request_helper().generate_video(request, timeout).await
    }

    /// Query the state of a generation task.
    pub async fn retrieve_video(&self, task_id: &str) -> Result<VideoTaskResult, ZhipuRequestError> {
        self.acquire().await;

        let timeout = self.timeout.unwrap_or(timeouts::CHAT);
        self.request_helper().retrieve_video(task_id, timeout).await
    }

    /// Poll a task until it leaves `PROCESSING` or `max_polls` queries were made.
    ///
    /// The task is always queried at least once, so a budget of 0 behaves
    /// like 1. Returns the last observed state; it is still `PROCESSING` when
    /// the poll budget ran out. A failed query ends the wait with that error.
    pub async fn wait_for_video(
        &self,
        task_id: &str,
        interval: Duration,
        max_polls: u32,
    ) -> Result<VideoTaskResult, ZhipuRequestError> {
        let mut polls = 0;
        loop {
            let result = self.retrieve_video(task_id).await?;
            polls += 1;

            if result.task_status.is_finished() || polls >= max_polls {
                return Ok(result);
            }

            log::debug!("video task {task_id} still processing after {polls} polls");
            tokio::time::sleep(interval).await;
        }
    }
}
