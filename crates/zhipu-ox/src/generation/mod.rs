//! Image and video generation endpoints.

pub mod image;
pub mod video;

use serde::{Deserialize, Serialize};

pub use image::{GeneratedImage, ImageGenerationRequest, ImageGenerationResponse, ImageResponseFormat};
pub use video::{GeneratedVideo, TaskStatus, VideoGenerationRequest, VideoTask, VideoTaskResult};

/// Output quality; `speed` trades detail for latency.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Standard,
    Hd,
    Quality,
    Speed,
}
