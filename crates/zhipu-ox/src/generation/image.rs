use bon::Builder;
use serde::{Deserialize, Serialize};

use super::Quality;
use crate::{Zhipu, ZhipuRequestError, model::Model, timeouts};

/// Request for text-to-image generation
#[derive(Debug, Clone, Serialize, Builder)]
pub struct ImageGenerationRequest {
    /// The model to use, e.g. `cogview-3-flash`
    #[builder(into)]
    pub model: Model,

    /// Description of the image
    #[builder(into)]
    pub prompt: String,

    /// Number of images to generate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub n: Option<u32>,

    /// `WIDTHxHEIGHT`, e.g. `1024x1024`, `768x1344`, `1344x768`
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ImageResponseFormat>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<Quality>,

    /// End-user id forwarded for abuse monitoring
    #[builder(into)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ImageResponseFormat {
    Url,
}

/// Response from image generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageGenerationResponse {
    #[serde(default)]
    pub created: u64,
    #[serde(default)]
    pub data: Vec<GeneratedImage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
}

impl ImageGenerationResponse {
    pub fn urls(&self) -> impl Iterator<Item = &str> {
        self.data.iter().map(|image| image.url.as_str())
    }
}

impl Zhipu {
    /// Generate images from a text prompt.
    pub async fn generate_images(
        &self,
        request: &ImageGenerationRequest,
    ) -> Result<ImageGenerationResponse, ZhipuRequestError> {
        self.acquire().await;

        let timeout = self.timeout.unwrap_or(timeouts::IMAGE_GENERATION);
        self.request_helper().generate_images(request, timeout).await
    }
}
