use std::fmt;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

/// What a model is for, and which endpoint it is called through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum ModelCategory {
    Text,
    Vision,
    Image,
    Video,
    Audio,
}

impl ModelCategory {
    /// The free model used when a caller does not pick one.
    pub fn default_model(self) -> Model {
        match self {
            Self::Text => Model::Glm47Flash,
            Self::Vision => Model::Glm46vFlash,
            Self::Image => Model::CogView3Flash,
            Self::Video => Model::CogVideoXFlash,
            Self::Audio => Model::Glm4Voice,
        }
    }
}

/// Zhipu models with a free tier, plus any other model id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Model {
    Glm47Flash,
    Glm4Flash250414,
    Glm46vFlash,
    Glm41vThinkingFlash,
    Glm4vFlash,
    CogView3Flash,
    CogVideoXFlash,
    Glm4Voice,
    /// Custom model (for models not in this enum)
    Custom(String),
}

const CATALOGUE: [Model; 8] = [
    Model::Glm47Flash,
    Model::Glm4Flash250414,
    Model::Glm46vFlash,
    Model::Glm41vThinkingFlash,
    Model::Glm4vFlash,
    Model::CogView3Flash,
    Model::CogVideoXFlash,
    Model::Glm4Voice,
];

impl Model {
    pub fn as_str(&self) -> &str {
        match self {
            Model::Glm47Flash => "glm-4.7-flash",
            Model::Glm4Flash250414 => "glm-4-flash-250414",
            Model::Glm46vFlash => "glm-4.6v-flash",
            Model::Glm41vThinkingFlash => "glm-4.1v-thinking-flash",
            Model::Glm4vFlash => "glm-4v-flash",
            Model::CogView3Flash => "cogview-3-flash",
            Model::CogVideoXFlash => "cogvideox-flash",
            Model::Glm4Voice => "glm-4-voice",
            Model::Custom(s) => s,
        }
    }

    /// Every known model, in catalogue order.
    pub fn catalogue() -> impl Iterator<Item = Model> {
        CATALOGUE.into_iter()
    }

    /// Known models of one category.
    pub fn by_category(category: ModelCategory) -> impl Iterator<Item = Model> {
        Self::catalogue().filter(move |m| m.category() == Some(category))
    }

    pub fn category(&self) -> Option<ModelCategory> {
        match self {
            Model::Glm47Flash | Model::Glm4Flash250414 => Some(ModelCategory::Text),
            Model::Glm46vFlash | Model::Glm41vThinkingFlash | Model::Glm4vFlash => {
                Some(ModelCategory::Vision)
            }
            Model::CogView3Flash => Some(ModelCategory::Image),
            Model::CogVideoXFlash => Some(ModelCategory::Video),
            Model::Glm4Voice => Some(ModelCategory::Audio),
            Model::Custom(_) => None,
        }
    }

    pub fn description(&self) -> Option<&'static str> {
        match self {
            Model::Glm47Flash => Some("Latest free base model"),
            Model::Glm4Flash250414 => Some("Free model with a long context window"),
            Model::Glm46vFlash => Some("Free vision model with tool calling and deep thinking"),
            Model::Glm41vThinkingFlash => Some("Free visual reasoning model"),
            Model::Glm4vFlash => Some("Free lightweight vision model"),
            Model::CogView3Flash => Some("Free image generation model"),
            Model::CogVideoXFlash => Some("Free video generation model"),
            Model::Glm4Voice => Some("Speech conversation model"),
            Model::Custom(_) => None,
        }
    }

    /// Context window in tokens.
    pub fn context_window(&self) -> Option<u32> {
        match self {
            Model::Glm47Flash => Some(200_000),
            Model::Glm4Flash250414 | Model::Glm46vFlash => Some(128_000),
            Model::Glm41vThinkingFlash => Some(64_000),
            Model::Glm4vFlash => Some(16_000),
            _ => None,
        }
    }

    /// Maximum output tokens.
    pub fn max_output(&self) -> Option<u32> {
        match self {
            Model::Glm47Flash => Some(128_000),
            Model::Glm46vFlash => Some(32_000),
            Model::Glm4Flash250414 | Model::Glm41vThinkingFlash => Some(16_000),
            Model::Glm4vFlash => Some(1_000),
            _ => None,
        }
    }

    pub fn supports_thinking(&self) -> bool {
        matches!(
            self,
            Model::Glm47Flash | Model::Glm46vFlash | Model::Glm41vThinkingFlash
        )
    }

    pub fn is_chat_model(&self) -> bool {
        !matches!(self, Model::CogView3Flash | Model::CogVideoXFlash)
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for Model {
    fn from(s: String) -> Self {
        Self::catalogue()
            .find(|m| m.as_str() == s)
            .unwrap_or(Model::Custom(s))
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        Model::from(s.to_string())
    }
}

impl From<Model> for String {
    fn from(model: Model) -> Self {
        match model {
            Model::Custom(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

/// All categories, in menu order.
pub fn categories() -> impl Iterator<Item = ModelCategory> {
    ModelCategory::iter()
}
