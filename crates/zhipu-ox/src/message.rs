use std::{fmt, path::Path};

use base64::Engine;
use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::tool::ToolCall;

pub type Messages = Vec<Message>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    System(SystemMessage),
    User(UserMessage),
    Assistant(AssistantMessage),
    Tool(ToolMessage),
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System(SystemMessage::new(content))
    }

    pub fn user(content: impl Into<MessageContent>) -> Self {
        Self::User(UserMessage::new(content))
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::Assistant(AssistantMessage::new(content))
    }

    pub fn tool(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Tool(ToolMessage::new(tool_call_id, content))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
pub struct SystemMessage {
    #[builder(into)]
    pub content: String,
}

impl SystemMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
pub struct UserMessage {
    #[builder(into)]
    pub content: MessageContent,
}

impl UserMessage {
    pub fn new(content: impl Into<MessageContent>) -> Self {
        Self {
            content: content.into(),
        }
    }
}

/// Plain text, or an ordered list of multimodal parts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

impl MessageContent {
    /// The text when the content is a plain string.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Parts(_) => None,
        }
    }
}

impl From<String> for MessageContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for MessageContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<Vec<ContentPart>> for MessageContent {
    fn from(parts: Vec<ContentPart>) -> Self {
        Self::Parts(parts)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: MediaUrl },
    VideoUrl { video_url: MediaUrl },
    FileUrl { file_url: MediaUrl },
    InputAudio { input_audio: InputAudio },
}

impl ContentPart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn image_url(url: impl Into<String>) -> Self {
        Self::ImageUrl {
            image_url: MediaUrl::new(url),
        }
    }

    pub fn video_url(url: impl Into<String>) -> Self {
        Self::VideoUrl {
            video_url: MediaUrl::new(url),
        }
    }

    pub fn file_url(url: impl Into<String>) -> Self {
        Self::FileUrl {
            file_url: MediaUrl::new(url),
        }
    }

    /// Inline an image file as a base64 data URL.
    pub fn image_from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        Ok(Self::ImageUrl {
            image_url: MediaUrl::from_path(path)?,
        })
    }

    pub fn input_audio(data: impl Into<String>, format: impl Into<String>) -> Self {
        Self::InputAudio {
            input_audio: InputAudio {
                data: data.into(),
                format: format.into(),
            },
        }
    }
}

/// `{"url": ...}`: either a public URL or a `data:` URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MediaUrl {
    pub url: String,
}

impl MediaUrl {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn from_bytes(bytes: &[u8], media_type: &str) -> Self {
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Self {
            url: format!("data:{media_type};base64,{data}"),
        }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, std::io::Error> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let media_type = mime_guess::from_path(path).first_or_octet_stream();
        Ok(Self::from_bytes(&bytes, media_type.essence_str()))
    }

    pub fn is_inline(&self) -> bool {
        self.url.starts_with("data:")
    }
}

impl fmt::Display for MediaUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_inline() {
            let head = self.url.split(',').next().unwrap_or_default();
            write!(f, "{head},... ({} bytes)", self.url.len())
        } else {
            f.write_str(&self.url)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InputAudio {
    /// Base64-encoded audio.
    pub data: String,
    /// Container format, e.g. `wav`.
    pub format: String,
}

impl InputAudio {
    pub fn from_bytes(bytes: &[u8], format: impl Into<String>) -> Self {
        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            format: format.into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Builder)]
pub struct AssistantMessage {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub content: Option<String>,
    /// Chain of thought returned when thinking mode is enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub reasoning_content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<ToolCall>>,
}

impl AssistantMessage {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            reasoning_content: None,
            tool_calls: None,
        }
    }

    pub fn with_tool_calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            content: None,
            reasoning_content: None,
            tool_calls: Some(tool_calls),
        }
    }

    /// Copy for replaying into a follow-up turn. Reasoning is not sent back.
    #[must_use]
    pub fn for_history(&self) -> Self {
        Self {
            content: self.content.clone(),
            reasoning_content: None,
            tool_calls: self.tool_calls.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
pub struct ToolMessage {
    #[builder(into)]
    pub tool_call_id: String,
    #[builder(into)]
    pub content: String,
}

impl ToolMessage {
    pub fn new(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
        }
    }
}

impl From<SystemMessage> for Message {
    fn from(msg: SystemMessage) -> Self {
        Message::System(msg)
    }
}

impl From<UserMessage> for Message {
    fn from(msg: UserMessage) -> Self {
        Message::User(msg)
    }
}

impl From<AssistantMessage> for Message {
    fn from(msg: AssistantMessage) -> Self {
        Message::Assistant(msg)
    }
}

impl From<ToolMessage> for Message {
    fn from(msg: ToolMessage) -> Self {
        Message::Tool(msg)
    }
}
