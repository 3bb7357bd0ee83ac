use std::time::Duration;

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    message::{ContentPart, Message, MessageContent, Messages, UserMessage},
    model::Model,
    timeouts,
    tool::{Tool, ToolChoice},
};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResponseFormat {
    Text,
    JsonObject,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ThinkingType {
    Enabled,
    Disabled,
}

/// Deep-thinking switch: `{"type": "enabled"}`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Thinking {
    pub r#type: ThinkingType,
}

impl Thinking {
    pub fn enabled() -> Self {
        Self {
            r#type: ThinkingType::Enabled,
        }
    }

    pub fn disabled() -> Self {
        Self {
            r#type: ThinkingType::Disabled,
        }
    }

    pub fn is_enabled(self) -> bool {
        self.r#type == ThinkingType::Enabled
    }
}

#[derive(Debug, Clone, Serialize, Builder)]
#[builder(builder_type(vis = "pub"), state_mod(vis = "pub"))]
pub struct ChatRequest {
    #[builder(field)]
    pub messages: Messages,
    #[builder(into)]
    pub model: Model,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stream: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<Tool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_format: Option<ResponseFormat>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thinking: Option<Thinking>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub user_id: Option<String>,
}

impl<S: chat_request_builder::State> ChatRequestBuilder<S> {
    pub fn messages(mut self, messages: impl IntoIterator<Item = impl Into<Message>>) -> Self {
        self.messages = messages.into_iter().map(Into::into).collect();
        self
    }

    pub fn message(mut self, message: impl Into<Message>) -> Self {
        self.messages.push(message.into());
        self
    }

    pub fn system(self, content: impl Into<String>) -> Self {
        self.message(Message::system(content))
    }

    pub fn user(self, content: impl Into<MessageContent>) -> Self {
        self.message(Message::user(content))
    }
}

impl ChatRequest {
    pub fn push_message(&mut self, message: impl Into<Message>) {
        self.messages.push(message.into());
    }

    /// Whether the request asks for deep thinking.
    pub fn thinking_enabled(&self) -> bool {
        self.thinking.is_some_and(Thinking::is_enabled)
    }

    /// Whether any user turn carries a video part.
    pub fn has_video(&self) -> bool {
        self.messages.iter().any(|message| match message {
            Message::User(UserMessage {
                content: MessageContent::Parts(parts),
            }) => parts
                .iter()
                .any(|part| matches!(part, ContentPart::VideoUrl { .. })),
            _ => false,
        })
    }

    /// Deadline used when the client has no explicit timeout.
    pub fn default_timeout(&self) -> Duration {
        if self.has_video() {
            timeouts::VIDEO_UNDERSTANDING
        } else if self.thinking_enabled() {
            timeouts::THINKING
        } else {
            timeouts::CHAT
        }
    }
}
