use bon::Builder;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;

/// A tool the model may use: a caller-defined function or one of the
/// provider's built-in tools.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    Function { function: ToolFunction },
    WebSearch { web_search: WebSearch },
    Retrieval { retrieval: Retrieval },
}

impl Tool {
    pub fn function(function: ToolFunction) -> Self {
        Self::Function { function }
    }

    pub fn function_with_params(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self::function(ToolFunction::with_parameters(name, description, parameters))
    }

    /// Built-in web search; the query is derived from the conversation.
    pub fn web_search() -> Self {
        Self::WebSearch {
            web_search: WebSearch {
                enable: true,
                search_query: Some("auto".to_string()),
                search_result: None,
            },
        }
    }

    /// Built-in knowledge-base retrieval.
    pub fn retrieval(knowledge_id: impl Into<String>) -> Self {
        Self::Retrieval {
            retrieval: Retrieval {
                knowledge_id: knowledge_id.into(),
                prompt_template: None,
            },
        }
    }

    /// Name of the function, `None` for built-in tools.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function { function } => Some(&function.name),
            Self::WebSearch { .. } | Self::Retrieval { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Builder)]
pub struct ToolFunction {
    #[builder(into)]
    pub name: String,
    #[builder(into)]
    pub description: String,
    /// JSON Schema of the arguments object.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,
}

impl ToolFunction {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: None,
        }
    }

    pub fn with_parameters(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Some(parameters),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
pub struct WebSearch {
    #[builder(default = true)]
    pub enable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub search_query: Option<String>,
    /// Ask the API to return the search hits alongside the answer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_result: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Builder)]
pub struct Retrieval {
    #[builder(into)]
    pub knowledge_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(into)]
    pub prompt_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    #[serde(default = "function_type")]
    pub r#type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
    pub function: FunctionCall,
}

fn function_type() -> String {
    "function".to_string()
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            r#type: function_type(),
            index: None,
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments, as produced by the model.
    pub arguments: String,
}

impl FunctionCall {
    pub fn parse_arguments<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_str(&self.arguments)
    }
}

/// Only `auto` is accepted by the API.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    #[default]
    Auto,
}
