use serde::{Deserialize, Serialize};

use zhipu_ox_common::usage::TokenUsage;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Usage {
    #[serde(flatten)]
    pub tokens: TokenUsage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt_tokens_details: Option<PromptTokensDetails>,
}

/// Breakdown of the prompt side, present when the context cache was hit.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct PromptTokensDetails {
    #[serde(default)]
    pub cached_tokens: u64,
}

impl Usage {
    pub fn new(prompt_tokens: u64, completion_tokens: u64) -> Self {
        Self {
            tokens: TokenUsage::with_prompt_completion(prompt_tokens, completion_tokens),
            prompt_tokens_details: None,
        }
    }

    pub fn prompt_tokens(&self) -> u64 {
        self.tokens.prompt_tokens()
    }

    pub fn completion_tokens(&self) -> u64 {
        self.tokens.completion_tokens()
    }

    pub fn total_tokens(&self) -> u64 {
        self.tokens.total_tokens()
    }

    pub fn cached_tokens(&self) -> u64 {
        self.prompt_tokens_details
            .as_ref()
            .map_or(0, |d| d.cached_tokens)
    }
}

impl std::ops::AddAssign for Usage {
    fn add_assign(&mut self, rhs: Self) {
        self.tokens += rhs.tokens;
        if let Some(rhs_details) = rhs.prompt_tokens_details {
            let details = self.prompt_tokens_details.get_or_insert_default();
            details.cached_tokens += rhs_details.cached_tokens;
        }
    }
}
