use serde::{Deserialize, Serialize};

/// Token counts as reported in the `usage` object of a response.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenUsage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completion_tokens: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_tokens: Option<u64>,
}

impl TokenUsage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_prompt_completion(prompt: u64, completion: u64) -> Self {
        Self {
            prompt_tokens: Some(prompt),
            completion_tokens: Some(completion),
            total_tokens: Some(prompt + completion),
        }
    }

    #[must_use]
    pub fn prompt_tokens(&self) -> u64 {
        self.prompt_tokens.unwrap_or(0)
    }

    #[must_use]
    pub fn completion_tokens(&self) -> u64 {
        self.completion_tokens.unwrap_or(0)
    }

    /// Reported total, or prompt + completion when the total is absent.
    #[must_use]
    pub fn total_tokens(&self) -> u64 {
        self.total_tokens
            .or_else(|| match (self.prompt_tokens, self.completion_tokens) {
                (Some(p), Some(c)) => Some(p + c),
                _ => None,
            })
            .unwrap_or(0)
    }

    pub fn add_assign(&mut self, other: &Self) {
        self.prompt_tokens = add_option(self.prompt_tokens, other.prompt_tokens);
        self.completion_tokens = add_option(self.completion_tokens, other.completion_tokens);
        self.total_tokens = add_option(self.total_tokens, other.total_tokens);
    }
}

fn add_option(lhs: Option<u64>, rhs: Option<u64>) -> Option<u64> {
    match (lhs, rhs) {
        (Some(a), Some(b)) => Some(a + b),
        (Some(a), None) => Some(a),
        (None, Some(b)) => Some(b),
        (None, None) => None,
    }
}

impl std::ops::Add for TokenUsage {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        let mut lhs = self;
        lhs.add_assign(&rhs);
        lhs
    }
}

impl std::ops::AddAssign for TokenUsage {
    fn add_assign(&mut self, rhs: Self) {
        TokenUsage::add_assign(self, &rhs);
    }
}
