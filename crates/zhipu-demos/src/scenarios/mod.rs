//! The demo groups. Each one calls the API a few times and prints what it got.

mod audio_chat;
mod basic_chat;
mod file_understanding;
mod function_call;
mod image_generation;
mod image_understanding;
mod multi_turn;
mod stream_chat;
mod thinking;
mod video_generation;
mod video_understanding;

use std::future::Future;

use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use zhipu_ox::{ChatResponse, Zhipu};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Scenario {
    BasicChat,
    StreamChat,
    Thinking,
    MultiTurn,
    ImageUnderstanding,
    VideoUnderstanding,
    FileUnderstanding,
    AudioChat,
    FunctionCall,
    ImageGeneration,
    VideoGeneration,
}

impl Scenario {
    /// The core subset run by `--quick`.
    pub const QUICK: [Scenario; 3] = [Scenario::BasicChat, Scenario::MultiTurn, Scenario::FunctionCall];

    pub fn all() -> Vec<Scenario> {
        Scenario::iter().collect()
    }

    /// Everything except the slow video groups.
    pub fn fast() -> Vec<Scenario> {
        Scenario::iter().filter(|s| !s.is_slow()).collect()
    }

    /// 1-based position in the menu.
    pub fn number(self) -> usize {
        Scenario::iter().position(|s| s == self).map_or(0, |i| i + 1)
    }

    pub fn from_number(number: usize) -> Option<Scenario> {
        number.checked_sub(1).and_then(|i| Scenario::iter().nth(i))
    }

    pub fn title(self) -> &'static str {
        match self {
            Scenario::BasicChat => "Basic chat",
            Scenario::StreamChat => "Streaming chat",
            Scenario::Thinking => "Deep thinking",
            Scenario::MultiTurn => "Multi-turn chat",
            Scenario::ImageUnderstanding => "Image understanding",
            Scenario::VideoUnderstanding => "Video understanding",
            Scenario::FileUnderstanding => "File understanding",
            Scenario::AudioChat => "Audio chat",
            Scenario::FunctionCall => "Function calling",
            Scenario::ImageGeneration => "Image generation",
            Scenario::VideoGeneration => "Video generation",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Scenario::BasicChat => "plain request/response, JSON mode, stop words",
            Scenario::StreamChat => "incremental output over SSE",
            Scenario::Thinking => "reasoning mode",
            Scenario::MultiTurn => "context memory across turns",
            Scenario::ImageUnderstanding => "vision on URLs and inline images",
            Scenario::VideoUnderstanding => "video analysis (slow)",
            Scenario::FileUnderstanding => "document analysis",
            Scenario::AudioChat => "voice model interaction",
            Scenario::FunctionCall => "tool calls and built-in tools",
            Scenario::ImageGeneration => "CogView",
            Scenario::VideoGeneration => "CogVideoX (slow)",
        }
    }

    pub fn is_slow(self) -> bool {
        matches!(self, Scenario::VideoUnderstanding | Scenario::VideoGeneration)
    }

    /// Run every demo of the group. A failing demo is printed and counted;
    /// the rest of the group still runs.
    pub async fn run(self, client: &Zhipu) -> Steps {
        let mut steps = Steps::default();
        match self {
            Scenario::BasicChat => basic_chat::run(client, &mut steps).await,
            Scenario::StreamChat => stream_chat::run(client, &mut steps).await,
            Scenario::Thinking => thinking::run(client, &mut steps).await,
            Scenario::MultiTurn => multi_turn::run(client, &mut steps).await,
            Scenario::ImageUnderstanding => image_understanding::run(client, &mut steps).await,
            Scenario::VideoUnderstanding => video_understanding::run(client, &mut steps).await,
            Scenario::FileUnderstanding => file_understanding::run(client, &mut steps).await,
            Scenario::AudioChat => audio_chat::run(client, &mut steps).await,
            Scenario::FunctionCall => function_call::run(client, &mut steps).await,
            Scenario::ImageGeneration => image_generation::run(client, &mut steps).await,
            Scenario::VideoGeneration => video_generation::run(client, &mut steps).await,
        }
        steps
    }
}

/// Tally of the demos run inside one group.
#[derive(Debug, Default)]
pub struct Steps {
    run: usize,
    failed: usize,
}

impl Steps {
    pub async fn step<F>(&mut self, title: &str, demo: F)
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        self.run += 1;
        println!("\n{}", "=".repeat(60));
        println!("🧪 Test {}: {title}", self.run);
        println!("{}", "=".repeat(60));

        if let Err(e) = demo.await {
            tracing::warn!(demo = title, error = %e, "demo failed");
            println!("\n❌ {e:#}");
            self.failed += 1;
        }
    }

    /// A demo that only explains an API surface and sends nothing.
    pub fn note(&mut self, title: &str, text: &str) {
        println!("\n{}", "=".repeat(60));
        println!("💡 {title}");
        println!("{}", "=".repeat(60));
        println!("{}", text.trim_end());
    }

    pub fn passed(&self) -> bool {
        self.failed == 0
    }

    pub fn failed(&self) -> usize {
        self.failed
    }
}

fn print_usage(response: &ChatResponse) {
    if let Some(usage) = &response.usage {
        println!(
            "\n📊 Tokens: prompt {}, completion {}, total {}",
            usage.prompt_tokens(),
            usage.completion_tokens(),
            usage.total_tokens()
        );
    }
}

fn reply_text(response: &ChatResponse) -> anyhow::Result<&str> {
    response
        .text()
        .ok_or_else(|| anyhow::anyhow!("response {} has no text content", response.id))
}

/// At most `max_chars` characters of `text`, with an ellipsis when cut.
fn preview(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}...", &text[..end]),
        None => text.to_string(),
    }
}

fn flush_stdout() {
    use std::io::Write;
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbering_is_one_based_and_stable() {
        assert_eq!(Scenario::BasicChat.number(), 1);
        assert_eq!(Scenario::VideoGeneration.number(), 11);
        assert_eq!(Scenario::from_number(9), Some(Scenario::FunctionCall));
        assert_eq!(Scenario::from_number(0), None);
        assert_eq!(Scenario::from_number(12), None);
    }

    #[test]
    fn fast_set_skips_video_groups() {
        let fast = Scenario::fast();
        assert_eq!(fast.len(), 9);
        assert!(!fast.contains(&Scenario::VideoUnderstanding));
        assert!(!fast.contains(&Scenario::VideoGeneration));
        assert_eq!(Scenario::all().len(), 11);
    }

    #[test]
    fn names_round_trip() {
        assert_eq!(Scenario::ImageGeneration.to_string(), "image_generation");
        assert_eq!("multi_turn".parse::<Scenario>().unwrap(), Scenario::MultiTurn);
    }

    #[test]
    fn preview_cuts_on_char_boundaries() {
        assert_eq!(preview("短文本", 10), "短文本");
        assert_eq!(preview("你好世界", 2), "你好...");
    }

    #[tokio::test]
    async fn failing_step_is_counted_and_group_continues() {
        let mut steps = Steps::default();
        steps.step("ok", async { Ok(()) }).await;
        steps.step("boom", async { anyhow::bail!("boom") }).await;
        steps.step("ok again", async { Ok(()) }).await;
        assert_eq!(steps.failed(), 1);
        assert!(!steps.passed());
    }
}
