use std::path::Path;

use anyhow::Result;
use zhipu_ox::{ChatRequest, ContentPart, Model, Zhipu, message::InputAudio};

use super::{Steps, reply_text};

/// Local recording used for the voice input demo, if present.
const INPUT_WAV: &str = "input.wav";

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Text chat with the voice model", text_chat(client)).await;
    steps.step("Voice input", voice_input(client)).await;
    steps.note(
        "Realtime voice (GLM-Realtime)",
        "WebSocket endpoint wss://open.bigmodel.cn/api/paas/v4/realtime, authorised with
`Authorization: Bearer <API key>`. Audio as pcm or wav, video as base64 frames.
Not exercised here: it needs a duplex audio pipeline.",
    );
    steps.note(
        "Speech synthesis (GLM-TTS)",
        "Asynchronous endpoint /paas/v4/async/audio with models glm-tts and glm-tts-clone.
Parameters: voice, speed (0.5-2.0), pitch, emotion. The result is polled like a video task.",
    );
}

async fn text_chat(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm4Voice)
        .system("你是一个语音助手，回答要口语化、自然。")
        .user("你好，请介绍一下你自己")
        .temperature(0.8)
        .build();

    let response = client.send(&request).await?;
    println!("\n🎤 {}", reply_text(&response)?);
    Ok(())
}

async fn voice_input(client: &Zhipu) -> Result<()> {
    let path = Path::new(INPUT_WAV);
    if !path.exists() {
        println!("\n⚠️  Skipped: put a wav recording at ./{INPUT_WAV} to try voice input");
        return Ok(());
    }

    let audio = InputAudio::from_bytes(&tokio::fs::read(path).await?, "wav");
    let request = ChatRequest::builder()
        .model(Model::Glm4Voice)
        .user(vec![
            ContentPart::text("这是我的语音问题"),
            ContentPart::InputAudio { input_audio: audio },
        ])
        .build();

    let response = client.send(&request).await?;
    println!("\n🎤 {}", reply_text(&response)?);
    Ok(())
}
