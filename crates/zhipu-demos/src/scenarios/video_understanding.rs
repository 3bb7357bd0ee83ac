use anyhow::{Context, Result};
use zhipu_ox::{ChatRequest, ContentPart, Message, ModelCategory, Zhipu};

use super::{Steps, preview, reply_text};

const SAMPLE_VIDEO: &str = "https://cdn.bigmodel.cn/agent-demos/lark/113123.mov";

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Describe a video", ask(client, "请描述这个视频的内容，发生了什么？", 0.7)).await;
    steps.step("Video Q&A", ask(client, "视频中有几个人？他们在做什么？", 0.5)).await;
    steps.step("Video summary", ask(client, "请为这个视频生成一段摘要，包含主要内容和关键点", 0.6)).await;
    steps.step("Follow-up on a video", follow_up(client)).await;
}

async fn ask(client: &Zhipu, question: &str, temperature: f32) -> Result<()> {
    let request = ChatRequest::builder()
        .model(ModelCategory::Vision.default_model())
        .user(vec![
            ContentPart::video_url(SAMPLE_VIDEO),
            ContentPart::text(question),
        ])
        .temperature(temperature)
        .build();

    println!("\n📤 Video: {SAMPLE_VIDEO}\n   Question: {question}");
    println!("⏳ Video analysis can take a few minutes...");
    let response = client.send(&request).await?;
    println!("\n📥 {}", reply_text(&response)?);
    Ok(())
}

async fn follow_up(client: &Zhipu) -> Result<()> {
    let mut request = ChatRequest::builder()
        .model(ModelCategory::Vision.default_model())
        .user(vec![
            ContentPart::video_url(SAMPLE_VIDEO),
            ContentPart::text("我看完了这个视频"),
        ])
        .build();

    let first = client.send(&request).await?;
    println!("\n🤖 AI: {}", preview(reply_text(&first)?, 200));
    request.push_message(first.assistant_message().context("response carried no choices")?);

    request.push_message(Message::user("视频里提到了哪些关键信息？"));
    let second = client.send(&request).await?;
    println!("\n🤖 AI: {}", reply_text(&second)?);
    Ok(())
}
