use anyhow::{Context, Result};
use zhipu_ox::{
    ChatRequest, ContentPart, ModelCategory, Thinking, Zhipu,
    message::MediaUrl,
};

use super::{Steps, print_usage, reply_text};

const REGISTER_PNG: &str = "https://cdn.bigmodel.cn/static/logo/register.png";
const API_KEY_PNG: &str = "https://cdn.bigmodel.cn/static/logo/api-key.png";

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Image by URL", by_url(client)).await;
    steps.step("Inline base64 image", inline(client)).await;
    steps.step("Comparing two images", two_images(client)).await;
    steps.step("Image with thinking", with_thinking(client)).await;
}

fn vision_request(parts: Vec<ContentPart>) -> ChatRequest {
    ChatRequest::builder()
        .model(ModelCategory::Vision.default_model())
        .user(parts)
        .temperature(0.7)
        .build()
}

async fn by_url(client: &Zhipu) -> Result<()> {
    let request = vision_request(vec![
        ContentPart::image_url(REGISTER_PNG),
        ContentPart::text("请描述这张图片的内容"),
    ]);

    println!("\n📤 Model: {}\n   Image: {REGISTER_PNG}", request.model);
    let response = client.send(&request).await?;
    println!("\n📥 Description:\n{}", reply_text(&response)?);
    print_usage(&response);
    Ok(())
}

/// Download the image and send it inline as a `data:` URL.
async fn inline(client: &Zhipu) -> Result<()> {
    let bytes = reqwest::get(REGISTER_PNG)
        .await
        .and_then(reqwest::Response::error_for_status)
        .context("downloading the sample image")?
        .bytes()
        .await?;

    let image = MediaUrl::from_bytes(&bytes, "image/png");
    println!("\n📤 Inline image: {image} ({} bytes)", bytes.len());

    let request = vision_request(vec![
        ContentPart::ImageUrl { image_url: image },
        ContentPart::text("描述这张图片"),
    ]);
    let response = client.send(&request).await?;
    println!("\n📥 Description:\n{}", reply_text(&response)?);
    Ok(())
}

async fn two_images(client: &Zhipu) -> Result<()> {
    let request = vision_request(vec![
        ContentPart::image_url(REGISTER_PNG),
        ContentPart::image_url(API_KEY_PNG),
        ContentPart::text("这两张图片有什么共同点和不同点？"),
    ]);

    let response = client.send(&request).await?;
    println!("\n📥 Comparison:\n{}", reply_text(&response)?);
    Ok(())
}

async fn with_thinking(client: &Zhipu) -> Result<()> {
    let mut request = vision_request(vec![
        ContentPart::image_url(REGISTER_PNG),
        ContentPart::text("分析一下这个 logo 的设计理念，它想传达什么品牌信息？"),
    ]);
    request.thinking = Some(Thinking::enabled());

    let response = client.send(&request).await?;
    println!("\n📥 Analysis:\n{}", reply_text(&response)?);
    Ok(())
}
