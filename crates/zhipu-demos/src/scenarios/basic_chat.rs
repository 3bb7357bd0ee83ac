use anyhow::Result;
use serde_json::Value;
use zhipu_ox::{ChatRequest, Model, ResponseFormat, Zhipu};

use super::{Steps, print_usage, reply_text};

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Basic chat", basic(client)).await;
    steps.step("JSON mode", json_mode(client)).await;
    steps.step("Stop words", stop_words(client)).await;
}

async fn basic(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一个有帮助的AI助手，回答简洁明了。")
        .user("请介绍一下智谱AI的免费模型有哪些特点？")
        .temperature(0.7)
        .max_tokens(1024)
        .build();

    println!("\n📤 Model: {}", request.model);
    let response = client.send(&request).await?;

    println!("\n📥 Reply:\n{}", reply_text(&response)?);
    print_usage(&response);
    Ok(())
}

async fn json_mode(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("列出3个中国的大模型公司，用JSON格式返回，包含 name（公司名）、model（代表模型）、feature（特点）字段")
        .response_format(ResponseFormat::JsonObject)
        .temperature(0.3)
        .build();

    let response = client.send(&request).await?;
    let text = reply_text(&response)?;

    match serde_json::from_str::<Value>(text) {
        Ok(value) => println!("\n📥 JSON reply:\n{}", serde_json::to_string_pretty(&value)?),
        Err(e) => {
            println!("\n⚠️  Reply is not valid JSON ({e}):\n{text}");
        }
    }
    Ok(())
}

async fn stop_words(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("请列举5个中国的城市，每个城市用一行表示")
        .stop(vec!["3.".to_string()])
        .max_tokens(500)
        .build();

    let response = client.send(&request).await?;
    println!("\n📥 Reply (generation halts at \"3.\"):\n{}", reply_text(&response)?);

    match response.finish_reason() {
        Some("stop") => println!("\n✅ finish_reason = stop"),
        Some(other) => println!("\nℹ️  finish_reason = {other}"),
        None => println!("\nℹ️  no finish_reason reported"),
    }
    Ok(())
}
