use std::time::Instant;

use anyhow::{Result, bail};
use futures_util::StreamExt;
use zhipu_ox::{ChatRequest, Model, StreamFrame, Zhipu};

use super::{Steps, flush_stdout, preview, reply_text};

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Streamed poem", poem(client)).await;
    steps.step("Streamed explanation", long_text(client)).await;
    steps.step("Streaming vs non-streaming", comparison(client)).await;
}

/// Print deltas as they arrive and return the assembled text.
async fn print_stream(client: &Zhipu, request: &ChatRequest) -> Result<String> {
    let mut stream = client.stream_text(request);
    let mut text = String::new();
    let mut ended = false;

    while let Some(frame) = stream.next().await {
        match frame? {
            StreamFrame::ContentDelta(delta) => {
                print!("{delta}");
                flush_stdout();
                text.push_str(&delta);
            }
            StreamFrame::StreamEnd => ended = true,
        }
    }
    println!();

    if !ended {
        bail!("stream stopped without an end marker");
    }
    Ok(text)
}

async fn poem(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一个诗人，擅长写优美的现代诗。")
        .user("写一首关于人工智能的短诗，4-6行即可")
        .temperature(0.8)
        .build();

    println!("\n📥 Streaming reply:\n");
    let text = print_stream(client, &request).await?;
    println!("\n✅ Received {} characters", text.chars().count());
    Ok(())
}

async fn long_text(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("请解释什么是机器学习，用通俗易懂的语言，200字左右")
        .temperature(0.7)
        .max_tokens(500)
        .build();

    println!("\n📥 Streaming reply:\n");
    print_stream(client, &request).await?;
    Ok(())
}

async fn comparison(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("列举5个提高生产力的技巧，每条一句话")
        .build();

    println!("\n📤 Non-streaming...");
    let started = Instant::now();
    let response = client.send(&request).await?;
    let blocking = started.elapsed();
    println!("{}", preview(reply_text(&response)?, 200));

    println!("\n📤 Streaming...");
    let started = Instant::now();
    let mut stream = client.stream_text(&request);
    let mut first_delta = None;
    while let Some(frame) = stream.next().await {
        if let StreamFrame::ContentDelta(delta) = frame? {
            first_delta.get_or_insert_with(|| started.elapsed());
            print!("{delta}");
            flush_stdout();
        }
    }
    println!();
    let streamed = started.elapsed();

    println!("\n⏱️  Non-streaming total: {:.2}s", blocking.as_secs_f64());
    println!("⏱️  Streaming total:     {:.2}s", streamed.as_secs_f64());
    if let Some(first) = first_delta {
        println!("⏱️  First token after:   {:.2}s", first.as_secs_f64());
    }
    Ok(())
}
