use std::time::Instant;

use anyhow::Result;
use futures_util::StreamExt;
use zhipu_ox::{ChatRequest, Model, Thinking, Zhipu};

use super::{Steps, flush_stdout, preview, print_usage, reply_text};

const LOGIC_QUESTION: &str = "分析以下逻辑问题：
\"所有的鸟都会飞。企鹅是鸟。因此企鹅会飞。\"
这个推理有什么问题？";

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Thinking on a math problem", math(client)).await;
    steps.step("Thinking vs normal mode", thinking_vs_normal(client)).await;
    steps.step("Streamed thinking", streamed(client)).await;
    steps.step("Thinking for code", coding(client)).await;
}

async fn math(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("一个水池有进水管和出水管，单开进水管5小时灌满，单开出水管7小时排空。如果同时打开两个管，几小时能灌满？")
        .thinking(Thinking::enabled())
        .temperature(0.3)
        .build();

    let response = client.send(&request).await?;

    if let Some(reasoning) = response.reasoning() {
        println!("\n🧠 Reasoning:\n{}", preview(reasoning, 500));
    }
    println!("\n📥 Answer:\n{}", reply_text(&response)?);
    print_usage(&response);
    Ok(())
}

async fn thinking_vs_normal(client: &Zhipu) -> Result<()> {
    println!("\n❓ Question:\n{LOGIC_QUESTION}\n");

    for thinking in [Thinking::disabled(), Thinking::enabled()] {
        let label = if thinking.is_enabled() { "thinking" } else { "normal" };
        let request = ChatRequest::builder()
            .model(Model::Glm47Flash)
            .user(LOGIC_QUESTION)
            .thinking(thinking)
            .temperature(0.3)
            .build();

        println!("{}", "-".repeat(40));
        println!("📤 Mode: {label}");
        let started = Instant::now();
        let response = client.send(&request).await?;

        println!("\n📥 {}", preview(reply_text(&response)?, 300));
        println!(
            "\n⏱️  {:.2}s, {} completion tokens",
            started.elapsed().as_secs_f64(),
            response.usage.map_or(0, |u| u.completion_tokens())
        );
    }
    Ok(())
}

async fn streamed(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("解释量子计算的基本原理，用通俗的语言")
        .thinking(Thinking::enabled())
        .temperature(0.5)
        .build();

    let mut stream = client.stream(&request);
    let mut in_reasoning = false;
    let mut in_answer = false;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if let Some(reasoning) = chunk.reasoning() {
            if !in_reasoning {
                println!("\n🧠 Reasoning:");
                in_reasoning = true;
            }
            print!("{reasoning}");
            flush_stdout();
        }
        if let Some(content) = chunk.content() {
            if !in_answer {
                println!("\n\n📥 Answer:");
                in_answer = true;
            }
            print!("{content}");
            flush_stdout();
        }
        if let Some(usage) = &chunk.usage {
            println!("\n\n📊 Tokens: total {}", usage.total_tokens());
        }
    }
    println!();
    Ok(())
}

async fn coding(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一个专业的程序员，写代码时要考虑边界情况和错误处理。")
        .user(
            "写一个 Python 函数，实现二叉树的后序遍历。
要求：
1. 使用递归和非递归两种方法
2. 包含类型注解
3. 考虑空树的情况
4. 添加注释说明",
        )
        .thinking(Thinking::enabled())
        .temperature(0.2)
        .max_tokens(2000)
        .build();

    let response = client.send(&request).await?;
    if let Some(reasoning) = response.reasoning() {
        println!("\n🧠 Reasoning (excerpt):\n{}", preview(reasoning, 300));
    }
    println!("\n📥 Code:\n{}", reply_text(&response)?);
    Ok(())
}
