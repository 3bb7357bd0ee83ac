use anyhow::{Context, Result};
use zhipu_ox::{ChatRequest, Message, Model, Zhipu, message::AssistantMessage};

use super::{Steps, preview, reply_text};

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Three-round conversation", three_rounds(client)).await;
    steps.step("Role play", role_play(client)).await;
    steps.step("Recall from history", memory_summary(client)).await;
}

async fn three_rounds(client: &Zhipu) -> Result<()> {
    let mut request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一个专业的生活顾问，擅长健康饮食建议。")
        .temperature(0.7)
        .build();

    let turns = [
        ("我想减肥，有什么建议吗？", None),
        ("早餐吃什么比较好？", Some("the model should read this as a diet breakfast question")),
        ("晚餐呢？", Some("the model should stay on the diet topic")),
    ];

    for (question, expectation) in turns {
        println!("\n👤 User: {question}");
        if let Some(expectation) = expectation {
            println!("   ({expectation})");
        }

        request.push_message(Message::user(question));
        let response = client.send(&request).await?;
        println!("\n🤖 AI: {}", preview(reply_text(&response)?, 200));

        let reply = response
            .assistant_message()
            .context("response carried no choices")?;
        request.push_message(reply);
    }

    println!("\n📜 History ({} messages):", request.messages.len());
    for message in &request.messages {
        let (role, text) = match message {
            Message::System(m) => ("system", m.content.as_str()),
            Message::User(m) => ("user", m.content.as_text().unwrap_or("[multimodal]")),
            Message::Assistant(m) => ("assistant", m.content.as_deref().unwrap_or("")),
            Message::Tool(m) => ("tool", m.content.as_str()),
        };
        println!("  [{role}] {}", preview(text, 100));
    }
    Ok(())
}

async fn role_play(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一位经验丰富的Python导师，耐心、幽默，喜欢用生动的比喻解释概念。")
        .user("老师，什么是装饰器？")
        .message(AssistantMessage::new(
            "哈哈，装饰器啊，你可以把它想象成一个'包装纸'！🎁 就像你送礼物时，会用漂亮的包装纸把礼物包起来，装饰器就是把函数'包'起来，在不改变原函数的情况下，给函数添加一些额外的功能。",
        ))
        .user("能举个例子吗？")
        .temperature(0.8)
        .build();

    let response = client.send(&request).await?;
    println!("\n🧑‍🏫 Mentor:\n{}", reply_text(&response)?);
    Ok(())
}

async fn memory_summary(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .system("你是一个项目管理助手，帮助用户规划和跟踪项目进度。")
        .user("我要开发一个博客系统，用React和Node.js")
        .message(Message::assistant("好的！React + Node.js 是一个现代的全栈组合。我们可以把项目分解为几个阶段：需求分析、UI设计、前端开发、后端开发、测试部署。你想先从哪个阶段开始？"))
        .user("先做前端吧")
        .message(Message::assistant("前端开发阶段计划：1) 搭建React项目结构 2) 设计组件库 3) 实现页面路由 4) 对接API 5) 优化性能。预计2-3周。"))
        .user("用Vite还是CRA？")
        .message(Message::assistant("推荐Vite！启动快、热更新快、配置简单。CRA已经不太维护了。"))
        .user("好的，现在项目进展如何了？")
        .temperature(0.7)
        .build();

    println!("\n📤 Sending {} messages of history", request.messages.len());
    let response = client.send(&request).await?;
    println!("\n🤖 AI (should recall React, Vite and the frontend plan):\n{}", reply_text(&response)?);
    Ok(())
}
