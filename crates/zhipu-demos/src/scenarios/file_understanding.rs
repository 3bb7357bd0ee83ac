use anyhow::{Context, Result};
use zhipu_ox::{ChatRequest, ContentPart, Message, ModelCategory, Zhipu};

use super::{Steps, preview, reply_text};

const DEMO_TXT: &str = "https://cdn.bigmodel.cn/static/demo/demo2.txt";
const DEMO_PDF: &str = "https://cdn.bigmodel.cn/static/demo/demo1.pdf";

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Text file", ask(client, &[DEMO_TXT], "请总结这个文件的主要内容")).await;
    steps.step("PDF file", ask(client, &[DEMO_PDF], "这个 PDF 讲了什么？提取关键信息")).await;
    steps.step("Two files", ask(client, &[DEMO_PDF, DEMO_TXT], "比较这两个文件的内容，它们有什么关联？")).await;
    steps.step("Questions about a file", follow_up(client)).await;
}

fn file_parts(files: &[&str], text: &str) -> Vec<ContentPart> {
    files
        .iter()
        .map(|url| ContentPart::file_url(*url))
        .chain(std::iter::once(ContentPart::text(text)))
        .collect()
}

async fn ask(client: &Zhipu, files: &[&str], question: &str) -> Result<()> {
    let request = ChatRequest::builder()
        .model(ModelCategory::Vision.default_model())
        .user(file_parts(files, question))
        .temperature(0.7)
        .build();

    for file in files {
        println!("\n📄 File: {file}");
    }
    let response = client.send(&request).await?;
    println!("\n📥 {}", reply_text(&response)?);
    Ok(())
}

async fn follow_up(client: &Zhipu) -> Result<()> {
    let mut request = ChatRequest::builder()
        .model(ModelCategory::Vision.default_model())
        .user(file_parts(&[DEMO_TXT], "我已经阅读了这份文档"))
        .build();

    let first = client.send(&request).await?;
    println!("\n🤖 AI: {}", preview(reply_text(&first)?, 200));
    request.push_message(first.assistant_message().context("response carried no choices")?);

    request.push_message(Message::user("文档中提到的关键数据有哪些？"));
    let second = client.send(&request).await?;
    println!("\n🤖 AI: {}", reply_text(&second)?);
    Ok(())
}
