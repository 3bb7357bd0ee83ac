use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::json;
use zhipu_ox::{ChatRequest, Message, Model, Tool, ToolChoice, Zhipu};

use super::{Steps, reply_text};

pub async fn run(client: &Zhipu, steps: &mut Steps) {
    steps.step("Single function", weather(client)).await;
    steps.step("Several functions", several_tools(client)).await;
    steps.step("Tool result round trip", stock_price(client)).await;
    steps.step("Built-in web search", web_search(client)).await;
    steps.note(
        "Knowledge base retrieval",
        "Tool::retrieval(\"<knowledge-id>\") attaches a knowledge base created on the
Zhipu platform; set `prompt_template` to shape how retrieved passages are used.",
    );
}

fn weather_tool() -> Tool {
    Tool::function_with_params(
        "get_weather",
        "获取指定城市的当前天气信息",
        json!({
            "type": "object",
            "properties": {
                "city": {"type": "string", "description": "城市名称，如北京、上海"},
                "date": {"type": "string", "description": "日期，格式 YYYY-MM-DD，默认为今天"}
            },
            "required": ["city"]
        }),
    )
}

#[derive(Debug, Deserialize)]
struct WeatherArgs {
    city: String,
    date: Option<String>,
}

async fn weather(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("今天北京的天气怎么样？")
        .tools(vec![weather_tool()])
        .tool_choice(ToolChoice::Auto)
        .temperature(0.3)
        .build();

    let response = client.send(&request).await?;
    let Some(calls) = response.tool_calls() else {
        println!("\n💬 Text reply: {}", response.text().unwrap_or("(empty)"));
        return Ok(());
    };

    for call in calls {
        println!("\n🔧 {}({})", call.function.name, call.function.arguments);
        let args: WeatherArgs = call.function.parse_arguments()?;
        let mock = json!({
            "city": args.city,
            "date": args.date,
            "temperature": "25°C",
            "weather": "晴朗",
            "humidity": "45%"
        });
        println!("   mock result: {mock}");
    }
    Ok(())
}

async fn several_tools(client: &Zhipu) -> Result<()> {
    let tools = vec![
        Tool::function_with_params(
            "search_knowledge",
            "在知识库中搜索相关信息",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "搜索关键词"},
                    "top_k": {"type": "integer", "description": "返回结果数量"}
                },
                "required": ["query"]
            }),
        ),
        Tool::function_with_params(
            "calculator",
            "执行数学计算",
            json!({
                "type": "object",
                "properties": {
                    "expression": {"type": "string", "description": "数学表达式，如 2+2, sqrt(16)"}
                },
                "required": ["expression"]
            }),
        ),
    ];

    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("帮我搜索一下强化学习的资料，然后计算 125 乘以 37 的结果")
        .tools(tools)
        .tool_choice(ToolChoice::Auto)
        .build();

    let response = client.send(&request).await?;
    match response.tool_calls() {
        Some(calls) => {
            println!("\n🔧 {} tool call(s):", calls.len());
            for call in calls {
                println!("   {}({})", call.function.name, call.function.arguments);
            }
        }
        None => println!("\n💬 Text reply: {}", response.text().unwrap_or("(empty)")),
    }
    Ok(())
}

async fn stock_price(client: &Zhipu) -> Result<()> {
    let tool = Tool::function_with_params(
        "get_stock_price",
        "获取股票价格",
        json!({
            "type": "object",
            "properties": {
                "symbol": {"type": "string", "description": "股票代码"}
            },
            "required": ["symbol"]
        }),
    );

    let mut request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("查询一下阿里巴巴的股票价格")
        .tools(vec![tool])
        .tool_choice(ToolChoice::Auto)
        .build();

    println!("\n👤 User: 查询一下阿里巴巴的股票价格");
    let first = client.send(&request).await?;
    let Some(call) = first.tool_calls().and_then(<[_]>::first).cloned() else {
        println!("\n🤖 AI (no tool call): {}", first.text().unwrap_or("(empty)"));
        return Ok(());
    };
    println!("\n🤖 AI: [tool] {}({})", call.function.name, call.function.arguments);

    let args: serde_json::Value = call.function.parse_arguments()?;
    let result = json!({
        "symbol": args.get("symbol").and_then(|s| s.as_str()).unwrap_or("BABA"),
        "price": 85.42,
        "change": "+1.23%",
        "time": "2024-01-15 15:30:00"
    });

    request.push_message(first.assistant_message().context("response carried no choices")?);
    request.push_message(Message::tool(call.id, result.to_string()));

    let second = client.send(&request).await?;
    println!("\n🤖 AI: {}", reply_text(&second)?);
    Ok(())
}

async fn web_search(client: &Zhipu) -> Result<()> {
    let request = ChatRequest::builder()
        .model(Model::Glm47Flash)
        .user("2024年最新的AI大模型有哪些突破？")
        .tools(vec![Tool::web_search()])
        .temperature(0.7)
        .build();

    let response = client.send(&request).await?;
    println!("\n📥 {}", reply_text(&response)?);

    if let Some(hits) = &response.web_search {
        println!("\n🔎 Sources:");
        for hit in hits {
            println!(
                "   • {} {}",
                hit.title.as_deref().unwrap_or("(untitled)"),
                hit.link.as_deref().unwrap_or("")
            );
        }
    }
    Ok(())
}
