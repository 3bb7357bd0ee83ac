//! Live API integration tests
//!
//! These tests require a valid API key and make real API calls.
//! They are ignored by default - run with `cargo test -- --ignored` to execute.

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use zhipu_ox::{ChatRequest, ContentPart, Model, StreamFrame, Thinking, Zhipu};

    fn create_client() -> Zhipu {
        dotenv::dotenv().ok();
        Zhipu::load_from_env().expect("VITE_ZHIPU_API_KEY or ZHIPU_API_KEY must be set")
    }

    #[tokio::test]
    #[ignore = "requires ZHIPU_API_KEY and makes live API calls"]
    async fn test_simple_chat() {
        let client = create_client();
        let request = ChatRequest::builder()
            .model(Model::Glm47Flash)
            .user("用一句话介绍你自己")
            .max_tokens(100)
            .build();

        let response = client.send(&request).await.expect("request failed");
        assert!(response.text().is_some_and(|t| !t.is_empty()));
        assert!(response.usage.is_some());
    }

    #[tokio::test]
    #[ignore = "requires ZHIPU_API_KEY and makes live API calls"]
    async fn test_streaming_chat() {
        let client = create_client();
        let request = ChatRequest::builder()
            .model(Model::Glm47Flash)
            .user("从 1 数到 5")
            .build();

        let frames: Vec<StreamFrame> = client
            .stream_text(&request)
            .map(|frame| frame.expect("stream error"))
            .collect()
            .await;

        assert_eq!(frames.last(), Some(&StreamFrame::StreamEnd));
        assert!(frames.len() > 1);
    }

    #[tokio::test]
    #[ignore = "requires ZHIPU_API_KEY and makes live API calls"]
    async fn test_thinking_returns_reasoning() {
        let client = create_client();
        let request = ChatRequest::builder()
            .model(Model::Glm47Flash)
            .user("9.11 和 9.9 哪个大？")
            .thinking(Thinking::enabled())
            .build();

        let response = client.send(&request).await.expect("request failed");
        assert!(response.text().is_some());
    }

    #[tokio::test]
    #[ignore = "requires ZHIPU_API_KEY and makes live API calls"]
    async fn test_image_understanding() {
        let client = create_client();
        let request = ChatRequest::builder()
            .model(Model::Glm46vFlash)
            .user(vec![
                ContentPart::image_url("https://cdn.bigmodel.cn/static/logo/register.png"),
                ContentPart::text("这张图片里有什么？"),
            ])
            .build();

        let response = client.send(&request).await.expect("request failed");
        assert!(response.text().is_some());
    }
}
