#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures_util::StreamExt;
    use serde_json::json;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{body_partial_json, header, method, path},
    };
    use zhipu_ox::{
        ChatRequest, Model, StreamFrame, TaskStatus, Zhipu, ZhipuRequestError,
        generation::{ImageGenerationRequest, VideoGenerationRequest},
    };

    fn client(server: &MockServer, api_key: &str) -> Zhipu {
        Zhipu::builder()
            .api_key(api_key)
            .base_url(server.uri())
            .build()
    }

    fn request() -> ChatRequest {
        ChatRequest::builder()
            .model(Model::Glm47Flash)
            .user("你好")
            .build()
    }

    fn chat_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chat-1",
            "created": 1_700_000_000,
            "model": "glm-4.7-flash",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}],
            "usage": {"prompt_tokens": 6, "completion_tokens": 4, "total_tokens": 10}
        })
    }

    fn sse(lines: &[&str]) -> String {
        lines.iter().map(|l| format!("{l}\n\n")).collect()
    }

    #[tokio::test]
    async fn test_send_posts_with_bearer_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("content-type", "application/json"))
            .and(body_partial_json(json!({
                "model": "glm-4.7-flash",
                "messages": [{"role": "user", "content": "你好"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("你好！")))
            .expect(1)
            .mount(&server)
            .await;

        let response = client(&server, "sk-test").send(&request()).await.unwrap();
        assert_eq!(response.text(), Some("你好！"));
        assert_eq!(response.usage.unwrap().total_tokens(), 10);
    }

    #[tokio::test]
    async fn test_missing_key_sends_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(chat_body("x")))
            .expect(0)
            .mount(&server)
            .await;

        let zhipu = client(&server, "");
        let err = zhipu.send(&request()).await.unwrap_err();
        assert!(matches!(err, ZhipuRequestError::AuthenticationMissing));

        let mut stream = zhipu.stream_text(&request());
        assert!(matches!(
            stream.next().await,
            Some(Err(ZhipuRequestError::AuthenticationMissing))
        ));
    }

    #[tokio::test]
    async fn test_non_success_reports_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"code": "1302", "message": "您当前使用该API的并发数过高"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(&server, "sk").send(&request()).await.unwrap_err();
        assert_eq!(err.status(), Some(429));
        match err {
            ZhipuRequestError::Api { code, body, .. } => {
                assert_eq!(code.as_deref(), Some("1302"));
                assert!(body.contains("1302"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_text_yields_deltas_then_end() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"data: {"id":"s1","choices":[{"index":0,"delta":{"role":"assistant","content":"Hi"}}]}"#,
            r#"data: {not valid json"#,
            r#"data: {"id":"s1","choices":[{"index":0,"delta":{"content":" there"}}]}"#,
            r#"data: {"id":"s1","choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
            "data: [DONE]",
            r#"data: {"choices":[{"delta":{"content":"ignored"}}]}"#,
        ]);
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({"stream": true})))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        let frames: Vec<StreamFrame> = client(&server, "sk")
            .stream_text(&request())
            .map(|frame| frame.unwrap())
            .collect()
            .await;

        assert_eq!(
            frames,
            vec![
                StreamFrame::ContentDelta("Hi".to_string()),
                StreamFrame::ContentDelta(" there".to_string()),
                StreamFrame::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_text_reads_content_despite_odd_fields() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"data: {"id":42,"choices":[{"index":0,"delta":{"content":"晴"}}]}"#,
            r#"data: {"created":"1700000000","choices":[{"index":null,"delta":{"content":"天"}}]}"#,
            "data: [DONE]",
        ]);
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .expect(1)
            .mount(&server)
            .await;

        // A limit of one would abort on the first frame if odd fields counted as malformed.
        let zhipu = Zhipu::builder()
            .api_key("sk")
            .base_url(server.uri())
            .malformed_frame_limit(1)
            .build();

        let frames: Vec<StreamFrame> = zhipu
            .stream_text(&request())
            .map(|frame| frame.unwrap())
            .collect()
            .await;

        assert_eq!(
            frames,
            vec![
                StreamFrame::ContentDelta("晴".to_string()),
                StreamFrame::ContentDelta("天".to_string()),
                StreamFrame::StreamEnd,
            ]
        );
    }

    #[tokio::test]
    async fn test_stream_typed_chunks_carry_reasoning_and_usage() {
        let server = MockServer::start().await;
        let body = sse(&[
            r#"data: {"choices":[{"index":0,"delta":{"reasoning_content":"先算"}}]}"#,
            r#"data: {"choices":[{"index":0,"delta":{"content":"4"}}]}"#,
            r#"data: {"choices":[{"index":0,"delta":{},"finish_reason":"stop"}],"usage":{"prompt_tokens":3,"completion_tokens":2,"total_tokens":5}}"#,
            "data: [DONE]",
        ]);
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let chunks: Vec<_> = client(&server, "sk")
            .stream(&request())
            .map(|chunk| chunk.unwrap())
            .collect()
            .await;

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].reasoning(), Some("先算"));
        assert_eq!(chunks[1].content(), Some("4"));
        assert_eq!(chunks[2].finish_reason(), Some("stop"));
        assert_eq!(chunks[2].usage.as_ref().unwrap().total_tokens(), 5);
    }

    #[tokio::test]
    async fn test_stream_without_done_ends_on_close() {
        let server = MockServer::start().await;
        let body = sse(&[r#"data: {"choices":[{"delta":{"content":"partial"}}]}"#]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let frames: Vec<StreamFrame> = client(&server, "sk")
            .stream_text(&request())
            .map(|frame| frame.unwrap())
            .collect()
            .await;
        assert_eq!(
            frames,
            vec![StreamFrame::ContentDelta("partial".to_string()), StreamFrame::StreamEnd]
        );
    }

    #[tokio::test]
    async fn test_stream_error_status_yields_single_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
            .mount(&server)
            .await;

        let results: Vec<_> = client(&server, "sk").stream_text(&request()).collect().await;
        assert_eq!(results.len(), 1);
        match &results[0] {
            Err(ZhipuRequestError::Api { status, body, .. }) => {
                assert_eq!(*status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_malformed_frame_limit_aborts_stream() {
        let server = MockServer::start().await;
        let body = sse(&["data: {bad", "data: {bad", "data: {bad", "data: [DONE]"]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/event-stream"))
            .mount(&server)
            .await;

        let zhipu = Zhipu::builder()
            .api_key("sk")
            .base_url(server.uri())
            .malformed_frame_limit(3)
            .build();

        let results: Vec<_> = zhipu.stream(&request()).collect().await;
        assert_eq!(results.len(), 1);
        assert!(matches!(
            results[0],
            Err(ZhipuRequestError::TooManyMalformedFrames(3))
        ));
    }

    #[tokio::test]
    async fn test_timeout_is_enforced() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(chat_body("late"))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client(&server, "sk")
            .with_timeout(Duration::from_millis(100))
            .send(&request())
            .await
            .unwrap_err();
        match err {
            ZhipuRequestError::Http(e) => assert!(e.is_timeout()),
            other => panic!("expected timeout, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_images() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/images/generations"))
            .and(body_partial_json(json!({"model": "cogview-3-flash", "n": 2, "size": "1024x1024"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "created": 1_700_000_000,
                "data": [{"url": "https://example.com/1.png"}, {"url": "https://example.com/2.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let request = ImageGenerationRequest::builder()
            .model(Model::CogView3Flash)
            .prompt("未来科技城市")
            .n(2)
            .size("1024x1024")
            .build();
        let response = client(&server, "sk").generate_images(&request).await.unwrap();
        let urls: Vec<&str> = response.urls().collect();
        assert_eq!(urls, ["https://example.com/1.png", "https://example.com/2.png"]);
    }

    #[tokio::test]
    async fn test_generate_video_and_poll_until_done() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/videos/generations"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "task-9", "model": "cogvideox-flash", "request_id": "r1", "task_status": "PROCESSING"
            })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/async-result/task-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_status": "PROCESSING"})))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/async-result/task-9"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "task_status": "SUCCESS",
                "video_result": [{"url": "https://example.com/v.mp4", "cover_image_url": "https://example.com/c.png"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let zhipu = client(&server, "sk");
        let request = VideoGenerationRequest::builder()
            .model(Model::CogVideoXFlash)
            .prompt("一只大熊猫在竹林中吃竹子")
            .size("1920x1080")
            .fps(30)
            .duration(5)
            .build();

        let task = zhipu.generate_video(&request).await.unwrap();
        assert_eq!(task.id, "task-9");
        assert_eq!(task.task_status, TaskStatus::Processing);

        let result = zhipu
            .wait_for_video(&task.id, Duration::from_millis(10), 10)
            .await
            .unwrap();
        assert_eq!(result.task_status, TaskStatus::Success);
        assert_eq!(result.video_url(), Some("https://example.com/v.mp4"));
    }

    #[tokio::test]
    async fn test_wait_for_video_stops_after_max_polls() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/async-result/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_status": "PROCESSING"})))
            .expect(3)
            .mount(&server)
            .await;

        let result = client(&server, "sk")
            .wait_for_video("slow", Duration::from_millis(1), 3)
            .await
            .unwrap();
        assert_eq!(result.task_status, TaskStatus::Processing);
    }

    #[tokio::test]
    async fn test_wait_for_video_with_zero_budget_queries_once() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/async-result/slow"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"task_status": "PROCESSING"})))
            .expect(1)
            .mount(&server)
            .await;

        let result = client(&server, "sk")
            .wait_for_video("slow", Duration::from_millis(1), 0)
            .await
            .unwrap();
        assert_eq!(result.task_status, TaskStatus::Processing);
    }
}
