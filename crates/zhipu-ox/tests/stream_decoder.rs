#[cfg(test)]
mod tests {
    use zhipu_ox::{StreamDecoder, StreamFrame};

    fn delta_line(text: &str) -> String {
        let chunk = serde_json::json!({"choices": [{"index": 0, "delta": {"content": text}}]});
        format!("data: {chunk}")
    }

    fn delta(text: &str) -> StreamFrame {
        StreamFrame::ContentDelta(text.to_string())
    }

    #[test]
    fn test_scenario_stops_at_done_and_ignores_rest() {
        let lines = vec![
            delta_line("Hi"),
            String::new(),
            delta_line(" there"),
            "data: [DONE]".to_string(),
            delta_line("ignored"),
        ];

        let frames: Vec<StreamFrame> = StreamDecoder::new(lines).collect();
        assert_eq!(frames, vec![delta("Hi"), delta(" there"), StreamFrame::StreamEnd]);
    }

    #[test]
    fn test_one_delta_per_content_line_in_order() {
        let texts = ["床前", "明月光", "，", "疑是地上霜"];
        let lines: Vec<String> = texts.iter().map(|t| delta_line(t)).collect();

        let deltas: Vec<String> = StreamDecoder::new(lines.iter())
            .filter_map(|f| f.as_delta().map(str::to_string))
            .collect();
        assert_eq!(deltas, texts);
    }

    #[test]
    fn test_non_data_lines_are_skipped_without_terminating() {
        let lines = vec![
            String::new(),
            ": keep-alive".to_string(),
            "event: message".to_string(),
            "data:{\"choices\":[{\"delta\":{\"content\":\"no space\"}}]}".to_string(),
            delta_line("kept"),
        ];

        let frames: Vec<StreamFrame> = StreamDecoder::new(lines).collect();
        assert_eq!(frames, vec![delta("kept"), StreamFrame::StreamEnd]);
    }

    #[test]
    fn test_malformed_json_is_skipped_and_decoding_resumes() {
        let lines = vec![
            delta_line("a"),
            "data: {not valid json".to_string(),
            delta_line("b"),
            "data: [DONE]".to_string(),
        ];

        let text = StreamDecoder::new(lines).into_text();
        assert_eq!(text, "ab");
    }

    #[test]
    fn test_empty_or_missing_content_yields_nothing() {
        let lines = vec![
            "data: {\"choices\":[{\"delta\":{\"role\":\"assistant\"}}]}".to_string(),
            "data: {\"choices\":[{\"delta\":{\"content\":\"\"}}]}".to_string(),
            "data: {\"choices\":[]}".to_string(),
            "data: {\"choices\":[{\"delta\":{},\"finish_reason\":\"stop\"}],\"usage\":{\"prompt_tokens\":3,\"completion_tokens\":2,\"total_tokens\":5}}".to_string(),
            "data: [DONE]".to_string(),
        ];

        let frames: Vec<StreamFrame> = StreamDecoder::new(lines).collect();
        assert_eq!(frames, vec![StreamFrame::StreamEnd]);
    }

    #[test]
    fn test_content_survives_unusual_sibling_fields() {
        let lines = [
            r#"data: {"id":42,"choices":[{"delta":{"content":"a"}}]}"#,
            r#"data: {"created":"1700000000","choices":[{"delta":{"content":"b"}}]}"#,
            r#"data: {"choices":[{"index":null,"delta":{"content":"c"}}]}"#,
            r#"data: {"choices":[{"delta":{"content":"d","tool_calls":[{"index":0,"function":{"name":"get_weather","arguments":{"city":"x"}}}]}}]}"#,
            "data: [DONE]",
        ];

        let frames: Vec<StreamFrame> = StreamDecoder::new(lines).collect();
        assert_eq!(
            frames,
            vec![delta("a"), delta("b"), delta("c"), delta("d"), StreamFrame::StreamEnd]
        );
    }

    #[test]
    fn test_exhausted_input_is_an_implicit_end_and_decoder_is_fused() {
        let mut decoder = StreamDecoder::new(vec![delta_line("x")]);

        assert_eq!(decoder.next(), Some(delta("x")));
        assert_eq!(decoder.next(), Some(StreamFrame::StreamEnd));
        assert_eq!(decoder.next(), None);
        assert_eq!(decoder.next(), None);
    }

    #[test]
    fn test_fragments_concatenate_to_full_text() {
        let full = "Rust 的所有权系统在编译期保证内存安全。";
        let lines: Vec<String> = full
            .chars()
            .collect::<Vec<_>>()
            .chunks(3)
            .map(|c| delta_line(&c.iter().collect::<String>()))
            .chain(std::iter::once("data: [DONE]".to_string()))
            .collect();

        assert_eq!(StreamDecoder::new(lines).into_text(), full);
    }

    #[test]
    fn test_crlf_terminated_body() {
        let body = format!("{}\r\n\r\n{}\r\n\r\ndata: [DONE]\r\n", delta_line("1"), delta_line("2"));
        assert_eq!(StreamDecoder::from_body(&body).into_text(), "12");
    }
}
