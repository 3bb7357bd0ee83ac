//! Server-Sent Events decoding for streaming chat responses.
//!
//! The provider frames every event as a single `data: <json>` line and closes
//! the stream with `data: [DONE]`. Decoding is lenient: lines that are not
//! data lines are ignored, and data lines whose payload is not valid JSON are
//! skipped without surfacing an error. Valid JSON that does not fit the
//! requested event type is skipped too, but it is not counted as malformed.

use std::pin::Pin;

use futures_util::{Stream, StreamExt, stream::BoxStream};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::CommonRequestError;

/// Literal prefix of every data line, including the single space.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that marks the end of the stream.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Outcome of decoding one line of an event stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame<T> {
    /// A data line carrying a decodable event.
    Event(T),
    /// Nothing to yield for this line; keep reading.
    Skip,
    /// The `[DONE]` sentinel; stop reading.
    End,
}

/// Syntactic class of a raw line, before any JSON is parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// Blank separator, comment, or any non-data field.
    Ignored,
    /// `data: [DONE]`
    Done,
    /// Payload of a `data: ` line.
    Data(&'a str),
}

/// Classify a single line. A trailing `\r` is stripped first.
#[must_use]
pub fn classify_line(line: &str) -> LineKind<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    match line.strip_prefix(DATA_PREFIX) {
        Some(DONE_SENTINEL) => LineKind::Done,
        Some(payload) => LineKind::Data(payload),
        None => LineKind::Ignored,
    }
}

/// Decode a single line into a [`Frame`].
///
/// Malformed JSON, or JSON that does not fit `T`, yields [`Frame::Skip`]; it
/// never aborts the stream.
pub fn decode_line<T: DeserializeOwned>(line: &str) -> Frame<T> {
    match classify_line(line) {
        LineKind::Ignored => Frame::Skip,
        LineKind::Done => Frame::End,
        LineKind::Data(payload) => match decode_payload(payload) {
            Payload::Event(event) => Frame::Event(event),
            Payload::Malformed | Payload::Unfit => Frame::Skip,
        },
    }
}

/// Result of decoding the payload of one data line.
enum Payload<T> {
    Event(T),
    /// Not JSON at all.
    Malformed,
    /// Valid JSON of a different shape than the event type.
    Unfit,
}

fn decode_payload<T: DeserializeOwned>(payload: &str) -> Payload<T> {
    let value = match serde_json::from_str::<Value>(payload) {
        Ok(value) => value,
        Err(e) => {
            log::debug!("skipping malformed stream frame: {e}");
            return Payload::Malformed;
        }
    };

    match serde_json::from_value::<T>(value) {
        Ok(event) => Payload::Event(event),
        Err(e) => {
            log::debug!("skipping stream frame with unexpected shape: {e}");
            Payload::Unfit
        }
    }
}

type ByteStream =
    Pin<Box<dyn Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static>>;

/// Incremental SSE parser over a chunked HTTP body.
///
/// Network chunks are buffered until a full line is available, so a frame
/// split across chunks decodes the same as an unsplit one.
pub struct SseParser {
    byte_stream: ByteStream,
    buffer: Vec<u8>,
    finished: bool,
    malformed_limit: Option<usize>,
    consecutive_malformed: usize,
}

impl std::fmt::Debug for SseParser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SseParser")
            .field("buffered", &self.buffer.len())
            .field("finished", &self.finished)
            .field("malformed_limit", &self.malformed_limit)
            .finish_non_exhaustive()
    }
}

impl SseParser {
    pub fn new(response: reqwest::Response) -> Self {
        Self::from_byte_stream(response.bytes_stream())
    }

    pub fn from_byte_stream<S>(stream: S) -> Self
    where
        S: Stream<Item = Result<bytes::Bytes, reqwest::Error>> + Send + 'static,
    {
        Self {
            byte_stream: Box::pin(stream),
            buffer: Vec::new(),
            finished: false,
            malformed_limit: None,
            consecutive_malformed: 0,
        }
    }

    /// Abort with [`CommonRequestError::TooManyMalformedFrames`] once `limit`
    /// malformed frames arrive back to back. Unlimited by default.
    #[must_use]
    pub fn with_malformed_limit(mut self, limit: usize) -> Self {
        self.malformed_limit = Some(limit);
        self
    }

    /// Get the next decoded event, or `None` once the stream has ended.
    ///
    /// The stream ends at `[DONE]` or when the connection closes. Transport
    /// errors are returned as-is.
    pub async fn next_event<T: DeserializeOwned>(
        &mut self,
    ) -> Result<Option<T>, CommonRequestError> {
        loop {
            if self.finished {
                return Ok(None);
            }

            while let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') {
                let line: Vec<u8> = self.buffer.drain(..=pos).collect();
                if let Some(event) = self.process_line(&line[..line.len() - 1])? {
                    return Ok(Some(event));
                }
                if self.finished {
                    return Ok(None);
                }
            }

            match self.byte_stream.next().await {
                Some(chunk) => self.buffer.extend_from_slice(&chunk?),
                None => {
                    // Connection closed; a trailing line without '\n' still counts.
                    self.finished = true;
                    if self.buffer.is_empty() {
                        return Ok(None);
                    }
                    let line = std::mem::take(&mut self.buffer);
                    return self.process_line(&line);
                }
            }
        }
    }

    /// Turn the parser into a stream of decoded events.
    pub fn into_stream<T>(mut self) -> BoxStream<'static, Result<T, CommonRequestError>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        Box::pin(async_stream::try_stream! {
            while let Some(event) = self.next_event::<T>().await? {
                yield event;
            }
        })
    }

    fn process_line<T: DeserializeOwned>(
        &mut self,
        raw: &[u8],
    ) -> Result<Option<T>, CommonRequestError> {
        let Ok(line) = std::str::from_utf8(raw) else {
            log::debug!("skipping stream line with invalid UTF-8");
            return self.record_malformed();
        };

        match classify_line(line) {
            LineKind::Ignored => Ok(None),
            LineKind::Done => {
                self.finished = true;
                Ok(None)
            }
            LineKind::Data(payload) => match decode_payload::<T>(payload) {
                Payload::Event(event) => {
                    self.consecutive_malformed = 0;
                    Ok(Some(event))
                }
                Payload::Unfit => {
                    self.consecutive_malformed = 0;
                    Ok(None)
                }
                Payload::Malformed => self.record_malformed(),
            },
        }
    }

    fn record_malformed<T>(&mut self) -> Result<Option<T>, CommonRequestError> {
        self.consecutive_malformed += 1;
        match self.malformed_limit {
            Some(limit) if self.consecutive_malformed >= limit => {
                self.finished = true;
                Err(CommonRequestError::TooManyMalformedFrames(limit))
            }
            _ => Ok(None),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn parser_from(chunks: Vec<&'static str>) -> SseParser {
        let stream = futures_util::stream::iter(
            chunks
                .into_iter()
                .map(|c| Ok::<_, reqwest::Error>(bytes::Bytes::from_static(c.as_bytes()))),
        );
        SseParser::from_byte_stream(stream)
    }

    async fn collect(mut parser: SseParser) -> Result<Vec<Value>, CommonRequestError> {
        let mut events = Vec::new();
        while let Some(event) = parser.next_event::<Value>().await? {
            events.push(event);
        }
        Ok(events)
    }

    #[test]
    fn test_classify_line() {
        assert_eq!(classify_line(""), LineKind::Ignored);
        assert_eq!(classify_line(": keep-alive"), LineKind::Ignored);
        assert_eq!(classify_line("event: message"), LineKind::Ignored);
        assert_eq!(classify_line("data:{\"a\":1}"), LineKind::Ignored);
        assert_eq!(classify_line("data: [DONE]"), LineKind::Done);
        assert_eq!(classify_line("data: [DONE]\r"), LineKind::Done);
        assert_eq!(classify_line("data: {\"a\":1}"), LineKind::Data("{\"a\":1}"));
    }

    #[test]
    fn test_decode_line_variants() {
        assert_eq!(decode_line::<Value>(""), Frame::Skip);
        assert_eq!(decode_line::<Value>("data: [DONE]"), Frame::End);
        assert_eq!(decode_line::<Value>("data: {not valid json"), Frame::Skip);
        assert_eq!(
            decode_line::<Value>("data: {\"test\": \"value\"}"),
            Frame::Event(serde_json::json!({"test": "value"}))
        );
    }

    #[tokio::test]
    async fn test_parser_stops_at_done() {
        let parser = parser_from(vec![
            "data: {\"n\":1}\n\n",
            "data: [DONE]\n\n",
            "data: {\"n\":2}\n\n",
        ]);
        let events = collect(parser).await.unwrap();
        assert_eq!(events, vec![serde_json::json!({"n": 1})]);
    }

    #[tokio::test]
    async fn test_parser_reassembles_split_frames() {
        let parser = parser_from(vec!["data: {\"n\"", ":1}\r\n", "\r\ndata: {\"n\":2}\n"]);
        let events = collect(parser).await.unwrap();
        assert_eq!(
            events,
            vec![serde_json::json!({"n": 1}), serde_json::json!({"n": 2})]
        );
    }

    #[tokio::test]
    async fn test_parser_decodes_trailing_line_without_newline() {
        let parser = parser_from(vec!["data: {\"n\":1}\n", "data: {\"n\":2}"]);
        let events = collect(parser).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn test_parser_skips_malformed_frames_by_default() {
        let parser = parser_from(vec![
            "data: {broken\n",
            "data: {broken\n",
            "data: {broken\n",
            "data: {\"n\":1}\n",
            "data: [DONE]\n",
        ]);
        let events = collect(parser).await.unwrap();
        assert_eq!(events, vec![serde_json::json!({"n": 1})]);
    }

    #[tokio::test]
    async fn test_malformed_limit_counts_consecutive_frames_only() {
        let interleaved = parser_from(vec![
            "data: {broken\n",
            "data: {\"n\":1}\n",
            "data: {broken\n",
            "data: {\"n\":2}\n",
        ])
        .with_malformed_limit(2);
        assert_eq!(collect(interleaved).await.unwrap().len(), 2);

        let consecutive = parser_from(vec![
            "data: {\"n\":1}\n",
            "data: {broken\n",
            "data: {broken\n",
            "data: {\"n\":2}\n",
        ])
        .with_malformed_limit(2);
        let err = collect(consecutive).await.unwrap_err();
        assert!(matches!(err, CommonRequestError::TooManyMalformedFrames(2)));
    }

    #[test]
    fn test_valid_json_of_other_shape_is_skipped() {
        #[derive(Debug, PartialEq, serde::Deserialize)]
        struct Tick {
            n: u32,
        }

        assert_eq!(decode_line::<Tick>("data: {\"n\":\"one\"}"), Frame::Skip);
        assert_eq!(decode_line::<Tick>("data: {\"n\":1}"), Frame::Event(Tick { n: 1 }));
    }

    #[tokio::test]
    async fn test_unfit_frames_do_not_count_as_malformed() {
        #[derive(Debug, serde::Deserialize)]
        struct Tick {
            #[allow(dead_code)]
            n: u32,
        }

        let mut parser = parser_from(vec![
            "data: {\"n\":\"one\"}\n",
            "data: {\"n\":\"two\"}\n",
            "data: {\"n\":\"three\"}\n",
            "data: {\"n\":4}\n",
        ])
        .with_malformed_limit(2);

        let mut events = 0;
        while parser.next_event::<Tick>().await.unwrap().is_some() {
            events += 1;
        }
        assert_eq!(events, 1);
    }

    #[tokio::test]
    async fn test_into_stream_yields_events_in_order() {
        let parser = parser_from(vec!["data: {\"n\":1}\n\ndata: {\"n\":2}\n\ndata: [DONE]\n\n"]);
        let events: Vec<Value> = parser
            .into_stream::<Value>()
            .map(|r| r.unwrap())
            .collect()
            .await;
        assert_eq!(events.len(), 2);
        assert_eq!(events[1]["n"], 2);
    }
}
