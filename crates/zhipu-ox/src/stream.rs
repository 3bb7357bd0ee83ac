//! Text-level view of a streamed chat completion.
//!
//! [`StreamDecoder`] turns raw event-stream lines into [`StreamFrame`]s: one
//! `ContentDelta` per non-empty content fragment, then a single `StreamEnd`.

use std::iter::FusedIterator;

use serde_json::Value;
use zhipu_ox_common::streaming::{Frame, decode_line};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamFrame {
    /// Next fragment of generated text
    ContentDelta(String),
    /// The stream is over; nothing follows
    StreamEnd,
}

impl StreamFrame {
    pub fn as_delta(&self) -> Option<&str> {
        match self {
            Self::ContentDelta(text) => Some(text),
            Self::StreamEnd => None,
        }
    }

    pub fn is_end(&self) -> bool {
        matches!(self, Self::StreamEnd)
    }
}

/// Non-empty `choices[0].delta.content` of a raw chunk.
///
/// Only that path is read, so a chunk whose other fields have unexpected
/// types still yields its text.
pub fn delta_content(chunk: &Value) -> Option<&str> {
    chunk
        .pointer("/choices/0/delta/content")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
}

/// Decodes an iterator of SSE lines into [`StreamFrame`]s.
///
/// Stops reading at `data: [DONE]`; exhausting the input is an implicit end.
/// Either way exactly one `StreamEnd` is produced, after which the decoder is
/// fused.
#[derive(Debug)]
pub struct StreamDecoder<I> {
    lines: I,
    finished: bool,
}

impl<I> StreamDecoder<I> {
    pub fn new<L>(lines: L) -> Self
    where
        L: IntoIterator<IntoIter = I>,
    {
        Self {
            lines: lines.into_iter(),
            finished: false,
        }
    }
}

impl<'a> StreamDecoder<std::str::Lines<'a>> {
    /// Decode a whole event-stream body held in memory.
    pub fn from_body(body: &'a str) -> Self {
        Self::new(body.lines())
    }
}

impl<I, S> StreamDecoder<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    /// Concatenate every delta.
    pub fn into_text(self) -> String {
        self.filter_map(|frame| match frame {
            StreamFrame::ContentDelta(text) => Some(text),
            StreamFrame::StreamEnd => None,
        })
        .collect()
    }
}

impl<I, S> Iterator for StreamDecoder<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
    type Item = StreamFrame;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        for line in self.lines.by_ref() {
            match decode_line::<Value>(line.as_ref()) {
                Frame::Event(chunk) => {
                    if let Some(text) = delta_content(&chunk) {
                        return Some(StreamFrame::ContentDelta(text.to_string()));
                    }
                }
                Frame::Skip => {}
                Frame::End => break,
            }
        }

        self.finished = true;
        Some(StreamFrame::StreamEnd)
    }
}

impl<I, S> FusedIterator for StreamDecoder<I>
where
    I: Iterator<Item = S>,
    S: AsRef<str>,
{
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn as_delta_and_is_end() {
        assert_eq!(StreamFrame::ContentDelta("x".into()).as_delta(), Some("x"));
        assert!(StreamFrame::StreamEnd.is_end());
        assert_eq!(StreamFrame::StreamEnd.as_delta(), None);
    }

    #[test]
    fn delta_content_reads_only_the_content_path() {
        let chunk = serde_json::json!({"id": 7, "choices": [{"index": null, "delta": {"content": "x"}}]});
        assert_eq!(delta_content(&chunk), Some("x"));
        assert_eq!(delta_content(&serde_json::json!({"choices": []})), None);
        assert_eq!(
            delta_content(&serde_json::json!({"choices": [{"delta": {"content": ""}}]})),
            None
        );
    }

    #[test]
    fn from_body_splits_lines() {
        let body = "data: {\"choices\":[{\"delta\":{\"content\":\"a\"}}]}\r\n\r\ndata: [DONE]\r\n";
        let frames: Vec<_> = StreamDecoder::from_body(body).collect();
        assert_eq!(
            frames,
            vec![StreamFrame::ContentDelta("a".into()), StreamFrame::StreamEnd]
        );
    }
}
