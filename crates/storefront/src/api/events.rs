//! Server-sent category change events.
//!
//! `/api/sse/events` is a long-lived `text/event-stream`. Frames are
//! separated by a blank line and carry `event:` and `data:` fields; only the
//! three category events are surfaced, everything else (heartbeats, other
//! resources) is skipped. Each category event drops the cached category list
//! before it is handed to the caller.

use async_stream::stream;
use futures::StreamExt;
use futures::stream::BoxStream;
use nursery_core::events::CategoryEvent;
use reqwest::Method;
use reqwest::header::{ACCEPT, HeaderValue};
use tracing::{debug, instrument, warn};

use super::ApiClient;
use crate::error::ApiError;

/// Largest frame accepted before the stream is abandoned.
const MAX_FRAME_BYTES: usize = 64 * 1024;

/// Category events as they arrive.
pub type CategoryEventStream = BoxStream<'static, Result<CategoryEvent, ApiError>>;

/// One parsed SSE frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseFrame {
    pub event: String,
    pub data: String,
}

impl SseFrame {
    /// Parse the lines of a single frame.
    ///
    /// The event name defaults to `message`. Multiple `data:` lines are
    /// joined with newlines. Returns `None` for comment-only or empty frames.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let mut event = None;
        let mut data: Vec<&str> = Vec::new();

        for line in raw.lines() {
            if line.starts_with(':') {
                continue;
            }
            let (field, value) = line.split_once(':').unwrap_or((line, ""));
            let value = value.strip_prefix(' ').unwrap_or(value);
            match field {
                "event" => event = Some(value),
                "data" => data.push(value),
                _ => {}
            }
        }

        if event.is_none() && data.is_empty() {
            return None;
        }

        Some(Self {
            event: event.unwrap_or("message").to_string(),
            data: data.join("\n"),
        })
    }
}

/// Split the next complete frame off the front of `buffer`.
fn extract_frame(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let idx = buffer.windows(2).position(|w| w == b"\n\n")?;
    let mut frame: Vec<u8> = buffer.drain(..idx + 2).collect();
    frame.truncate(idx);
    Some(frame)
}

impl ApiClient {
    /// Subscribe to category change events.
    ///
    /// The stream ends when the server closes the connection. Transport
    /// failures, undecodable frames and frames over 64 KiB are yielded as
    /// errors; the caller decides whether to reconnect.
    ///
    /// # Errors
    ///
    /// Returns an error if the subscription request is rejected.
    #[instrument(skip(self))]
    pub async fn category_events(&self) -> Result<CategoryEventStream, ApiError> {
        let url = self.url("api/sse/events")?;
        let response = self
            .stream_request(Method::GET, url)
            .header(ACCEPT, HeaderValue::from_static("text/event-stream"))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::from_status(status, &body));
        }

        let client = self.clone();
        Ok(stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut byte_stream = std::pin::pin!(response.bytes_stream());

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(chunk) => chunk,
                    Err(e) => {
                        yield Err(ApiError::Stream(e.to_string()));
                        break;
                    }
                };
                buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

                while let Some(frame) = extract_frame(&mut buffer) {
                    let Ok(text) = std::str::from_utf8(&frame) else {
                        yield Err(ApiError::Stream("invalid UTF-8 in event frame".to_string()));
                        continue;
                    };
                    let Some(frame) = SseFrame::parse(text) else {
                        continue;
                    };
                    match CategoryEvent::from_sse(&frame.event, &frame.data) {
                        Some(event) => {
                            debug!(event = event.event_name(), id = ?event.category_id, "Category changed");
                            client.invalidate_categories().await;
                            yield Ok(event);
                        }
                        None => debug!(event = %frame.event, "Ignoring event"),
                    }
                }

                if buffer.len() > MAX_FRAME_BYTES {
                    yield Err(ApiError::Stream(format!(
                        "event frame exceeds {MAX_FRAME_BYTES} bytes"
                    )));
                    buffer.clear();
                    break;
                }
            }

            if !buffer.is_empty() {
                warn!(bytes = buffer.len(), "Event stream closed mid-frame");
            }
        }
        .boxed())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_frame() {
        let mut buffer = b"event: category_created\ndata: {\"id\":1}\n\nevent: ping\n".to_vec();
        let frame = extract_frame(&mut buffer).unwrap();
        assert_eq!(frame, b"event: category_created\ndata: {\"id\":1}");
        assert_eq!(buffer, b"event: ping\n");
        assert!(extract_frame(&mut buffer).is_none());
    }

    #[test]
    fn test_extract_back_to_back_frames() {
        let mut buffer = b"\n\nevent: a\n\n".to_vec();
        assert_eq!(extract_frame(&mut buffer).unwrap(), b"");
        assert_eq!(extract_frame(&mut buffer).unwrap(), b"event: a");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_parse_frame_fields() {
        let frame = SseFrame::parse("event: category_updated\ndata: {\"categoryId\":4}").unwrap();
        assert_eq!(frame.event, "category_updated");
        assert_eq!(frame.data, r#"{"categoryId":4}"#);

        let event = CategoryEvent::from_sse(&frame.event, &frame.data).unwrap();
        assert_eq!(event.category_id.map(|id| id.as_i64()), Some(4));
    }

    #[test]
    fn test_parse_defaults_and_comments() {
        assert!(SseFrame::parse(": keep-alive").is_none());
        assert!(SseFrame::parse("").is_none());

        let frame = SseFrame::parse("data:first\ndata: second").unwrap();
        assert_eq!(frame.event, "message");
        assert_eq!(frame.data, "first\nsecond");
    }
}
