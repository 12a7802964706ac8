//! Incremental parser for the Messages API server-sent event stream.
//!
//! Network chunks split events at arbitrary byte positions, even inside a
//! multibyte character, so the parser keeps a byte buffer: complete lines are
//! decoded and consumed, a trailing partial line stays for the next chunk.

use serde::Deserialize;

use crate::error::LlmError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    TextDelta(String),
    MessageStop,
    /// The API reported an error mid-stream.
    Error(String),
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiStreamEvent {
    ContentBlockDelta {
        delta: ApiDelta,
    },
    MessageStop,
    Error {
        error: ApiErrorBody,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ApiDelta {
    TextDelta {
        text: String,
    },
    #[serde(other)]
    Other,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: String,
}

/// Consume every complete line in `buffer` and return the events found.
///
/// `event:` lines, comments, blank lines and event kinds without text
/// (`ping`, `message_start`, ...) produce nothing.
pub fn parse_sse_buffered(buffer: &mut Vec<u8>) -> Vec<Result<SseEvent, LlmError>> {
    let mut events = Vec::new();

    while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=newline_pos).collect();
        let line = match std::str::from_utf8(&raw[..newline_pos]) {
            Ok(line) => line.trim_end_matches('\r'),
            Err(e) => {
                events.push(Err(LlmError::Parse(format!("SSE line is not UTF-8: {e}"))));
                continue;
            }
        };

        if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim_start();
            if !data.is_empty() {
                if let Some(event) = parse_data(data) {
                    events.push(event);
                }
            }
        }
    }

    events
}

fn parse_data(data: &str) -> Option<Result<SseEvent, LlmError>> {
    if data == "[DONE]" {
        return Some(Ok(SseEvent::MessageStop));
    }
    match serde_json::from_str::<ApiStreamEvent>(data) {
        Ok(ApiStreamEvent::ContentBlockDelta {
            delta: ApiDelta::TextDelta { text },
        }) => Some(Ok(SseEvent::TextDelta(text))),
        Ok(ApiStreamEvent::MessageStop) => Some(Ok(SseEvent::MessageStop)),
        Ok(ApiStreamEvent::Error { error }) => Some(Ok(SseEvent::Error(error.message))),
        Ok(_) => None,
        Err(e) => Some(Err(LlmError::Parse(format!("SSE parse error: {e}")))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELTA_A: &str = r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hel"}}"#;
    const DELTA_B: &str = r#"data: {"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"lo"}}"#;

    fn texts(events: Vec<Result<SseEvent, LlmError>>) -> Vec<String> {
        events
            .into_iter()
            .filter_map(|e| match e {
                Ok(SseEvent::TextDelta(t)) => Some(t),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn parses_complete_events() {
        let mut buffer = format!(
            "event: content_block_delta\n{DELTA_A}\n\nevent: content_block_delta\n{DELTA_B}\n\n"
        )
        .into_bytes();
        assert_eq!(texts(parse_sse_buffered(&mut buffer)), vec!["Hel", "lo"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn keeps_partial_line_for_next_chunk() {
        let (head, tail) = DELTA_A.split_at(30);
        let mut buffer = head.as_bytes().to_vec();
        assert!(parse_sse_buffered(&mut buffer).is_empty());
        assert_eq!(buffer, head.as_bytes());

        buffer.extend_from_slice(tail.as_bytes());
        buffer.extend_from_slice(b"\n\n");
        assert_eq!(texts(parse_sse_buffered(&mut buffer)), vec!["Hel"]);
    }

    #[test]
    fn ignores_pings_and_metadata() {
        let mut buffer = Vec::from(
            "event: ping\ndata: {\"type\": \"ping\"}\n\n: comment\n\
             data: {\"type\":\"message_start\",\"message\":{\"id\":\"m1\"}}\n\
             data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"input_json_delta\",\"partial_json\":\"{\"}}\n"
                .as_bytes(),
        );
        assert!(parse_sse_buffered(&mut buffer).is_empty());
    }

    #[test]
    fn handles_crlf_and_stop() {
        let mut buffer =
            format!("{DELTA_B}\r\n\r\ndata: {{\"type\":\"message_stop\"}}\r\n").into_bytes();
        let events: Vec<_> = parse_sse_buffered(&mut buffer)
            .into_iter()
            .map(|e| e.unwrap())
            .collect();
        assert_eq!(
            events,
            vec![SseEvent::TextDelta("lo".into()), SseEvent::MessageStop]
        );
    }

    #[test]
    fn surfaces_error_events_and_bad_json() {
        let mut buffer = Vec::from(
            "data: {\"type\":\"error\",\"error\":{\"type\":\"overloaded_error\",\"message\":\"Overloaded\"}}\n\
             data: {not json}\n"
                .as_bytes(),
        );
        let events = parse_sse_buffered(&mut buffer);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Ok(SseEvent::Error(m)) if m == "Overloaded"));
        assert!(matches!(&events[1], Err(LlmError::Parse(_))));
    }

    #[test]
    fn multibyte_character_split_across_chunks() {
        let line = "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"林峰\"}}\n\n";
        let bytes = line.as_bytes();
        // Cut one byte into the first character.
        let cut = line.find('林').unwrap() + 1;

        let mut buffer = bytes[..cut].to_vec();
        assert!(parse_sse_buffered(&mut buffer).is_empty());
        buffer.extend_from_slice(&bytes[cut..]);

        assert_eq!(texts(parse_sse_buffered(&mut buffer)), vec!["林峰"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn invalid_utf8_line_is_reported_and_skipped() {
        let mut buffer = b"data: \xff\xfe\n".to_vec();
        buffer.extend_from_slice(DELTA_B.as_bytes());
        buffer.push(b'\n');

        let events = parse_sse_buffered(&mut buffer);
        assert_eq!(events.len(), 2);
        assert!(matches!(&events[0], Err(LlmError::Parse(_))));
        assert!(matches!(&events[1], Ok(SseEvent::TextDelta(t)) if t == "lo"));
    }
}
