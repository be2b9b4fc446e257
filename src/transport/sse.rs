// stream_reply — Incremental terminal rendering for streamed assistant replies
// Copyright (C) 2025  The stream-reply contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, either version 3 of the
// License, or (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use super::TransportEvent;
use serde::Deserialize;

/// JSON payload of one `data:` line.
#[derive(Debug, Default, Deserialize)]
struct Frame {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    chunk: Option<String>,
    #[serde(default)]
    final_content: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Incremental `text/event-stream` decoder.
///
/// Bytes are buffered until a blank line closes an event, so multi-byte
/// characters split across network reads are never decoded halfway.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
    started: bool,
    finished: bool,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a terminal event has been produced.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Feed raw bytes and collect every event they complete.
    pub fn push(&mut self, bytes: &[u8]) -> Vec<TransportEvent> {
        self.buffer.extend_from_slice(bytes);
        let mut events = Vec::new();
        while let Some((pos, delim_len)) = find_double_newline(&self.buffer) {
            let raw: Vec<u8> = self.buffer.drain(..pos).collect();
            self.buffer.drain(..delim_len);
            self.decode_event(&String::from_utf8_lossy(&raw), &mut events);
        }
        events
    }

    /// Flush whatever is left once the byte stream ends.
    ///
    /// A stream that ends without a terminal frame still completes.
    pub fn finish(&mut self) -> Vec<TransportEvent> {
        let mut events = Vec::new();
        let rest = std::mem::take(&mut self.buffer);
        if !rest.iter().all(u8::is_ascii_whitespace) {
            self.decode_event(&String::from_utf8_lossy(&rest), &mut events);
        }
        if !self.finished {
            tracing::debug!("event stream ended without a completion frame");
            self.finished = true;
            events.push(TransportEvent::Complete { final_content: None });
        }
        events
    }

    fn decode_event(&mut self, raw: &str, events: &mut Vec<TransportEvent>) {
        if self.finished {
            return;
        }
        let Some(data) = event_data(raw) else {
            return;
        };
        let frame = match serde_json::from_str::<Frame>(&data) {
            Ok(frame) => frame,
            Err(err) => {
                tracing::warn!(error = %err, data = %data, "skipping malformed stream frame");
                return;
            }
        };

        if frame.status.as_deref() == Some("streaming") && !self.started {
            self.started = true;
            events.push(TransportEvent::Started { message_id: frame.id });
            return;
        }
        if frame.status.as_deref() == Some("complete") {
            self.finished = true;
            events.push(match frame.error {
                Some(error) => TransportEvent::Failed(frame.final_content.unwrap_or(error)),
                None => TransportEvent::Complete { final_content: frame.final_content },
            });
            return;
        }
        if let Some(chunk) = frame.chunk {
            events.push(TransportEvent::Chunk(chunk));
        }
    }
}

/// Joined `data:` lines of one event, or `None` for comments and keep-alives.
fn event_data(raw: &str) -> Option<String> {
    let lines: Vec<&str> = raw
        .lines()
        .filter_map(|line| line.strip_prefix("data:"))
        .map(|rest| rest.strip_prefix(' ').unwrap_or(rest))
        .collect();
    let data = lines.join("\n");
    let trimmed = data.trim();
    (!trimmed.is_empty() && trimmed != "[DONE]").then(|| trimmed.to_owned())
}

fn find_double_newline(buffer: &[u8]) -> Option<(usize, usize)> {
    let crlf = buffer.windows(4).position(|w| w == b"\r\n\r\n").map(|pos| (pos, 4));
    let lf = buffer.windows(2).position(|w| w == b"\n\n").map(|pos| (pos, 2));
    match (crlf, lf) {
        (Some(c), Some(l)) => Some(if l.0 <= c.0 { l } else { c }),
        (c, l) => c.or(l),
    }
}
