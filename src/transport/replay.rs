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

use super::{ReplySource, TransportEvent, receiver_stream};
use crate::error::TransportError;
use futures::stream::BoxStream;
use std::path::Path;
use std::time::Duration;
use tokio::sync::mpsc;

pub const DEFAULT_CHUNK_SIZE: usize = 4;
pub const DEFAULT_CHUNK_DELAY: Duration = Duration::from_millis(40);

/// Reply used when no source is configured.
pub const DEMO_REPLY: &str = r#"Here is a small **Python** helper that reads a file:

```python
def read_lines(path):
    with open(path) as f:
        return [line.rstrip() for line in f]
```

And the same idea in Rust:

```rust
fn read_lines(path: &str) -> std::io::Result<Vec<String>> {
    Ok(std::fs::read_to_string(path)?.lines().map(str::to_owned).collect())
}
```

Both versions strip trailing whitespace. Use `Alt+1` or `Alt+2` to copy a block."#;

/// Replays a fixed reply in uneven bursts, as a live model would send it.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    text: String,
    chunk_size: usize,
    delay: Duration,
}

impl ReplaySource {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), chunk_size: DEFAULT_CHUNK_SIZE, delay: DEFAULT_CHUNK_DELAY }
    }

    pub fn demo() -> Self {
        Self::new(DEMO_REPLY)
    }

    pub fn from_file(path: &Path) -> Result<Self, TransportError> {
        let text = std::fs::read_to_string(path)?;
        tracing::info!(path = %path.display(), len = text.len(), "loaded replay file");
        Ok(Self::new(text))
    }

    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// The reply split into bursts of 1, n and 3n characters, repeating.
    pub fn bursts(&self) -> Vec<String> {
        let sizes = [1, self.chunk_size, self.chunk_size.saturating_mul(3)];
        let mut bursts = Vec::new();
        let mut chars = self.text.chars().peekable();
        let mut size = sizes.iter().cycle();
        while chars.peek().is_some() {
            let take = size.next().copied().unwrap_or(1);
            bursts.push(chars.by_ref().take(take).collect());
        }
        bursts
    }
}

impl ReplySource for ReplaySource {
    fn open(&self, _prompt: &str, _category: &str) -> BoxStream<'static, TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let bursts = self.bursts();
        let delay = self.delay;

        tokio::spawn(async move {
            if tx.send(TransportEvent::Started { message_id: None }).is_err() {
                return;
            }
            for burst in bursts {
                tokio::time::sleep(delay).await;
                if tx.send(TransportEvent::Chunk(burst)).is_err() {
                    return;
                }
            }
            let _ = tx.send(TransportEvent::Complete { final_content: None });
        });

        receiver_stream(rx)
    }
}
