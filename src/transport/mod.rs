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

//! Reply sources: where streamed reply text comes from.

pub mod http;
pub mod replay;
pub mod sse;

pub use http::HttpSource;
pub use replay::{DEMO_REPLY, ReplaySource};
pub use sse::SseDecoder;

use futures::stream::{self, BoxStream};
use tokio::sync::mpsc;

/// One event of a reply stream, in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Started { message_id: Option<String> },
    Chunk(String),
    Complete { final_content: Option<String> },
    Failed(String),
}

impl TransportEvent {
    /// Whether no further events follow this one.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Failed(_))
    }
}

/// Something that can turn a prompt into a stream of reply events.
///
/// Every stream ends with exactly one terminal event.
pub trait ReplySource {
    fn open(&self, prompt: &str, category: &str) -> BoxStream<'static, TransportEvent>;
}

/// Adapt a channel receiver into a boxed stream.
fn receiver_stream(
    rx: mpsc::UnboundedReceiver<TransportEvent>,
) -> BoxStream<'static, TransportEvent> {
    Box::pin(stream::unfold(rx, |mut rx| async move { rx.recv().await.map(|event| (event, rx)) }))
}
