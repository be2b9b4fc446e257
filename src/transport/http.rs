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

use super::{ReplySource, SseDecoder, TransportEvent, receiver_stream};
use crate::error::TransportError;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde::Serialize;
use std::time::Duration;
use tokio::sync::mpsc;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Serialize)]
struct StreamRequest<'a> {
    message: &'a str,
    category: &'a str,
}

/// Streams replies from an HTTP endpoint that answers with server-sent events.
#[derive(Debug, Clone)]
pub struct HttpSource {
    client: reqwest::Client,
    url: String,
}

impl HttpSource {
    pub fn new(url: impl Into<String>) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().connect_timeout(CONNECT_TIMEOUT).build()?;
        Ok(Self { client, url: url.into() })
    }
}

impl ReplySource for HttpSource {
    fn open(&self, prompt: &str, category: &str) -> BoxStream<'static, TransportEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        let request = self
            .client
            .post(&self.url)
            .header(reqwest::header::ACCEPT, "text/event-stream")
            .json(&StreamRequest { message: prompt, category });
        let url = self.url.clone();

        tokio::spawn(async move {
            if let Err(err) = pump(request, &tx).await {
                tracing::warn!(%url, error = %err, "reply stream failed");
                let _ = tx.send(TransportEvent::Failed(err.to_string()));
            }
        });

        receiver_stream(rx)
    }
}

async fn pump(
    request: reqwest::RequestBuilder,
    tx: &mpsc::UnboundedSender<TransportEvent>,
) -> Result<(), TransportError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(TransportError::Status(status.as_u16()));
    }

    let mut decoder = SseDecoder::new();
    let mut body = response.bytes_stream();
    while let Some(bytes) = body.next().await {
        for event in decoder.push(&bytes?) {
            if tx.send(event).is_err() {
                return Ok(());
            }
        }
        if decoder.is_finished() {
            return Ok(());
        }
    }
    for event in decoder.finish() {
        let _ = tx.send(event);
    }
    Ok(())
}
