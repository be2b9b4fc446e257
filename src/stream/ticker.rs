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

use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Timer event addressed to one ticking loop of one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevealTick {
    pub session: u64,
    pub generation: u64,
}

/// Owned handle to a running ticking loop.
///
/// The loop only emits [`RevealTick`]s; all state changes happen wherever
/// those are received. Dropping the handle cancels the loop.
#[derive(Debug)]
pub struct TickLoop {
    cancel: CancellationToken,
    task: JoinHandle<()>,
}

impl TickLoop {
    /// Start emitting `tick` every `every`, first one `every` from now.
    /// Must be called within a tokio runtime.
    pub fn spawn(tick: RevealTick, every: Duration, tx: mpsc::UnboundedSender<RevealTick>) -> Self {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval_at(Instant::now() + every, every);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    () = token.cancelled() => break,
                    _ = interval.tick() => {
                        if tx.send(tick).is_err() {
                            break;
                        }
                    }
                }
            }
        });
        let RevealTick { session, generation } = tick;
        tracing::debug!(session, generation, "reveal loop started");
        Self { cancel, task }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickLoop {
    fn drop(&mut self) {
        self.cancel.cancel();
        self.task.abort();
    }
}
