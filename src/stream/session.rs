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

use super::reconcile::{
    CodeHighlighter, CopyAffordance, Notice, ProseRenderer, Reconciler, Surface,
};
use super::reveal::{Advance, RevealConfig, RevealScheduler, TickOutcome};
use super::scroll::{ScrollIntent, ScrollPolicy};
use super::segment::{Segment, segment};
use super::ticker::{RevealTick, TickLoop};
use tokio::sync::mpsc;

/// How the transport ended a reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamOutcome {
    /// Normal completion. `final_content`, when present, replaces the
    /// accumulated text.
    Complete { final_content: Option<String> },
    /// Transport failure; the reply body becomes the error text.
    Failed(String),
}

/// A reply that has left the pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinalizedReply {
    pub session: u64,
    pub text: String,
    pub surface: Surface,
    /// Set when the reply ended inside an unterminated fence.
    pub anomaly: Option<Notice>,
}

/// One in-flight reply.
#[derive(Debug)]
pub struct StreamSession {
    id: u64,
    scheduler: RevealScheduler,
    ticker: Option<TickLoop>,
    scroll_snapshot: ScrollIntent,
}

impl StreamSession {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn accumulated(&self) -> &str {
        self.scheduler.accumulated()
    }

    pub fn revealed_len(&self) -> usize {
        self.scheduler.revealed_len()
    }

    pub fn is_ticking(&self) -> bool {
        self.ticker.is_some()
    }

    pub fn scroll_was_detached(&self) -> bool {
        self.scroll_snapshot == ScrollIntent::Detached
    }

    fn stop_ticking(&mut self) {
        self.scheduler.cancel();
        self.ticker = None;
    }
}

/// Owns the in-flight reply and drives scheduler, ticker and reconciler.
///
/// Every mutation happens on the caller's thread; tick loops only send
/// [`RevealTick`]s into `tick_tx`, and the owner feeds them back through
/// [`SessionController::on_tick`].
pub struct SessionController<P, H> {
    config: RevealConfig,
    reconciler: Reconciler<P, H>,
    session: Option<StreamSession>,
    tick_tx: mpsc::UnboundedSender<RevealTick>,
    next_session: u64,
}

impl<P: ProseRenderer, H: CodeHighlighter> SessionController<P, H> {
    pub fn new(
        config: RevealConfig,
        reconciler: Reconciler<P, H>,
        tick_tx: mpsc::UnboundedSender<RevealTick>,
    ) -> Self {
        Self { config, reconciler, session: None, tick_tx, next_session: 1 }
    }

    pub fn session(&self) -> Option<&StreamSession> {
        self.session.as_ref()
    }

    pub fn is_streaming(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_ticking(&self) -> bool {
        self.session.as_ref().is_some_and(StreamSession::is_ticking)
    }

    /// Live surface of the in-flight reply.
    pub fn surface(&self) -> &Surface {
        self.reconciler.surface()
    }

    /// Start a new reply, superseding any in-flight one.
    ///
    /// The superseded reply is dropped without finalization; its tick loop
    /// is cancelled before anything else changes.
    pub fn begin(&mut self, scroll: &ScrollPolicy) -> u64 {
        if let Some(mut previous) = self.session.take() {
            previous.stop_ticking();
            tracing::info!(session = previous.id, "reply superseded by a new message");
        }
        self.reconciler.take_surface();

        let id = self.next_session;
        self.next_session += 1;
        self.session = Some(StreamSession {
            id,
            scheduler: RevealScheduler::new(self.config),
            ticker: None,
            scroll_snapshot: scroll.snapshot(),
        });
        tracing::info!(session = id, scroll = ?scroll.snapshot(), "reply started");
        id
    }

    /// Append one transport chunk to the accumulated text.
    pub fn append_chunk(&mut self, chunk: &str) -> Option<Advance> {
        let session = self.session.as_ref()?;
        let mut text = String::with_capacity(session.accumulated().len() + chunk.len());
        text.push_str(session.accumulated());
        text.push_str(chunk);
        self.update_text(&text)
    }

    /// Replace the accumulated text with a new snapshot of the whole reply.
    /// Snapshots that do not extend the previous one restart the reveal.
    pub fn update_text(&mut self, text: &str) -> Option<Advance> {
        let session = self.session.as_mut()?;
        let outcome = session.scheduler.advance(text);

        if outcome.advance == Advance::Reset {
            // Old frames must not survive a reset, even for one tick.
            session.ticker = None;
            self.reconciler.reconcile("", false);
        }

        if let Some(generation) = outcome.start_loop {
            let tick = RevealTick { session: session.id, generation };
            // Replacing the handle drops (and cancels) any older loop.
            session.ticker =
                Some(TickLoop::spawn(tick, self.config.tick_interval, self.tick_tx.clone()));
        }

        Some(outcome.advance)
    }

    /// Apply one tick. Returns whether the surface changed.
    pub fn on_tick(&mut self, tick: RevealTick) -> bool {
        let Some(session) = self.session.as_mut() else {
            return false;
        };
        if session.id != tick.session {
            return false;
        }

        match session.scheduler.tick(tick.generation) {
            TickOutcome::Stale => false,
            TickOutcome::Revealed => {
                self.reconciler.reconcile(session.scheduler.revealed_text(), true);
                true
            }
            TickOutcome::CaughtUp => {
                session.ticker = None;
                self.reconciler.reconcile(session.scheduler.revealed_text(), false);
                true
            }
        }
    }

    /// End the in-flight reply and hand out its final surface.
    ///
    /// Stops ticking before touching any state, renders the complete text
    /// once more without the in-progress marker, attaches copy affordances
    /// and restores the scroll intent captured by [`Self::begin`].
    pub fn finalize(
        &mut self,
        outcome: StreamOutcome,
        scroll: &mut ScrollPolicy,
    ) -> Option<FinalizedReply> {
        let mut session = self.session.take()?;
        session.stop_ticking();

        let transport_error = match outcome {
            StreamOutcome::Complete { final_content: Some(text) } => {
                session.scheduler.replace_revealed(&text);
                None
            }
            StreamOutcome::Complete { final_content: None } => {
                session.scheduler.flush();
                None
            }
            StreamOutcome::Failed(message) => {
                tracing::warn!(session = session.id, %message, "reply stream failed");
                session.scheduler.replace_revealed(&format!("Error: {message}"));
                Some(Notice::TransportError(message))
            }
        };

        let text = session.scheduler.accumulated().to_owned();
        self.reconciler.reconcile(&text, false);

        let anomaly = unterminated_fence(&text);
        if let Some(Notice::UnterminatedFence { language }) = &anomaly {
            tracing::warn!(session = session.id, %language, "reply ended inside an open fence");
        }

        let surface = self.reconciler.surface_mut();
        surface.notice = transport_error.or_else(|| anomaly.clone());
        attach_copy_affordances(surface, &text);

        scroll.restore(session.scroll_snapshot);
        tracing::info!(session = session.id, len = text.len(), "reply finalized");

        Some(FinalizedReply {
            session: session.id,
            text,
            surface: self.reconciler.take_surface(),
            anomaly,
        })
    }

    /// Drop the in-flight reply without producing a result.
    pub fn abandon(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.stop_ticking();
            tracing::info!(session = session.id, "reply abandoned");
        }
        self.reconciler.take_surface();
    }
}

fn unterminated_fence(text: &str) -> Option<Notice> {
    match segment(text).pop() {
        Some(Segment::Code { language, open: true, .. }) => {
            Some(Notice::UnterminatedFence { language })
        }
        _ => None,
    }
}

fn attach_copy_affordances(surface: &mut Surface, text: &str) {
    for block in &mut surface.code_blocks {
        block.copy = Some(CopyAffordance {
            label: format!("copy {}", block.language),
            payload: block.source.clone(),
        });
    }
    surface.message_copy =
        Some(CopyAffordance { label: "copy message".to_owned(), payload: text.to_owned() });
}
