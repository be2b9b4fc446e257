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

use super::clipboard::{ArboardClipboard, Clipboard};
use super::input::InputState;
use crate::render::{MarkdownRenderer, SyntectHighlighter, terminal_reconciler};
use crate::stream::{
    FinalizedReply, RevealConfig, RevealTick, ScrollPolicy, ScrollThresholds, SessionController,
    Viewport,
};
use crate::transport::{ReplySource, TransportEvent};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Terminal rows are mapped onto the scroll policy's pixel thresholds.
pub const ROW_HEIGHT_PX: u32 = 16;

pub type TerminalController = SessionController<MarkdownRenderer, SyntectHighlighter>;

/// Events delivered to the event loop from background tasks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    Transport { session: u64, event: TransportEvent },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppStatus {
    Ready,
    Streaming,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    User(String),
    /// The in-flight reply; drawn from the controller's live surface.
    Streaming { session: u64 },
    Assistant(Box<FinalizedReply>),
}

/// Scroll geometry of the chat body, in rows, as of the last frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChatViewport {
    pub content_rows: u16,
    pub body_rows: u16,
    pub offset: u16,
}

impl ChatViewport {
    pub fn max_offset(&self) -> u16 {
        self.content_rows.saturating_sub(self.body_rows)
    }

    pub fn to_pixels(self) -> Viewport {
        Viewport {
            scroll_height: u32::from(self.content_rows) * ROW_HEIGHT_PX,
            scroll_top: u32::from(self.offset) * ROW_HEIGHT_PX,
            client_height: u32::from(self.body_rows) * ROW_HEIGHT_PX,
        }
    }
}

pub struct App {
    pub messages: Vec<ChatMessage>,
    pub controller: TerminalController,
    pub scroll: ScrollPolicy,
    pub viewport: ChatViewport,
    /// Content changed since the last frame; auto-scroll may apply.
    pub content_dirty: bool,
    /// Next frame scrolls to the bottom even when detached.
    pub force_scroll: bool,
    pub input: InputState,
    pub status: AppStatus,
    pub should_quit: bool,
    pub spinner_frame: usize,
    pub category: String,
    pub source: Box<dyn ReplySource>,
    pub clipboard: Box<dyn Clipboard>,
    /// Short-lived footer feedback, e.g. after a copy.
    pub flash: Option<String>,
    pub event_tx: mpsc::UnboundedSender<AppEvent>,
    pub event_rx: mpsc::UnboundedReceiver<AppEvent>,
    pub tick_rx: mpsc::UnboundedReceiver<RevealTick>,
    /// Task forwarding transport events for the in-flight reply.
    pub(super) stream_task: Option<JoinHandle<()>>,
}

impl App {
    pub fn new(
        source: Box<dyn ReplySource>,
        category: impl Into<String>,
        reveal: RevealConfig,
        thresholds: ScrollThresholds,
    ) -> Self {
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            messages: Vec::new(),
            controller: SessionController::new(reveal, terminal_reconciler(), tick_tx),
            scroll: ScrollPolicy::new(thresholds),
            viewport: ChatViewport::default(),
            content_dirty: false,
            force_scroll: false,
            input: InputState::new(),
            status: AppStatus::Ready,
            should_quit: false,
            spinner_frame: 0,
            category: category.into(),
            source,
            clipboard: Box::new(ArboardClipboard::new()),
            flash: None,
            event_tx,
            event_rx,
            tick_rx,
            stream_task: None,
        }
    }

    /// App over the built-in demo reply with a memory clipboard.
    pub fn test_default() -> Self {
        let mut app = Self::new(
            Box::new(crate::transport::ReplaySource::demo()),
            "general",
            RevealConfig::default(),
            ScrollThresholds::default(),
        );
        app.clipboard = Box::new(super::clipboard::MemoryClipboard::default());
        app
    }

    pub fn is_streaming(&self) -> bool {
        self.controller.is_streaming()
    }

    /// The last finalized reply, if any.
    pub fn last_reply(&self) -> Option<&FinalizedReply> {
        self.messages.iter().rev().find_map(|msg| match msg {
            ChatMessage::Assistant(reply) => Some(reply.as_ref()),
            _ => None,
        })
    }

    /// Record the chat body geometry of a new frame and apply auto-scroll.
    /// Returns the row offset to draw at.
    pub fn apply_layout(&mut self, content_rows: u16, body_rows: u16) -> u16 {
        self.viewport.content_rows = content_rows;
        self.viewport.body_rows = body_rows;
        let max_offset = self.viewport.max_offset();
        self.viewport.offset = self.viewport.offset.min(max_offset);

        if self.content_dirty || self.force_scroll {
            if let Some(target) =
                self.scroll.auto_scroll_target(self.viewport.to_pixels(), self.force_scroll)
            {
                let rows = u16::try_from(target / ROW_HEIGHT_PX).unwrap_or(u16::MAX);
                self.viewport.offset = rows.min(max_offset);
            }
            self.content_dirty = false;
            self.force_scroll = false;
        }
        self.viewport.offset
    }

    pub(super) fn stop_stream_task(&mut self) {
        if let Some(task) = self.stream_task.take() {
            task.abort();
        }
    }
}

impl Drop for App {
    fn drop(&mut self) {
        self.stop_stream_task();
    }
}
