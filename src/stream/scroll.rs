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

pub const DEFAULT_DETACH_THRESHOLD: u32 = 100;
pub const DEFAULT_REATTACH_THRESHOLD: u32 = 30;

/// Hysteresis band for scroll intent, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScrollThresholds {
    /// Scrolling up past this distance from the bottom detaches.
    pub detach: u32,
    /// Coming back within this distance of the bottom re-attaches.
    pub reattach: u32,
}

impl Default for ScrollThresholds {
    fn default() -> Self {
        Self { detach: DEFAULT_DETACH_THRESHOLD, reattach: DEFAULT_REATTACH_THRESHOLD }
    }
}

/// Geometry of the scrollable chat viewport at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Viewport {
    /// Total content height.
    pub scroll_height: u32,
    /// Offset of the first visible pixel.
    pub scroll_top: u32,
    /// Visible height.
    pub client_height: u32,
}

impl Viewport {
    pub fn distance_from_bottom(&self) -> u32 {
        self.scroll_height.saturating_sub(self.scroll_top).saturating_sub(self.client_height)
    }

    pub fn max_scroll_top(&self) -> u32 {
        self.scroll_height.saturating_sub(self.client_height)
    }
}

/// Whether the viewer wants the viewport to follow new content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScrollIntent {
    #[default]
    Following,
    Detached,
}

/// Two-state scroll intent machine with hysteresis.
#[derive(Debug, Clone)]
pub struct ScrollPolicy {
    intent: ScrollIntent,
    last_offset: u32,
    thresholds: ScrollThresholds,
}

impl ScrollPolicy {
    pub fn new(thresholds: ScrollThresholds) -> Self {
        Self { intent: ScrollIntent::Following, last_offset: 0, thresholds }
    }

    pub fn intent(&self) -> ScrollIntent {
        self.intent
    }

    pub fn is_detached(&self) -> bool {
        self.intent == ScrollIntent::Detached
    }

    /// Feed one viewport scroll event and return the resulting intent.
    pub fn on_scroll(&mut self, viewport: Viewport) -> ScrollIntent {
        let scrolling_up = viewport.scroll_top < self.last_offset;
        let distance = viewport.distance_from_bottom();

        match self.intent {
            ScrollIntent::Following if scrolling_up && distance > self.thresholds.detach => {
                tracing::debug!(distance, "viewer detached from live tail");
                self.intent = ScrollIntent::Detached;
            }
            ScrollIntent::Detached if distance < self.thresholds.reattach => {
                tracing::debug!(distance, "viewer re-attached to live tail");
                self.intent = ScrollIntent::Following;
            }
            _ => {}
        }

        self.last_offset = viewport.scroll_top;
        self.intent
    }

    /// The explicit "jump to latest" affordance.
    pub fn jump_to_latest(&mut self) {
        self.intent = ScrollIntent::Following;
    }

    /// Where auto-scroll should move the viewport, if anywhere.
    ///
    /// Returns `None` while detached unless `force` is set; `force` is
    /// reserved for the jump-to-latest affordance.
    pub fn auto_scroll_target(&mut self, viewport: Viewport, force: bool) -> Option<u32> {
        if self.is_detached() && !force {
            return None;
        }
        let target = viewport.max_scroll_top();
        self.last_offset = target;
        Some(target)
    }

    /// Snapshot taken when a send begins.
    pub fn snapshot(&self) -> ScrollIntent {
        self.intent
    }

    /// Put back a snapshot after the reply finalizes.
    pub fn restore(&mut self, intent: ScrollIntent) {
        self.intent = intent;
    }

    /// Back to the initial state, for a freshly loaded conversation.
    pub fn reset(&mut self) {
        self.intent = ScrollIntent::Following;
        self.last_offset = 0;
    }
}

impl Default for ScrollPolicy {
    fn default() -> Self {
        Self::new(ScrollThresholds::default())
    }
}
