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

//! Incremental rendering pipeline for a streamed reply.
//!
//! Text flows transport -> [`SessionController`] -> [`RevealScheduler`] ->
//! [`Reconciler`], while [`ScrollPolicy`] decides whether the viewport follows.

pub mod reconcile;
pub mod reveal;
pub mod scroll;
pub mod segment;
pub mod session;
pub mod ticker;

pub use reconcile::{
    CodeBlockView, CodeHighlighter, CopyAffordance, IN_PROGRESS_MARKER, Notice, ProseRenderer,
    Reconciler, Surface,
};
pub use reveal::{Advance, RevealConfig, RevealScheduler, TickOutcome};
pub use scroll::{ScrollIntent, ScrollPolicy, ScrollThresholds, Viewport};
pub use segment::{Segment, segment};
pub use session::{FinalizedReply, SessionController, StreamOutcome, StreamSession};
pub use ticker::{RevealTick, TickLoop};
