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

//! Concrete prose and code renderers for the reconciler.

pub mod highlight;
pub mod markdown;

pub use crate::stream::{CodeHighlighter, ProseRenderer};
pub use highlight::SyntectHighlighter;
pub use markdown::MarkdownRenderer;

use crate::stream::Reconciler;

/// Reconciler wired to the terminal renderers.
pub type TerminalReconciler = Reconciler<MarkdownRenderer, SyntectHighlighter>;

pub fn terminal_reconciler() -> TerminalReconciler {
    Reconciler::new(MarkdownRenderer::new(), SyntectHighlighter::new())
}
