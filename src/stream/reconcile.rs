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

use super::segment::{Segment, segment};
use crate::error::HighlightError;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use std::panic::{self, AssertUnwindSafe};

/// Cursor glyph shown at the end of the prose region while ticking.
pub const IN_PROGRESS_MARKER: &str = "\u{258C}";

/// Renders prose markdown into terminal lines. Trusted to escape its input.
pub trait ProseRenderer {
    fn render(&self, prose: &str) -> Vec<Line<'static>>;
}

/// Highlights one code block. Unknown languages are the highlighter's
/// problem; errors fall back to verbatim text for that block only.
pub trait CodeHighlighter {
    fn highlight(&self, code: &str, language: &str) -> Result<Vec<Line<'static>>, HighlightError>;
}

/// Copy action attached to a finalized block or message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyAffordance {
    pub label: String,
    pub payload: String,
}

/// Problem reported on a finalized reply instead of being silently repaired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// The stream ended while a code fence was still open.
    UnterminatedFence { language: String },
    /// The transport failed; the reply body is the error text.
    TransportError(String),
}

impl Notice {
    pub fn message(&self) -> String {
        match self {
            Self::UnterminatedFence { language } => {
                format!("Reply ended inside an unterminated `{language}` code block")
            }
            Self::TransportError(message) => format!("Stream failed: {message}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlockView {
    pub language: String,
    /// Verbatim block content, used for copying.
    pub source: String,
    pub lines: Vec<Line<'static>>,
    pub open: bool,
    /// False when the highlighter failed and `lines` are verbatim.
    pub highlighted: bool,
    pub copy: Option<CopyAffordance>,
}

/// The reconciled UI surface for one reply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Surface {
    pub prose: Vec<Line<'static>>,
    pub code_blocks: Vec<CodeBlockView>,
    pub notice: Option<Notice>,
    pub message_copy: Option<CopyAffordance>,
}

impl Surface {
    pub fn has_in_progress_marker(&self) -> bool {
        self.prose.iter().flat_map(|line| line.spans.iter()).any(is_marker)
    }

    pub fn is_finalized(&self) -> bool {
        self.message_copy.is_some()
    }

    pub fn open_block(&self) -> Option<&CodeBlockView> {
        self.code_blocks.last().filter(|block| block.open)
    }

    /// Prose region flattened to plain text, one line per row.
    pub fn prose_text(&self) -> String {
        self.prose.iter().map(ToString::to_string).collect::<Vec<_>>().join("\n")
    }
}

struct CachedBlock {
    language: String,
    content: String,
    lines: Vec<Line<'static>>,
    highlighted: bool,
}

/// Rebuilds the [`Surface`] from scratch on every call.
///
/// Prose and code regions are fully replaced, never patched, so repeated
/// calls with the same text give the same surface. Highlighted lines of
/// closed blocks are reused from the previous pass.
pub struct Reconciler<P, H> {
    prose: P,
    highlighter: H,
    surface: Surface,
    closed_blocks: Vec<CachedBlock>,
}

impl<P: ProseRenderer, H: CodeHighlighter> Reconciler<P, H> {
    pub fn new(prose: P, highlighter: H) -> Self {
        Self { prose, highlighter, surface: Surface::default(), closed_blocks: Vec::new() }
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    /// Hand the current surface out and start the next reply from empty.
    pub fn take_surface(&mut self) -> Surface {
        self.closed_blocks.clear();
        std::mem::take(&mut self.surface)
    }

    /// Segment `revealed` and replace both regions.
    /// `ticking` controls the in-progress marker.
    pub fn reconcile(&mut self, revealed: &str, ticking: bool) -> &Surface {
        let mut previous = std::mem::take(&mut self.closed_blocks);
        let mut prose = Vec::new();
        let mut code_blocks = Vec::new();

        for seg in segment(revealed) {
            match seg {
                Segment::Prose(text) => prose.extend(self.prose.render(&text)),
                Segment::Code { language, content, open } => {
                    let block = if open {
                        self.render_open_block(language, content)
                    } else {
                        self.render_closed_block(language, content, &mut previous)
                    };
                    code_blocks.push(block);
                }
            }
        }

        if ticking {
            push_in_progress_marker(&mut prose);
        }

        self.surface = Surface { prose, code_blocks, notice: None, message_copy: None };
        &self.surface
    }

    fn render_closed_block(
        &mut self,
        language: String,
        content: String,
        previous: &mut Vec<CachedBlock>,
    ) -> CodeBlockView {
        let hit = previous
            .iter()
            .position(|cached| cached.language == language && cached.content == content)
            .map(|idx| previous.swap_remove(idx));

        let (lines, highlighted) = match hit {
            Some(cached) => (cached.lines, cached.highlighted),
            None => self.highlight_safe(&content, &language),
        };
        self.closed_blocks.push(CachedBlock {
            language: language.clone(),
            content: content.clone(),
            lines: lines.clone(),
            highlighted,
        });
        CodeBlockView { language, source: content, lines, open: false, highlighted, copy: None }
    }

    fn render_open_block(&self, language: String, content: String) -> CodeBlockView {
        let (lines, highlighted) = self.highlight_safe(&content, &language);
        CodeBlockView { language, source: content, lines, open: true, highlighted, copy: None }
    }

    fn highlight_safe(&self, content: &str, language: &str) -> (Vec<Line<'static>>, bool) {
        let attempt = AssertUnwindSafe(|| self.highlighter.highlight(content, language));
        match panic::catch_unwind(attempt) {
            Ok(Ok(lines)) => (lines, true),
            Ok(Err(err)) => {
                tracing::warn!(%language, error = %err, "highlighting failed, showing verbatim");
                (verbatim_lines(content), false)
            }
            Err(_) => {
                tracing::warn!(%language, "highlighter panic; showing verbatim code");
                (verbatim_lines(content), false)
            }
        }
    }
}

pub fn verbatim_lines(content: &str) -> Vec<Line<'static>> {
    content.lines().map(|line| Line::raw(line.to_owned())).collect()
}

fn is_marker(span: &Span<'_>) -> bool {
    span.content.as_ref() == IN_PROGRESS_MARKER
}

fn push_in_progress_marker(prose: &mut Vec<Line<'static>>) {
    let marker =
        Span::styled(IN_PROGRESS_MARKER, Style::default().add_modifier(Modifier::SLOW_BLINK));
    match prose.last_mut() {
        Some(line) if !line.spans.is_empty() => line.spans.push(marker),
        _ => prose.push(Line::from(marker)),
    }
}
