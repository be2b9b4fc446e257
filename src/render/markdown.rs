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

use crate::stream::ProseRenderer;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use std::panic::{self, AssertUnwindSafe};

/// Prose renderer backed by `tui-markdown`.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer {
    bg: Option<Color>,
}

impl MarkdownRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_background(mut self, bg: Color) -> Self {
        self.bg = Some(bg);
        self
    }
}

impl ProseRenderer for MarkdownRenderer {
    fn render(&self, prose: &str) -> Vec<Line<'static>> {
        render_markdown_safe(prose, self.bg)
    }
}

pub fn render_markdown_safe(text: &str, bg: Option<Color>) -> Vec<Line<'static>> {
    render_markdown_safe_with(text, bg, render_with_tui_markdown)
}

fn render_markdown_safe_with<F>(text: &str, bg: Option<Color>, renderer: F) -> Vec<Line<'static>>
where
    F: FnOnce(&str, Option<Color>) -> Vec<Line<'static>>,
{
    if let Ok(lines) = panic::catch_unwind(AssertUnwindSafe(|| renderer(text, bg))) {
        lines
    } else {
        tracing::warn!(len = text.len(), "markdown renderer panic; showing plain prose");
        plain_text_fallback(text, bg)
    }
}

fn render_with_tui_markdown(text: &str, bg: Option<Color>) -> Vec<Line<'static>> {
    // Prose segments keep their trailing newline; the renderer would turn it
    // into an empty row.
    let text = text.strip_suffix('\n').unwrap_or(text);
    tui_markdown::from_str(text)
        .lines
        .into_iter()
        .map(|line| {
            let spans: Vec<Span<'static>> = line
                .spans
                .into_iter()
                .map(|span| Span::styled(span.content.into_owned(), with_bg(span.style, bg)))
                .collect();
            Line::from(spans).style(with_bg(line.style, bg))
        })
        .collect()
}

fn with_bg(style: Style, bg: Option<Color>) -> Style {
    match bg {
        Some(color) => style.bg(color),
        None => style,
    }
}

fn plain_text_fallback(text: &str, bg: Option<Color>) -> Vec<Line<'static>> {
    let style = with_bg(Style::default(), bg);
    text.lines().map(|line| Line::from(Span::styled(line.to_owned(), style))).collect()
}
