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

use crate::stream::{CodeBlockView, Notice, Surface};
use crate::ui::theme;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

pub const SPINNER_FRAMES: &[char] = &[
    '\u{280B}', '\u{2819}', '\u{2839}', '\u{2838}', '\u{283C}', '\u{2834}', '\u{2826}', '\u{2827}',
    '\u{2807}', '\u{280F}',
];

pub fn render_user(text: &str, out: &mut Vec<Line<'static>>) {
    out.push(Line::from(Span::styled(
        "You",
        Style::default().fg(theme::ROLE_USER).add_modifier(Modifier::BOLD),
    )));
    let style = Style::default().bg(theme::USER_MSG_BG);
    for line in text.lines() {
        out.push(Line::from(Span::styled(line.to_owned(), style)));
    }
    out.push(Line::default());
}

/// Render one reply surface: prose region first, then the code region.
/// `spinner` is set while the reply is still streaming.
pub fn render_reply(surface: &Surface, spinner: Option<usize>, out: &mut Vec<Line<'static>>) {
    let mut header = vec![Span::styled(
        "Assistant",
        Style::default().fg(theme::ROLE_ASSISTANT).add_modifier(Modifier::BOLD),
    )];
    if let Some(frame) = spinner {
        let ch = SPINNER_FRAMES[frame % SPINNER_FRAMES.len()];
        header.push(Span::styled(format!("  {ch}"), Style::default().fg(theme::STATUS_STREAMING)));
    }
    out.push(Line::from(header));

    out.extend(surface.prose.iter().cloned());

    for (index, block) in surface.code_blocks.iter().enumerate() {
        out.push(Line::default());
        render_code_block(index, block, out);
    }

    if let Some(notice) = &surface.notice {
        let color = match notice {
            Notice::UnterminatedFence { .. } => theme::STATUS_WARNING,
            Notice::TransportError(_) => theme::STATUS_ERROR,
        };
        out.push(Line::default());
        out.push(Line::from(Span::styled(
            format!("⚠ {}", notice.message()),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
    }
    out.push(Line::default());
}

fn render_code_block(index: usize, block: &CodeBlockView, out: &mut Vec<Line<'static>>) {
    let mut badge = vec![
        Span::styled(theme::SEPARATOR_CHAR.repeat(2), theme::dim()),
        Span::styled(format!(" {} ", block.language), theme::badge(block.open)),
    ];
    if block.open {
        badge.push(Span::styled("… ", theme::dim()));
    }
    if !block.highlighted {
        badge.push(Span::styled("(plain) ", theme::dim()));
    }
    if block.copy.is_some() && index < 9 {
        badge.push(Span::styled(format!("[Alt+{}: copy]", index + 1), theme::dim()));
    }
    out.push(Line::from(badge));

    let gutter_style = Style::default().fg(if block.highlighted {
        theme::DIM
    } else {
        theme::CODE_FALLBACK
    });
    for line in &block.lines {
        let mut spans = Vec::with_capacity(line.spans.len() + 1);
        spans.push(Span::styled(theme::CODE_GUTTER, gutter_style));
        spans.extend(line.spans.iter().cloned());
        out.push(Line::from(spans));
    }
}
