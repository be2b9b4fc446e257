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

use crate::app::{App, ChatMessage};
use crate::ui::{message, theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Paragraph, Wrap};

pub fn render(frame: &mut Frame, area: Rect, app: &mut App) {
    let lines = chat_lines(app);

    // Build paragraph once; line_count gives the real wrapped height
    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: false });
    let content_rows = u16::try_from(paragraph.line_count(area.width)).unwrap_or(u16::MAX);
    let offset = app.apply_layout(content_rows, area.height);
    frame.render_widget(paragraph.scroll((offset, 0)), area);
}

fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    if app.messages.is_empty() {
        lines.extend(welcome_lines(app));
        return lines;
    }

    for msg in &app.messages {
        match msg {
            ChatMessage::User(text) => message::render_user(text, &mut lines),
            ChatMessage::Streaming { session } => {
                if app.controller.session().is_some_and(|s| s.id() == *session) {
                    let surface = app.controller.surface();
                    message::render_reply(surface, Some(app.spinner_frame), &mut lines);
                }
            }
            ChatMessage::Assistant(reply) => {
                message::render_reply(&reply.surface, None, &mut lines);
            }
        }
    }
    lines
}

fn welcome_lines(app: &App) -> Vec<Line<'static>> {
    let pad = "  ";
    vec![
        Line::default(),
        Line::from(Span::styled(
            format!("{pad}stream-reply"),
            Style::default().fg(theme::RUST_ORANGE),
        )),
        Line::from(Span::styled(format!("{pad}category: {}", app.category), theme::dim())),
        Line::default(),
        Line::from(Span::styled(
            format!(
                "{pad}Enter to send, End/Ctrl+J jump to latest, Ctrl+Y copy reply, \
                 Alt+1..9 copy block, Ctrl+N new chat, Esc to quit"
            ),
            theme::dim(),
        )),
    ]
}
