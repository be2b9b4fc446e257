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

use crate::app::App;
use crate::ui::theme;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::UnicodeWidthStr;

/// Horizontal padding to match footer inset.
const INPUT_PAD: u16 = 2;

/// Prompt prefix width: "❯ " = 2 columns
const PROMPT_WIDTH: u16 = 2;

pub fn render(frame: &mut Frame, area: Rect, app: &App) {
    let padded = Rect {
        x: area.x.saturating_add(INPUT_PAD),
        y: area.y,
        width: area.width.saturating_sub(INPUT_PAD * 2),
        height: area.height,
    };
    let prompt =
        Span::styled(format!("{} ", theme::PROMPT_CHAR), Style::default().fg(theme::RUST_ORANGE));

    if app.input.text().is_empty() {
        let line = Line::from(vec![prompt, Span::styled("Type a message...", theme::dim())]);
        frame.render_widget(Paragraph::new(line), padded);
        frame.set_cursor_position((padded.x.saturating_add(PROMPT_WIDTH), padded.y));
        return;
    }

    let (hscroll, cursor_x) = horizontal_scroll(app.input.before_cursor(), padded.width);
    let line = Line::from(vec![prompt, Span::raw(app.input.text().to_owned())]);
    frame.render_widget(Paragraph::new(line).scroll((0, hscroll)), padded);
    let cursor = padded.x.saturating_add(PROMPT_WIDTH).saturating_add(cursor_x);
    frame.set_cursor_position((cursor, padded.y));
}

/// Scroll the line so the cursor stays visible.
/// Returns `(hscroll, cursor column after the prompt)`.
fn horizontal_scroll(before_cursor: &str, width: u16) -> (u16, u16) {
    let visible = width.saturating_sub(PROMPT_WIDTH + 1);
    let cursor_col = u16::try_from(before_cursor.width()).unwrap_or(u16::MAX);
    let hscroll = cursor_col.saturating_sub(visible);
    (hscroll, cursor_col - hscroll)
}
