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

mod chat;
mod input;
mod layout;
mod message;
pub mod theme;

use crate::app::{App, AppStatus};
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub fn render(frame: &mut Frame, app: &mut App) {
    let areas = layout::compute(frame.area());

    // Body: chat (includes welcome text when no messages yet)
    chat::render(frame, areas.body, app);

    render_separator(frame, areas.input_sep);
    input::render(frame, areas.input, app);
    render_separator(frame, areas.input_bottom_sep);

    // Footer: status on the left, jump hint and copy feedback on the right.
    if let Some(footer_area) = areas.footer {
        render_footer(frame, footer_area, app);
    }
}

const FOOTER_PAD: u16 = 2;
const FOOTER_COLUMN_GAP: u16 = 1;
type FooterItem = Option<(String, Color)>;

pub const JUMP_HINT_TEXT: &str = "↓ new output below, End to jump to latest";

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let padded = Rect {
        x: area.x + FOOTER_PAD,
        y: area.y,
        width: area.width.saturating_sub(FOOTER_PAD * 2),
        height: area.height,
    };

    let line = status_line(app);
    match footer_right_items(app) {
        (Some((hint_text, hint_color)), Some((flash_text, flash_color))) => {
            let (left_area, mid_area, right_area) = split_footer_three_columns(padded);
            frame.render_widget(Paragraph::new(line), left_area);
            render_footer_right_info(frame, mid_area, &hint_text, hint_color);
            render_footer_right_info(frame, right_area, &flash_text, flash_color);
        }
        (Some((text, color)), None) | (None, Some((text, color))) => {
            let (left_area, right_area) = split_footer_columns(padded);
            frame.render_widget(Paragraph::new(line), left_area);
            render_footer_right_info(frame, right_area, &text, color);
        }
        (None, None) => {
            frame.render_widget(Paragraph::new(line), padded);
        }
    }
}

fn status_line(app: &App) -> Line<'static> {
    match app.status {
        AppStatus::Ready => Line::from(vec![
            Span::styled("Ready", Style::default().fg(theme::DIM)),
            Span::raw("  "),
            Span::styled("Ctrl+Y", Style::default().fg(Color::White)),
            Span::styled(" : copy reply", Style::default().fg(theme::DIM)),
        ]),
        AppStatus::Streaming => {
            let ch = message::SPINNER_FRAMES[app.spinner_frame % message::SPINNER_FRAMES.len()];
            Line::from(Span::styled(
                format!("{ch} Streaming..."),
                Style::default().fg(theme::STATUS_STREAMING),
            ))
        }
        AppStatus::Error => {
            Line::from(Span::styled("Error", Style::default().fg(theme::STATUS_ERROR)))
        }
    }
}

/// Returns `(jump_hint, flash)` -- either or both may be `None`.
fn footer_right_items(app: &App) -> (FooterItem, FooterItem) {
    let jump_hint = app.scroll.is_detached().then(|| (JUMP_HINT_TEXT.to_owned(), theme::JUMP_HINT));
    let flash = app.flash.as_ref().map(|text| (text.clone(), theme::RUST_ORANGE));
    (jump_hint, flash)
}

fn split_footer_columns(area: Rect) -> (Rect, Rect) {
    if area.width == 0 {
        return (area, Rect { width: 0, ..area });
    }

    let gap = if area.width > 2 { FOOTER_COLUMN_GAP } else { 0 };
    let usable_width = area.width.saturating_sub(gap);
    let left_width = usable_width.saturating_add(1) / 2;
    let right_width = usable_width.saturating_sub(left_width);

    let left = Rect { width: left_width, ..area };
    let right = Rect {
        x: area.x.saturating_add(left_width).saturating_add(gap),
        width: right_width,
        ..area
    };
    (left, right)
}

/// Three-column split: left (status) | mid (jump hint) | right (copy feedback).
fn split_footer_three_columns(area: Rect) -> (Rect, Rect, Rect) {
    if area.width == 0 {
        let zero = Rect { width: 0, ..area };
        return (area, zero, zero);
    }

    let gap = if area.width > 4 { FOOTER_COLUMN_GAP } else { 0 };
    let usable = area.width.saturating_sub(gap.saturating_mul(2));
    let left_width = usable.saturating_add(1) / 3;
    let right_part = usable.saturating_sub(left_width);
    let mid_width = right_part.saturating_add(1) / 2;
    let right_width = right_part.saturating_sub(mid_width);

    let left = Rect { width: left_width, ..area };
    let mid =
        Rect { x: area.x.saturating_add(left_width).saturating_add(gap), width: mid_width, ..area };
    let right = Rect {
        x: mid.x.saturating_add(mid_width).saturating_add(gap),
        width: right_width,
        ..area
    };
    (left, mid, right)
}

fn fit_footer_right_text(text: &str, max_width: usize) -> Option<String> {
    if max_width == 0 || text.trim().is_empty() {
        return None;
    }

    if UnicodeWidthStr::width(text) <= max_width {
        return Some(text.to_owned());
    }

    if max_width <= 3 {
        return Some(".".repeat(max_width));
    }

    let mut fitted = String::new();
    let mut width: usize = 0;
    for ch in text.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width.saturating_add(ch_width).saturating_add(3) > max_width {
            break;
        }
        fitted.push(ch);
        width = width.saturating_add(ch_width);
    }

    if fitted.is_empty() {
        return Some("...".to_owned());
    }
    fitted.push_str("...");
    Some(fitted)
}

fn render_footer_right_info(frame: &mut Frame, area: Rect, right_text: &str, right_color: Color) {
    if area.width == 0 {
        return;
    }
    let Some(fitted) = fit_footer_right_text(right_text, usize::from(area.width)) else {
        return;
    };

    let line = Line::from(Span::styled(fitted, Style::default().fg(right_color)));
    frame.render_widget(Paragraph::new(line).alignment(Alignment::Right), area);
}

fn render_separator(frame: &mut Frame, area: Rect) {
    if area.height == 0 {
        return;
    }
    let sep_str = theme::SEPARATOR_CHAR.repeat(area.width as usize);
    let line = Line::from(Span::styled(sep_str, Style::default().fg(theme::DIM)));
    frame.render_widget(Paragraph::new(line), area);
}
