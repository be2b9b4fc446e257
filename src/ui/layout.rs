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

use ratatui::layout::{Constraint, Layout, Rect};

pub struct AppLayout {
    pub body: Rect,
    pub input_sep: Rect,
    pub input: Rect,
    pub input_bottom_sep: Rect,
    pub footer: Option<Rect>,
}

pub fn compute(area: Rect) -> AppLayout {
    if area.height < 6 {
        // Ultra-compact: no separators, no footer
        let [body, input] =
            Layout::vertical([Constraint::Min(1), Constraint::Length(1)]).areas(area);
        let zero_at = |y| Rect::new(area.x, y, area.width, 0);
        AppLayout {
            body,
            input_sep: zero_at(input.y),
            input,
            input_bottom_sep: zero_at(input.bottom()),
            footer: None,
        }
    } else {
        let [body, input_sep, input, input_bottom_sep, footer] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(area);
        AppLayout { body, input_sep, input, input_bottom_sep, footer: Some(footer) }
    }
}
