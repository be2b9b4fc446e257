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

use ratatui::style::{Color, Modifier, Style};

// Accent
pub const RUST_ORANGE: Color = Color::Rgb(244, 118, 0);

// UI chrome
pub const DIM: Color = Color::DarkGray;
pub const PROMPT_CHAR: &str = "❯";
pub const SEPARATOR_CHAR: &str = "─";
pub const CODE_GUTTER: &str = "│ ";

// Role header colors
pub const ROLE_USER: Color = Color::White;
pub const ROLE_ASSISTANT: Color = RUST_ORANGE;

// User message background
pub const USER_MSG_BG: Color = Color::Rgb(40, 44, 52);

// Code blocks
pub const CODE_BADGE: Color = Color::Cyan;
pub const CODE_OPEN_BADGE: Color = Color::Yellow;
pub const CODE_FALLBACK: Color = Color::Gray;

// Status colors
pub const STATUS_STREAMING: Color = Color::Cyan;
pub const STATUS_ERROR: Color = Color::Red;
pub const STATUS_WARNING: Color = Color::Yellow;
pub const JUMP_HINT: Color = Color::LightBlue;

pub fn dim() -> Style {
    Style::default().fg(DIM)
}

pub fn badge(open: bool) -> Style {
    let color = if open { CODE_OPEN_BADGE } else { CODE_BADGE };
    Style::default().fg(color).add_modifier(Modifier::BOLD)
}
