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

/// Fence marker that opens and closes a code block.
pub const FENCE: &str = "```";

/// Language used when a fence carries no usable tag.
pub const DEFAULT_LANGUAGE: &str = "plaintext";

/// A classified, contiguous run of reply text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Prose(String),
    Code {
        language: String,
        content: String,
        /// True only for a trailing block whose closing fence has not arrived.
        open: bool,
    },
}

impl Segment {
    pub fn prose(text: impl Into<String>) -> Self {
        Self::Prose(text.into())
    }

    pub fn code(language: impl Into<String>, content: impl Into<String>, open: bool) -> Self {
        Self::Code { language: language.into(), content: content.into(), open }
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Code { open: true, .. })
    }

    #[must_use]
    pub fn is_code(&self) -> bool {
        matches!(self, Self::Code { .. })
    }

    /// Body text without fence lines.
    #[must_use]
    pub fn text(&self) -> &str {
        match self {
            Self::Prose(text) => text,
            Self::Code { content, .. } => content,
        }
    }
}

enum Pending {
    None,
    Prose(String),
    Code { language: String, content: String },
}

/// Split reply text into ordered prose and code segments.
///
/// Scans line by line with terminators kept. A line whose trimmed form starts
/// with a fence toggles code state; fence lines never reach segment bodies.
/// Text ending inside a fence yields a final segment with `open = true`.
/// Nested fences are not recognised: every fence line toggles.
pub fn segment(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut pending = Pending::None;

    for line in text.split_inclusive('\n') {
        if is_fence_line(line) {
            pending = match pending {
                Pending::Code { language, content } => {
                    out.push(Segment::Code { language, content, open: false });
                    Pending::None
                }
                Pending::Prose(prose) => {
                    out.push(Segment::Prose(prose));
                    Pending::Code { language: fence_language(line), content: String::new() }
                }
                Pending::None => {
                    Pending::Code { language: fence_language(line), content: String::new() }
                }
            };
            continue;
        }

        match &mut pending {
            Pending::Code { content, .. } => content.push_str(line),
            Pending::Prose(prose) => prose.push_str(line),
            Pending::None => pending = Pending::Prose(line.to_owned()),
        }
    }

    match pending {
        Pending::None => {}
        Pending::Prose(prose) => {
            if !prose.is_empty() {
                out.push(Segment::Prose(prose));
            }
        }
        Pending::Code { language, content } => {
            out.push(Segment::Code { language, content, open: true });
        }
    }

    out
}

/// Whether `text` currently ends inside an unterminated fence.
pub fn has_open_fence(text: &str) -> bool {
    text.split_inclusive('\n').filter(|line| is_fence_line(line)).count() % 2 == 1
}

fn is_fence_line(line: &str) -> bool {
    line.trim().starts_with(FENCE)
}

/// Language tag of an opening fence line, lower-cased.
/// Anything that is not a single tag token counts as a bare fence.
fn fence_language(line: &str) -> String {
    let rest = line.trim().trim_start_matches('`').trim();
    if !rest.is_empty() && rest.chars().all(is_language_char) {
        rest.to_lowercase()
    } else {
        DEFAULT_LANGUAGE.to_owned()
    }
}

fn is_language_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '+' | '#' | '.' | '_' | '-')
}
