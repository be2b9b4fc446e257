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

use std::cell::RefCell;
use std::rc::Rc;

/// Sink for copy actions. Writes are fire-and-forget: failures are logged
/// and reported back only as a boolean for footer feedback.
pub trait Clipboard {
    fn write_text(&mut self, text: &str) -> bool;
}

/// System clipboard through `arboard`.
#[derive(Default)]
pub struct ArboardClipboard {
    inner: Option<arboard::Clipboard>,
}

impl ArboardClipboard {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Clipboard for ArboardClipboard {
    fn write_text(&mut self, text: &str) -> bool {
        if self.inner.is_none() {
            match arboard::Clipboard::new() {
                Ok(clipboard) => self.inner = Some(clipboard),
                Err(err) => {
                    tracing::warn!(error = %err, "clipboard unavailable");
                    return false;
                }
            }
        }
        let Some(clipboard) = self.inner.as_mut() else {
            return false;
        };
        match clipboard.set_text(text.to_owned()) {
            Ok(()) => {
                tracing::debug!(len = text.len(), "copied to clipboard");
                true
            }
            Err(err) => {
                tracing::warn!(error = %err, "clipboard write failed");
                self.inner = None;
                false
            }
        }
    }
}

/// In-memory clipboard for headless runs and tests. Clones share storage.
#[derive(Debug, Default, Clone)]
pub struct MemoryClipboard {
    writes: Rc<RefCell<Vec<String>>>,
}

impl MemoryClipboard {
    pub fn writes(&self) -> Vec<String> {
        self.writes.borrow().clone()
    }

    pub fn last(&self) -> Option<String> {
        self.writes.borrow().last().cloned()
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&mut self, text: &str) -> bool {
        self.writes.borrow_mut().push(text.to_owned());
        true
    }
}
