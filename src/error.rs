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

/// Fatal errors that end the binary with a dedicated exit code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AppError {
    #[error("HTTP client for the stream URL could not be built")]
    HttpClientFailed,
    #[error("Replay file could not be read")]
    ReplayUnreadable,
    #[error("Terminal setup failed")]
    TerminalFailed,
}

impl AppError {
    pub const HTTP_CLIENT_FAILED_EXIT_CODE: i32 = 20;
    pub const REPLAY_UNREADABLE_EXIT_CODE: i32 = 21;
    pub const TERMINAL_FAILED_EXIT_CODE: i32 = 22;

    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::HttpClientFailed => Self::HTTP_CLIENT_FAILED_EXIT_CODE,
            Self::ReplayUnreadable => Self::REPLAY_UNREADABLE_EXIT_CODE,
            Self::TerminalFailed => Self::TERMINAL_FAILED_EXIT_CODE,
        }
    }

    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::HttpClientFailed => {
                "Could not set up the HTTP client for `--url`. Check the TLS setup, \
                 or use `--replay <FILE>` instead."
            }
            Self::ReplayUnreadable => {
                "The replay file could not be read. Check the path passed to `--replay`."
            }
            Self::TerminalFailed => "The terminal could not be put into raw mode.",
        }
    }
}

/// Failures while talking to a reply stream.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server answered with status {0}")]
    Status(u16),
    #[error("failed to read replay file: {0}")]
    Io(#[from] std::io::Error),
}

/// A single code block could not be highlighted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum HighlightError {
    #[error("highlighting engine failed: {0}")]
    Engine(String),
}

impl From<syntect::Error> for HighlightError {
    fn from(err: syntect::Error) -> Self {
        Self::Engine(err.to_string())
    }
}
