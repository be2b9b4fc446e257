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

pub mod clipboard;
mod events;
mod input;
mod state;

pub use clipboard::{ArboardClipboard, Clipboard, MemoryClipboard};
pub use events::{
    handle_app_event, handle_reveal_tick, handle_terminal_event, jump_to_latest,
    new_conversation, scroll_by, submit_prompt,
};
pub use input::InputState;
pub use state::{App, AppEvent, AppStatus, ChatMessage, ChatViewport, ROW_HEIGHT_PX};

use crate::Cli;
use crate::error::AppError;
use crate::transport::{HttpSource, ReplaySource, ReplySource};
use anyhow::Context as _;
use crossterm::event::EventStream;
use futures::{FutureExt as _, StreamExt};
use std::time::{Duration, Instant};

/// Build the app from command-line options.
pub fn create_app(cli: &Cli) -> anyhow::Result<App> {
    let source: Box<dyn ReplySource> = if let Some(url) = cli.url.as_deref() {
        Box::new(HttpSource::new(url).map_err(|err| {
            tracing::error!(error = %err, "failed to build HTTP client");
            AppError::HttpClientFailed
        })?)
    } else {
        let replay = match cli.replay.as_deref() {
            Some(path) => ReplaySource::from_file(path)
                .map_err(|err| {
                    tracing::error!(
                        path = %path.display(),
                        error = %err,
                        "failed to read replay file"
                    );
                    AppError::ReplayUnreadable
                })
                .with_context(|| format!("loading {}", path.display()))?,
            None => ReplaySource::demo(),
        };
        Box::new(
            replay
                .with_chunk_size(cli.chunk_size)
                .with_delay(Duration::from_millis(cli.chunk_delay_ms)),
        )
    };

    Ok(App::new(source, cli.category.clone(), cli.reveal_config(), cli.scroll_thresholds()))
}

// ---------------------------------------------------------------------------
// TUI event loop
// ---------------------------------------------------------------------------

pub async fn run_tui(app: &mut App) -> anyhow::Result<()> {
    let mut terminal = ratatui::try_init().map_err(|err| {
        tracing::error!(error = %err, "terminal init failed");
        AppError::TerminalFailed
    })?;

    // Mouse capture for wheel scrolling (ignore error on unsupported terminals)
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::EnableBracketedPaste,
        crossterm::event::EnableMouseCapture,
    );

    let mut events = EventStream::new();
    let frame_duration = Duration::from_millis(16);
    let mut last_render = Instant::now();
    let result = loop {
        // Phase 1: wait for at least one event or the next frame
        let time_to_next = frame_duration.saturating_sub(last_render.elapsed());
        tokio::select! {
            Some(Ok(event)) = events.next() => {
                events::handle_terminal_event(app, event);
            }
            Some(event) = app.event_rx.recv() => {
                events::handle_app_event(app, event);
            }
            Some(tick) = app.tick_rx.recv() => {
                events::handle_reveal_tick(app, tick);
            }
            () = tokio::time::sleep(time_to_next) => {}
        }

        // Phase 2: drain everything already queued, terminal input first
        loop {
            if let Some(Some(Ok(event))) = events.next().now_or_never() {
                events::handle_terminal_event(app, event);
                continue;
            }
            if let Ok(event) = app.event_rx.try_recv() {
                events::handle_app_event(app, event);
                continue;
            }
            match app.tick_rx.try_recv() {
                Ok(tick) => events::handle_reveal_tick(app, tick),
                Err(_) => break,
            }
        }

        if app.should_quit {
            break Ok(());
        }

        // Phase 3: render once
        if app.is_streaming() {
            app.spinner_frame = app.spinner_frame.wrapping_add(1);
        }
        if let Err(err) = terminal.draw(|f| crate::ui::render(f, app)) {
            break Err(err.into());
        }
        last_render = Instant::now();
    };

    app.controller.abandon();
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableBracketedPaste,
        crossterm::event::DisableMouseCapture,
    );
    ratatui::restore();

    result
}
