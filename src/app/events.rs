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

use super::{App, AppEvent, AppStatus, ChatMessage};
use crate::stream::{Notice, RevealTick, StreamOutcome};
use crate::transport::TransportEvent;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseEventKind};
use futures::StreamExt;

const MOUSE_SCROLL_LINES: i32 = 3;

pub fn handle_terminal_event(app: &mut App, event: Event) {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(app, key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollUp => scroll_by(app, -MOUSE_SCROLL_LINES),
            MouseEventKind::ScrollDown => scroll_by(app, MOUSE_SCROLL_LINES),
            _ => {}
        },
        Event::Paste(text) => app.input.insert_str(&text),
        // Resize is handled automatically by ratatui
        _ => {}
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), m) if m.contains(KeyModifiers::CONTROL) => app.should_quit = true,
        (KeyCode::Esc, _) => app.should_quit = true,
        (KeyCode::Enter, _) => {
            if !app.input.is_empty() {
                let prompt = app.input.take();
                submit_prompt(app, prompt);
            }
        }
        // Scrolling
        (KeyCode::Up, _) => scroll_by(app, -1),
        (KeyCode::Down, _) => scroll_by(app, 1),
        (KeyCode::PageUp, _) => scroll_by(app, -page_rows(app)),
        (KeyCode::PageDown, _) => scroll_by(app, page_rows(app)),
        (KeyCode::End, _) => jump_to_latest(app),
        (KeyCode::Char('j'), m) if m.contains(KeyModifiers::CONTROL) => jump_to_latest(app),
        // Copy actions
        (KeyCode::Char('y'), m) if m.contains(KeyModifiers::CONTROL) => copy_last_reply(app),
        (KeyCode::Char(c @ '1'..='9'), m) if m.contains(KeyModifiers::ALT) => {
            let index = c as usize - '1' as usize;
            copy_code_block(app, index);
        }
        (KeyCode::Char('n'), m) if m.contains(KeyModifiers::CONTROL) => new_conversation(app),
        // Prompt editing
        (KeyCode::Left, _) => app.input.move_left(),
        (KeyCode::Right, _) => app.input.move_right(),
        (KeyCode::Home, _) => app.input.move_home(),
        (KeyCode::Backspace, _) => app.input.delete_char_before(),
        (KeyCode::Delete, _) => app.input.delete_char_after(),
        (KeyCode::Char(c), m) if !m.intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) => {
            app.input.insert_char(c);
        }
        _ => {}
    }
}

fn page_rows(app: &App) -> i32 {
    i32::from(app.viewport.body_rows.saturating_sub(1).max(1))
}

/// Send a prompt and start streaming its reply. An in-flight reply is
/// superseded: its stream is dropped and its partial text discarded.
pub fn submit_prompt(app: &mut App, prompt: String) {
    if app.is_streaming() {
        app.stop_stream_task();
        app.messages.retain(|msg| !matches!(msg, ChatMessage::Streaming { .. }));
    }

    let session = app.controller.begin(&app.scroll);
    let mut stream = app.source.open(&prompt, &app.category);
    app.messages.push(ChatMessage::User(prompt));
    app.messages.push(ChatMessage::Streaming { session });
    app.status = AppStatus::Streaming;
    app.flash = None;
    app.content_dirty = true;

    let tx = app.event_tx.clone();
    app.stream_task = Some(tokio::spawn(async move {
        while let Some(event) = stream.next().await {
            let terminal = event.is_terminal();
            if tx.send(AppEvent::Transport { session, event }).is_err() || terminal {
                break;
            }
        }
    }));
}

pub fn handle_app_event(app: &mut App, event: AppEvent) {
    match event {
        AppEvent::Transport { session, event } => handle_transport_event(app, session, event),
    }
}

fn handle_transport_event(app: &mut App, session: u64, event: TransportEvent) {
    if app.controller.session().map(crate::stream::StreamSession::id) != Some(session) {
        tracing::debug!(session, "dropping event for a superseded reply");
        return;
    }

    match event {
        TransportEvent::Started { message_id } => {
            tracing::debug!(session, ?message_id, "reply stream opened");
        }
        TransportEvent::Chunk(chunk) => {
            if app.controller.append_chunk(&chunk).is_some() {
                app.content_dirty = true;
            }
        }
        TransportEvent::Complete { final_content } => {
            finish_reply(app, StreamOutcome::Complete { final_content });
        }
        TransportEvent::Failed(message) => finish_reply(app, StreamOutcome::Failed(message)),
    }
}

fn finish_reply(app: &mut App, outcome: StreamOutcome) {
    let Some(reply) = app.controller.finalize(outcome, &mut app.scroll) else {
        return;
    };
    app.stream_task = None;
    app.status = if matches!(reply.surface.notice, Some(Notice::TransportError(_))) {
        AppStatus::Error
    } else {
        AppStatus::Ready
    };

    let session = reply.session;
    let slot = app
        .messages
        .iter_mut()
        .find(|msg| matches!(msg, ChatMessage::Streaming { session: s } if *s == session));
    match slot {
        Some(slot) => *slot = ChatMessage::Assistant(Box::new(reply)),
        None => app.messages.push(ChatMessage::Assistant(Box::new(reply))),
    }
    app.content_dirty = true;
}

pub fn handle_reveal_tick(app: &mut App, tick: RevealTick) {
    if app.controller.on_tick(tick) {
        app.content_dirty = true;
    }
}

/// Move the chat viewport by `delta` rows and let the scroll policy
/// classify the move.
pub fn scroll_by(app: &mut App, delta: i32) {
    let max = i32::from(app.viewport.max_offset());
    let next = (i32::from(app.viewport.offset) + delta).clamp(0, max);
    app.viewport.offset = u16::try_from(next).unwrap_or(0);
    app.scroll.on_scroll(app.viewport.to_pixels());
}

pub fn jump_to_latest(app: &mut App) {
    app.scroll.jump_to_latest();
    app.force_scroll = true;
}

fn copy_last_reply(app: &mut App) {
    let payload = app
        .last_reply()
        .and_then(|reply| reply.surface.message_copy.as_ref())
        .map(|copy| copy.payload.clone());
    app.flash = Some(match payload {
        Some(text) if app.clipboard.write_text(&text) => "Copied reply".to_owned(),
        Some(_) => "Copy failed".to_owned(),
        None => "Nothing to copy yet".to_owned(),
    });
}

fn copy_code_block(app: &mut App, index: usize) {
    let copy = app
        .last_reply()
        .and_then(|reply| reply.surface.code_blocks.get(index))
        .and_then(|block| block.copy.clone());
    app.flash = Some(match copy {
        Some(copy) if app.clipboard.write_text(&copy.payload) => {
            format!("Copied block {} ({})", index + 1, copy.label.trim_start_matches("copy "))
        }
        Some(_) => "Copy failed".to_owned(),
        None => format!("No code block {}", index + 1),
    });
}

/// Start over with an empty chat.
pub fn new_conversation(app: &mut App) {
    app.stop_stream_task();
    app.controller.abandon();
    app.messages.clear();
    app.scroll.reset();
    app.viewport.offset = 0;
    app.status = AppStatus::Ready;
    app.flash = None;
    app.content_dirty = true;
    tracing::info!("new conversation");
}
