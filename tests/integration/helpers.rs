use futures::StreamExt;
use futures::stream::{self, BoxStream};
use ratatui::Terminal;
use ratatui::backend::TestBackend;
use std::time::Duration;
use stream_reply::app::{
    App, AppEvent, MemoryClipboard, handle_app_event, handle_reveal_tick, submit_prompt,
};
use stream_reply::stream::{RevealConfig, ScrollThresholds};
use stream_reply::transport::{ReplaySource, ReplySource, TransportEvent};

/// Replays a fixed list of events as fast as they are polled.
pub struct ScriptedSource {
    events: Vec<TransportEvent>,
}

impl ScriptedSource {
    pub fn chunks(chunks: &[&str]) -> Self {
        let mut events = vec![TransportEvent::Started { message_id: None }];
        events.extend(chunks.iter().map(|c| TransportEvent::Chunk((*c).to_owned())));
        events.push(TransportEvent::Complete { final_content: None });
        Self { events }
    }
}

impl ReplySource for ScriptedSource {
    fn open(&self, _prompt: &str, _category: &str) -> BoxStream<'static, TransportEvent> {
        stream::iter(self.events.clone()).boxed()
    }
}

/// Never yields; tests push events by hand with [`feed`].
pub struct SilentSource;

impl ReplySource for SilentSource {
    fn open(&self, _prompt: &str, _category: &str) -> BoxStream<'static, TransportEvent> {
        stream::pending().boxed()
    }
}

/// Build an `App` over `source` with a memory clipboard.
/// No terminal, no network -- just state.
pub fn app_with(source: impl ReplySource + 'static) -> (App, MemoryClipboard) {
    let mut app = App::new(
        Box::new(source),
        "general",
        RevealConfig::default(),
        ScrollThresholds::default(),
    );
    let clipboard = MemoryClipboard::default();
    app.clipboard = Box::new(clipboard.clone());
    (app, clipboard)
}

pub fn replay_app(text: &str) -> App {
    app_with(ReplaySource::new(text).with_delay(Duration::ZERO)).0
}

/// Send `prompt` and drive transport events and reveal ticks until the
/// reply is finalized.
pub async fn send_and_finish(app: &mut App, prompt: &str) {
    submit_prompt(app, prompt.to_owned());
    pump_until_done(app).await;
}

pub async fn pump_until_done(app: &mut App) {
    while app.is_streaming() {
        tokio::select! {
            Some(event) = app.event_rx.recv() => handle_app_event(app, event),
            Some(tick) = app.tick_rx.recv() => handle_reveal_tick(app, tick),
        }
    }
}

/// Push one transport event for the in-flight reply.
pub fn feed(app: &mut App, event: TransportEvent) {
    let session = app.controller.session().expect("reply in flight").id();
    handle_app_event(app, AppEvent::Transport { session, event });
}

/// Apply a single reveal tick.
pub async fn tick_once(app: &mut App) {
    let tick = app.tick_rx.recv().await.expect("tick");
    handle_reveal_tick(app, tick);
}

/// Apply ticks until the revealed text has caught up, drawing a frame
/// after each one so the viewport sees every intermediate layout.
pub async fn tick_until_caught_up(app: &mut App) {
    while app.controller.is_ticking() {
        tick_once(app).await;
        draw(app, WIDTH, HEIGHT);
    }
}

pub const WIDTH: u16 = 80;
pub const HEIGHT: u16 = 24;

/// Draw one frame and return the screen as one string per row.
pub fn draw(app: &mut App, width: u16, height: u16) -> Vec<String> {
    let mut terminal = Terminal::new(TestBackend::new(width, height)).expect("test terminal");
    terminal.draw(|frame| stream_reply::ui::render(frame, app)).expect("draw");
    let buffer = terminal.backend().buffer();
    (0..buffer.area.height)
        .map(|y| (0..buffer.area.width).map(|x| buffer[(x, y)].symbol()).collect())
        .collect()
}

pub fn screen_contains(rows: &[String], needle: &str) -> bool {
    rows.iter().any(|row| row.contains(needle))
}

/// Prose line after line, enough to overflow the chat body several times.
pub fn long_reply(lines: usize) -> String {
    (0..lines).map(|i| format!("line {i}\n\n")).collect()
}
