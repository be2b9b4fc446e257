// =====
// TESTS: 11
// =====
//
// End-to-end streaming scenarios.
// Drives App through transport events and reveal ticks the way the
// event loop does, and checks the finalized reply and viewport.

use pretty_assertions::assert_eq;
use stream_reply::app::{AppStatus, ChatMessage, jump_to_latest, scroll_by, submit_prompt};
use stream_reply::stream::{Notice, ScrollIntent, Segment, segment};
use stream_reply::transport::{DEMO_REPLY, TransportEvent};

use crate::helpers::{
    HEIGHT, ScriptedSource, SilentSource, WIDTH, app_with, draw, feed, long_reply, replay_app,
    send_and_finish, tick_once, tick_until_caught_up,
};

// --- Segmentation of complete replies ---

#[tokio::test(start_paused = true)]
async fn chunks_split_across_fences_segment_like_the_whole_text() {
    let chunks = ["Hello ", "world\n```py\ndef", " f():\n", "    pass\n```\nDone"];
    let (mut app, _) = app_with(ScriptedSource::chunks(&chunks));
    send_and_finish(&mut app, "show me").await;

    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(reply.text, chunks.concat());
    assert_eq!(
        segment(&reply.text),
        vec![
            Segment::prose("Hello world\n"),
            Segment::code("py", "def f():\n    pass\n", false),
            Segment::prose("Done"),
        ]
    );
    assert_eq!(reply.anomaly, None);
    assert!(!reply.surface.has_in_progress_marker());
    assert_eq!(reply.surface.code_blocks.len(), 1);
    assert_eq!(reply.surface.code_blocks[0].source, "def f():\n    pass\n");
    assert!(!reply.surface.code_blocks[0].open);
    assert_eq!(app.status, AppStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn unterminated_fence_is_reported_not_closed() {
    let (mut app, _) = app_with(ScriptedSource::chunks(&["See:\n```js\n", "console.log(1)"]));
    send_and_finish(&mut app, "q").await;

    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(
        segment(&reply.text),
        vec![Segment::prose("See:\n"), Segment::code("js", "console.log(1)", true)]
    );
    let expected = Notice::UnterminatedFence { language: "js".to_owned() };
    assert_eq!(reply.anomaly, Some(expected.clone()));
    assert_eq!(reply.surface.notice, Some(expected));
    assert!(reply.surface.code_blocks[0].open);
    // Still copyable, and not an error state for the app.
    assert!(reply.surface.code_blocks[0].copy.is_some());
    assert_eq!(app.status, AppStatus::Ready);
}

#[tokio::test(start_paused = true)]
async fn demo_replay_streams_to_completion() {
    let mut app = replay_app(DEMO_REPLY);
    send_and_finish(&mut app, "demo").await;

    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(reply.text, DEMO_REPLY);
    let languages: Vec<_> =
        reply.surface.code_blocks.iter().map(|block| block.language.as_str()).collect();
    assert_eq!(languages, vec!["python", "rust"]);
    assert_eq!(reply.surface.message_copy.as_ref().map(|c| c.payload.as_str()), Some(DEMO_REPLY));
}

// --- Reveal pacing ---

#[tokio::test(start_paused = true)]
async fn burst_is_revealed_gradually() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("abcdefghijklmnopqrstuvwxyz".to_owned()));

    assert!(app.controller.is_ticking());
    tick_once(&mut app).await;
    let session = app.controller.session().expect("in flight");
    assert_eq!(session.revealed_len(), 3);
    assert!(app.controller.surface().has_in_progress_marker());

    tick_until_caught_up(&mut app).await;
    assert_eq!(app.controller.session().expect("in flight").revealed_len(), 26);
    assert!(!app.controller.surface().has_in_progress_marker());
}

#[tokio::test(start_paused = true)]
async fn completion_flushes_hidden_text() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("a long reply that has barely started".to_owned()));
    tick_once(&mut app).await;
    feed(&mut app, TransportEvent::Complete { final_content: None });

    assert!(!app.is_streaming());
    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(reply.surface.prose_text(), "a long reply that has barely started");
}

// --- Terminal outcomes ---

#[tokio::test(start_paused = true)]
async fn final_content_replaces_streamed_text() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("draft answer".to_owned()));
    feed(&mut app, TransportEvent::Complete { final_content: Some("Final answer".to_owned()) });

    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(reply.text, "Final answer");
    assert_eq!(reply.surface.prose_text(), "Final answer");
}

#[tokio::test(start_paused = true)]
async fn transport_failure_becomes_error_reply() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("partial".to_owned()));
    feed(&mut app, TransportEvent::Failed("connection reset".to_owned()));

    assert_eq!(app.status, AppStatus::Error);
    let reply = app.last_reply().expect("finalized reply");
    assert_eq!(reply.text, "Error: connection reset");
    assert_eq!(reply.surface.notice, Some(Notice::TransportError("connection reset".to_owned())));
    assert!(!app.controller.is_ticking());
}

#[tokio::test(start_paused = true)]
async fn new_prompt_supersedes_in_flight_reply() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "first".to_owned());
    feed(&mut app, TransportEvent::Chunk("partial first reply".to_owned()));
    submit_prompt(&mut app, "second".to_owned());
    feed(&mut app, TransportEvent::Chunk("second reply".to_owned()));
    feed(&mut app, TransportEvent::Complete { final_content: None });

    assert_eq!(
        app.messages.iter().filter(|m| matches!(m, ChatMessage::User(_))).count(),
        2
    );
    assert!(!app.messages.iter().any(|m| matches!(m, ChatMessage::Streaming { .. })));
    let replies: Vec<_> = app
        .messages
        .iter()
        .filter_map(|m| match m {
            ChatMessage::Assistant(reply) => Some(reply.text.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(replies, vec!["second reply".to_owned()]);
}

// --- Scroll intent across a stream ---

#[tokio::test(start_paused = true)]
async fn following_viewer_ends_pinned_to_bottom() {
    let (mut app, _) = app_with(SilentSource);
    draw(&mut app, WIDTH, HEIGHT);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk(long_reply(40)));
    tick_until_caught_up(&mut app).await;
    assert_eq!(app.viewport.offset, app.viewport.max_offset());

    feed(&mut app, TransportEvent::Complete { final_content: None });
    draw(&mut app, WIDTH, HEIGHT);
    assert!(app.viewport.max_offset() > 0);
    assert_eq!(app.viewport.offset, app.viewport.max_offset());
    assert_eq!(app.scroll.intent(), ScrollIntent::Following);
}

#[tokio::test(start_paused = true)]
async fn detached_viewer_offset_is_untouched_by_ticks() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "first".to_owned());
    feed(&mut app, TransportEvent::Chunk(long_reply(40)));
    feed(&mut app, TransportEvent::Complete { final_content: None });
    draw(&mut app, WIDTH, HEIGHT);

    scroll_by(&mut app, -12);
    assert_eq!(app.scroll.intent(), ScrollIntent::Detached);
    let parked = app.viewport.offset;

    // Detached at send time: the whole stream leaves the viewport alone.
    submit_prompt(&mut app, "second".to_owned());
    draw(&mut app, WIDTH, HEIGHT);
    feed(&mut app, TransportEvent::Chunk(long_reply(10)));
    while app.controller.is_ticking() {
        tick_once(&mut app).await;
        draw(&mut app, WIDTH, HEIGHT);
        assert_eq!(app.viewport.offset, parked);
    }
    feed(&mut app, TransportEvent::Complete { final_content: None });
    draw(&mut app, WIDTH, HEIGHT);
    assert_eq!(app.viewport.offset, parked);
    assert!(app.scroll.is_detached());

    jump_to_latest(&mut app);
    draw(&mut app, WIDTH, HEIGHT);
    assert_eq!(app.viewport.offset, app.viewport.max_offset());
    assert_eq!(app.scroll.intent(), ScrollIntent::Following);
}

#[tokio::test(start_paused = true)]
async fn detaching_mid_stream_freezes_viewport_until_finalize() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk(long_reply(80)));
    for _ in 0..150 {
        tick_once(&mut app).await;
        draw(&mut app, WIDTH, HEIGHT);
    }
    assert_eq!(app.viewport.offset, app.viewport.max_offset());

    scroll_by(&mut app, -12);
    assert!(app.scroll.is_detached());
    let parked = app.viewport.offset;
    for _ in 0..20 {
        tick_once(&mut app).await;
        draw(&mut app, WIDTH, HEIGHT);
    }
    assert_eq!(app.viewport.offset, parked);

    // The viewer was following when the message was sent.
    feed(&mut app, TransportEvent::Complete { final_content: None });
    draw(&mut app, WIDTH, HEIGHT);
    assert_eq!(app.scroll.intent(), ScrollIntent::Following);
    assert_eq!(app.viewport.offset, app.viewport.max_offset());
}
