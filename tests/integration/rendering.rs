// =====
// TESTS: 8
// =====
//
// Full-frame rendering through a test backend.

use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers};
use stream_reply::app::{handle_terminal_event, scroll_by, submit_prompt};
use stream_reply::stream::IN_PROGRESS_MARKER;
use stream_reply::transport::TransportEvent;

use crate::helpers::{
    HEIGHT, SilentSource, WIDTH, app_with, draw, feed, long_reply, screen_contains, tick_once,
    tick_until_caught_up,
};

#[tokio::test]
async fn empty_chat_shows_welcome_and_ready_footer() {
    let (mut app, _) = app_with(SilentSource);
    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, "stream-reply"));
    assert!(screen_contains(&screen, "category: general"));
    assert!(screen_contains(&screen, "Type a message..."));
    assert!(screen_contains(&screen, "Ready"));
}

#[tokio::test(start_paused = true)]
async fn partially_revealed_reply_shows_marker_and_spinner() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "hello".to_owned());
    feed(&mut app, TransportEvent::Chunk("Streaming prose arrives here".to_owned()));
    tick_once(&mut app).await;

    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, "You"));
    assert!(screen_contains(&screen, "Assistant"));
    assert!(screen_contains(&screen, &format!("Str{IN_PROGRESS_MARKER}")));
    assert!(screen_contains(&screen, "Streaming..."));
    assert!(!screen_contains(&screen, "arrives"));
}

#[tokio::test(start_paused = true)]
async fn open_code_block_is_badged_as_in_progress() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "code".to_owned());
    feed(&mut app, TransportEvent::Chunk("Intro\n```py\nx = 1\n".to_owned()));
    tick_until_caught_up(&mut app).await;

    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, " py … "));
    assert!(screen_contains(&screen, "│ x = 1"));
    assert!(!screen_contains(&screen, "[Alt+1: copy]"));
    assert!(!screen_contains(&screen, IN_PROGRESS_MARKER));
}

#[tokio::test(start_paused = true)]
async fn finalized_blocks_offer_copy_keys() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "code".to_owned());
    feed(&mut app, TransportEvent::Chunk("Intro\n```py\nx = 1\n```\n```sh\nls\n```\n".to_owned()));
    feed(&mut app, TransportEvent::Complete { final_content: None });

    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, "[Alt+1: copy]"));
    assert!(screen_contains(&screen, "[Alt+2: copy]"));
    assert!(!screen_contains(&screen, " py … "));
    assert!(screen_contains(&screen, "Ready"));
}

#[tokio::test(start_paused = true)]
async fn unterminated_fence_shows_warning() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("See:\n```js\nconsole.log(1)".to_owned()));
    feed(&mut app, TransportEvent::Complete { final_content: None });

    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, "⚠ Reply ended inside an unterminated `js` code block"));
}

#[tokio::test(start_paused = true)]
async fn transport_error_shows_in_reply_and_footer() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Failed("connection reset".to_owned()));

    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(screen_contains(&screen, "Error: connection reset"));
    assert!(screen_contains(&screen, "⚠ Stream failed: connection reset"));
    assert!(screen[usize::from(HEIGHT) - 1].contains("Error"));
}

#[tokio::test(start_paused = true)]
async fn detached_viewer_sees_jump_hint_and_copy_feedback() {
    let (mut app, clipboard) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk(long_reply(40)));
    feed(&mut app, TransportEvent::Complete { final_content: None });
    draw(&mut app, WIDTH, HEIGHT);

    scroll_by(&mut app, -12);
    handle_terminal_event(
        &mut app,
        Event::Key(KeyEvent::new(KeyCode::Char('y'), KeyModifiers::CONTROL)),
    );
    let screen = draw(&mut app, WIDTH, HEIGHT);
    let footer = &screen[usize::from(HEIGHT) - 1];
    assert!(footer.contains("↓ new output below"));
    assert!(footer.contains("Copied reply"));
    assert_eq!(clipboard.last(), Some(long_reply(40)));

    handle_terminal_event(&mut app, Event::Key(KeyEvent::new(KeyCode::End, KeyModifiers::NONE)));
    let screen = draw(&mut app, WIDTH, HEIGHT);
    assert!(!screen_contains(&screen, "↓ new output below"));
}

#[tokio::test(start_paused = true)]
async fn tiny_terminal_still_renders() {
    let (mut app, _) = app_with(SilentSource);
    submit_prompt(&mut app, "q".to_owned());
    feed(&mut app, TransportEvent::Chunk("```rust\nfn main() {}\n".to_owned()));
    tick_until_caught_up(&mut app).await;

    let screen = draw(&mut app, 20, 4);
    assert_eq!(screen.len(), 4);
    assert!(screen[3].contains('❯'));
}
