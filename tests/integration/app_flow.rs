//! The App: key and mouse handling against a started session, rendered on a
//! TestBackend.

use std::sync::Arc;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use super::common::fixtures::{advance, recording, sample_fixture, settle};
use super::common::terminal::{render_app, row_of};
use replay_devtools::markup::NodeId;
use replay_devtools::store::Modal;
use replay_devtools::ui::{Action, AppEvent};
use replay_devtools::{App, Config, DevtoolsSession, MemoryCommentStore, PlaybackConfig, ZoomRegion};

const WIDTH: u16 = 100;
const HEIGHT: u16 = 30;
/// First row of the timeline bar at 100x30
const TIMELINE_ROW: u16 = 27;

fn key(code: KeyCode) -> KeyEvent {
    KeyEvent::new(code, KeyModifiers::NONE)
}

fn char_key(c: char) -> KeyEvent {
    key(KeyCode::Char(c))
}

fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
    MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    }
}

fn new_app() -> (App, Arc<MemoryCommentStore>) {
    let session = DevtoolsSession::from_recording(recording(sample_fixture()), PlaybackConfig::default());
    let comments = Arc::new(MemoryCommentStore::new());
    (App::new(Config::default(), session, comments.clone()), comments)
}

/// Started app with the loading skeleton gone
async fn ready_app() -> (App, Arc<MemoryCommentStore>) {
    let (mut app, comments) = new_app();
    app.start().await.expect("start");
    settle().await;
    while app.is_loading() {
        advance(100).await;
        app.tick();
    }
    render_app(&mut app, WIDTH, HEIGHT);
    (app, comments)
}

fn selected(app: &App) -> Option<String> {
    app.session()
        .store()
        .read(|s| s.markup.selected_node_id().map(|id| id.as_str().to_string()))
}

#[tokio::test(start_paused = true)]
async fn test_loading_skeleton_until_ready() {
    let (mut app, _comments) = new_app();

    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Loading recording..."));
    assert!(!screen.contains("<html"));

    app.start().await.unwrap();
    app.tick();
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Ready"));

    // First bump fills the bar, then it stays up briefly
    advance(200).await;
    app.tick();
    assert!(app.is_loading());
    advance(300).await;
    assert!(!app.is_loading());
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("<html lang=\"en\">"));
}

#[tokio::test(start_paused = true)]
async fn test_ready_screen_shows_tree_timeline_and_footer() {
    let (mut app, _comments) = ready_app().await;

    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Elements"));
    assert!(screen.contains("▶ <head>"));
    assert!(screen.contains("▼ <body class=\"main\">"));
    assert!(screen.contains("<button id=\"go\">  event"));
    assert!(screen.contains("00:01.000 / 00:01.000"));
    assert!(screen.contains("Screen  h900"));
    assert!(screen.contains("play"));

    // The viewer reported its size back as the canvas
    let canvas = app.session().store().read(|s| s.app.canvas).expect("canvas");
    assert_eq!(canvas.width, 38.0);
}

#[tokio::test(start_paused = true)]
async fn test_keyboard_navigation_and_expansion() {
    let (mut app, _comments) = ready_app().await;

    app.handle_key_event(char_key('j'));
    assert_eq!(selected(&app).as_deref(), Some("html"));
    app.handle_key_event(key(KeyCode::Down));
    assert_eq!(selected(&app).as_deref(), Some("head"));

    app.handle_key_event(char_key('l'));
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("▼ <head>"));
    assert!(screen.contains("<title>"));

    // Expanded: `l` steps into the first child
    app.handle_key_event(char_key('l'));
    assert_eq!(selected(&app).as_deref(), Some("title"));

    // Leaf: `h` goes to the parent, then collapses it
    app.handle_key_event(char_key('h'));
    assert_eq!(selected(&app).as_deref(), Some("head"));
    app.handle_key_event(char_key('h'));
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("▶ <head>"));

    app.handle_key_event(char_key('k'));
    assert_eq!(selected(&app).as_deref(), Some("html"));
    app.handle_key_event(char_key('k'));
    assert_eq!(selected(&app).as_deref(), Some("html"));
}

#[tokio::test(start_paused = true)]
async fn test_mouse_expands_hovers_and_selects() {
    let (mut app, _comments) = ready_app().await;
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    let head_row = row_of(&screen, "<head>").unwrap();
    let button_row = row_of(&screen, "<button").unwrap();

    // Expander sits after the depth-1 indent, inside the panel border
    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 3, head_row));
    assert!(app
        .session()
        .store()
        .read(|s| s.markup.node(&NodeId::new("head")).unwrap().is_expanded));

    let screen = render_app(&mut app, WIDTH, HEIGHT);
    let button_row_now = row_of(&screen, "<button").unwrap();
    assert_eq!(button_row_now, button_row + 1);

    app.handle_mouse_event(mouse(MouseEventKind::Moved, 10, button_row_now));
    assert_eq!(
        app.session().store().read(|s| s.markup.hovered_node_id().cloned()),
        Some(NodeId::new("button"))
    );

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 10, button_row_now));
    assert_eq!(selected(&app).as_deref(), Some("button"));

    // Off the panel: hover is cleared
    app.handle_mouse_event(mouse(MouseEventKind::Moved, 80, 5));
    assert_eq!(app.session().store().read(|s| s.markup.hovered_node_id().cloned()), None);
}

#[tokio::test(start_paused = true)]
async fn test_event_badge_click_shows_listeners() {
    let (mut app, _comments) = ready_app().await;
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    let row = row_of(&screen, "<button").unwrap();
    let line = screen.lines().nth(row as usize).unwrap();
    let badge_col = line.find(" event ").unwrap() as u16 + 1;

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), badge_col, row));
    settle().await;

    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Event listeners"));
    assert!(screen.contains("click  onGo"));

    app.handle_key_event(key(KeyCode::Esc));
    assert!(app.session().store().read(|s| s.markup.event_tooltip().is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_event_listener_key_without_listeners_sets_status() {
    let (mut app, _comments) = ready_app().await;

    app.handle_key_event(char_key('j'));
    app.handle_key_event(char_key('e'));

    assert_eq!(app.status(), Some("No event listeners on this node"));
}

#[tokio::test(start_paused = true)]
async fn test_timeline_hover_and_click() {
    let (mut app, _comments) = ready_app().await;

    // Track starts after the 26-column label and spans 73 columns
    app.handle_mouse_event(mouse(MouseEventKind::Moved, 26 + 36, TIMELINE_ROW));
    assert_eq!(app.session().store().read(|s| s.timeline.hover_time), Some(500.0));
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("00:00.500"));

    app.handle_mouse_event(mouse(MouseEventKind::Moved, 26 + 36, TIMELINE_ROW - 3));
    assert_eq!(app.session().store().read(|s| s.timeline.hover_time), None);

    app.handle_mouse_event(mouse(MouseEventKind::Down(MouseButton::Left), 26 + 36, TIMELINE_ROW));
    settle().await;
    assert_eq!(app.session().store().read(|s| s.timeline.current_time), 500.0);
}

#[tokio::test(start_paused = true)]
async fn test_playback_keys() {
    let (mut app, _comments) = ready_app().await;

    app.handle_key_event(char_key(' '));
    assert!(app.session().store().read(|s| s.timeline.is_playing()));
    advance(200).await;

    app.handle_key_event(char_key(' '));
    settle().await;
    assert!(!app.session().store().read(|s| s.timeline.is_playing()));

    app.handle_key_event(char_key('.'));
    settle().await;
    assert_eq!(app.session().store().read(|s| s.timeline.current_time), 500.0);

    app.handle_key_event(char_key(','));
    settle().await;
    assert_eq!(app.session().store().read(|s| s.timeline.current_time), 100.0);
}

#[tokio::test(start_paused = true)]
async fn test_zoom_in_and_reset() {
    let (mut app, _comments) = ready_app().await;

    // Shifted '+' arrives with SHIFT set
    app.handle_key_event(KeyEvent::new(KeyCode::Char('+'), KeyModifiers::SHIFT));
    let zoom = app.session().store().read(|s| s.timeline.zoom_region);
    assert_eq!((zoom.start_time, zoom.end_time), (500.0, 1000.0));
    assert_eq!(zoom.scale, 2.0);

    app.handle_action(Action::ResetZoom);
    assert_eq!(
        app.session().store().read(|s| s.timeline.zoom_region),
        ZoomRegion::new(0.0, 1000.0)
    );
}

#[tokio::test(start_paused = true)]
async fn test_comment_typed_and_saved() {
    let (mut app, comments) = ready_app().await;

    app.handle_key_event(char_key('c'));
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Comment at 00:01.000"));

    // Inspector letters are plain text while editing
    for c in "qhx".chars() {
        app.handle_key_event(char_key(c));
    }
    app.handle_key_event(key(KeyCode::Backspace));
    assert_eq!(app.editor().buffer(), "qh");
    assert!(!app.should_quit());

    app.handle_key_event(key(KeyCode::Enter));
    settle().await;
    app.handle_pending_events();

    assert_eq!(app.status(), Some("Comment saved"));
    assert_eq!(app.editor().buffer(), "");
    assert!(app
        .session()
        .store()
        .read(|s| s.comments.pending_comment.is_none()));
    assert_eq!(comments.comments()[0].1.content, "qh");
}

#[tokio::test(start_paused = true)]
async fn test_failed_save_reported_in_footer() {
    let (mut app, _comments) = ready_app().await;
    app.handle_key_event(char_key('c'));
    app.handle_key_event(char_key('x'));

    app.handle_app_event(AppEvent::CommentSaved(Err("Comment service returned 503".into())));

    assert_eq!(
        app.status(),
        Some("Comment not saved: Comment service returned 503")
    );
    assert_eq!(app.editor().buffer(), "x");
}

#[tokio::test(start_paused = true)]
async fn test_escape_closes_innermost_first() {
    let (mut app, _comments) = ready_app().await;

    app.handle_key_event(char_key('c'));
    app.handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT));
    // '?' is text inside the editor
    assert_eq!(app.editor().buffer(), "?");

    app.handle_action(Action::ShowHelp);
    let screen = render_app(&mut app, WIDTH, HEIGHT);
    assert!(screen.contains("Keys"));
    assert!(screen.contains("Play/pause"));

    app.handle_key_event(key(KeyCode::Esc));
    assert_eq!(app.session().store().read(|s| s.app.modal), None);
    assert!(app.session().store().read(|s| s.comments.pending_comment.is_some()));

    app.handle_key_event(key(KeyCode::Esc));
    assert!(app.session().store().read(|s| s.comments.pending_comment.is_none()));
}

#[tokio::test(start_paused = true)]
async fn test_help_and_quit_keys() {
    let (mut app, _comments) = ready_app().await;

    app.handle_key_event(KeyEvent::new(KeyCode::Char('?'), KeyModifiers::SHIFT));
    assert_eq!(app.session().store().read(|s| s.app.modal), Some(Modal::Help));

    app.handle_key_event(char_key('q'));
    assert!(app.should_quit());
}
