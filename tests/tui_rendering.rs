// ABOUTME: E2E tests for TUI rendering using ratatui's TestBackend.
// ABOUTME: Verifies the TUI renders chat messages, status bar, the launcher, and the selection panel.

use std::sync::Arc;

use ratatui::Terminal;
use ratatui::backend::TestBackend;

use coursebot::chat::testing::MockTransport;
use coursebot::chat::{ChatReply, Completion, Language, RequestGateway};
use coursebot::session::{ConversationStore, SessionId};
use coursebot::storage::MemoryStore;
use coursebot::tui::state::{ChatEvent, TuiState};
use coursebot::tui::ui;
use coursebot::widget::ChatWidget;

/// Extract a single row of text from the terminal buffer as a String.
fn row_text(terminal: &Terminal<TestBackend>, y: u16) -> String {
    let buf = terminal.backend().buffer();
    let width = buf.area.width;
    (0..width)
        .map(|x| {
            buf.cell((x, y))
                .map(|c| c.symbol().chars().next().unwrap_or(' '))
                .unwrap_or(' ')
        })
        .collect()
}

/// Extract all text from the terminal buffer as a single string (rows joined by newlines).
fn all_text(terminal: &Terminal<TestBackend>) -> String {
    let buf = terminal.backend().buffer();
    let height = buf.area.height;
    (0..height)
        .map(|y| row_text(terminal, y))
        .collect::<Vec<_>>()
        .join("\n")
}

fn make_state(welcome: &str) -> TuiState {
    let session_id = SessionId::new("abcdef12-3456-7890-abcd-ef1234567890");
    let conversation =
        ConversationStore::new(Arc::new(MemoryStore::new()), session_id.clone(), welcome);
    let gateway = RequestGateway::new(Arc::new(MockTransport::new()), session_id);
    let mut widget = ChatWidget::new(conversation, gateway, Language::En);
    widget.set_open(true);
    TuiState::new(widget, "http://localhost:8000/chat".to_string())
}

/// Feed a reply through the chat event path, as the chat loop would.
fn apply_reply(state: &mut TuiState, reply: ChatReply) {
    let guard = state.widget.gateway().begin().unwrap();
    state.apply_chat_event(ChatEvent::Reply(Completion {
        result: Ok(reply),
        guard,
    }));
}

fn draw(terminal: &mut Terminal<TestBackend>, state: &mut TuiState) {
    terminal
        .draw(|frame| ui::render(frame, state))
        .unwrap();
}

/// A fresh state renders the header and the seeded welcome message.
#[test]
fn renders_header_and_welcome() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = make_state("Hi! How can I help?");
    draw(&mut terminal, &mut state);

    let header = row_text(&terminal, 0);
    assert!(
        header.contains("coursebot"),
        "header should contain 'coursebot', got: {:?}",
        header,
    );
    let text = all_text(&terminal);
    assert!(text.contains("⏺"), "bot prefix missing:\n{}", text);
    assert!(text.contains("Hi! How can I help?"), "welcome missing:\n{}", text);
}

/// A submitted message shows up with the user prefix.
#[test]
fn renders_user_message() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = make_state("Welcome");
    state.input = "Hello assistant!".to_string();
    let _pending = state.submit_input().unwrap();
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("❯"), "user prefix missing:\n{}", text);
    assert!(text.contains("Hello assistant!"), "message missing:\n{}", text);
}

/// The status bar shows the short session id, language, server, and the
/// waiting indicator while a request is in flight.
#[test]
fn renders_status_bar() {
    let mut terminal = Terminal::new(TestBackend::new(100, 24)).unwrap();
    let mut state = make_state("Welcome");
    state.input = "hi".to_string();
    let _pending = state.submit_input().unwrap();
    draw(&mut terminal, &mut state);

    let status = row_text(&terminal, 23);
    assert!(status.contains("session abcdef12"), "got: {:?}", status);
    assert!(status.contains("English"), "got: {:?}", status);
    assert!(status.contains("localhost:8000/chat"), "got: {:?}", status);
    assert!(status.contains("waiting for reply"), "got: {:?}", status);

    let text = all_text(&terminal);
    assert!(
        text.contains("waiting for reply..."),
        "input title should show the waiting indicator:\n{}",
        text,
    );
}

/// A closed widget shows only the launcher.
#[test]
fn closed_widget_renders_launcher() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = make_state("Secret welcome");
    state.widget.set_open(false);
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("Ctrl+O"), "launcher hint missing:\n{}", text);
    assert!(!text.contains("Secret welcome"), "conversation should be hidden:\n{}", text);
}

/// A feature-selection reply renders the wizard panel with numbered options.
#[test]
fn renders_selection_panel() {
    let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
    let mut state = make_state("Welcome");
    apply_reply(
        &mut state,
        ChatReply::FeatureSelection {
            prompt: "Here are options".to_string(),
            menu: [("level", vec!["Undergraduate", "Postgraduate"])]
                .into_iter()
                .collect(),
        },
    );
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("Here are options"), "prompt missing:\n{}", text);
    assert!(text.contains("CHOOSE level"), "key missing:\n{}", text);
    assert!(text.contains("[1] Undergraduate"), "option missing:\n{}", text);
    assert!(text.contains("[2] Postgraduate"), "option missing:\n{}", text);
    assert!(text.contains("(pick an option above)"), "input hint missing:\n{}", text);
}

/// Wrapped chat lines should contribute to scroll bounds so long replies
/// don't appear clipped by the input area.
#[test]
fn scroll_clamp_accounts_for_wrapped_chat_height() {
    let mut terminal = Terminal::new(TestBackend::new(24, 10)).unwrap();
    let mut state = make_state(
        "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu nu xi omicron pi rho sigma tau upsilon phi chi psi omega",
    );
    state.scroll_offset = 100;
    draw(&mut terminal, &mut state);

    assert!(
        state.scroll_offset > 0 && state.scroll_offset < 100,
        "scroll offset should clamp to the wrapped content height, got {}",
        state.scroll_offset,
    );
}

/// A long prompt wraps and every option gets its own row in a narrow terminal.
#[test]
fn long_prompt_and_options_stay_visible_in_narrow_terminal() {
    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    let mut state = make_state("Welcome");
    apply_reply(
        &mut state,
        ChatReply::FeatureSelection {
            prompt: "To suggest the right programme I need a little more detail about your interest in pharmacy"
                .to_string(),
            menu: [(
                "area",
                vec![
                    "Clinical practice",
                    "Pharmaceutical research",
                    "Industry and regulation",
                    "Not sure yet, narrow it down",
                ],
            )]
            .into_iter()
            .collect(),
        },
    );
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("pharmacy"), "prompt tail missing:\n{}", text);
    assert!(text.contains("[1] Clinical practice"), "option missing:\n{}", text);
    assert!(text.contains("[4] Not sure yet, narrow it down"), "option missing:\n{}", text);
}

/// When the options outgrow the panel, the highlighted one is scrolled into view.
#[test]
fn highlighted_option_is_visible_when_panel_is_clipped() {
    let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
    let mut state = make_state("Welcome");
    let options: Vec<String> = (1..=12).map(|i| format!("Course option {i}")).collect();
    apply_reply(
        &mut state,
        ChatReply::FeatureSelection {
            prompt: "Pick one".to_string(),
            menu: [("course", options)].into_iter().collect(),
        },
    );
    state.widget.move_highlight(11);
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("Course option 12"), "highlighted option missing:\n{}", text);
    assert!(text.contains("Welcome"), "chat area should keep some rows:\n{}", text);
}

/// With scroll_offset at 0 the viewport stays pinned to the newest reply.
#[test]
fn new_reply_keeps_viewport_pinned_to_bottom() {
    let mut terminal = Terminal::new(TestBackend::new(24, 10)).unwrap();
    let mut state = make_state("line1\nline2\nline3\nline4");
    draw(&mut terminal, &mut state);

    apply_reply(
        &mut state,
        ChatReply::Text("line5\nline6\nline7\nline8".to_string()),
    );
    draw(&mut terminal, &mut state);

    let text = all_text(&terminal);
    assert!(text.contains("line8"), "newest content missing:\n{}", text);
    assert!(!text.contains("line1"), "oldest content should scroll away:\n{}", text);
}

/// Cursor should be clamped to the input viewport when the input text exceeds available width.
#[test]
fn cursor_is_clamped_inside_input_viewport_for_long_input() {
    let mut terminal = Terminal::new(TestBackend::new(12, 8)).unwrap();
    let mut state = make_state("Hi");
    state.input = "abcdefghijklmnopqrstuvwxyz".to_string();
    state.cursor_pos = state.input.chars().count();
    draw(&mut terminal, &mut state);

    let cursor = terminal.get_cursor_position().unwrap();
    assert!(
        cursor.x < 12,
        "cursor x should stay within terminal width, got {:?}",
        cursor,
    );
}
