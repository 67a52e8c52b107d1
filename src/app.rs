// ABOUTME: App orchestrator — wires together storage, session, gateway, chat loop, and TUI.
// ABOUTME: Sets up subsystems then runs the terminal event loop until the user quits.

use std::sync::Arc;
use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyEventKind};
use futures::StreamExt;
use ratatui::DefaultTerminal;
use tokio::sync::mpsc;

use crate::chat::{self, ChatTransport, Completion, GatewayError, HttpTransport, RequestGateway};
use crate::config::Config;
use crate::session::{ConversationStore, SessionManager};
use crate::storage::{FileStore, KeyValueStore};
use crate::tui::input::{InputResult, handle_key};
use crate::tui::state::{ChatEvent, TuiState, UserEvent};
use crate::tui::ui;
use crate::widget::ChatWidget;

/// How long to wait for the chat loop after quitting before abandoning it.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(2);

/// Top-level application that orchestrates all subsystems.
pub struct App {
    config: Config,
    fresh: bool,
}

/// Everything the event loop reacts to.
#[derive(Debug)]
pub enum Msg {
    Terminal(Event),
    Chat(ChatEvent),
    /// Periodic redraw so the session timer advances.
    Tick,
}

impl App {
    /// Create a new app with the given configuration.
    pub fn new(config: Config, fresh: bool) -> Self {
        Self { config, fresh }
    }

    /// Run the application: set up subsystems, launch the chat loop, and drive the TUI.
    pub async fn run(self) -> anyhow::Result<()> {
        let data_dir = self.config.data_dir();
        let store: Arc<dyn KeyValueStore> = Arc::new(FileStore::open(&data_dir)?);
        let session_id = SessionManager::load_or_create(store.as_ref())?;

        let transport = Arc::new(HttpTransport::new(
            &self.config.server.base_url,
            self.config.server.timeout(),
        )?);
        let server = transport.endpoint().to_string();
        let gateway = RequestGateway::new(transport, session_id.clone());

        let mut conversation = ConversationStore::new(
            Arc::clone(&store),
            session_id.clone(),
            &self.config.chat.welcome_message,
        );
        let restored = !self.fresh && conversation.restore();
        tracing::info!(
            session_id = %session_id,
            restored,
            server = %server,
            data_dir = %data_dir.display(),
            "starting coursebot"
        );

        let mut widget = ChatWidget::new(conversation, gateway.clone(), self.config.chat.language);
        widget.set_open(true);
        let mut state = TuiState::new(widget, server);
        state.notice = Some(if restored {
            format!("Resumed session {}", session_id.short())
        } else {
            format!("New session {}", session_id.short())
        });

        // Channels between the TUI and the chat loop.
        let (user_tx, user_rx) = mpsc::channel::<UserEvent>(16);
        let (chat_tx, mut chat_rx) = mpsc::channel::<ChatEvent>(16);
        let mut chat_handle = tokio::spawn(chat::run_chat_loop(gateway, user_rx, chat_tx));

        let mut terminal = ratatui::try_init()?;
        let result = event_loop(&mut terminal, &mut state, &user_tx, &mut chat_rx).await;
        ratatui::restore();

        // Signal the chat loop to quit; an unanswered request is abandoned.
        let _ = user_tx.send(UserEvent::Quit).await;
        drop(user_tx);
        if tokio::time::timeout(SHUTDOWN_GRACE, &mut chat_handle)
            .await
            .is_err()
        {
            tracing::warn!("chat loop did not stop in time; abandoning in-flight request");
            chat_handle.abort();
        }

        if result.is_ok() {
            print_exit_screen(&state);
        }
        result
    }
}

async fn event_loop(
    terminal: &mut DefaultTerminal,
    state: &mut TuiState,
    user_tx: &mpsc::Sender<UserEvent>,
    chat_rx: &mut mpsc::Receiver<ChatEvent>,
) -> anyhow::Result<()> {
    let mut events = EventStream::new();
    let mut tick = tokio::time::interval(Duration::from_secs(1));

    loop {
        terminal.draw(|frame| ui::render(frame, state))?;

        let msg = tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => Msg::Terminal(event),
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(event) = chat_rx.recv() => Msg::Chat(event),
            _ = tick.tick() => Msg::Tick,
        };

        match update(state, msg) {
            InputResult::None => {}
            InputResult::Quit => return Ok(()),
            InputResult::Send(pending) => {
                if let Err(mpsc::error::SendError(UserEvent::Send(pending))) =
                    user_tx.send(UserEvent::Send(pending)).await
                {
                    tracing::error!("chat loop has stopped; dropping request");
                    state.apply_chat_event(ChatEvent::Reply(Completion {
                        result: Err(GatewayError::Transport("chat loop stopped".to_string())),
                        guard: pending.guard,
                    }));
                }
            }
        }
    }
}

/// Apply one message to the TUI state, returning what the loop must do next.
pub fn update(state: &mut TuiState, msg: Msg) -> InputResult {
    match msg {
        Msg::Terminal(Event::Key(key)) if key.kind == KeyEventKind::Press => {
            handle_key(state, key)
        }
        Msg::Terminal(Event::Paste(text)) => {
            if state.widget.accepts_text() {
                for c in text.chars() {
                    state.insert_char_at_cursor(c);
                }
            }
            InputResult::None
        }
        Msg::Terminal(_) | Msg::Tick => InputResult::None,
        Msg::Chat(event) => {
            state.apply_chat_event(event);
            InputResult::None
        }
    }
}

/// Print a farewell screen after the TUI exits.
fn print_exit_screen(state: &TuiState) {
    let elapsed_secs = state.session_start.elapsed().as_secs();
    let elapsed = if elapsed_secs >= 3600 {
        format!("{}h {:02}m", elapsed_secs / 3600, (elapsed_secs % 3600) / 60)
    } else {
        format!("{}m {:02}s", elapsed_secs / 60, elapsed_secs % 60)
    };
    let msg_count = state.widget.messages().len();
    let session = state.widget.conversation().session_id();

    println!();
    println!("  \u{1f393} \x1b[1mThanks for using coursebot!\x1b[0m");
    println!();
    println!("  \u{1f550} Session lasted {elapsed} with {msg_count} messages in the conversation.");
    println!("  \u{1f516} Your session id is {session}; the conversation will be here next time.");
    println!();
}
