// ABOUTME: Chat loop — background task that performs gateway calls for the TUI.
// ABOUTME: Receives pending requests over one channel and reports replies over another.

use tokio::sync::mpsc;

use crate::chat::gateway::RequestGateway;
use crate::tui::state::{ChatEvent, UserEvent};

/// Run until the user quits or either channel closes.
///
/// Requests are handled one at a time. Each reply is reported together with
/// its in-flight guard, so the gateway stays busy until the TUI applies it.
pub async fn run_chat_loop(
    gateway: RequestGateway,
    mut user_rx: mpsc::Receiver<UserEvent>,
    chat_tx: mpsc::Sender<ChatEvent>,
) {
    loop {
        let event = match user_rx.recv().await {
            Some(e) => e,
            None => break, // Channel closed.
        };

        match event {
            UserEvent::Quit => break,
            UserEvent::Send(pending) => {
                let completion = gateway.dispatch(pending).await;
                if chat_tx.send(ChatEvent::Reply(completion)).await.is_err() {
                    tracing::debug!("TUI gone, stopping chat loop");
                    break;
                }
            }
        }
    }
}
