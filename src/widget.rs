// ABOUTME: ChatWidget — the UI-independent core tying conversation, wizard, and gateway together.
// ABOUTME: Turns user actions into pending requests and folds replies back into visible state.

use crate::chat::{
    ChatReply, Completion, GatewayError, Language, Outbound, PendingRequest, RequestGateway,
};
use crate::session::{ConversationStore, Message};
use crate::wizard::{SelectionWizard, WizardStep};

/// Bot message appended whenever a chat call fails, whatever the cause.
pub const APOLOGY: &str = "Sorry, I couldn't reach the course assistant. Please try again.";

pub struct ChatWidget {
    conversation: ConversationStore,
    wizard: SelectionWizard,
    gateway: RequestGateway,
    language: Language,
    open: bool,
}

impl ChatWidget {
    /// A closed widget over an existing conversation.
    pub fn new(conversation: ConversationStore, gateway: RequestGateway, language: Language) -> Self {
        Self {
            conversation,
            wizard: SelectionWizard::new(),
            gateway,
            language,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_open(&mut self, open: bool) {
        self.open = open;
    }

    pub fn toggle_open(&mut self) {
        self.open = !self.open;
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Switch to the next supported language and return it.
    pub fn cycle_language(&mut self) -> Language {
        self.language = self.language.next();
        self.language
    }

    pub fn conversation(&self) -> &ConversationStore {
        &self.conversation
    }

    pub fn messages(&self) -> &[Message] {
        self.conversation.messages()
    }

    pub fn wizard(&self) -> &SelectionWizard {
        &self.wizard
    }

    pub fn gateway(&self) -> &RequestGateway {
        &self.gateway
    }

    pub fn is_generating(&self) -> bool {
        self.gateway.is_generating()
    }

    /// Whether free text would currently be accepted.
    pub fn accepts_text(&self) -> bool {
        self.open && !self.is_generating() && !self.wizard.is_active()
    }

    /// Record the user's message and claim the gateway for it.
    ///
    /// Returns `None`, changing nothing, for blank text, while closed, while a
    /// call is in flight, or while the wizard is waiting for a pick.
    pub fn submit_text(&mut self, text: &str) -> Option<PendingRequest> {
        if text.trim().is_empty() || !self.open || self.wizard.is_active() {
            return None;
        }
        let guard = match self.gateway.begin() {
            Ok(guard) => guard,
            Err(e) => {
                tracing::debug!(error = %e, "ignoring submit while a request is in flight");
                return None;
            }
        };

        self.conversation.append(Message::user(text));
        Some(PendingRequest {
            guard,
            outbound: Outbound::Text {
                text: text.to_string(),
                language: self.language,
            },
        })
    }

    /// Pick option `index` for the key on screen.
    ///
    /// Returns the feature submission once the last key is answered.
    pub fn choose_option(&mut self, index: usize) -> Option<PendingRequest> {
        let step = self.wizard.choose(index);
        self.finish_step(step)
    }

    /// Pick whichever option is highlighted.
    pub fn choose_highlighted(&mut self) -> Option<PendingRequest> {
        let step = self.wizard.choose_highlighted();
        self.finish_step(step)
    }

    pub fn move_highlight(&mut self, delta: isize) {
        self.wizard.move_highlight(delta);
    }

    fn finish_step(&mut self, step: WizardStep) -> Option<PendingRequest> {
        let WizardStep::Complete(selections) = step else {
            return None;
        };
        match self.gateway.begin() {
            Ok(guard) => Some(PendingRequest {
                guard,
                outbound: Outbound::Features(selections),
            }),
            Err(e) => {
                self.apply_reply(Err(e));
                None
            }
        }
    }

    /// Fold the outcome of a call into the conversation or the wizard.
    pub fn apply_reply(&mut self, result: Result<ChatReply, GatewayError>) {
        match result {
            Ok(ChatReply::Text(text)) => self.conversation.append(Message::bot(text)),
            Ok(ChatReply::FeatureSelection { prompt, menu }) => {
                if !self.wizard.activate(prompt.clone(), menu) {
                    self.conversation.append(Message::bot(prompt));
                }
            }
            Err(e) => {
                tracing::debug!(kind = e.kind(), "showing apology for failed request");
                self.conversation.append(Message::bot(APOLOGY));
            }
        }
    }

    /// Apply a finished call, then release its in-flight slot.
    pub fn apply_completion(&mut self, completion: Completion) {
        let Completion { result, guard } = completion;
        self.apply_reply(result);
        drop(guard);
    }

    /// Perform a pending call and apply its outcome.
    pub async fn send(&mut self, pending: PendingRequest) {
        let gateway = self.gateway.clone();
        let completion = gateway.dispatch(pending).await;
        self.apply_completion(completion);
    }
}
