//! Chat widget state machine.
//!
//! The panel is either closed or open, and the compose box is either idle or
//! waiting on one outstanding request. Submitting while a request is in
//! flight, or with blank input, does nothing.

use nightschool_domain::{ChatMessage, ChatRole};
use tracing::warn;

use crate::client::ChatClientError;

pub const HEADER_TITLE: &str = "Design Expert";
pub const HEADER_SUBTITLE: &str = "Ask about minimalist design";
pub const INPUT_PLACEHOLDER: &str = "Ask a question...";
pub const THINKING_TEXT: &str = "Thinking...";
pub const WELCOME_LINES: [&str; 2] = [
    "Welcome! I'm your minimalist design expert.",
    "Ask me anything about minimalism, Donald Judd, Dan Flavin, Agnes Martin, Sol LeWitt, or contemporary design trends.",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelState {
    Closed,
    Open,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeState {
    Idle,
    Sending,
}

/// A message accepted for delivery, with the credential to send it under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMessage {
    pub auth_token: String,
    pub message: String,
}

#[derive(Debug)]
pub struct ChatWidget {
    auth_token: Option<String>,
    panel: PanelState,
    compose: ComposeState,
    input: String,
    transcript: Vec<ChatMessage>,
}

impl ChatWidget {
    pub fn new(auth_token: Option<String>) -> Self {
        Self {
            auth_token,
            panel: PanelState::Closed,
            compose: ComposeState::Idle,
            input: String::new(),
            transcript: Vec::new(),
        }
    }

    /// The widget is inert for signed-out users.
    pub fn is_visible(&self) -> bool {
        self.auth_token.is_some()
    }

    pub fn panel(&self) -> PanelState {
        self.panel
    }

    pub fn compose(&self) -> ComposeState {
        self.compose
    }

    pub fn transcript(&self) -> &[ChatMessage] {
        &self.transcript
    }

    pub fn open(&mut self) {
        if self.is_visible() {
            self.panel = PanelState::Open;
        }
    }

    pub fn close(&mut self) {
        self.panel = PanelState::Closed;
    }

    pub fn set_input(&mut self, input: impl Into<String>) {
        if self.compose == ComposeState::Idle {
            self.input = input.into();
        }
    }

    /// Moves to `Sending` and returns the message to deliver.
    ///
    /// Returns `None` without touching state when signed out, closed, already
    /// sending, or when the input is blank.
    pub fn begin_submit(&mut self) -> Option<OutgoingMessage> {
        let auth_token = self.auth_token.clone()?;
        if self.panel != PanelState::Open || self.compose == ComposeState::Sending {
            return None;
        }

        let message = self.input.trim().to_owned();
        if message.is_empty() {
            return None;
        }

        self.input.clear();
        self.transcript.push(ChatMessage::user(message.as_str()));
        self.compose = ComposeState::Sending;

        Some(OutgoingMessage {
            auth_token,
            message,
        })
    }

    /// Appends the reply, or the error text, and returns to `Idle`.
    pub fn finish(&mut self, result: Result<String, ChatClientError>) {
        let content = match result {
            Ok(reply) => reply,
            Err(error) => {
                warn!(%error, "chat message failed");
                error.transcript_text().to_owned()
            }
        };

        self.transcript.push(ChatMessage::assistant(content));
        self.compose = ComposeState::Idle;
    }

    /// Text rendering of the widget, or `None` when nothing is shown.
    pub fn render(&self) -> Option<String> {
        if !self.is_visible() {
            return None;
        }

        if self.panel == PanelState::Closed {
            return Some("[chat] type /open to ask the design expert".to_owned());
        }

        let mut output = format!("== {HEADER_TITLE} ==\n{HEADER_SUBTITLE}\n\n");

        if self.transcript().is_empty() {
            for line in WELCOME_LINES {
                output.push_str(line);
                output.push('\n');
            }
        }

        for message in self.transcript() {
            let speaker = match message.role() {
                ChatRole::User => "you",
                ChatRole::Assistant => "expert",
            };
            output.push_str(&format!("{speaker}> {}\n", message.content()));
        }

        if self.compose() == ComposeState::Sending {
            output.push_str(THINKING_TEXT);
            output.push('\n');
        }

        Some(output)
    }
}
