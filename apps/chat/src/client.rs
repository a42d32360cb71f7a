//! HTTP transport between the widget and the chat proxy.

use async_trait::async_trait;
use reqwest::header;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when a rejection carries no `error` field.
pub const SEND_FAILED_TEXT: &str = "Failed to send message";

/// Shown when the proxy could not be reached or answered garbage.
pub const TRANSPORT_FAILED_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// Failure modes of one chat round trip.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ChatClientError {
    /// The proxy answered with a non-success status.
    #[error("chat proxy rejected the message: {0}")]
    Rejected(String),
    /// The request did not complete or the reply could not be decoded.
    #[error("chat proxy unreachable: {0}")]
    Transport(String),
}

impl ChatClientError {
    /// Text appended to the transcript as the assistant's turn.
    pub fn transcript_text(&self) -> &str {
        match self {
            Self::Rejected(message) => message,
            Self::Transport(_) => TRANSPORT_FAILED_TEXT,
        }
    }
}

/// Sends one user message and returns the assistant reply.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send_message(&self, auth_token: &str, message: &str)
    -> Result<String, ChatClientError>;
}

#[derive(Debug, Serialize)]
struct ChatRequestBody<'a> {
    message: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatReplyBody {
    message: String,
}

#[derive(Debug, Default, Deserialize)]
struct ChatErrorBody {
    error: Option<String>,
}

pub struct HttpChatTransport {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpChatTransport {
    pub fn new(http_client: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http_client,
            endpoint: endpoint.into(),
        }
    }
}

#[async_trait]
impl ChatTransport for HttpChatTransport {
    async fn send_message(
        &self,
        auth_token: &str,
        message: &str,
    ) -> Result<String, ChatClientError> {
        let response = self
            .http_client
            .post(self.endpoint.as_str())
            .header(header::AUTHORIZATION, format!("Bearer {auth_token}"))
            .json(&ChatRequestBody { message })
            .send()
            .await
            .map_err(|error| ChatClientError::Transport(error.to_string()))?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|error| ChatClientError::Transport(error.to_string()))?;

        if !status.is_success() {
            return Err(rejection_from_body(&body));
        }

        serde_json::from_slice::<ChatReplyBody>(&body)
            .map(|reply| reply.message)
            .map_err(|error| {
                ChatClientError::Transport(format!("invalid chat reply body: {error}"))
            })
    }
}

fn rejection_from_body(body: &[u8]) -> ChatClientError {
    let error = serde_json::from_slice::<ChatErrorBody>(body)
        .unwrap_or_default()
        .error
        .filter(|error| !error.trim().is_empty());

    ChatClientError::Rejected(error.unwrap_or_else(|| SEND_FAILED_TEXT.to_owned()))
}

#[cfg(test)]
mod tests {
    use super::{
        ChatClientError, SEND_FAILED_TEXT, TRANSPORT_FAILED_TEXT, rejection_from_body,
    };

    #[test]
    fn rejection_uses_server_error_text() {
        let error = rejection_from_body(br#"{"error":"Rate limit exceeded. Please try again later."}"#);
        assert_eq!(
            error.transcript_text(),
            "Rate limit exceeded. Please try again later."
        );
    }

    #[test]
    fn rejection_without_error_field_uses_generic_text() {
        let bodies: [&[u8]; 3] = [br#"{}"#, b"<html>bad gateway</html>", br#"{"error":""}"#];
        for body in bodies {
            assert_eq!(rejection_from_body(body).transcript_text(), SEND_FAILED_TEXT);
        }
    }

    #[test]
    fn transport_failures_hide_details() {
        let error = ChatClientError::Transport("connection refused".to_owned());
        assert_eq!(error.transcript_text(), TRANSPORT_FAILED_TEXT);
    }
}
