//! OpenAI-compatible chat completion adapter.

use async_trait::async_trait;
use nightschool_application::{CompletionProvider, CompletionRequest};
use nightschool_core::{AppError, AppResult};
use nightschool_domain::ChatRole;
use serde::{Deserialize, Serialize};
use url::Url;

/// Settings for the completion API client.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    /// API root, e.g. `https://api.openai.com/v1`.
    pub base_url: String,
    /// Bearer credential.
    pub api_key: String,
    /// Model identifier sent with every request.
    pub model: String,
}

/// HTTP implementation of the completion provider port.
pub struct OpenAiCompletionProvider {
    http_client: reqwest::Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: Vec<ChatCompletionMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatCompletionMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatCompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionChoice {
    message: Option<ChatCompletionReply>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionReply {
    content: Option<String>,
}

impl OpenAiCompletionProvider {
    /// Creates the provider. Called once at startup; the instance is shared
    /// for the lifetime of the process.
    pub fn new(http_client: reqwest::Client, config: OpenAiConfig) -> AppResult<Self> {
        if config.api_key.trim().is_empty() {
            return Err(AppError::Validation(
                "completion api key must not be empty".to_owned(),
            ));
        }

        let endpoint = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint).map_err(|error| {
            AppError::Validation(format!(
                "invalid completion api base url '{}': {error}",
                config.base_url
            ))
        })?;

        Ok(Self {
            http_client,
            endpoint,
            api_key: config.api_key,
            model: config.model,
        })
    }

    fn body<'a>(&'a self, request: &'a CompletionRequest) -> ChatCompletionBody<'a> {
        ChatCompletionBody {
            model: self.model.as_str(),
            messages: vec![
                ChatCompletionMessage {
                    role: "system",
                    content: request.system_instruction.as_str(),
                },
                ChatCompletionMessage {
                    role: ChatRole::User.as_str(),
                    content: request.user_message.as_str(),
                },
            ],
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

fn first_choice_content(response: ChatCompletionResponse) -> Option<String> {
    response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message)
        .and_then(|message| message.content)
}

#[async_trait]
impl CompletionProvider for OpenAiCompletionProvider {
    async fn complete(&self, request: CompletionRequest) -> AppResult<Option<String>> {
        let response = self
            .http_client
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(&self.body(&request))
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("completion api transport error: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "completion api failed with status {status}: {body}"
            )));
        }

        let decoded = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to decode completion response: {error}"))
            })?;

        Ok(first_choice_content(decoded))
    }
}
