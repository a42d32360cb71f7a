use std::env;

use nightschool_core::{AppError, AppResult};

const DEFAULT_CHAT_API_URL: &str = "http://localhost:3001/api/chat";

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_url: String,
    /// Bearer token of the signed-in user. `None` means signed out.
    pub auth_token: Option<String>,
}

impl ChatConfig {
    pub fn load() -> AppResult<Self> {
        let api_url = env::var("CHAT_API_URL")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_CHAT_API_URL.to_owned());

        if !api_url.starts_with("http://") && !api_url.starts_with("https://") {
            return Err(AppError::Validation(format!(
                "CHAT_API_URL must be an http(s) url, got '{api_url}'"
            )));
        }

        let auth_token = env::var("CHAT_AUTH_TOKEN")
            .ok()
            .map(|value| value.trim().to_owned())
            .filter(|value| !value.is_empty());

        Ok(Self {
            api_url,
            auth_token,
        })
    }
}
