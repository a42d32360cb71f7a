use async_trait::async_trait;
use chrono::{DateTime, Utc};

use nightschool_core::AppResult;
use nightschool_domain::{CallerKey, RateLimitRecord};

/// Repository port for per-caller quota records.
#[async_trait]
pub trait ChatRateLimitRepository: Send + Sync {
    /// Returns the stored record for the caller, if one exists.
    async fn find_record(&self, caller_key: &CallerKey) -> AppResult<Option<RateLimitRecord>>;

    /// Overwrites the caller's record. The store assigns its own
    /// last-updated timestamp.
    async fn save_record(&self, caller_key: &CallerKey, record: RateLimitRecord) -> AppResult<()>;
}

/// Single completion call sent to the text-generation service.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// Instruction sent ahead of the user message.
    pub system_instruction: String,
    /// The user's message.
    pub user_message: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

/// Port for the hosted completion API.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Generates a reply. Returns `Ok(None)` when the service answered
    /// without any content.
    async fn complete(&self, request: CompletionRequest) -> AppResult<Option<String>>;
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
