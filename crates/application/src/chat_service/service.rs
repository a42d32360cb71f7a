use std::sync::Arc;

use nightschool_core::{AppError, AppResult, NonEmptyString};
use nightschool_domain::{CallerKey, RateLimitPolicy};
use tracing::{debug, warn};

use super::config::{COMPLETION_FALLBACK_REPLY, CompletionSettings};
use super::ports::{ChatRateLimitRepository, Clock, CompletionProvider, CompletionRequest};

/// Application service answering chat messages within a per-caller quota.
#[derive(Clone)]
pub struct ChatService {
    rate_limits: Arc<dyn ChatRateLimitRepository>,
    completions: Arc<dyn CompletionProvider>,
    clock: Arc<dyn Clock>,
    policy: RateLimitPolicy,
    settings: CompletionSettings,
}

impl ChatService {
    /// Creates a chat service with the default quota and generation settings.
    #[must_use]
    pub fn new(
        rate_limits: Arc<dyn ChatRateLimitRepository>,
        completions: Arc<dyn CompletionProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            rate_limits,
            completions,
            clock,
            policy: RateLimitPolicy::default(),
            settings: CompletionSettings::default(),
        }
    }

    /// Replaces the quota policy.
    #[must_use]
    pub fn with_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Replaces the generation settings.
    #[must_use]
    pub fn with_settings(mut self, settings: CompletionSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Returns the active quota policy.
    #[must_use]
    pub fn policy(&self) -> &RateLimitPolicy {
        &self.policy
    }

    /// Answers one message from the caller.
    ///
    /// Returns `Err(AppError::RateLimited)` without calling the completion API
    /// when the caller's window is exhausted. The incremented count is only
    /// persisted after a successful completion.
    pub async fn reply(&self, caller_key: &CallerKey, message: &NonEmptyString) -> AppResult<String> {
        let now = self.clock.now();
        let stored = self.rate_limits.find_record(caller_key).await?;
        let window = self.policy.evaluate(stored.as_ref(), now);

        if window.restarted() {
            debug!(caller = %caller_key, "rate limit window expired, starting a new one");
        }

        if window.is_exhausted(&self.policy) {
            warn!(
                caller = %caller_key,
                count = window.count(),
                limit = self.policy.max_messages(),
                "chat rate limit exceeded"
            );
            return Err(AppError::RateLimited(
                "too many messages, please try again later".to_owned(),
            ));
        }

        let completion = self
            .completions
            .complete(CompletionRequest {
                system_instruction: self.settings.system_instruction.clone(),
                user_message: message.as_str().to_owned(),
                max_tokens: self.settings.max_tokens,
                temperature: self.settings.temperature,
            })
            .await?;

        self.rate_limits
            .save_record(caller_key, window.incremented())
            .await?;

        Ok(completion
            .filter(|content| !content.is_empty())
            .unwrap_or_else(|| COMPLETION_FALLBACK_REPLY.to_owned()))
    }
}
