//! Application services and ports.

#![forbid(unsafe_code)]

mod chat_service;

pub use chat_service::{
    COMPLETION_FALLBACK_REPLY, ChatRateLimitRepository, ChatService, Clock, CompletionProvider,
    CompletionRequest, CompletionSettings, DESIGN_EXPERT_INSTRUCTION,
};
