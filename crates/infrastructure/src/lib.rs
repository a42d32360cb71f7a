//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod firestore_chat_rate_limit_repository;
mod in_memory_chat_rate_limit_repository;
mod openai_completion_provider;
mod redis_chat_rate_limit_repository;
mod system_clock;

pub use firestore_chat_rate_limit_repository::{
    FirestoreChatRateLimitRepository, FirestoreConfig, RATE_LIMIT_COLLECTION,
};
pub use in_memory_chat_rate_limit_repository::InMemoryChatRateLimitRepository;
pub use openai_completion_provider::{OpenAiCompletionProvider, OpenAiConfig};
pub use redis_chat_rate_limit_repository::RedisChatRateLimitRepository;
pub use system_clock::SystemClock;
