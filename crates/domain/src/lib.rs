//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod chat;
mod rate_limit;

pub use chat::{CallerKey, ChatMessage, ChatRole, UNKNOWN_CALLER};
pub use rate_limit::{RateLimitPolicy, RateLimitRecord, RateLimitWindow};
