//! Rate-limited chat completion ports and application service.
//!
//! Each caller key gets a fixed quota of messages per window. The quota is read
//! before the completion call and written back only after it succeeds, so a
//! rejected or failed request leaves the stored record untouched.

mod config;
mod ports;
mod service;


pub use config::{COMPLETION_FALLBACK_REPLY, CompletionSettings, DESIGN_EXPERT_INSTRUCTION};
pub use ports::{ChatRateLimitRepository, Clock, CompletionProvider, CompletionRequest};
pub use service::ChatService;
