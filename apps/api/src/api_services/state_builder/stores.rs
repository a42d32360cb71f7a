use std::sync::Arc;

use nightschool_application::ChatRateLimitRepository;
use nightschool_core::{AppError, AppResult};
use nightschool_infrastructure::{
    FirestoreChatRateLimitRepository, InMemoryChatRateLimitRepository,
    RedisChatRateLimitRepository,
};
use tracing::info;

use crate::api_config::RateLimitStoreConfig;

pub(super) fn build_rate_limit_repository(
    store: &RateLimitStoreConfig,
    http_client: reqwest::Client,
) -> AppResult<Arc<dyn ChatRateLimitRepository>> {
    match store {
        RateLimitStoreConfig::InMemory => {
            info!(store = "in_memory", "chat rate limits are kept in process memory");
            Ok(Arc::new(InMemoryChatRateLimitRepository::new()))
        }
        RateLimitStoreConfig::Redis { redis_url } => {
            let client = redis::Client::open(redis_url.as_str())
                .map_err(|error| AppError::Validation(format!("invalid REDIS_URL: {error}")))?;
            info!(store = "redis", "chat rate limits are stored in redis");
            Ok(Arc::new(RedisChatRateLimitRepository::new(
                client,
                "nightschool:rate_limits",
            )))
        }
        RateLimitStoreConfig::Firestore(firestore) => {
            info!(
                store = "firestore",
                project = %firestore.project_id,
                "chat rate limits are stored in firestore"
            );
            Ok(Arc::new(FirestoreChatRateLimitRepository::new(
                http_client,
                firestore.clone(),
            )?))
        }
    }
}
