use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use nightschool_application::ChatRateLimitRepository;
use nightschool_core::AppResult;
use nightschool_domain::{CallerKey, RateLimitRecord};
use tokio::sync::RwLock;

#[derive(Debug, Clone, Copy)]
struct StoredRecord {
    record: RateLimitRecord,
    last_updated: DateTime<Utc>,
}

/// In-memory rate limit store for development and tests.
#[derive(Debug, Default)]
pub struct InMemoryChatRateLimitRepository {
    records: RwLock<HashMap<CallerKey, StoredRecord>>,
}

impl InMemoryChatRateLimitRepository {
    /// Creates an empty in-memory rate limit store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns when the caller's record was last written.
    pub async fn last_updated(&self, caller_key: &CallerKey) -> Option<DateTime<Utc>> {
        self.records
            .read()
            .await
            .get(caller_key)
            .map(|stored| stored.last_updated)
    }
}

#[async_trait]
impl ChatRateLimitRepository for InMemoryChatRateLimitRepository {
    async fn find_record(&self, caller_key: &CallerKey) -> AppResult<Option<RateLimitRecord>> {
        Ok(self
            .records
            .read()
            .await
            .get(caller_key)
            .map(|stored| stored.record))
    }

    async fn save_record(&self, caller_key: &CallerKey, record: RateLimitRecord) -> AppResult<()> {
        self.records.write().await.insert(
            caller_key.clone(),
            StoredRecord {
                record,
                last_updated: Utc::now(),
            },
        );

        Ok(())
    }
}
