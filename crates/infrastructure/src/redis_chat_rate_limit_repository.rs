//! Redis-backed chat rate limit repository.
//!
//! Each caller key maps to one hash holding `count`, `windowStart` and
//! `lastUpdated`, with timestamps stored as epoch milliseconds.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use nightschool_application::ChatRateLimitRepository;
use nightschool_core::{AppError, AppResult};
use nightschool_domain::{CallerKey, RateLimitRecord};
use redis::{AsyncCommands, Script};

const SAVE_RECORD_SCRIPT: &str = r#"
local key = KEYS[1]
local server_time = redis.call('TIME')
local now_ms = tonumber(server_time[1]) * 1000 + math.floor(tonumber(server_time[2]) / 1000)

redis.call('DEL', key)
redis.call('HSET', key, 'count', ARGV[1], 'windowStart', ARGV[2], 'lastUpdated', now_ms)
return now_ms
"#;

/// Redis implementation of the chat rate limit repository port.
#[derive(Clone)]
pub struct RedisChatRateLimitRepository {
    client: redis::Client,
    key_prefix: String,
}

impl RedisChatRateLimitRepository {
    /// Creates a repository with a configured Redis client and key prefix.
    #[must_use]
    pub fn new(client: redis::Client, key_prefix: impl Into<String>) -> Self {
        Self {
            client,
            key_prefix: key_prefix.into(),
        }
    }

    fn key_for(&self, caller_key: &CallerKey) -> String {
        format!("{}:{caller_key}", self.key_prefix)
    }

    async fn connection(&self) -> AppResult<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|error| AppError::Internal(format!("failed to connect to redis: {error}")))
    }
}

fn decode_record(fields: &HashMap<String, String>) -> AppResult<Option<RateLimitRecord>> {
    if fields.is_empty() {
        return Ok(None);
    }

    let count = match fields.get("count") {
        Some(value) => value.parse::<u32>().map_err(|error| {
            AppError::Internal(format!("invalid redis rate limit count '{value}': {error}"))
        })?,
        None => 0,
    };

    let window_start = fields
        .get("windowStart")
        .map(|value| {
            value.parse::<i64>().map_err(|error| {
                AppError::Internal(format!(
                    "invalid redis rate limit window start '{value}': {error}"
                ))
            })
        })
        .transpose()?
        .map(|millis| {
            Utc.timestamp_millis_opt(millis).single().ok_or_else(|| {
                AppError::Internal(format!(
                    "redis rate limit window start out of range: {millis}"
                ))
            })
        })
        .transpose()?;

    // Missing window start counts as a window opened now.
    Ok(Some(RateLimitRecord::new(
        count,
        window_start.unwrap_or_else(Utc::now),
    )))
}

fn encode_window_start(window_start: DateTime<Utc>) -> i64 {
    window_start.timestamp_millis()
}

#[async_trait]
impl ChatRateLimitRepository for RedisChatRateLimitRepository {
    async fn find_record(&self, caller_key: &CallerKey) -> AppResult<Option<RateLimitRecord>> {
        let mut connection = self.connection().await?;

        let fields: HashMap<String, String> = connection
            .hgetall(self.key_for(caller_key))
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read redis rate limit record: {error}"))
            })?;

        decode_record(&fields)
    }

    async fn save_record(&self, caller_key: &CallerKey, record: RateLimitRecord) -> AppResult<()> {
        let mut connection = self.connection().await?;

        let _last_updated: i64 = Script::new(SAVE_RECORD_SCRIPT)
            .key(self.key_for(caller_key))
            .arg(record.count)
            .arg(encode_window_start(record.window_start))
            .invoke_async(&mut connection)
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write redis rate limit record: {error}"))
            })?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use chrono::{TimeZone, Utc};
    use nightschool_domain::RateLimitRecord;

    use super::decode_record;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    #[test]
    fn empty_hash_means_no_record() {
        assert!(matches!(decode_record(&HashMap::new()), Ok(None)));
    }

    #[test]
    fn decodes_count_and_window_start() {
        let window_start = Utc
            .timestamp_millis_opt(1_718_000_000_000)
            .single()
            .unwrap_or_default();
        let decoded = decode_record(&fields(&[
            ("count", "7"),
            ("windowStart", "1718000000000"),
            ("lastUpdated", "1718000005000"),
        ]));

        assert_eq!(
            decoded.ok().flatten(),
            Some(RateLimitRecord::new(7, window_start))
        );
    }

    #[test]
    fn rejects_corrupt_count() {
        let decoded = decode_record(&fields(&[("count", "many"), ("windowStart", "0")]));
        assert!(decoded.is_err());
    }

    #[test]
    fn missing_count_defaults_to_zero() {
        let decoded = decode_record(&fields(&[("windowStart", "1718000000000")]));
        assert_eq!(decoded.ok().flatten().map(|record| record.count), Some(0));
    }
}
