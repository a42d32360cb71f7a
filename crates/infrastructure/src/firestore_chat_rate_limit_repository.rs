//! Firestore-backed chat rate limit repository using the REST API.
//!
//! Records live in the `rateLimits` collection, one document per caller key:
//!
//! ```text
//! rateLimits/{escaped caller key}
//!   count:       integer
//!   windowStart: timestamp
//!   lastUpdated: timestamp (REQUEST_TIME server transform)
//! ```

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use nightschool_application::ChatRateLimitRepository;
use nightschool_core::{AppError, AppResult};
use nightschool_domain::{CallerKey, RateLimitRecord};
use serde_json::{Value, json};
use tracing::debug;
use url::Url;

/// Collection holding one document per caller key.
pub const RATE_LIMIT_COLLECTION: &str = "rateLimits";

/// Connection settings for a Firestore database.
#[derive(Debug, Clone)]
pub struct FirestoreConfig {
    /// REST API root, e.g. `https://firestore.googleapis.com/v1`.
    pub base_url: String,
    /// Google Cloud project identifier.
    pub project_id: String,
    /// Database identifier, usually `(default)`.
    pub database_id: String,
    /// Web API key appended to every request.
    pub api_key: String,
}

/// Firestore implementation of the chat rate limit repository port.
#[derive(Clone)]
pub struct FirestoreChatRateLimitRepository {
    http_client: reqwest::Client,
    base_url: Url,
    project_id: String,
    database_id: String,
    api_key: String,
}

impl FirestoreChatRateLimitRepository {
    /// Creates a repository for the configured database.
    pub fn new(http_client: reqwest::Client, config: FirestoreConfig) -> AppResult<Self> {
        let base_url = Url::parse(config.base_url.trim_end_matches('/')).map_err(|error| {
            AppError::Validation(format!(
                "invalid Firestore base url '{}': {error}",
                config.base_url
            ))
        })?;

        if base_url.cannot_be_a_base() {
            return Err(AppError::Validation(format!(
                "Firestore base url '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            http_client,
            base_url,
            project_id: config.project_id,
            database_id: config.database_id,
            api_key: config.api_key,
        })
    }

    fn database_path(&self) -> String {
        format!(
            "projects/{}/databases/{}/documents",
            self.project_id, self.database_id
        )
    }

    fn document_name(&self, caller_key: &CallerKey) -> String {
        format!(
            "{}/{RATE_LIMIT_COLLECTION}/{}",
            self.database_path(),
            document_id(caller_key)
        )
    }

    fn endpoint(&self, trailing: &[&str]) -> AppResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|()| {
                AppError::Internal("Firestore base url cannot carry a path".to_owned())
            })?;
            segments
                .pop_if_empty()
                .extend(["projects", self.project_id.as_str()])
                .extend(["databases", self.database_id.as_str()])
                .extend(trailing);
        }
        url.query_pairs_mut().append_pair("key", &self.api_key);

        Ok(url)
    }

    fn document_url(&self, caller_key: &CallerKey) -> AppResult<Url> {
        let document_id = document_id(caller_key);
        self.endpoint(&["documents", RATE_LIMIT_COLLECTION, document_id.as_str()])
    }

    fn commit_url(&self) -> AppResult<Url> {
        self.endpoint(&["documents:commit"])
    }
}

/// Maps a caller key onto the `[A-Za-z0-9-_]` alphabet.
///
/// Every byte outside `[A-Za-z0-9-]` becomes `_XX` (uppercase hex), so ids are
/// injective and can never be `.`, `..` or `__name__`.
fn document_id(caller_key: &CallerKey) -> String {
    let mut id = String::with_capacity(caller_key.as_str().len());
    for byte in caller_key.as_str().bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' {
            id.push(char::from(byte));
        } else {
            id.push('_');
            id.push(char::from(HEX_DIGITS[usize::from(byte >> 4)]));
            id.push(char::from(HEX_DIGITS[usize::from(byte & 0x0f)]));
        }
    }
    id
}

const HEX_DIGITS: &[u8; 16] = b"0123456789ABCDEF";

fn timestamp_value(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn commit_body(document_name: &str, record: RateLimitRecord) -> Value {
    json!({
        "writes": [{
            "update": {
                "name": document_name,
                "fields": {
                    "count": { "integerValue": record.count.to_string() },
                    "windowStart": { "timestampValue": timestamp_value(record.window_start) },
                },
            },
            "updateTransforms": [{
                "fieldPath": "lastUpdated",
                "setToServerValue": "REQUEST_TIME",
            }],
        }],
    })
}

fn decode_document(document: &Value, expected_name: &str) -> AppResult<RateLimitRecord> {
    let name = document.get("name").and_then(Value::as_str);
    if name != Some(expected_name) {
        return Err(AppError::Internal(format!(
            "Firestore returned an unexpected resource instead of document '{expected_name}'"
        )));
    }

    let fields = document
        .get("fields")
        .filter(|fields| fields.is_object())
        .ok_or_else(|| {
            AppError::Internal(format!("Firestore document '{expected_name}' has no fields"))
        })?;

    let count = match fields.get("count") {
        Some(value) => decode_integer(value)?,
        None => 0,
    };

    let window_start = fields
        .get("windowStart")
        .and_then(|value| value.get("timestampValue"))
        .and_then(Value::as_str)
        .map(|value| {
            DateTime::parse_from_rfc3339(value)
                .map(|parsed| parsed.with_timezone(&Utc))
                .map_err(|error| {
                    AppError::Internal(format!(
                        "invalid Firestore windowStart '{value}': {error}"
                    ))
                })
        })
        .transpose()?
        .unwrap_or_else(Utc::now);

    Ok(RateLimitRecord::new(count, window_start))
}

fn decode_integer(value: &Value) -> AppResult<u32> {
    let raw = value.get("integerValue").ok_or_else(|| {
        AppError::Internal(format!("Firestore count is not an integer: {value}"))
    })?;

    let parsed = match raw {
        Value::String(text) => text.parse::<i64>().ok(),
        Value::Number(number) => number.as_i64(),
        _ => None,
    }
    .ok_or_else(|| AppError::Internal(format!("invalid Firestore integer value: {raw}")))?;

    u32::try_from(parsed.max(0))
        .map_err(|error| AppError::Internal(format!("Firestore count out of range: {error}")))
}

#[async_trait]
impl ChatRateLimitRepository for FirestoreChatRateLimitRepository {
    async fn find_record(&self, caller_key: &CallerKey) -> AppResult<Option<RateLimitRecord>> {
        let response = self
            .http_client
            .get(self.document_url(caller_key)?)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to read Firestore rate limit: {error}"))
            })?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            debug!(caller = %caller_key, "no Firestore rate limit document yet");
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "Firestore read failed with status {status}: {body}"
            )));
        }

        let document = response.json::<Value>().await.map_err(|error| {
            AppError::Internal(format!("failed to decode Firestore document: {error}"))
        })?;

        decode_document(&document, &self.document_name(caller_key)).map(Some)
    }

    async fn save_record(&self, caller_key: &CallerKey, record: RateLimitRecord) -> AppResult<()> {
        let body = commit_body(&self.document_name(caller_key), record);

        let response = self
            .http_client
            .post(self.commit_url()?)
            .json(&body)
            .send()
            .await
            .map_err(|error| {
                AppError::Internal(format!("failed to write Firestore rate limit: {error}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<response body unavailable>".to_owned());
            return Err(AppError::Internal(format!(
                "Firestore commit failed with status {status}: {body}"
            )));
        }

        Ok(())
    }
}
