//! Fixed-window message quota per caller.

use chrono::{DateTime, TimeDelta, Utc};
use nightschool_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

/// Stored quota state for one caller key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitRecord {
    /// Messages accepted in the current window.
    pub count: u32,
    /// When the current window started.
    pub window_start: DateTime<Utc>,
}

impl RateLimitRecord {
    /// Creates a record.
    #[must_use]
    pub fn new(count: u32, window_start: DateTime<Utc>) -> Self {
        Self {
            count,
            window_start,
        }
    }
}

/// Message ceiling and window length applied to every caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_messages: u32,
    window: TimeDelta,
}

impl RateLimitPolicy {
    /// Ten messages per hour.
    pub const DEFAULT_MAX_MESSAGES: u32 = 10;
    /// One hour.
    pub const DEFAULT_WINDOW_SECONDS: i64 = 60 * 60;

    /// Creates a policy, rejecting a zero ceiling or a non-positive window.
    pub fn new(max_messages: u32, window_seconds: i64) -> AppResult<Self> {
        if max_messages == 0 {
            return Err(AppError::Validation(
                "rate limit ceiling must be greater than zero".to_owned(),
            ));
        }

        if window_seconds <= 0 {
            return Err(AppError::Validation(
                "rate limit window must be greater than zero seconds".to_owned(),
            ));
        }

        let window = TimeDelta::try_seconds(window_seconds).ok_or_else(|| {
            AppError::Validation(format!("rate limit window is out of range: {window_seconds}"))
        })?;

        Ok(Self {
            max_messages,
            window,
        })
    }

    /// Returns the message ceiling per window.
    #[must_use]
    pub fn max_messages(&self) -> u32 {
        self.max_messages
    }

    /// Returns the window length.
    #[must_use]
    pub fn window(&self) -> TimeDelta {
        self.window
    }

    /// Resolves the window that applies to a request arriving at `now`.
    ///
    /// A missing record, or one whose window started more than one window
    /// length ago, yields a fresh window starting at `now` with a zero count.
    #[must_use]
    pub fn evaluate(&self, stored: Option<&RateLimitRecord>, now: DateTime<Utc>) -> RateLimitWindow {
        match stored {
            Some(record) if now - record.window_start <= self.window => RateLimitWindow {
                count: record.count,
                window_start: record.window_start,
                restarted: false,
            },
            _ => RateLimitWindow {
                count: 0,
                window_start: now,
                restarted: stored.is_some(),
            },
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self {
            max_messages: Self::DEFAULT_MAX_MESSAGES,
            window: TimeDelta::seconds(Self::DEFAULT_WINDOW_SECONDS),
        }
    }
}

/// Effective quota state for a single request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitWindow {
    count: u32,
    window_start: DateTime<Utc>,
    restarted: bool,
}

impl RateLimitWindow {
    /// Messages already accepted in this window.
    #[must_use]
    pub fn count(&self) -> u32 {
        self.count
    }

    /// Start of this window.
    #[must_use]
    pub fn window_start(&self) -> DateTime<Utc> {
        self.window_start
    }

    /// True when a stored window had expired and was replaced.
    #[must_use]
    pub fn restarted(&self) -> bool {
        self.restarted
    }

    /// True when the ceiling has been reached.
    #[must_use]
    pub fn is_exhausted(&self, policy: &RateLimitPolicy) -> bool {
        self.count >= policy.max_messages
    }

    /// Returns the record to persist after one more accepted message.
    #[must_use]
    pub fn incremented(&self) -> RateLimitRecord {
        RateLimitRecord::new(self.count.saturating_add(1), self.window_start)
    }
}
