//! Retry policy: which failed attempts are retried, and after how long.
//!
//! Retried: no response at all (connection refused, DNS, reset) and 5xx.
//! Never retried: an attempt that hit the per-attempt timeout, a request
//! that could not be built, and any other status, in particular 4xx
//! (401/403 included). Backoff is linear: retry `n` waits `n * base_delay`.

use crate::transport::{RawResponse, TransportFailure};
use std::time::Duration;

/// Why a single attempt did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptFailure {
    NoResponse(String),
    TimedOut,
    /// The request could not be built (for example an unparsable URL).
    Invalid(String),
    /// A response arrived with a non-2xx status.
    Status(RawResponse),
}

impl AttemptFailure {
    pub fn status(&self) -> Option<u16> {
        match self {
            AttemptFailure::Status(response) => Some(response.status),
            _ => None,
        }
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            AttemptFailure::NoResponse(_) => true,
            AttemptFailure::TimedOut | AttemptFailure::Invalid(_) => false,
            AttemptFailure::Status(response) => (500..=599).contains(&response.status),
        }
    }

    /// Label for logs and the retry metric.
    pub fn reason(&self) -> &'static str {
        match self {
            AttemptFailure::NoResponse(_) => "network",
            AttemptFailure::TimedOut => "timeout",
            AttemptFailure::Invalid(_) => "invalid_request",
            AttemptFailure::Status(response) if response.status >= 500 => "server_error",
            AttemptFailure::Status(_) => "client_error",
        }
    }
}

impl From<TransportFailure> for AttemptFailure {
    fn from(failure: TransportFailure) -> Self {
        match failure {
            TransportFailure::NoResponse(detail) => AttemptFailure::NoResponse(detail),
            TransportFailure::TimedOut => AttemptFailure::TimedOut,
            TransportFailure::InvalidRequest(detail) => AttemptFailure::Invalid(detail),
        }
    }
}

/// Retry bookkeeping for one logical request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryState {
    attempt: u32,
}

impl RetryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of retries scheduled so far (0 during the first try).
    pub fn attempt(&self) -> u32 {
        self.attempt
    }

    pub fn advance(&mut self) {
        self.attempt += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Whether `failure` should be retried given the retries already made.
    pub fn should_retry(&self, failure: &AttemptFailure, state: &RetryState) -> bool {
        state.attempt < self.max_retries && failure.is_retryable()
    }

    /// Delay before the retry numbered `state.attempt()` (1-indexed).
    pub fn next_delay(&self, state: &RetryState) -> Duration {
        self.base_delay.saturating_mul(state.attempt)
    }
}
