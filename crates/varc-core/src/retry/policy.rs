use std::time::Duration;

/// High-level classification of a fetch error for retry purposes.
///
/// Stays generic on purpose; the transport maps HTTP status codes, curl
/// errors, or IO failures into these kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Operation timed out (connect/read).
    Timeout,
    /// Server asked us to slow down (e.g. 429, 503).
    Throttled,
    /// Network-level failure (connection reset, DNS, socket error).
    Connection,
    /// HTTP status that is retryable but not strictly throttling (5xx).
    Http5xx(u16),
    /// Any other error (not retried).
    Other,
}

/// The set of error kinds a policy will swallow and retry.
///
/// Everything outside the set propagates immediately without consuming
/// retry budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryableKinds {
    pub timeout: bool,
    pub connection: bool,
    pub throttled: bool,
    pub http_5xx: bool,
}

impl RetryableKinds {
    /// Only socket-level transience: timeouts and connection failures.
    pub const TRANSPORT_ONLY: Self = Self {
        timeout: true,
        connection: true,
        throttled: false,
        http_5xx: false,
    };

    pub fn contains(&self, kind: ErrorKind) -> bool {
        match kind {
            ErrorKind::Timeout => self.timeout,
            ErrorKind::Connection => self.connection,
            ErrorKind::Throttled => self.throttled,
            ErrorKind::Http5xx(_) => self.http_5xx,
            ErrorKind::Other => false,
        }
    }
}

impl Default for RetryableKinds {
    /// All transient kinds: timeouts, connection failures, throttling, 5xx.
    fn default() -> Self {
        Self {
            timeout: true,
            connection: true,
            throttled: true,
            http_5xx: true,
        }
    }
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry this error.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Bounded exponential backoff over a configurable set of retryable kinds.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts per chunk (including the first).
    pub max_attempts: u32,
    /// Base delay for backoff.
    pub base_delay: Duration,
    /// Upper bound on backoff delay.
    pub max_delay: Duration,
    /// Which error kinds are retried at all.
    pub retryable: RetryableKinds,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(30),
            retryable: RetryableKinds::default(),
        }
    }
}

impl RetryPolicy {
    /// Compute the next backoff delay for a given attempt and error kind.
    ///
    /// `attempt` is 1-based (1 = first attempt). Returns `RetryDecision::NoRetry`
    /// when the kind is outside the retryable set or the budget is spent.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if !self.retryable.contains(kind) {
            return RetryDecision::NoRetry;
        }
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        // Exponential backoff: base * 2^(attempt-1), capped.
        let exp = 1u32 << attempt.saturating_sub(1).min(8);
        let raw = self.base_delay.saturating_mul(exp);
        RetryDecision::RetryAfter(raw.min(self.max_delay))
    }
}
