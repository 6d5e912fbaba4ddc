//! Bounded retry loop: run a fetch until success, budget exhaustion, or a
//! non-retryable error.

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Terminal failure of a retried fetch. Distinguishes a spent budget from an
/// error the policy refuses to retry, since callers surface the two differently.
#[derive(Debug)]
pub enum RetryFailure {
    /// Every attempt failed with a retryable error; holds the last one.
    Exhausted { attempts: u32, last: FetchError },
    /// A non-retryable error surfaced; no further attempts were made.
    Fatal(FetchError),
}

/// Runs `f` until it succeeds or the retry policy says to stop.
/// On retryable failure, sleeps for the backoff duration then tries again.
pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, RetryFailure>
where
    F: FnMut() -> Result<T, FetchError>,
{
    let mut attempt = 1u32;
    loop {
        match f() {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        return Err(if policy.retryable.contains(kind) {
                            RetryFailure::Exhausted {
                                attempts: attempt,
                                last: e,
                            }
                        } else {
                            RetryFailure::Fatal(e)
                        });
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::debug!(attempt, %e, delay_ms = d.as_millis() as u64, "retrying fetch");
                        std::thread::sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}
