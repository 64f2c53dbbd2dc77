//! Bounded wake-up loop for a backend that may be cold-starting.
//!
//! ```text
//! Probing(1) --ready--> Ready
//!     |
//!  not ready, attempt < max --> Retrying(attempt + 1) --delay--> Probing(attempt + 1)
//!     |
//!  not ready, attempt == max --> Exhausted
//! ```

use std::future::Future;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::progress::{ProgressObserver, ProgressState};

use super::ApiError;

/// Default attempt budget for waking the server.
/// 12 attempts at 5s apart covers a ~60s serverless cold start.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 12;

/// Default delay between attempts in milliseconds.
pub const DEFAULT_RETRY_DELAY_MS: u64 = 5000;

/// Default cap for exponential backoff in milliseconds.
pub const DEFAULT_MAX_DELAY_MS: u64 = 15_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backoff {
    #[default]
    Fixed,
    Exponential,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub backoff: Backoff,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            backoff: Backoff::Fixed,
            max_delay: Duration::from_millis(DEFAULT_MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    /// Attempt budget, never less than one probe.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        match self.backoff {
            Backoff::Fixed => self.delay,
            Backoff::Exponential => {
                let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
                self.delay.saturating_mul(factor).min(self.max_delay)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeState {
    Probing(u32),
    Retrying(u32),
    Ready,
    Exhausted,
}

impl ProbeState {
    pub fn initial() -> Self {
        ProbeState::Probing(1)
    }

    /// Advance after a probe. Only meaningful from `Probing`.
    pub fn after_probe(self, ready: bool, max_attempts: u32) -> Self {
        match self {
            ProbeState::Probing(_) if ready => ProbeState::Ready,
            ProbeState::Probing(attempt) if attempt >= max_attempts => ProbeState::Exhausted,
            ProbeState::Probing(attempt) => ProbeState::Retrying(attempt + 1),
            other => other,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProbeState::Ready | ProbeState::Exhausted)
    }
}

/// Drive `probe` until it reports ready or the attempt budget runs out.
///
/// Progress `(attempt, max)` is pushed before each probe starts. Returns the
/// number of probes issued on success.
pub async fn wait_until_ready<P, Fut, O>(
    policy: &RetryPolicy,
    observer: &O,
    mut probe: P,
) -> Result<u32, ApiError>
where
    P: FnMut() -> Fut,
    Fut: Future<Output = bool>,
    O: ProgressObserver + ?Sized,
{
    let max = policy.attempts();
    let mut state = ProbeState::initial();
    let mut probes = 0;

    while !state.is_terminal() {
        state = match state {
            ProbeState::Probing(attempt) => {
                observer.on_progress(ProgressState::new(attempt, max));
                let ready = probe().await;
                probes = attempt;
                debug!(attempt, max, ready, "Server probe finished");
                state.after_probe(ready, max)
            }
            ProbeState::Retrying(next) => {
                let delay = policy.delay_after(next - 1);
                warn!(
                    attempt = next - 1,
                    max,
                    delay_ms = delay.as_millis() as u64,
                    "Server not ready, retrying"
                );
                tokio::time::sleep(delay).await;
                ProbeState::Probing(next)
            }
            terminal => terminal,
        };
    }

    if state == ProbeState::Ready {
        Ok(probes)
    } else {
        warn!(attempts = max, "Server never became ready");
        Err(ApiError::ServerUnavailable { attempts: max })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use crate::progress::NoProgress;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            delay: Duration::from_millis(1),
            ..RetryPolicy::default()
        }
    }

    #[test]
    fn test_default_policy() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.attempts(), 12);
        assert_eq!(policy.delay_after(1), Duration::from_secs(5));
        assert_eq!(policy.delay_after(11), Duration::from_secs(5));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(fast_policy(0).attempts(), 1);
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 12,
            delay: Duration::from_millis(1000),
            backoff: Backoff::Exponential,
            max_delay: Duration::from_millis(6000),
        };
        assert_eq!(policy.delay_after(1), Duration::from_millis(1000));
        assert_eq!(policy.delay_after(2), Duration::from_millis(2000));
        assert_eq!(policy.delay_after(3), Duration::from_millis(4000));
        assert_eq!(policy.delay_after(4), Duration::from_millis(6000));
        assert_eq!(policy.delay_after(40), Duration::from_millis(6000));
    }

    #[test]
    fn test_state_transitions() {
        let s = ProbeState::initial();
        assert_eq!(s, ProbeState::Probing(1));
        assert_eq!(s.after_probe(true, 3), ProbeState::Ready);
        assert_eq!(s.after_probe(false, 3), ProbeState::Retrying(2));
        assert_eq!(ProbeState::Probing(3).after_probe(false, 3), ProbeState::Exhausted);
        assert_eq!(ProbeState::Exhausted.after_probe(true, 3), ProbeState::Exhausted);
        assert!(ProbeState::Ready.is_terminal());
        assert!(!ProbeState::Retrying(2).is_terminal());
    }

    #[tokio::test]
    async fn test_ready_after_failures_reports_each_attempt() {
        for n in 1..=5u32 {
            let calls = AtomicU32::new(0);
            let seen = Mutex::new(Vec::new());
            let observer = |p: ProgressState| seen.lock().unwrap().push((p.attempts_made, p.attempts_total));

            let result = wait_until_ready(&fast_policy(5), &observer, || {
                let call = calls.fetch_add(1, Ordering::SeqCst) + 1;
                async move { call == n }
            })
            .await;

            assert_eq!(result.unwrap(), n);
            assert_eq!(calls.load(Ordering::SeqCst), n);
            let expected: Vec<(u32, u32)> = (1..=n).map(|i| (i, 5)).collect();
            assert_eq!(*seen.lock().unwrap(), expected);
        }
    }

    #[tokio::test]
    async fn test_exhaustion() {
        let calls = AtomicU32::new(0);
        let result = wait_until_ready(&fast_policy(4), &NoProgress, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await;

        assert!(matches!(result, Err(ApiError::ServerUnavailable { attempts: 4 })));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
    }
}
