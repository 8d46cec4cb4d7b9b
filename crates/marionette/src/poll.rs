//! Bounded fixed-delay polling.
//!
//! The two polling loops in this crate (capability settle-check, bootstrap
//! completion) share this one utility: fixed interval, fixed attempt
//! budget, no backoff, no jitter, optional cancellation.

use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Interval and attempt budget for one polling loop.
#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl PollConfig {
    pub fn new(interval: Duration, max_attempts: u32) -> Self {
        Self {
            interval,
            max_attempts,
        }
    }
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 30,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollError {
    /// The attempt budget ran out before the predicate was satisfied.
    Exhausted { attempts: u32 },
    /// The caller's cancellation token fired.
    Cancelled,
}

/// Run `attempt` up to `config.max_attempts` times, sleeping
/// `config.interval` between attempts, until it yields a value.
///
/// N attempts incur exactly N−1 sleeps: the loop never waits after the
/// final attempt. The `attempt` closure receives the 1-based attempt
/// number. A cancellation token, when given, aborts during the sleep
/// rather than waiting out the budget.
pub async fn poll_until<T, F, Fut>(
    config: &PollConfig,
    cancel: Option<&CancellationToken>,
    mut attempt: F,
) -> Result<T, PollError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Option<T>>,
{
    for n in 1..=config.max_attempts {
        if let Some(token) = cancel {
            if token.is_cancelled() {
                return Err(PollError::Cancelled);
            }
        }
        if let Some(value) = attempt(n).await {
            return Ok(value);
        }
        if n < config.max_attempts {
            match cancel {
                Some(token) => tokio::select! {
                    _ = token.cancelled() => return Err(PollError::Cancelled),
                    _ = sleep(config.interval) => {}
                },
                None => sleep(config.interval).await,
            }
        }
    }
    Err(PollError::Exhausted {
        attempts: config.max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    fn immediate(max_attempts: u32) -> PollConfig {
        PollConfig::new(Duration::ZERO, max_attempts)
    }

    #[tokio::test]
    async fn returns_value_on_first_success() {
        let calls = Cell::new(0u32);
        let result = poll_until(&immediate(5), None, |n| {
            calls.set(calls.get() + 1);
            async move { if n == 3 { Some(n) } else { None } }
        })
        .await;
        assert_eq!(result, Ok(3));
        assert_eq!(calls.get(), 3);
    }

    #[tokio::test]
    async fn exhausts_after_exact_budget() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = poll_until(&immediate(4), None, |_| {
            calls.set(calls.get() + 1);
            async { None }
        })
        .await;
        assert_eq!(result, Err(PollError::Exhausted { attempts: 4 }));
        assert_eq!(calls.get(), 4);
    }

    #[tokio::test]
    async fn zero_attempts_exhausts_without_calling() {
        let calls = Cell::new(0u32);
        let result: Result<(), _> = poll_until(&immediate(0), None, |_| {
            calls.set(calls.get() + 1);
            async { None }
        })
        .await;
        assert_eq!(result, Err(PollError::Exhausted { attempts: 0 }));
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn cancellation_stops_the_loop() {
        let token = CancellationToken::new();
        token.cancel();
        let calls = Cell::new(0u32);
        let result: Result<(), _> = poll_until(&immediate(5), Some(&token), |_| {
            calls.set(calls.get() + 1);
            async { None }
        })
        .await;
        assert_eq!(result, Err(PollError::Cancelled));
        assert_eq!(calls.get(), 0);
    }

    #[tokio::test]
    async fn cancellation_interrupts_the_sleep() {
        let token = CancellationToken::new();
        let config = PollConfig::new(Duration::from_secs(60), 3);
        let inner = token.clone();
        let result: Result<(), _> = poll_until(&config, Some(&token), |_| {
            inner.cancel();
            async { None }
        })
        .await;
        assert_eq!(result, Err(PollError::Cancelled));
    }
}
