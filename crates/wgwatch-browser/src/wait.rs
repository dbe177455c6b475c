//! Poll-until-deadline primitive shared by every bounded wait.

use crate::error::{BrowserError, Result};
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// How often to probe and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub deadline: Duration,
}

impl PollPolicy {
    pub const fn new(interval: Duration, deadline: Duration) -> Self {
        Self { interval, deadline }
    }

    /// Probe every 250ms until `deadline`.
    pub const fn within(deadline: Duration) -> Self {
        Self::new(Duration::from_millis(250), deadline)
    }
}

/// Run `probe` until it returns `true` or the deadline passes.
///
/// The probe is always run at least once, and once more after the final
/// sleep, so a condition that becomes true right at the deadline is seen.
pub async fn poll_until<F, Fut>(label: &str, policy: PollPolicy, mut probe: F) -> Result<()>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let started = Instant::now();
    loop {
        if probe().await {
            return Ok(());
        }

        let elapsed = started.elapsed();
        if elapsed >= policy.deadline {
            return Err(BrowserError::Timeout(format!(
                "{label} not reached after {:?}",
                policy.deadline
            )));
        }

        let remaining = policy.deadline - elapsed;
        tokio::time::sleep(policy.interval.min(remaining)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_immediate_success() {
        let calls = AtomicUsize::new(0);
        let result = poll_until("ready", PollPolicy::within(Duration::from_secs(5)), || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { true }
        })
        .await;

        assert!(result.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_some_probes() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();
        let policy = PollPolicy::new(Duration::from_millis(500), Duration::from_secs(30));

        poll_until("ready", policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move { n >= 3 }
        })
        .await
        .expect("condition met before deadline");

        assert_eq!(calls.load(Ordering::SeqCst), 4);
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(1500));
        assert!(elapsed < Duration::from_millis(1600));
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_exceeded() {
        let calls = AtomicUsize::new(0);
        let start = Instant::now();
        let policy = PollPolicy::new(Duration::from_millis(500), Duration::from_secs(30));

        let err = poll_until("grecaptcha ready", policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { false }
        })
        .await
        .expect_err("never ready");

        assert!(matches!(err, BrowserError::Timeout(ref msg) if msg.contains("grecaptcha ready")));
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(30));
        assert!(elapsed < Duration::from_millis(30_500));
        // roughly one probe per interval plus the final one at the deadline
        assert!(calls.load(Ordering::SeqCst) >= 60);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_sleep_is_clamped() {
        let start = Instant::now();
        let policy = PollPolicy::new(Duration::from_secs(4), Duration::from_secs(10));
        let _ = poll_until("never", policy, || async { false }).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_secs(10));
        assert!(elapsed < Duration::from_secs(11));
    }
}
