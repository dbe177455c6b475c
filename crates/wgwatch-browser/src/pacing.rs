//! Humanized interaction delays.
//!
//! All randomized waiting goes through [`Pacing`] so tests can swap in
//! [`Pacing::instant`] without touching control flow.

use rand::Rng;
use std::time::Duration;

/// Interaction delay policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pacing {
    pause_min: Duration,
    pause_max: Duration,
    keystroke: Duration,
}

impl Pacing {
    /// Build a policy. `pause_min` is clamped to `pause_max`.
    pub fn new(pause_min: Duration, pause_max: Duration, keystroke: Duration) -> Self {
        Self {
            pause_min: pause_min.min(pause_max),
            pause_max,
            keystroke,
        }
    }

    /// 4 to 10 seconds between steps, 80ms between keystrokes.
    pub fn human() -> Self {
        Self::new(
            Duration::from_secs(4),
            Duration::from_secs(10),
            Duration::from_millis(80),
        )
    }

    /// No waiting at all.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, Duration::ZERO)
    }

    /// Draw the next pause length.
    pub fn next_pause(&self) -> Duration {
        if self.pause_max <= self.pause_min {
            return self.pause_min;
        }
        let millis = rand::thread_rng()
            .gen_range(self.pause_min.as_millis()..=self.pause_max.as_millis());
        Duration::from_millis(u64::try_from(millis).unwrap_or(u64::MAX))
    }

    /// Sleep for a randomized pause between interactive steps.
    pub async fn pause(&self) {
        let pause = self.next_pause();
        if !pause.is_zero() {
            tracing::trace!("Pausing {:?}", pause);
            tokio::time::sleep(pause).await;
        }
    }

    /// Sleep between two typed characters.
    pub async fn keystroke(&self) {
        if !self.keystroke.is_zero() {
            tokio::time::sleep(self.keystroke).await;
        }
    }

    /// Random offset in `[base, base + spread)`, used for pointer coordinates.
    pub fn jitter(base: f64, spread: f64) -> f64 {
        base + rand::thread_rng().gen::<f64>() * spread
    }
}

impl Default for Pacing {
    fn default() -> Self {
        Self::human()
    }
}
