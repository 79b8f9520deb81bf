//! Wait budgets for long-running server operations
//!
//! A [`TimeoutPolicy`] tells the wait engine how long it may keep polling and
//! how often. Operations accept `Option<&TimeoutPolicy>`: `None` returns as soon
//! as the trigger request is accepted, [`TimeoutPolicy::instant`] checks progress
//! exactly once, and [`TimeoutPolicy::bounded`] polls until done or out of time.

use std::time::Duration;

/// Default time between progress checks
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(500);

/// How long a wait may last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitMode {
    /// Check progress once and return
    Instant,
    /// Keep checking until the duration has elapsed
    Bounded(Duration),
}

/// Caller-specified wait budget and poll cadence
#[derive(Debug, Clone, Copy)]
pub struct TimeoutPolicy {
    mode: WaitMode,
    poll_interval: Duration,
}

impl TimeoutPolicy {
    /// Policy that performs a single progress check
    pub fn instant() -> Self {
        Self {
            mode: WaitMode::Instant,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Policy that polls for up to `timeout`
    ///
    /// A zero timeout has no budget to wait in and degrades to [`TimeoutPolicy::instant`].
    pub fn bounded(timeout: Duration) -> Self {
        if timeout.is_zero() {
            return Self::instant();
        }
        Self {
            mode: WaitMode::Bounded(timeout),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }

    /// Build from an optional duration, `None` meaning [`WaitMode::Instant`]
    pub fn new(timeout: Option<Duration>) -> Self {
        timeout.map(Self::bounded).unwrap_or_else(Self::instant)
    }

    /// Policy bounded by whole seconds
    pub fn from_secs(secs: u64) -> Self {
        Self::bounded(Duration::from_secs(secs))
    }

    /// Override the poll interval; a zero interval falls back to [`DEFAULT_POLL_INTERVAL`]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = if interval.is_zero() {
            DEFAULT_POLL_INTERVAL
        } else {
            interval
        };
        self
    }

    pub fn mode(&self) -> WaitMode {
        self.mode
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    /// Total wait budget, zero for instant policies
    pub fn budget(&self) -> Duration {
        match self.mode {
            WaitMode::Instant => Duration::ZERO,
            WaitMode::Bounded(timeout) => timeout,
        }
    }

    pub fn is_instant(&self) -> bool {
        matches!(self.mode, WaitMode::Instant)
    }
}

impl Default for TimeoutPolicy {
    fn default() -> Self {
        Self::instant()
    }
}
