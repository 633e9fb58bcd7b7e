//! Pomodoro countdown timer.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Default session length: 25 minutes.
pub const DEFAULT_DURATION_SECS: u64 = 25 * 60;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("Expected a time as mm:ss, got {0:?}")]
    InvalidFormat(String),
    #[error("Seconds must be below 60, got {0}")]
    SecondsOutOfRange(u64),
}

/// Parse `"mm:ss"` into seconds.
pub fn parse_duration(input: &str) -> Result<u64, TimerError> {
    let invalid = || TimerError::InvalidFormat(input.to_string());
    let (minutes, seconds) = input.trim().split_once(':').ok_or_else(invalid)?;
    let parse = |part: &str| -> Result<u64, TimerError> {
        if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };
    let minutes = parse(minutes)?;
    let seconds = parse(seconds)?;
    if seconds >= 60 {
        return Err(TimerError::SecondsOutOfRange(seconds));
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(invalid)
}

/// Countdown timer driven by host ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PomodoroTimer {
    /// Last value set, restored by [`PomodoroTimer::reset`].
    duration_secs: u64,
    remaining_ms: u64,
    running: bool,
}

impl Default for PomodoroTimer {
    fn default() -> Self {
        Self::new(DEFAULT_DURATION_SECS)
    }
}

impl PomodoroTimer {
    pub fn new(duration_secs: u64) -> Self {
        Self {
            duration_secs,
            remaining_ms: duration_secs.saturating_mul(1000),
            running: false,
        }
    }

    /// Set the duration from `"mm:ss"`. Stops the timer.
    ///
    /// Invalid input leaves the timer untouched.
    pub fn set(&mut self, input: &str) -> Result<(), TimerError> {
        let secs = parse_duration(input)?;
        *self = Self::new(secs);
        Ok(())
    }

    pub fn start(&mut self) {
        if self.remaining_ms > 0 {
            self.running = true;
        }
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Stop and restore the last set duration.
    pub fn reset(&mut self) {
        *self = Self::new(self.duration_secs);
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn is_finished(&self) -> bool {
        self.remaining_ms == 0
    }

    pub fn remaining(&self) -> Duration {
        Duration::from_millis(self.remaining_ms)
    }

    /// Advance by `elapsed` while running. Returns `true` on the tick that
    /// reaches zero.
    pub fn tick(&mut self, elapsed: Duration) -> bool {
        if !self.running {
            return false;
        }
        let elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        self.remaining_ms = self.remaining_ms.saturating_sub(elapsed_ms);
        if self.remaining_ms == 0 {
            self.running = false;
            log::info!("Focus session finished");
            return true;
        }
        false
    }

    /// Remaining time as `MM:SS`, rounding partial seconds up.
    pub fn display(&self) -> String {
        let secs = self.remaining_ms.div_ceil(1000);
        format!("{:02}:{:02}", secs / 60, secs % 60)
    }
}

impl fmt::Display for PomodoroTimer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display())
    }
}
