//! Round Timer
//!
//! Pure tick counter with no system-time dependency: something outside
//! (a tokio interval in the session driver, a loop in tests) calls
//! [`RoundTimer::tick`] once per second. Supports both timing policies
//! seen in this game's history; the session plays count-down.

use serde::{Deserialize, Serialize};

/// Timing policy for a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerPolicy {
    /// Elapsed seconds, no end condition.
    CountUp,
    /// Remaining seconds from a limit; expires at zero.
    CountDown {
        /// Time limit in seconds.
        limit_secs: u64,
    },
}

/// One second of timer progress.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerTick {
    /// Formatted `minutes:seconds`, seconds zero-padded to two digits.
    pub display: String,
    /// Did a count-down timer just hit zero?
    pub expired: bool,
}

/// Round timer with 1-second resolution.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RoundTimer {
    policy: TimerPolicy,
    elapsed_secs: u64,
    running: bool,
}

impl RoundTimer {
    /// Create a stopped timer with the given policy.
    pub fn new(policy: TimerPolicy) -> Self {
        Self {
            policy,
            elapsed_secs: 0,
            running: false,
        }
    }

    /// Count-down timer for a difficulty's time limit.
    pub fn count_down(limit_secs: u64) -> Self {
        Self::new(TimerPolicy::CountDown { limit_secs })
    }

    /// The timer's policy.
    pub fn policy(&self) -> TimerPolicy {
        self.policy
    }

    /// Is the timer currently ticking?
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds elapsed since the last reset.
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed_secs
    }

    /// Seconds remaining (count-down only).
    pub fn remaining_secs(&self) -> Option<u64> {
        match self.policy {
            TimerPolicy::CountUp => None,
            TimerPolicy::CountDown { limit_secs } => {
                Some(limit_secs.saturating_sub(self.elapsed_secs))
            }
        }
    }

    /// Start (or resume) ticking.
    pub fn start(&mut self) {
        self.running = true;
    }

    /// Stop ticking. Elapsed time is kept until `reset`.
    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Stop and clear elapsed time.
    pub fn reset(&mut self) {
        self.elapsed_secs = 0;
        self.running = false;
    }

    /// Advance one second. Returns `None` when stopped.
    ///
    /// A count-down timer stops itself on the tick that reaches zero and
    /// reports `expired = true` exactly once.
    pub fn tick(&mut self) -> Option<TimerTick> {
        if !self.running {
            return None;
        }
        self.elapsed_secs += 1;

        let expired = match self.policy {
            TimerPolicy::CountUp => false,
            TimerPolicy::CountDown { limit_secs } => self.elapsed_secs >= limit_secs,
        };
        if expired {
            self.running = false;
        }

        Some(TimerTick {
            display: self.display(),
            expired,
        })
    }

    /// Current `minutes:seconds` display.
    ///
    /// Count-up shows elapsed time, count-down shows remaining time.
    pub fn display(&self) -> String {
        let secs = match self.policy {
            TimerPolicy::CountUp => self.elapsed_secs,
            TimerPolicy::CountDown { limit_secs } => limit_secs.saturating_sub(self.elapsed_secs),
        };
        format!("{}:{:02}", secs / 60, secs % 60)
    }
}

// =============================================================================
// TESTS
// =============================================================================
