// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Jittered check-in scheduling.
//!
//! A `JitterChecker` polls on a fixed cadence and decides, via a caller
//! supplied callback, whether a check-in should run. The interval between
//! check-ins is randomized around a base interval so a fleet of
//! installations does not hit the registration service in lockstep.

use crate::constants::{checkin, POLLING_INTERVAL};
use crate::error::{Result, SccError};
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Computes randomized check-in intervals around a fixed base.
#[derive(Debug, Clone)]
pub struct JitterCalculator {
    base_interval: Duration,
    jitter_max: u32,
    jitter_max_scale: Duration,
}

impl JitterCalculator {
    /// Validates that the jitter amplitude cannot push an interval to or
    /// below zero. Invalid combinations are configuration errors and are
    /// reported instead of panicking.
    pub fn new(
        base_interval: Duration,
        jitter_max: u32,
        jitter_max_scale: Duration,
    ) -> Result<Self> {
        if base_interval.is_zero() {
            return Err(SccError::InvalidJitterConfig(
                "base interval must be non-zero".to_string(),
            ));
        }

        let amplitude = jitter_max_scale.saturating_mul(jitter_max);
        if amplitude > base_interval {
            return Err(SccError::InvalidJitterConfig(format!(
                "jitter amplitude {:?} exceeds base interval {:?}",
                amplitude, base_interval
            )));
        }

        Ok(Self {
            base_interval,
            jitter_max,
            jitter_max_scale,
        })
    }

    /// Maximum distance a calculated interval can be from the base interval
    pub fn jitter_max_duration(&self) -> Duration {
        self.jitter_max_scale.saturating_mul(self.jitter_max)
    }

    /// base_interval + uniform(-jitter_max, +jitter_max) * jitter_max_scale
    pub fn calculate_checkin_interval(&self) -> Duration {
        if self.jitter_max == 0 {
            return self.base_interval;
        }

        let max = self.jitter_max as i64;
        let offset = rand::thread_rng().gen_range(-max..=max);
        let delta = self.jitter_max_scale.saturating_mul(offset.unsigned_abs() as u32);
        if offset >= 0 {
            self.base_interval + delta
        } else {
            self.base_interval - delta
        }
    }
}

/// Configuration for a [`JitterChecker`].
#[derive(Debug, Clone)]
pub struct JitterCheckerConfig {
    pub base_interval: Duration,
    pub jitter_max: u32,
    pub jitter_max_scale: Duration,
    /// How often the checker wakes up to see whether a check-in is due
    pub polling_interval: Duration,
    /// Hard ceiling on time between check-ins, regardless of jitter
    pub deadline_window: Duration,
}

impl JitterCheckerConfig {
    /// Production cadence: roughly every 20 hours, within a 3 hour band
    pub fn prod() -> Self {
        Self {
            base_interval: checkin::PROD_BASE,
            jitter_max: checkin::PROD_JITTER_MAX,
            jitter_max_scale: checkin::PROD_JITTER_SCALE,
            polling_interval: POLLING_INTERVAL,
            deadline_window: checkin::PROD_DEADLINE,
        }
    }

    /// Dev cadence: roughly every 30 minutes, within a 10 minute band
    pub fn dev() -> Self {
        Self {
            base_interval: checkin::DEV_BASE,
            jitter_max: checkin::DEV_JITTER_MAX,
            jitter_max_scale: checkin::DEV_JITTER_SCALE,
            polling_interval: POLLING_INTERVAL,
            deadline_window: checkin::DEV_DEADLINE,
        }
    }
}

/// Polls at `polling_interval` and invokes a callback with the current
/// jittered trigger interval and the strict deadline. The callback reports
/// whether it performed a check-in; if so, a new interval is drawn.
pub struct JitterChecker {
    calculator: JitterCalculator,
    polling_interval: Duration,
    deadline_window: Duration,
    trigger_interval: Option<Duration>,
    last_refresh: Instant,
}

impl JitterChecker {
    pub fn new(config: JitterCheckerConfig) -> Result<Self> {
        if config.polling_interval.is_zero() {
            return Err(SccError::InvalidJitterConfig(
                "polling interval must be non-zero".to_string(),
            ));
        }
        if config.deadline_window < config.base_interval {
            return Err(SccError::InvalidJitterConfig(
                "deadline window must be at least the base interval".to_string(),
            ));
        }

        let calculator = JitterCalculator::new(
            config.base_interval,
            config.jitter_max,
            config.jitter_max_scale,
        )?;

        Ok(Self {
            calculator,
            polling_interval: config.polling_interval,
            deadline_window: config.deadline_window,
            trigger_interval: None,
            last_refresh: Instant::now(),
        })
    }

    /// Arm the checker: draw the initial trigger interval and reset the
    /// refresh clock. Idempotent; `run` calls this when not yet started.
    pub fn start(&mut self) {
        let interval = self.calculator.calculate_checkin_interval();
        debug!("Initial check-in interval: {:?}", interval);
        self.trigger_interval = Some(interval);
        self.last_refresh = Instant::now();
    }

    /// Loop forever on the polling cadence. Callback errors are logged and
    /// retried on the next tick; they do not stop the checker.
    pub async fn run<F, Fut>(mut self, mut callback: F) -> Result<()>
    where
        F: FnMut(Duration, Instant) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        if self.trigger_interval.is_none() {
            self.start();
        }

        let mut ticker = tokio::time::interval(self.polling_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            // start() above guarantees the interval is set
            let trigger_interval = self.trigger_interval.unwrap_or(self.polling_interval);
            let strict_deadline = self.last_refresh + self.deadline_window;

            match callback(trigger_interval, strict_deadline).await {
                Ok(true) => {
                    let next = self.calculator.calculate_checkin_interval();
                    debug!("Check-in performed, next interval: {:?}", next);
                    self.trigger_interval = Some(next);
                    self.last_refresh = Instant::now();
                }
                Ok(false) => {}
                Err(e) => warn!("Check-in callback failed: {}", e),
            }
        }
    }
}

/// A check-in is due once the jittered interval has elapsed since the last
/// refresh, or unconditionally once the strict deadline has passed.
pub fn checkin_due(
    trigger_interval: Duration,
    strict_deadline: Instant,
    last_checkin: Instant,
) -> bool {
    let now = Instant::now();
    now.duration_since(last_checkin) >= trigger_interval || now >= strict_deadline
}
