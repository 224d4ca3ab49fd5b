//! Experience rate for the tracked character.

use chrono::{DateTime, Utc};

/// Minimum observation window before a rate is reported
const MIN_WINDOW_MS: i64 = 60_000;

/// Experience gained per hour since the first observation
#[derive(Debug, Clone, Default)]
pub struct XpRate {
    start: Option<(u64, DateTime<Utc>)>,
    latest: Option<f64>,
}

impl XpRate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current experience value and return the rate, if any
    pub fn observe(&mut self, experience: u64) -> Option<f64> {
        self.observe_at(experience, Utc::now())
    }

    /// Same as [`observe`](Self::observe) with an explicit clock
    ///
    /// The rate is absent until one minute has passed and while it is not
    /// positive.
    pub fn observe_at(&mut self, experience: u64, now: DateTime<Utc>) -> Option<f64> {
        let (start_exp, start_time) = *self.start.get_or_insert((experience, now));

        let elapsed_ms = (now - start_time).num_milliseconds();
        self.latest = if elapsed_ms > MIN_WINDOW_MS {
            let hours = elapsed_ms as f64 / 3_600_000.0;
            let gained = experience as f64 - start_exp as f64;
            Some(gained / hours).filter(|rate| *rate > 0.0)
        } else {
            None
        };
        self.latest
    }

    pub fn latest(&self) -> Option<f64> {
        self.latest
    }

    /// Forget the baseline, e.g. when tracking a different character
    pub fn reset(&mut self) {
        self.start = None;
        self.latest = None;
    }
}

/// Render a rate as `+1.2B/hr`, `+3.4M/hr`, `+5.6K/hr` or `+789/hr`
pub fn format_xp_rate(xp_per_hour: f64) -> String {
    if xp_per_hour >= 1_000_000_000.0 {
        format!("+{:.1}B/hr", xp_per_hour / 1_000_000_000.0)
    } else if xp_per_hour >= 1_000_000.0 {
        format!("+{:.1}M/hr", xp_per_hour / 1_000_000.0)
    } else if xp_per_hour >= 1_000.0 {
        format!("+{:.1}K/hr", xp_per_hour / 1_000.0)
    } else {
        format!("+{:.0}/hr", xp_per_hour)
    }
}
