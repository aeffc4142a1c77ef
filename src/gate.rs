use crate::config;
use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Outcome of comparing the clock against the configured gate
#[derive(Debug, Clone, PartialEq)]
pub struct GateCheck {
    pub now: DateTime<Tz>,
    pub gate: DateTime<Tz>,
    pub overridden: bool,
    pub allowed: bool,
}

impl GateCheck {
    /// Gate is today's `gate_time` in the market timezone. Runs are allowed
    /// at or after it, or at any time when overridden.
    pub fn evaluate(now: DateTime<Tz>, gate_time: NaiveTime, overridden: bool) -> Self {
        let gate_naive = now.date_naive().and_time(gate_time);
        // Asia/Kolkata has no DST transitions, so the local time is always unique
        let gate = now
            .timezone()
            .from_local_datetime(&gate_naive)
            .earliest()
            .unwrap_or(now);

        Self {
            now,
            gate,
            overridden,
            allowed: overridden || now >= gate,
        }
    }

    pub fn evaluate_now(gate_time: NaiveTime, overridden: bool) -> Self {
        Self::evaluate(market_now(), gate_time, overridden)
    }

    pub fn wait_message(&self) -> String {
        format!(
            "Wait until {} IST to run (or set the override).",
            self.gate.format("%I:%M %p")
        )
    }
}

pub fn market_now() -> DateTime<Tz> {
    Utc::now().with_timezone(&config::MARKET_TIMEZONE)
}
