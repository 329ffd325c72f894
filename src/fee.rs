//! Duration-based ancillary fee with a start fee and daily/weekly caps.

use crate::error::RateError;
use crate::money::round_cents;

const MINUTES_PER_DAY: f64 = 24.0 * 60.0;

/// Fee parameters.
#[derive(Debug, Clone)]
pub struct FeeSchedule {
    pub daily_cap: f64,
    pub weekly_cap: f64,
    /// Charged once, on the first day of the first week.
    pub start_fee: f64,
    pub per_minute: f64,
    pub days_per_week: u32,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            daily_cap: 10.0,
            weekly_cap: 25.0,
            start_fee: 1.25,
            per_minute: 1.0 / 60.0,
            days_per_week: 7,
        }
    }
}

impl FeeSchedule {
    fn minutes_per_week(&self) -> f64 {
        MINUTES_PER_DAY * f64::from(self.days_per_week)
    }

    /// Fee for `billed_minutes`. Non-positive durations cost nothing.
    pub fn fee_for(&self, billed_minutes: f64) -> Result<f64, RateError> {
        if !billed_minutes.is_finite() {
            return Err(RateError::InvalidInput(format!(
                "billed minutes must be finite, got {billed_minutes}"
            )));
        }
        if billed_minutes <= 0.0 {
            return Ok(0.0);
        }

        let complete_weeks = (billed_minutes / self.minutes_per_week()).floor();
        let mut total = complete_weeks * self.weekly_cap;
        let remaining = billed_minutes - complete_weeks * self.minutes_per_week();

        if remaining <= 0.0 {
            return Ok(round_cents(total));
        }

        let partial_week = if complete_weeks == 0.0 {
            self.first_week(remaining)
        } else {
            self.later_week(remaining)
        };
        total += partial_week.min(self.weekly_cap);

        Ok(round_cents(total))
    }

    /// Partial first week: the opening day carries the start fee.
    fn first_week(&self, minutes: f64) -> f64 {
        let first_day = minutes.min(MINUTES_PER_DAY);
        let opening = (self.start_fee + first_day * self.per_minute).min(self.daily_cap);
        opening + self.later_week(minutes - first_day)
    }

    /// Full days at the daily cap, then a metered partial day.
    fn later_week(&self, minutes: f64) -> f64 {
        let full_days = (minutes / MINUTES_PER_DAY).floor();
        let leftover = minutes - full_days * MINUTES_PER_DAY;

        let mut cost = full_days * self.daily_cap;
        if leftover > 0.0 {
            cost += (leftover * self.per_minute).min(self.daily_cap);
        }
        cost
    }
}

/// Fee under the default schedule.
pub fn compute_fee(billed_minutes: f64) -> Result<f64, RateError> {
    FeeSchedule::default().fee_for(billed_minutes)
}
