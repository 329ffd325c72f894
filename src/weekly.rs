//! Weekly-capped time cost for the long-distance plans.
//!
//! Windows are counted in segments from the start of the trip: days 0..7 form
//! the first window, 7..14 the second and so on. They do not line up with
//! calendar weeks.

use tracing::trace;

use crate::money::round_cents;

/// Number of day segments per weekly window.
pub const WINDOW_DAYS: usize = 7;

/// Sums per-day costs, capping each 7-segment window at `weekly_cap`.
pub fn weekly_capped_total(day_costs: &[f64], weekly_cap: f64) -> f64 {
    let mut total = 0.0;
    let mut window = 0.0;

    for (day_index, cost) in day_costs.iter().enumerate() {
        if day_index > 0 && day_index % WINDOW_DAYS == 0 {
            total += flush(window, weekly_cap, day_index / WINDOW_DAYS - 1);
            window = 0.0;
        }
        window += cost;
    }

    if window > 0.0 {
        total += flush(window, weekly_cap, day_costs.len().saturating_sub(1) / WINDOW_DAYS);
    }

    round_cents(total)
}

/// Spreads the weekly cap over the days of each window.
///
/// Days are billed in order until the window's allowance is used up; later
/// days in that window bill nothing. The result sums to
/// [`weekly_capped_total`] up to cent rounding.
pub fn weekly_capped_days(day_costs: &[f64], weekly_cap: f64) -> Vec<f64> {
    let mut allowance = weekly_cap;

    day_costs
        .iter()
        .enumerate()
        .map(|(day_index, cost)| {
            if day_index % WINDOW_DAYS == 0 {
                allowance = weekly_cap;
            }
            let billed = round_cents(cost.min(allowance).max(0.0));
            allowance -= billed;
            billed
        })
        .collect()
}

fn flush(window: f64, weekly_cap: f64, window_index: usize) -> f64 {
    let charged = window.min(weekly_cap);
    trace!(window_index, window, charged, "weekly window closed");
    charged
}
