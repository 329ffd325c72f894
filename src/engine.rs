//! Per-plan cost computation (time and distance) for a single trip.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::calendar::{segment_days, DaySegment};
use crate::money::round_cents;
use crate::plans::{KmTiers, PlanCatalog, PlanConfig, PlanId, Surcharges};
use crate::reconcile::Reconciliation;
use crate::trip::TripRequest;
use crate::weekly::{weekly_capped_days, weekly_capped_total};

/// Cost table keyed by plan, iterated in precedence order.
pub type RateTable = BTreeMap<PlanId, PlanCostResult>;

/// What one calendar day costs under one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCost {
    pub date: NaiveDate,
    pub hours: f64,
    pub is_weekend: bool,
    pub hourly_rate: f64,
    pub daily_cap: f64,
    pub hourly_cost: f64,
    /// `min(hourly_cost, daily_cap)`, in cents.
    pub day_capped_cost: f64,
    /// What this day bills once every cap applies. Equal to
    /// `day_capped_cost` except under a weekly cap, where a window's days
    /// bill in order until the cap is used up.
    pub actual_cost: f64,
}

/// Cost of a trip under one plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanCostResult {
    /// Plan whose rates produced these numbers (differs from the table key
    /// after a substitution).
    pub priced_as: PlanId,
    pub time_cost: f64,
    pub km_cost: f64,
    pub total_cost: f64,
    pub day_by_day: Vec<DayCost>,
    pub reconciliation: Reconciliation,
}

/// Prices one calendar day under `plan`.
pub fn day_cost(
    plan: &PlanConfig,
    surcharges: &Surcharges,
    day: &DaySegment,
    day_index: usize,
) -> DayCost {
    let (hourly_rate, daily_cap) = if day.is_weekend {
        (
            plan.hourly_rate + surcharges.weekend_hourly,
            plan.daily_cap.base_for(day_index) + surcharges.weekend_daily,
        )
    } else {
        (plan.hourly_rate, plan.daily_cap.base_for(day_index))
    };

    let hourly_cost = day.billable_hours * hourly_rate;

    DayCost {
        date: day.date,
        hours: day.billable_hours,
        is_weekend: day.is_weekend,
        hourly_rate,
        daily_cap,
        hourly_cost: round_cents(hourly_cost),
        day_capped_cost: round_cents(hourly_cost.min(daily_cap)),
        actual_cost: round_cents(hourly_cost.min(daily_cap)),
    }
}

/// Tiered distance charge.
pub fn km_cost(km: &KmTiers, distance_km: f64) -> f64 {
    let raw = match km.threshold {
        Some(threshold) if distance_km > threshold => {
            threshold * km.first_rate + (distance_km - threshold) * km.second_rate
        }
        _ => distance_km * km.first_rate,
    };
    round_cents(raw)
}

/// Prices a pre-segmented trip under one plan, ignoring eligibility.
pub fn plan_cost(
    plan: &PlanConfig,
    surcharges: &Surcharges,
    segments: &[DaySegment],
    distance_km: f64,
) -> PlanCostResult {
    let mut day_by_day: Vec<DayCost> = segments
        .iter()
        .enumerate()
        .map(|(day_index, day)| day_cost(plan, surcharges, day, day_index))
        .collect();

    let time_cost = match plan.daily_cap.weekly() {
        Some(weekly_cap) => {
            let costs: Vec<f64> = day_by_day.iter().map(|day| day.day_capped_cost).collect();
            let billed = weekly_capped_days(&costs, weekly_cap);
            for (day, amount) in day_by_day.iter_mut().zip(billed) {
                day.actual_cost = amount;
            }
            weekly_capped_total(&costs, weekly_cap)
        }
        None => round_cents(day_by_day.iter().map(|day| day.actual_cost).sum()),
    };
    let km_cost = km_cost(&plan.km, distance_km);

    trace!(plan = %plan.id, time_cost, km_cost, "plan priced");

    PlanCostResult {
        priced_as: plan.id,
        time_cost,
        km_cost,
        total_cost: round_cents(time_cost + km_cost),
        day_by_day,
        reconciliation: Reconciliation::None,
    }
}

/// Prices a trip under every eligible plan of the catalog.
///
/// Ineligible plans are left out of the table.
pub fn compute_base_costs(
    catalog: &PlanCatalog,
    trip: &TripRequest,
) -> Result<RateTable, crate::error::RateError> {
    let segments = segment_days(trip.start(), trip.end())?;
    let mut table = RateTable::new();

    for plan in catalog.plans() {
        if !plan.eligibility.allows(trip.start(), trip.end()) {
            debug!(plan = %plan.id, "trip not eligible, skipping plan");
            continue;
        }
        table.insert(
            plan.id,
            plan_cost(plan, &catalog.surcharges, &segments, trip.distance_km()),
        );
    }

    Ok(table)
}
