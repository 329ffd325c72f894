//! Plan catalog: rate tables and eligibility rules for each subscription plan.

use std::fmt;

use chrono::{Datelike, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

use crate::calendar::Season;

/// Plan identifiers, declared in reconciliation precedence order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PlanId {
    Open,
    OpenPlus,
    Value,
    ValuePlus,
    ValueExtra,
    LongDistanceLow,
    LongDistanceHigh,
    Workday,
}

impl PlanId {
    pub const ALL: [PlanId; 8] = [
        PlanId::Open,
        PlanId::OpenPlus,
        PlanId::Value,
        PlanId::ValuePlus,
        PlanId::ValueExtra,
        PlanId::LongDistanceLow,
        PlanId::LongDistanceHigh,
        PlanId::Workday,
    ];

    /// Plans a member can subscribe to (the rest only exist as alternate rates).
    pub const SUBSCRIBABLE: [PlanId; 5] = [
        PlanId::Open,
        PlanId::OpenPlus,
        PlanId::Value,
        PlanId::ValuePlus,
        PlanId::ValueExtra,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            PlanId::Open => "Open",
            PlanId::OpenPlus => "Open Plus",
            PlanId::Value => "Value",
            PlanId::ValuePlus => "Value Plus",
            PlanId::ValueExtra => "Value Extra",
            PlanId::LongDistanceLow => "Long Distance (low season)",
            PlanId::LongDistanceHigh => "Long Distance (high season)",
            PlanId::Workday => "Workday",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|plan| plan.name() == name.trim())
    }

    /// Open and Open Plus keep their own price through reconciliation.
    pub fn is_baseline(&self) -> bool {
        matches!(self, PlanId::Open | PlanId::OpenPlus)
    }

    pub fn long_distance(season: Season) -> Self {
        match season {
            Season::Low => PlanId::LongDistanceLow,
            Season::High => PlanId::LongDistanceHigh,
        }
    }
}

impl fmt::Display for PlanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Shape of a plan's per-day maximum.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DailyCap {
    /// Same cap every day.
    Flat(f64),
    /// One cap for the first day, another from the second day on.
    Tiered { first_day: f64, additional_day: f64 },
    /// First/additional day caps plus a cap per 7-day window.
    Weekly {
        first_day: f64,
        additional_day: f64,
        weekly: f64,
    },
}

impl DailyCap {
    /// Base cap (before weekend surcharge) for the day at `day_index`.
    pub fn base_for(&self, day_index: usize) -> f64 {
        match *self {
            DailyCap::Flat(cap) => cap,
            DailyCap::Tiered {
                first_day,
                additional_day,
            }
            | DailyCap::Weekly {
                first_day,
                additional_day,
                ..
            } => {
                if day_index == 0 {
                    first_day
                } else {
                    additional_day
                }
            }
        }
    }

    pub fn weekly(&self) -> Option<f64> {
        match *self {
            DailyCap::Weekly { weekly, .. } => Some(weekly),
            _ => None,
        }
    }
}

/// Two-tier distance pricing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KmTiers {
    pub first_rate: f64,
    pub second_rate: f64,
    /// Distance at which `second_rate` takes over; `None` means never.
    pub threshold: Option<f64>,
}

impl KmTiers {
    pub fn flat(rate: f64) -> Self {
        Self {
            first_rate: rate,
            second_rate: rate,
            threshold: None,
        }
    }

    pub fn tiered(first_rate: f64, threshold: f64, second_rate: f64) -> Self {
        Self {
            first_rate,
            second_rate,
            threshold: Some(threshold),
        }
    }
}

/// Predicate over a trip's `(start, end)`.
pub type TripPredicate = fn(NaiveDateTime, NaiveDateTime) -> bool;

/// Whether a plan applies to a given trip.
#[derive(Clone, Copy)]
pub enum Eligibility {
    Always,
    Predicate(TripPredicate),
}

impl Eligibility {
    pub fn allows(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match self {
            Eligibility::Always => true,
            Eligibility::Predicate(predicate) => predicate(start, end),
        }
    }
}

impl fmt::Debug for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::Always => f.write_str("Always"),
            Eligibility::Predicate(_) => f.write_str("Predicate(..)"),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct PlanConfig {
    pub id: PlanId,
    pub hourly_rate: f64,
    pub daily_cap: DailyCap,
    pub km: KmTiers,
    pub eligibility: Eligibility,
}

/// Weekend surcharges added on Saturdays and Sundays.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Surcharges {
    pub weekend_hourly: f64,
    pub weekend_daily: f64,
}

impl Default for Surcharges {
    fn default() -> Self {
        Self {
            weekend_hourly: 0.35,
            weekend_daily: 3.5,
        }
    }
}

/// An immutable set of plans valid for one policy epoch.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: Vec<PlanConfig>,
    pub surcharges: Surcharges,
}

impl PlanCatalog {
    /// Builds a catalog; entries are kept in precedence order whatever the
    /// input order, and a later duplicate replaces an earlier one.
    pub fn new(plans: Vec<PlanConfig>, surcharges: Surcharges) -> Self {
        let mut sorted: Vec<PlanConfig> = Vec::with_capacity(plans.len());
        for plan in plans {
            match sorted.iter_mut().find(|existing| existing.id == plan.id) {
                Some(existing) => *existing = plan,
                None => sorted.push(plan),
            }
        }
        sorted.sort_by_key(|plan| plan.id);
        Self {
            plans: sorted,
            surcharges,
        }
    }

    /// Rates in effect from May 2025.
    pub fn rates_2025() -> Self {
        let plans = vec![
            PlanConfig {
                id: PlanId::Open,
                hourly_rate: 13.0,
                daily_cap: DailyCap::Flat(55.0),
                km: KmTiers::tiered(0.0, 75.0, 0.30),
                eligibility: Eligibility::Always,
            },
            PlanConfig {
                id: PlanId::OpenPlus,
                hourly_rate: 7.5,
                daily_cap: DailyCap::Tiered {
                    first_day: 50.0,
                    additional_day: 35.0,
                },
                km: KmTiers::flat(0.25),
                eligibility: Eligibility::Always,
            },
            PlanConfig {
                id: PlanId::Value,
                hourly_rate: 4.5,
                daily_cap: DailyCap::Flat(35.0),
                km: KmTiers::tiered(0.47, 50.0, 0.34),
                eligibility: Eligibility::Always,
            },
            PlanConfig {
                id: PlanId::ValuePlus,
                hourly_rate: 3.9,
                daily_cap: DailyCap::Flat(29.0),
                km: KmTiers::tiered(0.38, 50.0, 0.30),
                eligibility: Eligibility::Always,
            },
            PlanConfig {
                id: PlanId::ValueExtra,
                hourly_rate: 3.6,
                daily_cap: DailyCap::Flat(25.0),
                km: KmTiers::flat(0.30),
                eligibility: Eligibility::Always,
            },
            PlanConfig {
                id: PlanId::LongDistanceLow,
                hourly_rate: 15.0,
                daily_cap: DailyCap::Weekly {
                    first_day: 41.0,
                    additional_day: 32.0,
                    weekly: 195.0,
                },
                km: KmTiers::tiered(0.24, 300.0, 0.15),
                eligibility: Eligibility::Predicate(starts_in_low_season),
            },
            PlanConfig {
                id: PlanId::LongDistanceHigh,
                hourly_rate: 15.0,
                daily_cap: DailyCap::Weekly {
                    first_day: 55.0,
                    additional_day: 45.0,
                    weekly: 240.0,
                },
                km: KmTiers::tiered(0.24, 300.0, 0.15),
                eligibility: Eligibility::Predicate(starts_in_high_season),
            },
            PlanConfig {
                id: PlanId::Workday,
                hourly_rate: 23.0,
                daily_cap: DailyCap::Flat(23.0),
                km: KmTiers::tiered(0.0, 40.0, 0.35),
                eligibility: Eligibility::Predicate(is_workday_trip),
            },
        ];

        Self::new(plans, Surcharges::default())
    }

    pub fn plans(&self) -> &[PlanConfig] {
        &self.plans
    }

    pub fn get(&self, id: PlanId) -> Option<&PlanConfig> {
        self.plans.iter().find(|plan| plan.id == id)
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::rates_2025()
    }
}

/// Longest trip, in wall-clock hours, that qualifies for the workday rate.
pub const WORKDAY_MAX_HOURS: f64 = 10.0;

pub fn starts_in_low_season(start: NaiveDateTime, _end: NaiveDateTime) -> bool {
    Season::of(start.date()) == Season::Low
}

pub fn starts_in_high_season(start: NaiveDateTime, _end: NaiveDateTime) -> bool {
    Season::of(start.date()) == Season::High
}

/// Starts Monday to Friday and lasts at most [`WORKDAY_MAX_HOURS`].
pub fn is_workday_trip(start: NaiveDateTime, end: NaiveDateTime) -> bool {
    if matches!(start.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let hours = (end - start).num_milliseconds().abs() as f64 / 3_600_000.0;
    hours <= WORKDAY_MAX_HOURS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trip::parse_timestamp;

    #[test]
    fn catalog_is_in_precedence_order() {
        let ids: Vec<PlanId> = PlanCatalog::default().plans().iter().map(|p| p.id).collect();
        assert_eq!(ids, PlanId::ALL.to_vec());
    }

    #[test]
    fn new_sorts_and_dedupes() {
        let base = PlanCatalog::default();
        let open = *base.get(PlanId::Open).unwrap();
        let value = *base.get(PlanId::Value).unwrap();
        let cheaper_open = PlanConfig {
            hourly_rate: 12.0,
            ..open
        };

        let catalog = PlanCatalog::new(vec![value, open, cheaper_open], Surcharges::default());
        let ids: Vec<PlanId> = catalog.plans().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![PlanId::Open, PlanId::Value]);
        assert_eq!(catalog.get(PlanId::Open).unwrap().hourly_rate, 12.0);
    }

    #[test]
    fn names_round_trip() {
        for id in PlanId::ALL {
            assert_eq!(PlanId::from_name(id.name()), Some(id));
        }
        assert_eq!(PlanId::from_name("Open Super"), None);
    }

    #[test]
    fn tiered_cap_switches_after_first_day() {
        let cap = DailyCap::Tiered {
            first_day: 50.0,
            additional_day: 35.0,
        };
        assert_eq!(cap.base_for(0), 50.0);
        assert_eq!(cap.base_for(1), 35.0);
        assert_eq!(cap.base_for(9), 35.0);
        assert_eq!(cap.weekly(), None);
    }

    #[test]
    fn workday_requires_weekday_start() {
        // 2025-08-09 is a Saturday
        let sat = parse_timestamp("2025-08-09T09:00:00").unwrap();
        let sat_end = parse_timestamp("2025-08-09T12:00:00").unwrap();
        assert!(!is_workday_trip(sat, sat_end));

        let thu = parse_timestamp("2025-08-07T08:00:00").unwrap();
        assert!(is_workday_trip(thu, parse_timestamp("2025-08-07T18:00:00").unwrap()));
        assert!(!is_workday_trip(thu, parse_timestamp("2025-08-07T18:15:00").unwrap()));
        assert!(!is_workday_trip(thu, parse_timestamp("2025-08-07T18:00:00.500").unwrap()));
    }

    #[test]
    fn seasons_are_exclusive() {
        let start = parse_timestamp("2025-06-15T00:00:00").unwrap();
        assert!(starts_in_high_season(start, start));
        assert!(!starts_in_low_season(start, start));
    }
}
