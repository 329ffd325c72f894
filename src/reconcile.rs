//! Cross-plan reconciliation.
//!
//! Each plan is first priced on its own. The billed price is then the
//! cheapest rate the policy allows for that plan:
//!
//! 1. Value-family plans are never billed above Open Plus.
//! 2. Any non-baseline plan drops to the season's long-distance rate when
//!    that is cheaper.
//! 3. Value Extra drops to the workday rate when that is cheaper.
//!
//! Later passes may override earlier substitutions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calendar::Season;
use crate::engine::{PlanCostResult, RateTable};
use crate::error::RateError;
use crate::plans::PlanId;

/// Why a plan's billed price differs from its own computed price.
///
/// Serialized as its display string, e.g. `"switched to Open Plus"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Reconciliation {
    #[default]
    None,
    SwitchedToOpenPlus,
    SwitchedToLongDistance(Season),
    SwitchedToWorkday,
}

impl fmt::Display for Reconciliation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reconciliation::None => f.write_str("none"),
            Reconciliation::SwitchedToOpenPlus => f.write_str("switched to Open Plus"),
            Reconciliation::SwitchedToLongDistance(season) => {
                write!(f, "switched to Long Distance ({})", season.label())
            }
            Reconciliation::SwitchedToWorkday => f.write_str("switched to Workday"),
        }
    }
}

impl FromStr for Reconciliation {
    type Err = RateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Reconciliation::None),
            "switched to Open Plus" => Ok(Reconciliation::SwitchedToOpenPlus),
            "switched to Long Distance (low season)" => {
                Ok(Reconciliation::SwitchedToLongDistance(Season::Low))
            }
            "switched to Long Distance (high season)" => {
                Ok(Reconciliation::SwitchedToLongDistance(Season::High))
            }
            "switched to Workday" => Ok(Reconciliation::SwitchedToWorkday),
            other => Err(RateError::InvalidInput(format!(
                "unknown reconciliation {other:?}"
            ))),
        }
    }
}

impl From<Reconciliation> for String {
    fn from(reason: Reconciliation) -> Self {
        reason.to_string()
    }
}

impl TryFrom<String> for Reconciliation {
    type Error = RateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Replaces each plan's raw cost with the price the policy actually bills.
///
/// `base` must hold Open and Open Plus. Substituted entries are copies of
/// the alternative plan's base result, tagged with the reason.
pub fn reconcile(base: &RateTable) -> Result<RateTable, RateError> {
    for anchor in [PlanId::Open, PlanId::OpenPlus] {
        if !base.contains_key(&anchor) {
            return Err(RateError::MissingBaselinePlan(anchor));
        }
    }

    let mut reconciled = open_plus_pass(base)?;
    long_distance_pass(base, &mut reconciled);
    workday_pass(base, &mut reconciled);

    Ok(reconciled)
}

fn substitute(source: &PlanCostResult, reason: Reconciliation) -> PlanCostResult {
    PlanCostResult {
        reconciliation: reason,
        ..source.clone()
    }
}

fn open_plus_pass(base: &RateTable) -> Result<RateTable, RateError> {
    let open_plus = base
        .get(&PlanId::OpenPlus)
        .ok_or(RateError::MissingBaselinePlan(PlanId::OpenPlus))?;

    let mut reconciled = RateTable::new();
    for (&id, result) in base {
        let entry = if id.is_baseline() || result.total_cost < open_plus.total_cost {
            substitute(result, Reconciliation::None)
        } else {
            debug!(
                plan = %id,
                own = result.total_cost,
                open_plus = open_plus.total_cost,
                "billing as Open Plus"
            );
            substitute(open_plus, Reconciliation::SwitchedToOpenPlus)
        };
        reconciled.insert(id, entry);
    }

    Ok(reconciled)
}

fn long_distance_pass(base: &RateTable, reconciled: &mut RateTable) {
    for (&id, current) in reconciled.iter_mut() {
        if id.is_baseline() {
            continue;
        }

        for season in [Season::Low, Season::High] {
            let Some(long_distance) = base.get(&PlanId::long_distance(season)) else {
                continue;
            };
            if current.total_cost > long_distance.total_cost {
                debug!(
                    plan = %id,
                    own = current.total_cost,
                    long_distance = long_distance.total_cost,
                    ?season,
                    "billing as long distance"
                );
                *current = substitute(
                    long_distance,
                    Reconciliation::SwitchedToLongDistance(season),
                );
                break;
            }
        }
    }
}

fn workday_pass(base: &RateTable, reconciled: &mut RateTable) {
    let Some(workday) = base.get(&PlanId::Workday) else {
        return;
    };
    let Some(current) = reconciled.get_mut(&PlanId::ValueExtra) else {
        return;
    };

    if current.total_cost > workday.total_cost {
        debug!(
            own = current.total_cost,
            workday = workday.total_cost,
            "billing Value Extra as workday"
        );
        *current = substitute(workday, Reconciliation::SwitchedToWorkday);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(priced_as: PlanId, total: f64) -> PlanCostResult {
        PlanCostResult {
            priced_as,
            time_cost: total,
            km_cost: 0.0,
            total_cost: total,
            day_by_day: Vec::new(),
            reconciliation: Reconciliation::None,
        }
    }

    fn table(entries: &[(PlanId, f64)]) -> RateTable {
        entries.iter().map(|&(id, total)| (id, result(id, total))).collect()
    }

    #[test]
    fn missing_baseline_is_an_error() {
        let base = table(&[(PlanId::Open, 10.0), (PlanId::Value, 5.0)]);
        assert!(matches!(
            reconcile(&base),
            Err(RateError::MissingBaselinePlan(PlanId::OpenPlus))
        ));
    }

    #[test]
    fn value_plan_at_or_above_open_plus_is_switched() {
        let base = table(&[
            (PlanId::Open, 30.0),
            (PlanId::OpenPlus, 20.0),
            (PlanId::Value, 20.0),
            (PlanId::ValuePlus, 19.99),
        ]);
        let out = reconcile(&base).unwrap();

        assert_eq!(out[&PlanId::Value].total_cost, 20.0);
        assert_eq!(out[&PlanId::Value].priced_as, PlanId::OpenPlus);
        assert_eq!(out[&PlanId::Value].reconciliation, Reconciliation::SwitchedToOpenPlus);
        assert_eq!(out[&PlanId::ValuePlus].reconciliation, Reconciliation::None);
        // Open Plus itself is untouched by the substitution
        assert_eq!(out[&PlanId::OpenPlus].reconciliation, Reconciliation::None);
        assert_eq!(out[&PlanId::Open].total_cost, 30.0);
    }

    #[test]
    fn long_distance_overrides_open_plus_switch() {
        let base = table(&[
            (PlanId::Open, 300.0),
            (PlanId::OpenPlus, 250.0),
            (PlanId::Value, 260.0),
            (PlanId::LongDistanceLow, 200.0),
        ]);
        let out = reconcile(&base).unwrap();

        assert_eq!(out[&PlanId::Value].total_cost, 200.0);
        assert_eq!(
            out[&PlanId::Value].reconciliation,
            Reconciliation::SwitchedToLongDistance(Season::Low)
        );
        assert_eq!(out[&PlanId::Open].total_cost, 300.0);
        assert_eq!(out[&PlanId::OpenPlus].total_cost, 250.0);
        assert_eq!(out[&PlanId::LongDistanceLow].reconciliation, Reconciliation::None);
    }

    #[test]
    fn workday_only_applies_to_value_extra() {
        let base = table(&[
            (PlanId::Open, 60.0),
            (PlanId::OpenPlus, 50.0),
            (PlanId::ValuePlus, 40.0),
            (PlanId::ValueExtra, 40.0),
            (PlanId::Workday, 30.0),
        ]);
        let out = reconcile(&base).unwrap();

        assert_eq!(out[&PlanId::ValueExtra].total_cost, 30.0);
        assert_eq!(out[&PlanId::ValueExtra].reconciliation, Reconciliation::SwitchedToWorkday);
        assert_eq!(out[&PlanId::ValuePlus].total_cost, 40.0);
        assert_eq!(out[&PlanId::ValuePlus].reconciliation, Reconciliation::None);
    }

    #[test]
    fn tags_render_like_invoices() {
        assert_eq!(Reconciliation::None.to_string(), "none");
        assert_eq!(
            Reconciliation::SwitchedToLongDistance(Season::High).to_string(),
            "switched to Long Distance (high season)"
        );
    }

    #[test]
    fn serializes_as_display_string() {
        let reason = Reconciliation::SwitchedToLongDistance(Season::Low);
        let json = serde_json::to_string(&reason).unwrap();
        assert_eq!(json, r#""switched to Long Distance (low season)""#);
        assert_eq!(serde_json::from_str::<Reconciliation>(&json).unwrap(), reason);

        assert_eq!(
            serde_json::to_string(&Reconciliation::SwitchedToOpenPlus).unwrap(),
            r#""switched to Open Plus""#
        );
        assert!(serde_json::from_str::<Reconciliation>(r#""switched to Open Mega""#).is_err());
    }
}
