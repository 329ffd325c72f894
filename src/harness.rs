//! Compares computed prices against reference estimates.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::engine::RateTable;
use crate::error::RateError;
use crate::estimator::estimate;
use crate::fee::FeeSchedule;
use crate::fixtures::RateTestCase;
use crate::money::round_cents;
use crate::plans::{PlanCatalog, PlanId};
use crate::reconcile::Reconciliation;

#[derive(Debug, Clone)]
pub struct HarnessOptions {
    /// Largest absolute difference, in dollars, still counted as a match.
    pub tolerance: f64,
    /// Published plans we do not model.
    pub ignored_plans: Vec<String>,
}

impl Default for HarnessOptions {
    fn default() -> Self {
        Self {
            tolerance: 0.10,
            ignored_plans: vec!["Open Super".to_string()],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Amounts {
    pub duration: f64,
    pub distance: f64,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedAmounts {
    pub duration: f64,
    pub distance: f64,
    pub total: f64,
    pub reconciliation: Reconciliation,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanEvaluation {
    pub plan: String,
    pub expected: Amounts,
    /// `None` when the plan was not in the computed table.
    pub actual: Option<ComputedAmounts>,
    pub difference_expected_actual: Option<f64>,
    pub test_result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseEvaluation {
    pub scenario: String,
    pub test_evals: Vec<PlanEvaluation>,
    pub evals_result: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalSummary<K> {
    pub passed: Vec<K>,
    pub failed: Vec<K>,
    pub total: usize,
    pub pass: usize,
    pub fail: usize,
    pub pass_rate: f64,
}

impl<K> EvalSummary<K> {
    pub fn from_results(results: impl IntoIterator<Item = (K, bool)>) -> Self {
        let mut passed = Vec::new();
        let mut failed = Vec::new();
        for (key, ok) in results {
            if ok {
                passed.push(key);
            } else {
                failed.push(key);
            }
        }

        let total = passed.len() + failed.len();
        let pass_rate = if total == 0 {
            0.0
        } else {
            round_cents(passed.len() as f64 / total as f64)
        };

        Self {
            pass: passed.len(),
            fail: failed.len(),
            passed,
            failed,
            total,
            pass_rate,
        }
    }
}

fn evaluate_plan(
    expected: &crate::reference::ReferenceEstimate,
    table: &RateTable,
    options: &HarnessOptions,
) -> PlanEvaluation {
    let actual = PlanId::from_name(&expected.plan)
        .and_then(|id| table.get(&id))
        .map(|result| ComputedAmounts {
            duration: result.time_cost,
            distance: result.km_cost,
            total: result.total_cost,
            reconciliation: result.reconciliation,
        });

    if actual.is_none() {
        warn!(plan = %expected.plan, "reference plan has no computed counterpart");
    }

    let difference = actual
        .as_ref()
        .map(|actual| round_cents(actual.total - expected.total));

    PlanEvaluation {
        plan: expected.plan.clone(),
        expected: Amounts {
            duration: expected.duration,
            distance: expected.distance,
            total: expected.total,
        },
        actual,
        difference_expected_actual: difference,
        test_result: difference.is_some_and(|diff| diff.abs() < options.tolerance),
    }
}

/// Prices one reference case and compares every published plan.
pub fn evaluate_case(
    case: &RateTestCase,
    catalog: &PlanCatalog,
    options: &HarnessOptions,
) -> Result<CaseEvaluation, RateError> {
    let table = estimate(&case.scenario.trip()?, catalog)?;

    let test_evals: Vec<PlanEvaluation> = case
        .estimate_tests
        .iter()
        .filter(|estimate| !options.ignored_plans.contains(&estimate.plan))
        .map(|estimate| evaluate_plan(estimate, &table, options))
        .collect();

    Ok(CaseEvaluation {
        scenario: case.scenario.scenario.clone(),
        evals_result: test_evals.iter().all(|eval| eval.test_result),
        test_evals,
    })
}

pub fn evaluate_cases(
    cases: &[RateTestCase],
    catalog: &PlanCatalog,
    options: &HarnessOptions,
) -> Result<(Vec<CaseEvaluation>, EvalSummary<String>), RateError> {
    let evaluations = cases
        .iter()
        .map(|case| evaluate_case(case, catalog, options))
        .collect::<Result<Vec<_>, _>>()?;

    let summary = EvalSummary::from_results(
        evaluations
            .iter()
            .map(|eval| (eval.scenario.clone(), eval.evals_result)),
    );
    info!(
        pass = summary.pass,
        fail = summary.fail,
        pass_rate = summary.pass_rate,
        "rate cases evaluated"
    );

    Ok((evaluations, summary))
}

/// Checks `(minutes, expected fee)` pairs; fees must match to the cent.
pub fn evaluate_fees(
    schedule: &FeeSchedule,
    cases: &[(f64, f64)],
) -> Result<EvalSummary<f64>, RateError> {
    let results = cases
        .iter()
        .map(|&(minutes, expected)| {
            Ok((minutes, schedule.fee_for(minutes)? == round_cents(expected)))
        })
        .collect::<Result<Vec<_>, RateError>>()?;

    let summary = EvalSummary::from_results(results);
    info!(pass = summary.pass, fail = summary.fail, "fee cases evaluated");
    Ok(summary)
}
