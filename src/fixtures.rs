//! Reference rate test cases: scenarios paired with published estimates.

use std::fs;
use std::path::Path;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::RateError;
use crate::reference::{ReferenceError, ReferenceEstimate};
use crate::traits::ReferenceEstimateProvider;
use crate::trip::{parse_timestamp, TripRequest};

/// A trip to price, with a human-readable label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scenario {
    pub scenario: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub distance: f64,
}

impl Scenario {
    pub fn new(label: &str, start: &str, end: &str, distance: f64) -> Result<Self, RateError> {
        Ok(Self {
            scenario: label.to_string(),
            start_date: parse_timestamp(start)?,
            end_date: parse_timestamp(end)?,
            distance,
        })
    }

    pub fn trip(&self) -> Result<TripRequest, RateError> {
        TripRequest::new(self.start_date, self.end_date, self.distance)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateTestCase {
    #[serde(flatten)]
    pub scenario: Scenario,
    pub estimate_tests: Vec<ReferenceEstimate>,
}

#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error("fixture io: {0}")]
    Io(#[from] std::io::Error),
    #[error("fixture json: {0}")]
    Json(#[from] serde_json::Error),
    #[error(transparent)]
    Reference(#[from] ReferenceError),
    #[error(transparent)]
    Rate(#[from] RateError),
}

/// Weekday scenarios checked against the published estimates.
pub fn default_scenarios() -> Result<Vec<Scenario>, RateError> {
    [
        ("1.00h weekday, 60km", "2025-08-07T10:00:00", "2025-08-07T11:00:00", 60.0),
        ("2.25h weekday, 30km", "2025-08-07T10:00:00", "2025-08-07T12:15:00", 30.0),
        ("5.00h weekday, 10km", "2025-08-07T10:00:00", "2025-08-07T15:00:00", 10.0),
        ("8.00h weekday, 70km", "2025-08-07T10:00:00", "2025-08-07T18:00:00", 70.0),
    ]
    .into_iter()
    .map(|(label, start, end, km)| Scenario::new(label, start, end, km))
    .collect()
}

pub fn build_test_case<P>(provider: &P, scenario: Scenario) -> Result<RateTestCase, FixtureError>
where
    P: ReferenceEstimateProvider,
{
    let estimate_tests = provider.estimates_for(&scenario)?;
    Ok(RateTestCase {
        scenario,
        estimate_tests,
    })
}

/// Fetches estimates for all scenarios concurrently, keeping input order.
pub fn build_test_cases<P>(
    provider: &P,
    scenarios: Vec<Scenario>,
) -> Result<Vec<RateTestCase>, FixtureError>
where
    P: ReferenceEstimateProvider + Sync,
{
    scenarios
        .into_par_iter()
        .map(|scenario| build_test_case(provider, scenario))
        .collect()
}

pub fn load_test_cases(path: &Path) -> Result<Vec<RateTestCase>, FixtureError> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn save_test_cases(path: &Path, cases: &[RateTestCase]) -> Result<(), FixtureError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(cases)?)?;
    info!(count = cases.len(), path = %path.display(), "wrote rate test cases");
    Ok(())
}

/// Reads a list of scenario labels to restrict a run to. An empty file
/// means no restriction.
pub fn load_overrides(path: &Path) -> Result<Vec<String>, FixtureError> {
    let text = fs::read_to_string(path)?;
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(&text)?)
}

/// Keeps only the overridden scenarios, or everything when `overrides` is empty.
pub fn select_scenarios(cases: Vec<RateTestCase>, overrides: &[String]) -> Vec<RateTestCase> {
    if overrides.is_empty() {
        return cases;
    }
    cases
        .into_iter()
        .filter(|case| overrides.contains(&case.scenario.scenario))
        .collect()
}
