//! Test fixtures for carshare-rates.
//!
//! Provides:
//! - Trip builders
//! - Canned reference estimates for the default weekday scenarios
//! - An in-memory `ReferenceEstimateProvider`

#![allow(dead_code)]

use std::collections::HashMap;

use carshare_rates::fixtures::Scenario;
use carshare_rates::reference::{ReferenceError, ReferenceEstimate};
use carshare_rates::traits::ReferenceEstimateProvider;
use carshare_rates::TripRequest;

pub fn trip(start: &str, end: &str, km: f64) -> TripRequest {
    TripRequest::parse(start, end, km).expect("valid trip")
}

pub fn estimate(plan: &str, duration: f64, distance: f64, total: f64) -> ReferenceEstimate {
    ReferenceEstimate {
        plan: plan.to_string(),
        rate: "Regular".to_string(),
        duration,
        distance,
        total,
    }
}

/// Published prices for the default scenarios (2025-08-07, a Thursday).
pub fn published_estimates() -> HashMap<&'static str, Vec<ReferenceEstimate>> {
    let mut map = HashMap::new();

    map.insert(
        "1.00h weekday, 60km",
        vec![
            estimate("Open", 13.0, 0.0, 13.0),
            estimate("Open Plus", 7.5, 15.0, 22.5),
            estimate("Value", 7.5, 15.0, 22.5),
            estimate("Value Plus", 7.5, 15.0, 22.5),
            estimate("Value Extra", 3.6, 18.0, 21.6),
            estimate("Open Super", 9.0, 0.0, 9.0),
        ],
    );
    map.insert(
        "2.25h weekday, 30km",
        vec![
            estimate("Open", 29.25, 0.0, 29.25),
            estimate("Open Plus", 16.88, 7.5, 24.38),
            estimate("Value", 10.13, 14.1, 24.23),
            estimate("Value Extra", 8.1, 9.0, 17.1),
        ],
    );
    map.insert(
        "5.00h weekday, 10km",
        vec![
            estimate("Open", 55.0, 0.0, 55.0),
            estimate("Open Plus", 37.5, 2.5, 40.0),
            estimate("Value", 22.5, 4.7, 27.2),
            estimate("Value Plus", 19.5, 3.8, 23.3),
            estimate("Value Extra", 18.0, 3.0, 21.0),
        ],
    );
    map.insert(
        "8.00h weekday, 70km",
        vec![
            estimate("Open", 55.0, 0.0, 55.0),
            estimate("Open Plus", 50.0, 17.5, 67.5),
            estimate("Value", 35.0, 30.3, 65.3),
            estimate("Value Plus", 29.0, 25.0, 54.0),
            // billed at the workday rate
            estimate("Value Extra", 23.0, 10.5, 33.5),
        ],
    );

    map
}

/// Serves canned estimates keyed by scenario label.
pub struct CannedProvider {
    pub estimates: HashMap<&'static str, Vec<ReferenceEstimate>>,
}

impl CannedProvider {
    pub fn published() -> Self {
        Self {
            estimates: published_estimates(),
        }
    }
}

impl ReferenceEstimateProvider for CannedProvider {
    fn estimates_for(&self, scenario: &Scenario) -> Result<Vec<ReferenceEstimate>, ReferenceError> {
        Ok(self
            .estimates
            .get(scenario.scenario.as_str())
            .cloned()
            .unwrap_or_default())
    }
}
