//! HTTP adapter for the operator's public trip-cost estimate endpoint.
//!
//! Only used to generate reference fixtures; the rate engine never calls it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::fixtures::Scenario;
use crate::traits::ReferenceEstimateProvider;
use crate::trip::TIMESTAMP_FORMAT;

#[derive(Debug, Clone)]
pub struct ReferenceConfig {
    pub base_url: String,
    pub city_id: u32,
    /// Appended to the local timestamps, e.g. `-04:00`.
    pub utc_offset: String,
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://restapifrontoffice.reservauto.net".to_string(),
            city_id: 103,
            utc_offset: "-04:00".to_string(),
            language: "en".to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("estimate request failed: {0}")]
    Http(#[from] reqwest::Error),
}

/// One published estimate, reduced to the fields we compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEstimate {
    pub plan: String,
    pub rate: String,
    pub duration: f64,
    pub distance: f64,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct ReferenceClient {
    config: ReferenceConfig,
    client: reqwest::blocking::Client,
}

impl ReferenceClient {
    pub fn new(config: ReferenceConfig) -> Result<Self, ReferenceError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self { config, client })
    }

    fn url(&self) -> String {
        format!(
            "{}/api/v2/Billing/TripCostEstimate",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl ReferenceEstimateProvider for ReferenceClient {
    fn estimates_for(&self, scenario: &Scenario) -> Result<Vec<ReferenceEstimate>, ReferenceError> {
        let offset = &self.config.utc_offset;
        let start = format!("{}{offset}", scenario.start_date.format(TIMESTAMP_FORMAT));
        let end = format!("{}{offset}", scenario.end_date.format(TIMESTAMP_FORMAT));

        debug!(scenario = %scenario.scenario, "requesting reference estimates");

        let body = self
            .client
            .get(self.url())
            .query(&[
                ("CityId", self.config.city_id.to_string()),
                ("StartDate", start),
                ("EndDate", end),
                ("Distance", scenario.distance.to_string()),
                ("AcceptLanguage", self.config.language.clone()),
            ])
            .send()?
            .error_for_status()?
            .json::<EstimateResponse>()?;

        Ok(body
            .trip_package_cost_estimate_list
            .into_iter()
            .filter(|estimate| estimate.service_type == STATION_BASED)
            .map(|estimate| ReferenceEstimate {
                plan: estimate.localized_plan_type_name,
                rate: estimate.localized_billing_rate_name,
                duration: estimate.duration_cost,
                distance: estimate.distance_cost,
                total: estimate.total_cost,
            })
            .collect())
    }
}

const STATION_BASED: &str = "StationBased";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EstimateResponse {
    #[serde(default)]
    trip_package_cost_estimate_list: Vec<PackageEstimate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PackageEstimate {
    service_type: String,
    #[serde(default)]
    localized_plan_type_name: String,
    #[serde(default)]
    localized_billing_rate_name: String,
    #[serde(default)]
    duration_cost: f64,
    #[serde(default)]
    distance_cost: f64,
    #[serde(default)]
    total_cost: f64,
}
