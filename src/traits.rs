//! Seams to external collaborators.

use crate::fixtures::Scenario;
use crate::reference::{ReferenceError, ReferenceEstimate};

/// Source of published price estimates for a scenario.
///
/// The HTTP client in [`crate::reference`] is the production implementation;
/// tests can supply canned estimates.
pub trait ReferenceEstimateProvider {
    fn estimates_for(&self, scenario: &Scenario) -> Result<Vec<ReferenceEstimate>, ReferenceError>;
}
