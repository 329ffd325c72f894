//! Entry points: price a trip under every plan and reconcile.

use rayon::prelude::*;
use tracing::debug;

use crate::engine::{compute_base_costs, RateTable};
use crate::error::RateError;
use crate::plans::PlanCatalog;
use crate::reconcile::reconcile;
use crate::trip::TripRequest;

/// Billed price per plan under an explicit catalog.
pub fn estimate(trip: &TripRequest, catalog: &PlanCatalog) -> Result<RateTable, RateError> {
    let base = compute_base_costs(catalog, trip)?;
    debug!(
        start = %trip.start(),
        end = %trip.end(),
        km = trip.distance_km(),
        plans = base.len(),
        "base costs computed"
    );
    reconcile(&base)
}

/// Billed price per plan under the current catalog.
pub fn compute_rental_cost(trip: &TripRequest) -> Result<RateTable, RateError> {
    estimate(trip, &PlanCatalog::default())
}

/// Prices many trips in parallel. Output order follows input order.
pub fn estimate_batch(
    trips: &[TripRequest],
    catalog: &PlanCatalog,
) -> Vec<Result<RateTable, RateError>> {
    trips.par_iter().map(|trip| estimate(trip, catalog)).collect()
}
