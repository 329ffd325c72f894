//! carshare-rates
//!
//! Reproduces a car-sharing operator's published billing policy: per-plan
//! trip prices with daily and weekly caps, cross-plan reconciliation, and the
//! duration-based ancillary fee.

pub mod error;
pub mod money;
pub mod trip;
pub mod calendar;
pub mod plans;
pub mod weekly;
pub mod engine;
pub mod reconcile;
pub mod estimator;
pub mod fee;
pub mod traits;
pub mod reference;
pub mod fixtures;
pub mod harness;
pub mod annotate;

pub use engine::{PlanCostResult, RateTable};
pub use error::RateError;
pub use estimator::compute_rental_cost;
pub use fee::compute_fee;
pub use plans::{PlanCatalog, PlanId};
pub use trip::TripRequest;
