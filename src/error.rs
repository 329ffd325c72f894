//! Error taxonomy for the rate engine.

use chrono::NaiveDateTime;

use crate::plans::PlanId;

/// Failures surfaced by the rate engine.
///
/// All variants are local precondition failures. The engine is deterministic,
/// so none of them are worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum RateError {
    /// The rental interval is empty or reversed.
    #[error("invalid range: end {end} is not after start {start}")]
    InvalidRange {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },

    /// A numeric input is negative or not finite.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Reconciliation needs both baseline plans in the base cost table.
    #[error("baseline plan {0} missing from cost table")]
    MissingBaselinePlan(PlanId),

    /// A timestamp could not be parsed as local wall-clock time.
    #[error("cannot parse timestamp {value:?}: {source}")]
    Parse {
        value: String,
        #[source]
        source: chrono::ParseError,
    },
}
