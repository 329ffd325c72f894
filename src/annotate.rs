//! Annotates a trip sheet (CSV) with estimated prices per plan and the fee.

use std::io::{Read, Write};

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::RateError;
use crate::estimator::estimate;
use crate::fee::FeeSchedule;
use crate::money::round_cents;
use crate::plans::{PlanCatalog, PlanId};
use crate::trip::TripRequest;

#[derive(Debug, Clone)]
pub struct AnnotateOptions {
    pub start_column: String,
    pub end_column: String,
    pub distance_column: String,
    /// Billed minutes; the fee column is only written when this exists.
    pub minutes_column: String,
    pub fee_column: String,
    pub plans: Vec<PlanId>,
    /// `(minuend, subtrahend)` pairs written as `diff_<a>_to_<b>`.
    pub differences: Vec<(PlanId, PlanId)>,
    /// Only append the fee. Trip columns are not read and the minutes
    /// column becomes required.
    pub fees_only: bool,
}

impl Default for AnnotateOptions {
    fn default() -> Self {
        Self {
            start_column: "date_start".to_string(),
            end_column: "date_end_billed".to_string(),
            distance_column: "distance_km".to_string(),
            minutes_column: "duration_min".to_string(),
            fee_column: "fees_dpf_calc".to_string(),
            plans: PlanId::SUBSCRIBABLE.to_vec(),
            differences: vec![
                (PlanId::Value, PlanId::ValuePlus),
                (PlanId::Value, PlanId::ValueExtra),
            ],
            fees_only: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    #[error("csv: {0}")]
    Csv(#[from] csv::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("missing column {0:?}")]
    MissingColumn(String),
    #[error("row {row}: cannot read {column} value {value:?}")]
    BadNumber {
        row: usize,
        column: String,
        value: String,
    },
    #[error("row {row}: {source}")]
    Rate {
        row: usize,
        #[source]
        source: RateError,
    },
}

/// Column name for a plan's estimate, e.g. `cost_est_value_plus`.
pub fn cost_column(plan: PlanId) -> String {
    format!("cost_est_{}", snake(plan))
}

pub fn difference_column(a: PlanId, b: PlanId) -> String {
    format!("diff_{}_to_{}", snake(a), snake(b))
}

fn snake(plan: PlanId) -> String {
    plan.name().to_lowercase().replace(' ', "_")
}

struct TripColumns {
    start: usize,
    end: usize,
    distance: usize,
}

struct Columns {
    /// `None` in fee-only mode.
    trip: Option<TripColumns>,
    minutes: Option<usize>,
}

impl Columns {
    fn locate(headers: &StringRecord, options: &AnnotateOptions) -> Result<Self, AnnotateError> {
        let find = |name: &str| headers.iter().position(|header| header == name);
        let require = |name: &str| {
            find(name).ok_or_else(|| AnnotateError::MissingColumn(name.to_string()))
        };

        if options.fees_only {
            return Ok(Self {
                trip: None,
                minutes: Some(require(&options.minutes_column)?),
            });
        }

        Ok(Self {
            trip: Some(TripColumns {
                start: require(&options.start_column)?,
                end: require(&options.end_column)?,
                distance: require(&options.distance_column)?,
            }),
            minutes: find(&options.minutes_column),
        })
    }
}

fn number(
    record: &StringRecord,
    index: usize,
    column: &str,
    row: usize,
) -> Result<f64, AnnotateError> {
    let raw = record.get(index).unwrap_or_default().trim();
    raw.parse::<f64>().map_err(|_| AnnotateError::BadNumber {
        row,
        column: column.to_string(),
        value: raw.to_string(),
    })
}

/// Like [`number`], but a blank cell reads as zero.
fn number_or_zero(
    record: &StringRecord,
    index: usize,
    column: &str,
    row: usize,
) -> Result<f64, AnnotateError> {
    if record.get(index).unwrap_or_default().trim().is_empty() {
        return Ok(0.0);
    }
    number(record, index, column, row)
}

fn annotate_row(
    record: &StringRecord,
    row: usize,
    columns: &Columns,
    catalog: &PlanCatalog,
    fees: &FeeSchedule,
    options: &AnnotateOptions,
) -> Result<Vec<String>, AnnotateError> {
    let rate_err = |source: RateError| AnnotateError::Rate { row, source };

    let mut out: Vec<String> = record.iter().map(str::to_string).collect();

    if let Some(trip_columns) = &columns.trip {
        let distance = number(record, trip_columns.distance, &options.distance_column, row)?;
        let trip = TripRequest::parse(
            record.get(trip_columns.start).unwrap_or_default(),
            record.get(trip_columns.end).unwrap_or_default(),
            distance,
        )
        .map_err(rate_err)?;
        let table = estimate(&trip, catalog).map_err(rate_err)?;

        for plan in &options.plans {
            out.push(
                table
                    .get(plan)
                    .map(|result| result.total_cost.to_string())
                    .unwrap_or_default(),
            );
        }
        for (a, b) in &options.differences {
            let diff = match (table.get(a), table.get(b)) {
                (Some(a), Some(b)) => round_cents(a.total_cost - b.total_cost).to_string(),
                _ => String::new(),
            };
            out.push(diff);
        }
    }
    if let Some(index) = columns.minutes {
        let minutes = number_or_zero(record, index, &options.minutes_column, row)?;
        out.push(fees.fee_for(minutes).map_err(rate_err)?.to_string());
    }

    Ok(out)
}

/// Reads trips from `input`, writes them with estimate columns appended to
/// `output`. Returns the number of rows written.
///
/// Rows are priced in parallel; the first failing row (1-based, header
/// excluded) aborts the run.
pub fn annotate<R: Read, W: Write>(
    input: R,
    output: W,
    catalog: &PlanCatalog,
    fees: &FeeSchedule,
    options: &AnnotateOptions,
) -> Result<usize, AnnotateError> {
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(input);
    let headers = reader.headers()?.clone();
    let columns = Columns::locate(&headers, options)?;
    if columns.minutes.is_none() {
        warn!(column = %options.minutes_column, "no billed-minutes column, fee not computed");
    }

    let records = reader.records().collect::<Result<Vec<_>, _>>()?;

    let rows = records
        .par_iter()
        .enumerate()
        .map(|(i, record)| annotate_row(record, i + 1, &columns, catalog, fees, options))
        .collect::<Result<Vec<_>, _>>()?;

    let mut header_out: Vec<String> = headers.iter().map(str::to_string).collect();
    if columns.trip.is_some() {
        header_out.extend(options.plans.iter().map(|plan| cost_column(*plan)));
        header_out.extend(
            options
                .differences
                .iter()
                .map(|(a, b)| difference_column(*a, *b)),
        );
    }
    if columns.minutes.is_some() {
        header_out.push(options.fee_column.clone());
    }

    let mut writer = WriterBuilder::new().from_writer(output);
    writer.write_record(&header_out)?;
    for row in &rows {
        writer.write_record(row)?;
    }
    writer.flush()?;

    info!(rows = rows.len(), "annotated trips");
    Ok(rows.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_names() {
        assert_eq!(cost_column(PlanId::OpenPlus), "cost_est_open_plus");
        assert_eq!(
            difference_column(PlanId::Value, PlanId::ValueExtra),
            "diff_value_to_value_extra"
        );
    }

    #[test]
    fn missing_required_column() {
        let input = "date_start,distance_km\n2025-08-07T10:00:00,10\n";
        let mut out = Vec::new();
        let err = annotate(
            input.as_bytes(),
            &mut out,
            &PlanCatalog::default(),
            &FeeSchedule::default(),
            &AnnotateOptions::default(),
        )
        .unwrap_err();
        assert!(matches!(err, AnnotateError::MissingColumn(name) if name == "date_end_billed"));
    }

    #[test]
    fn fee_only_mode_requires_minutes() {
        let input = "trip_id\na\n";
        let mut out = Vec::new();
        let options = AnnotateOptions {
            fees_only: true,
            ..AnnotateOptions::default()
        };
        let err = annotate(
            input.as_bytes(),
            &mut out,
            &PlanCatalog::default(),
            &FeeSchedule::default(),
            &options,
        )
        .unwrap_err();
        assert!(matches!(err, AnnotateError::MissingColumn(name) if name == "duration_min"));
    }
}
