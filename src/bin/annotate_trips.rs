use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use carshare_rates::annotate::{annotate, AnnotateOptions};
use carshare_rates::fee::FeeSchedule;
use carshare_rates::plans::PlanCatalog;

/// Appends per-plan price estimates and the duration fee to a trip sheet.
#[derive(Debug, Parser)]
#[command(version)]
struct Args {
    /// Trip sheet to read (CSV with headers).
    #[arg(long, env = "TRIPS_INPUT", default_value = "data/out/trips-to-annotate.csv")]
    input: PathBuf,

    /// Where to write the annotated sheet.
    #[arg(long, env = "TRIPS_OUTPUT", default_value = "data/out/trips-annotated.csv")]
    output: PathBuf,

    /// Column holding the billed end of the trip.
    #[arg(long, default_value = "date_end_billed")]
    end_column: String,

    /// Name of the fee column to append.
    #[arg(long, default_value = "fees_dpf_calc")]
    fee_column: String,

    /// Only append the fee; the sheet needs just the billed-minutes column.
    #[arg(long)]
    fees_only: bool,

    /// Log filter directives, e.g. `carshare_rates=debug`.
    #[arg(long, env = "RUST_LOG", default_value = "carshare_rates=info,annotate_trips=info")]
    log: String,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_new(&args.log)
                .with_context(|| format!("invalid log filter {:?}", args.log))?,
        )
        .init();

    let input =
        File::open(&args.input).with_context(|| format!("opening {}", args.input.display()))?;
    if let Some(parent) = args.output.parent() {
        fs::create_dir_all(parent)?;
    }
    let output = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;

    let options = AnnotateOptions {
        end_column: args.end_column,
        fee_column: args.fee_column,
        fees_only: args.fees_only,
        ..AnnotateOptions::default()
    };

    let rows = annotate(
        BufReader::new(input),
        BufWriter::new(output),
        &PlanCatalog::default(),
        &FeeSchedule::default(),
        &options,
    )?;

    tracing::info!("wrote {rows} rows to {}", args.output.display());
    Ok(())
}
