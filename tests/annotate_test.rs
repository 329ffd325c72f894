use carshare_rates::annotate::{annotate, AnnotateError, AnnotateOptions};
use carshare_rates::fee::FeeSchedule;
use carshare_rates::plans::PlanCatalog;

fn run(input: &str) -> Result<(usize, String), AnnotateError> {
    run_with(input, &AnnotateOptions::default())
}

fn run_with(input: &str, options: &AnnotateOptions) -> Result<(usize, String), AnnotateError> {
    let mut out = Vec::new();
    let rows = annotate(
        input.as_bytes(),
        &mut out,
        &PlanCatalog::default(),
        &FeeSchedule::default(),
        options,
    )?;
    Ok((rows, String::from_utf8(out).unwrap()))
}

#[test]
fn appends_plan_costs_differences_and_fee() {
    let input = "\
trip_id,date_start,date_end_billed,distance_km,duration_min
a,2025-08-07T10:00:00,2025-08-07T11:00:00,60,60
b,2025-08-07T10:00:00,2025-08-07T18:00:00,70,480
";
    let (rows, output) = run(input).unwrap();
    assert_eq!(rows, 2);

    let mut reader = csv::Reader::from_reader(output.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

    assert_eq!(&records[0][column("trip_id")], "a");
    assert_eq!(&records[0][column("cost_est_open")], "13");
    assert_eq!(&records[0][column("cost_est_value")], "22.5");
    assert_eq!(&records[0][column("cost_est_value_extra")], "21.6");
    assert_eq!(&records[0][column("diff_value_to_value_extra")], "0.9");
    assert_eq!(&records[0][column("fees_dpf_calc")], "2.25");

    assert_eq!(&records[1][column("cost_est_value_extra")], "33.5");
    assert_eq!(&records[1][column("diff_value_to_value_plus")], "11.3");
    assert_eq!(&records[1][column("fees_dpf_calc")], "9.25");
}

#[test]
fn fee_column_skipped_without_minutes() {
    let input = "\
date_start,date_end_billed,distance_km
2025-08-07T10:00:00,2025-08-07T11:00:00,60
";
    let (_, output) = run(input).unwrap();
    let header = output.lines().next().unwrap();
    assert!(header.contains("cost_est_open_plus"));
    assert!(!header.contains("fees_dpf_calc"));
}

#[test]
fn bad_row_reports_its_number() {
    let input = "\
date_start,date_end_billed,distance_km,duration_min
2025-08-07T10:00:00,2025-08-07T11:00:00,60,60
2025-08-07T12:00:00,2025-08-07T11:00:00,60,60
";
    match run(input) {
        Err(AnnotateError::Rate { row, .. }) => assert_eq!(row, 2),
        other => panic!("expected row error, got {other:?}"),
    }
}

#[test]
fn unparseable_distance_is_reported() {
    let input = "\
date_start,date_end_billed,distance_km
2025-08-07T10:00:00,2025-08-07T11:00:00,far
";
    assert!(matches!(run(input), Err(AnnotateError::BadNumber { row: 1, .. })));
}

#[test]
fn blank_distance_is_rejected() {
    let input = "\
date_start,date_end_billed,distance_km
2025-08-07T10:00:00,2025-08-07T11:00:00,
";
    match run(input) {
        Err(AnnotateError::BadNumber { row, column, .. }) => {
            assert_eq!(row, 1);
            assert_eq!(column, "distance_km");
        }
        other => panic!("expected blank distance error, got {other:?}"),
    }
}

#[test]
fn blank_minutes_cost_nothing() {
    let input = "\
date_start,date_end_billed,distance_km,duration_min
2025-08-07T10:00:00,2025-08-07T11:00:00,60,
";
    let (_, output) = run(input).unwrap();
    let mut reader = csv::Reader::from_reader(output.as_bytes());
    let headers = reader.headers().unwrap().clone();
    let fee = headers.iter().position(|h| h == "fees_dpf_calc").unwrap();
    let record = reader.records().next().unwrap().unwrap();
    assert_eq!(&record[fee], "0");
}

#[test]
fn fee_only_sheet_gets_just_the_fee() {
    let options = AnnotateOptions {
        fees_only: true,
        ..AnnotateOptions::default()
    };
    let (rows, output) = run_with("trip_id,duration_min\na,60\nb,2880\n", &options).unwrap();
    assert_eq!(rows, 2);

    let mut lines = output.lines();
    assert_eq!(lines.next(), Some("trip_id,duration_min,fees_dpf_calc"));
    assert_eq!(lines.next(), Some("a,60,2.25"));
    assert_eq!(lines.next(), Some("b,2880,20"));
    assert_eq!(lines.next(), None);
}
