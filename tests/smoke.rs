//! Integration tests for the `smoke` command.
use equitable_retirement::cli::handle_smoke_command;
use equitable_retirement::settings::Settings;
use float_cmp::assert_approx_eq;
use tempfile::tempdir;

/// An integration test for the `smoke` command with a named backend.
#[test]
fn test_handle_smoke_command() {
    unsafe { std::env::set_var("EQRET_LOG_LEVEL", "off") };

    // Unknown backends fail before anything else happens
    assert_eq!(
        handle_smoke_command(Some("cplex"), None, false, Some(Settings::default()))
            .unwrap_err()
            .to_string(),
        "Unsupported solver backend: cplex (available backends: highs, highs-simplex, highs-ipm)"
    );

    let tempdir = tempdir().unwrap();
    handle_smoke_command(
        Some("highs-simplex"),
        Some(tempdir.path()),
        false,
        Some(Settings::default()),
    )
    .unwrap();

    let mut reader = csv::Reader::from_path(tempdir.path().join("objective.csv")).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "highs-simplex");

    // Only cost is weighted
    let z: f64 = records[0][1].parse().unwrap();
    let cost: f64 = records[0][2].parse().unwrap();
    assert_approx_eq!(f64, z, cost, epsilon = 1e-6);
}
