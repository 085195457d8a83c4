//! Integration test for the `smoke` command using the backend and output folder from settings.
use equitable_retirement::cli::handle_smoke_command;
use equitable_retirement::optimisation::SolverBackend;
use equitable_retirement::settings::Settings;
use tempfile::tempdir;

#[test]
fn test_handle_smoke_command_from_settings() {
    unsafe { std::env::set_var("EQRET_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let settings = Settings {
        output_root: tempdir.path().join("results"),
        smoke_backend: SolverBackend::HighsIpm,
        ..Settings::default()
    };
    handle_smoke_command(None, None, false, Some(settings)).unwrap();

    let output_dir = tempdir.path().join("results").join("smoke");
    let mut reader = csv::Reader::from_path(output_dir.join("objective.csv")).unwrap();
    let records: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][0], "highs-ipm");

    // Every coal unit is fully retired in the final year
    let retirement: Vec<csv::StringRecord> =
        csv::Reader::from_path(output_dir.join("coal_retirement.csv"))
            .unwrap()
            .records()
            .map(Result::unwrap)
            .filter(|record| &record[1] == "2029")
            .collect();
    assert_eq!(retirement.len(), 5);
    for record in retirement {
        let retired: f64 = record[2].parse().unwrap();
        assert!((retired - 1.0).abs() < 1e-6);
    }
}
