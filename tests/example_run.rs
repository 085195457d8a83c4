//! Integration tests for the `example run` command.
use equitable_retirement::cli::RunOpts;
use equitable_retirement::cli::example::handle_example_run_command;
use equitable_retirement::settings::Settings;
use itertools::Itertools;
use tempfile::tempdir;

/// An integration test for the `example run` command.
#[test]
fn test_handle_example_run_command() {
    unsafe { std::env::set_var("EQRET_LOG_LEVEL", "off") };

    let tempdir = tempdir().unwrap();
    let opts = RunOpts {
        output_dir: Some(tempdir.path().to_path_buf()),
        overwrite: false,
        debug_model: false,
    };
    handle_example_run_command("mid_atlantic", &opts, Some(Settings::default())).unwrap();

    // Plants outside the selected states or with missing data are left out
    let plant_codes: Vec<String> =
        csv::Reader::from_path(tempdir.path().join("coal_retirement.csv"))
            .unwrap()
            .records()
            .map(|record| record.unwrap()[0].to_string())
            .dedup()
            .collect();
    assert_eq!(plant_codes, ["3118", "3954", "1571"]);
    assert!(!tempdir.path().join("debug_dimensions.csv").exists());
}
