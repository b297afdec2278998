mod common;

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use common::RecordingPlotter;
use hivescope::config::{ConfigInput, OutputFormat, ReportMode, RunConfig};
use hivescope::error::{ConfigError, RunError};
use hivescope::report::{renderer_for, FileSource, Orchestrator, RunState};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
}

/// Hourly readings for March 2025 (two days) and April 2025 (none).
fn write_sources(dir: &Path) {
    let mut co2 = String::from("id,record,created_at\n");
    let mut weight = String::from("id,record,created_at\n");
    let mut temperature = String::from("id,record,created_at\n");
    let mut humidity = String::from("id,record,created_at\n");
    for i in 0..48u32 {
        let ts = format!("2025-03-{:02} {:02}:00:00", 1 + i / 24, i % 24);
        let x = f64::from(i);
        writeln!(co2, "{i},{},{ts}", 400.0 + (x * 0.4).sin() * 20.0).unwrap();
        writeln!(weight, "{i},{},{ts}", 40.0 + x * 0.01).unwrap();
        writeln!(temperature, "{i},33.0*{}*{},{ts}", 34.0 + (x * 0.3).cos(), 8.0 + x * 0.1).unwrap();
        writeln!(humidity, "{i},55.0*{}*{},{ts}", 60.0 + (x * 0.2).sin() * 4.0, 75.0 - x * 0.2).unwrap();
    }
    std::fs::write(dir.join("hive_carbondioxide_hive1.csv"), co2).unwrap();
    std::fs::write(dir.join("hive_weights_hive1.csv"), weight).unwrap();
    std::fs::write(dir.join("hive_temperatures_hive1.csv"), temperature).unwrap();
    std::fs::write(dir.join("hive_humidity_hive1.csv"), humidity).unwrap();
}

fn config(csv_dir: &Path, out: &Path, mode: ReportMode, attributes: &[&str]) -> RunConfig {
    RunConfig::resolve(
        ConfigInput {
            start_date: Some("03/2025".to_string()),
            end_date: Some("04/2025".to_string()),
            attributes: attributes.iter().map(|a| a.to_string()).collect(),
            mode,
            csv_dir: csv_dir.to_path_buf(),
            hive_id: "hive1".to_string(),
            output_dir: out.to_path_buf(),
            format: OutputFormat::Json,
            ..ConfigInput::default()
        },
        today(),
    )
    .unwrap()
}

fn orchestrator(config: RunConfig, plotter: &RecordingPlotter) -> Orchestrator {
    let source = FileSource::from_config(&config);
    let renderer = renderer_for(config.format);
    Orchestrator::new(config, Box::new(source), Box::new(plotter.clone()), renderer)
}

fn read_json(path: &PathBuf) -> serde_json::Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn attribute_mode_writes_one_report_per_attribute() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(csv.path());
    let plotter = RecordingPlotter::default();

    let mut run = orchestrator(
        config(csv.path(), out.path(), ReportMode::Attribute, &["co2,weight"]),
        &plotter,
    );
    assert_eq!(run.state(), RunState::Configured);
    let reports = run.run().unwrap();
    assert_eq!(run.state(), RunState::Done);

    assert_eq!(
        reports,
        vec![
            out.path()
                .join("Range_carbondioxide_2025_March_to_2025_April")
                .join("Carbondioxide_Report_hive1_2025_March_to_2025_April.json"),
            out.path()
                .join("Range_weight_2025_March_to_2025_April")
                .join("Weight_Report_hive1_2025_March_to_2025_April.json"),
        ]
    );

    let co2 = read_json(&reports[0]);
    assert_eq!(
        co2["Title"],
        "Carbondioxide Analysis Report for hive1: March 2025 to April 2025"
    );
    let march = &co2["Results"]["2025_March"]["CO2 Analysis"];
    assert_eq!(march["Year"], 2025);
    assert!(march["Statistics"]["Mean"].is_number());
    assert_eq!(
        co2["Results"]["2025_April"]["CO2 Analysis"]["Error"],
        "No data available for 2025-04"
    );
    assert_eq!(
        co2["Plots"]["2025_March"]["CO2 Analysis"].as_array().unwrap().len(),
        2
    );

    assert!(out.path().join("2025_March_carbondioxide").join("co2_monthly_trend.png").exists());
    assert!(out.path().join("2025_April_weight").is_dir());
    assert_eq!(plotter.drawn().len(), 3);
}

#[test]
fn attribute_mode_skips_sources_that_fail_to_load() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(csv.path());
    std::fs::remove_file(csv.path().join("hive_weights_hive1.csv")).unwrap();
    let plotter = RecordingPlotter::default();

    let mut run = orchestrator(
        config(csv.path(), out.path(), ReportMode::Attribute, &["weight", "humidity"]),
        &plotter,
    );
    let reports = run.run().unwrap();
    assert_eq!(reports.len(), 1);
    assert!(reports[0].ends_with("Humidity_Report_hive1_2025_March_to_2025_April.json"));

    let humidity = read_json(&reports[0]);
    let stats = &humidity["Results"]["2025_March"]["Humidity Analysis"]["Interior"];
    assert!(stats["Average"].is_number());
}

#[test]
fn attribute_mode_with_nothing_loadable_fails() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let plotter = RecordingPlotter::default();

    let mut run = orchestrator(config(csv.path(), out.path(), ReportMode::Attribute, &["co2"]), &plotter);
    assert!(matches!(run.run(), Err(RunError::NothingRendered)));
    assert_eq!(run.state(), RunState::Failed);
}

#[test]
fn combined_mode_builds_one_report_with_every_section() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    let download = tempfile::tempdir().unwrap();
    write_sources(csv.path());
    let plotter = RecordingPlotter::default();

    let mut cfg = config(csv.path(), out.path(), ReportMode::Combined, &[]);
    cfg.download_dir = Some(download.path().to_path_buf());
    let mut run = orchestrator(cfg, &plotter);
    let reports = run.run().unwrap();

    let expected = out
        .path()
        .join("Range_2025_March_to_2025_April")
        .join("Report_hive1_2025_March_to_2025_April.json");
    assert_eq!(reports, vec![expected]);
    assert!(download
        .path()
        .join("Report_hive1_2025_March_to_2025_April.json")
        .exists());

    let report = read_json(&reports[0]);
    let march = report["Results"]["2025_March"].as_object().unwrap();
    let titles: Vec<&str> = march.keys().map(String::as_str).collect();
    assert_eq!(titles.len(), 5);
    assert!(march["CO2 Analysis"]["Diurnal Variations"]["Daytime Variability"].is_number());
    assert!(march["Correlation Analysis"]["CO2 vs Weight"]
        .as_str()
        .unwrap()
        .starts_with("Pearson: "));
    assert!(out.path().join("2025_March").join("correlation_heatmap.png").exists());

    let april = &report["Results"]["2025_April"];
    assert_eq!(april["Correlation Analysis"]["Error"], "No data available for 2025-04");
}

#[test]
fn combined_mode_aborts_when_a_source_is_missing() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(csv.path());
    std::fs::remove_file(csv.path().join("hive_humidity_hive1.csv")).unwrap();
    let plotter = RecordingPlotter::default();

    let mut run = orchestrator(config(csv.path(), out.path(), ReportMode::Combined, &[]), &plotter);
    let err = run.run().unwrap_err();
    assert!(matches!(err, RunError::Load { .. }));
    assert_eq!(run.state(), RunState::Failed);
    assert!(plotter.drawn().is_empty());
}

#[test]
fn invalid_input_is_rejected_before_anything_loads() {
    let out = tempfile::tempdir().unwrap();
    let input = ConfigInput {
        start_date: Some("05/2025".to_string()),
        end_date: Some("03/2025".to_string()),
        output_dir: out.path().to_path_buf(),
        ..ConfigInput::default()
    };

    let err = Orchestrator::from_input(input, today(), Box::new(RecordingPlotter::default())).err();
    assert!(matches!(err, Some(RunError::Config(ConfigError::StartAfterEnd))));
    assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
}

#[test]
fn valid_input_wires_the_configured_files() {
    let csv = tempfile::tempdir().unwrap();
    let out = tempfile::tempdir().unwrap();
    write_sources(csv.path());
    let plotter = RecordingPlotter::default();
    let input = ConfigInput {
        year: Some("2025".to_string()),
        month: Some("March".to_string()),
        attributes: vec!["weight".to_string()],
        csv_dir: csv.path().to_path_buf(),
        hive_id: "hive1".to_string(),
        output_dir: out.path().to_path_buf(),
        format: OutputFormat::Json,
        ..ConfigInput::default()
    };

    let mut run = Orchestrator::from_input(input, today(), Box::new(plotter.clone())).unwrap();
    assert_eq!(run.state(), RunState::Configured);
    assert_eq!(run.config().output_dir, out.path());

    let reports = run.run().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].extension().unwrap(), "json");
    assert_eq!(run.state(), RunState::Done);
}
