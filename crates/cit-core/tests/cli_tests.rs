use std::collections::BTreeSet;
use std::io::Write;

use cit_core::cli::{run, run_with, Cli, CliError};
use cit_core::ReduceError;
use cit_explore::coverage::{CoverageError, CoveringArray, CoveringArrayGenerator, CoveringProblem};
use cit_model::ModelError;
use clap::Parser;
use tempfile::NamedTempFile;

const SNAPSHOT: &str = r#"{"tests": [
    {"shortname": "t.hotplug.raw.max_size", "name": "(subtest=t).(subtest=hotplug).(i=raw).(s=max_size)"},
    {"shortname": "t.hotplug.qcow2.fmt_qcow2", "name": "(subtest=t).(subtest=hotplug).(i=qcow2).(s=fmt_qcow2)"},
    {"shortname": "t.hotplug.qcow2.default", "name": "(subtest=t).(subtest=hotplug).(i=qcow2).(s=default)"},
    {"shortname": "t.unplug.x", "prefix": "t.unplug"}
]}"#;

fn write_temp(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

fn run_cli(args: &[&str]) -> (Result<bool, CliError>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let mut out = Vec::new();
    let result = run(&cli, &mut out);
    (result, String::from_utf8(out).unwrap())
}

/// Returns fixed rows regardless of the problem.
struct FixedRows(Vec<Vec<usize>>);

impl CoveringArrayGenerator for FixedRows {
    fn generate(&self, problem: &CoveringProblem<'_>) -> Result<CoveringArray, CoverageError> {
        Ok(CoveringArray {
            rows: self.0.clone(),
            strength: problem.effective_strength(),
            total_targets: 0,
            excluded: BTreeSet::new(),
        })
    }
}

fn run_cli_with(args: &[&str], generator: &FixedRows) -> (Result<bool, CliError>, String) {
    let cli = Cli::try_parse_from(args).unwrap();
    let config = cli.reduction_config().unwrap();
    let mut out = Vec::new();
    let result = run_with(&cli, &config, generator, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_prints_reduced_names() {
    let snapshot = write_temp(SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();
    let (result, out) = run_cli(&["cit-reduce", "--snapshot", path, "--filter", "t.hotplug"]);
    assert!(result.unwrap());

    let mut lines: Vec<&str> = out.lines().collect();
    lines.sort_unstable();
    assert_eq!(
        lines,
        [
            "t.hotplug.qcow2.default",
            "t.hotplug.qcow2.fmt_qcow2",
            "t.hotplug.raw.max_size"
        ]
    );
}

#[test]
fn test_json_report() {
    let snapshot = write_temp(SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();
    let (result, out) = run_cli(&[
        "cit-reduce", "--snapshot", path, "--filter", "t.hotplug", "--strength", "2", "--json",
    ]);
    assert!(result.unwrap());

    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["prefix"], "t.hotplug");
    assert_eq!(report["outcome"]["status"], "reduced");
    assert_eq!(report["constraints"].as_array().unwrap().len(), 3);
}

#[test]
fn test_config_file_and_overrides() {
    let snapshot = write_temp(SNAPSHOT);
    let config = write_temp(r#"{"strength": 1, "seed": 3}"#);
    let cli = Cli::try_parse_from([
        "cit-reduce",
        "--snapshot",
        snapshot.path().to_str().unwrap(),
        "--filter",
        "t.hotplug",
        "--config",
        config.path().to_str().unwrap(),
        "--seed",
        "11",
    ])
    .unwrap();
    let effective = cli.reduction_config().unwrap();
    assert_eq!(effective.strength, 1);
    assert_eq!(effective.seed, 11);
}

#[test]
fn test_unknown_filter_is_an_error() {
    let snapshot = write_temp(SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();
    let (result, _) = run_cli(&["cit-reduce", "--snapshot", path, "--filter", "missing"]);
    assert!(matches!(result, Err(CliError::Reduce(_))));
}

#[test]
fn test_missing_snapshot_file() {
    let (result, _) = run_cli(&[
        "cit-reduce",
        "--snapshot",
        "/nonexistent/vt.json",
        "--filter",
        "t.hotplug",
    ]);
    assert!(matches!(result, Err(CliError::Snapshot(_))));
}

#[test]
fn test_spurious_rows_print_failure() {
    let snapshot = write_temp(SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();
    // Row [0, 1] is raw.fmt_qcow2, which is not a real test.
    let generator = FixedRows(vec![vec![0, 0], vec![0, 1]]);
    let args = ["cit-reduce", "--snapshot", path, "--filter", "t.hotplug"];

    let (result, out) = run_cli_with(&args, &generator);
    assert!(!result.unwrap());
    assert_eq!(
        out,
        "reduction of 't.hotplug' failed: 1 generated names are not real tests\n"
    );
    assert!(!out.contains("t.hotplug.raw.max_size"));

    let mut json_args = args.to_vec();
    json_args.push("--json");
    let (result, out) = run_cli_with(&json_args, &generator);
    assert!(!result.unwrap());
    let report: serde_json::Value = serde_json::from_str(&out).unwrap();
    assert_eq!(report["outcome"]["status"], "spurious");
    assert_eq!(report["outcome"]["spurious"][0], "t.hotplug.raw.fmt_qcow2");
}

#[test]
fn test_empty_rows_print_failure() {
    let snapshot = write_temp(SNAPSHOT);
    let path = snapshot.path().to_str().unwrap();
    let (result, out) = run_cli_with(
        &["cit-reduce", "--snapshot", path, "--filter", "t.hotplug"],
        &FixedRows(vec![]),
    );
    assert!(!result.unwrap());
    assert_eq!(out, "reduction of 't.hotplug' produced no tests\n");
}

#[test]
fn test_absent_flag_resolves_empty_components() {
    let snapshot = write_temp(
        r#"{"tests": [
            {"shortname": "t.gap.a..b", "prefix": "t.gap"},
            {"shortname": "t.gap.c.d.e", "prefix": "t.gap"}
        ]}"#,
    );
    let path = snapshot.path().to_str().unwrap();

    let (result, _) = run_cli(&["cit-reduce", "--snapshot", path, "--filter", "t.gap"]);
    assert!(matches!(
        result,
        Err(CliError::Reduce(ReduceError::Model(ModelError::AbsentCollision { .. })))
    ));

    let (result, out) = run_cli(&[
        "cit-reduce", "--snapshot", path, "--filter", "t.gap", "--absent", "none",
    ]);
    assert!(result.unwrap());
    let mut lines: Vec<&str> = out.lines().collect();
    lines.sort_unstable();
    assert_eq!(lines, ["t.gap.a..b", "t.gap.c.d.e"]);
}

#[test]
fn test_absent_flag_overrides_config() {
    let snapshot = write_temp(SNAPSHOT);
    let config = write_temp(r#"{"absent": "n/a"}"#);
    let cli = Cli::try_parse_from([
        "cit-reduce",
        "--snapshot",
        snapshot.path().to_str().unwrap(),
        "--filter",
        "t.hotplug",
        "--config",
        config.path().to_str().unwrap(),
        "--absent",
        "none",
    ])
    .unwrap();
    assert_eq!(cli.reduction_config().unwrap().absent, "none");
}
