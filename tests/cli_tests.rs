//! Integration tests for the kelpie-reports CLI
//!
//! Each test runs the binary inside a temporary working directory holding
//! its own `results/` tree, so no implicit configuration leaks in.

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

const LENGTHS_CSV: &str = "model,dataset,length
ComplEx,FB15k,1
ComplEx,FB15k,2
ComplEx,FB15k,2
ComplEx,FB15k,3
ComplEx,WN18,1
ComplEx,WN18,4
ComplEx,WN18,2
ComplEx,WN18,3
ComplEx,FB15k,1
ComplEx,WN18,2
";

const END_TO_END_CSV: &str = "model,dataset,method,delta_h1,delta_mrr
ComplEx,FB15k,Kelpie,-0.61,-0.52
ComplEx,FB15k,K1,-0.30,-0.25
";

const TIMES_CSV: &str = "model,dataset,seconds
ComplEx,FB15k,12.5
TransE,FB15k,8.0
";

/// Test helper to get the CLI binary, isolated in `dir`
fn kelpie_cmd(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("kelpie-reports").unwrap();
    cmd.current_dir(dir)
        .env_remove("KELPIE_RESULTS_DIR")
        .env_remove("KELPIE_OUTPUT_DIR")
        .env_remove("KELPIE_TEMPLATE_ROOT")
        .env("XDG_CONFIG_HOME", dir.join(".config"));
    cmd
}

fn write_result(dir: &Path, relative: &str, content: &str) {
    let path = dir.join("results").join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn workspace() -> TempDir {
    let dir = tempdir().unwrap();
    write_result(dir.path(), "explanation-lengths/necessary/ComplEx.csv", LENGTHS_CSV);
    write_result(dir.path(), "end-to-end/necessary.csv", END_TO_END_CSV);
    write_result(dir.path(), "extraction-times/necessary.csv", TIMES_CSV);
    dir
}

fn files_under(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    let Ok(entries) = fs::read_dir(dir) else {
        return files;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            files.extend(files_under(&path));
        } else {
            files.push(path);
        }
    }
    files
}

#[test]
fn test_cli_help() {
    let dir = tempdir().unwrap();
    kelpie_cmd(dir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("batch"));
}

#[test]
fn test_list_reports_shows_every_kind() {
    let dir = tempdir().unwrap();
    kelpie_cmd(dir.path())
        .arg("list-reports")
        .assert()
        .success()
        .stdout(predicate::str::contains("end-to-end"))
        .stdout(predicate::str::contains("explanation-lengths"))
        .stdout(predicate::str::contains("xsi-threshold"));
}

#[test]
fn test_generate_displays_table_without_writing() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "necessary"])
        .assert()
        .success()
        .stdout(predicate::str::contains("End-to-end explanation effectiveness"))
        .stdout(predicate::str::contains("-0.610"));

    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_generate_save_writes_single_svg() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args([
            "generate",
            "explanation-lengths",
            "--mode",
            "necessary",
            "--model",
            "ComplEx",
            "--save",
            "True",
        ])
        .assert()
        .success();

    let saved = files_under(&dir.path().join("reports"));
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("explanation-lengths/necessary_ComplEx.svg"));
    assert!(fs::read_to_string(&saved[0]).unwrap().contains("<svg"));
}

#[test]
fn test_bare_save_flag_means_true() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "extraction-times", "--mode", "NECESSARY", "--save"])
        .assert()
        .success();

    assert!(dir
        .path()
        .join("reports/extraction-times/necessary.svg")
        .is_file());
}

#[test]
fn test_save_false_displays_summary() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args([
            "generate",
            "explanation-lengths",
            "--mode",
            "necessary",
            "--model",
            "complex",
            "--save",
            "False",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains("mean_length"))
        .stdout(predicate::str::contains("2.100"));

    assert!(!dir.path().join("reports").exists());
}

#[test]
fn test_unrecognized_mode_fails_with_invalid_config() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "both"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid configuration"))
        .stderr(predicate::str::contains("both"));
}

#[test]
fn test_invalid_save_value_fails() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "necessary", "--save", "maybe"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("save"));
}

#[test]
fn test_missing_model_for_lengths_fails() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "explanation-lengths", "--mode", "necessary"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--model"));
}

#[test]
fn test_missing_results_fail_with_data_not_found() {
    let dir = workspace();
    kelpie_cmd(dir.path())
        .args(["generate", "prefilter-comparison", "--mode", "sufficient"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Result data not found"))
        .stderr(predicate::str::contains("prefilter-comparison"));
}

#[test]
fn test_results_dir_flag_overrides_default() {
    let dir = workspace();
    let moved = dir.path().join("elsewhere");
    fs::rename(dir.path().join("results"), &moved).unwrap();

    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "necessary", "--results-dir"])
        .arg(&moved)
        .assert()
        .success();

    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "necessary"])
        .env("KELPIE_RESULTS_DIR", &moved)
        .assert()
        .success();
}

#[test]
fn test_latex_format_from_config_file() {
    let dir = workspace();
    fs::write(
        dir.path().join(".kelpie-reports.yml"),
        "tables:\n  format: latex\n  precision: 2\n",
    )
    .unwrap();

    kelpie_cmd(dir.path())
        .args(["generate", "end-to-end", "--mode", "necessary", "--save"])
        .assert()
        .success();

    let table = fs::read_to_string(dir.path().join("reports/end-to-end/necessary.tex")).unwrap();
    assert!(table.contains(r"\begin{tabular}"));
    assert!(table.contains("-0.61"));
}

#[test]
fn test_batch_stops_at_first_failure() {
    let dir = workspace();
    let plan = dir.path().join("plan.yml");
    fs::write(
        &plan,
        "jobs:
  - kind: extraction-times
    mode: necessary
    save: true
  - kind: extraction-times
    mode: sufficient
    save: true
  - kind: explanation-lengths
    mode: necessary
    model: ComplEx
    save: true
",
    )
    .unwrap();

    kelpie_cmd(dir.path())
        .args(["batch", "--plan"])
        .arg(&plan)
        .assert()
        .failure()
        .stderr(predicate::str::contains("job 2"));

    let saved = files_under(&dir.path().join("reports"));
    assert_eq!(saved.len(), 1);
    assert!(saved[0].ends_with("extraction-times/necessary.svg"));
}

#[test]
fn test_batch_parallel_runs_remaining_jobs() {
    let dir = workspace();
    let plan = dir.path().join("plan.yml");
    fs::write(
        &plan,
        "jobs:
  - kind: extraction-times
    mode: sufficient
  - kind: explanation-lengths
    mode: necessary
    model: ComplEx
",
    )
    .unwrap();

    kelpie_cmd(dir.path())
        .args(["batch", "--parallel", "--save", "--plan"])
        .arg(&plan)
        .assert()
        .failure();

    assert!(dir
        .path()
        .join("reports/explanation-lengths/necessary_ComplEx.svg")
        .is_file());
}

#[test]
fn test_batch_dry_run_prints_paper_plan() {
    let dir = tempdir().unwrap();
    kelpie_cmd(dir.path())
        .args(["batch", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains("kind: end-to-end"))
        .stdout(predicate::str::contains("kind: xsi-threshold"));
}

#[test]
fn test_init_and_validate_config() {
    let dir = tempdir().unwrap();
    kelpie_cmd(dir.path()).arg("init-config").assert().success();
    assert!(dir.path().join(".kelpie-reports.yml").is_file());

    kelpie_cmd(dir.path())
        .arg("init-config")
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    kelpie_cmd(dir.path())
        .args(["validate-config", "--config", ".kelpie-reports.yml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("valid"));
}

#[test]
fn test_printed_default_config_loads_back() {
    let dir = tempdir().unwrap();
    let output = kelpie_cmd(dir.path())
        .arg("print-default-config")
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(!output.stdout.contains(&0x1b), "no terminal escapes in config output");
    fs::write(dir.path().join("printed.yml"), &output.stdout).unwrap();

    kelpie_cmd(dir.path())
        .args(["validate-config", "--config", "printed.yml"])
        .assert()
        .success();
}

#[test]
fn test_partial_config_sections_use_defaults() {
    let dir = workspace();
    fs::write(
        dir.path().join(".kelpie-reports.yml"),
        "paths:\n  output_dir: out\nplots:\n  width: 800\n",
    )
    .unwrap();

    kelpie_cmd(dir.path())
        .args(["generate", "extraction-times", "--mode", "necessary", "--save"])
        .assert()
        .success();

    assert!(dir.path().join("out/extraction-times/necessary.svg").is_file());
}

#[test]
fn test_validate_config_rejects_zero_plot_size() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("bad.yml"), "plots:\n  width: 0\n  height: 480\n").unwrap();

    kelpie_cmd(dir.path())
        .args(["validate-config", "--config", "bad.yml"])
        .assert()
        .failure();
}
