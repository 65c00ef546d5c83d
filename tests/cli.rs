//! End-to-end checks through the `llmray` binary: exit statuses and the
//! lifecycle log lines written to stderr.

use std::io::Write;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

fn llmray(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_llmray"))
        .args(args)
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run llmray")
}

fn write(dir: &TempDir, name: &str, contents: &str) -> String {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    path.to_str().unwrap().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn position(haystack: &str, needle: &str) -> usize {
    haystack
        .find(needle)
        .unwrap_or_else(|| panic!("'{}' not found in:\n{}", needle, haystack))
}

#[test]
fn csv_dataset_loads_with_start_then_finish() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "x.csv", "a,b,y\n1,2,3\n4,5,9\n");
    let config = write(&dir, "dataset.json", &format!(r#"{{"type": "CsvDataset", "path": "{}"}}"#, csv));

    let output = llmray(&["load", "dataset", &config]);
    assert!(output.status.success(), "{}", stderr(&output));

    let log = stderr(&output);
    assert!(position(&log, "load_dataset start") < position(&log, "load_dataset finish"));
    assert_eq!(log.matches("load_dataset start").count(), 1);
    assert_eq!(log.matches("load_dataset finish").count(), 1);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("2 samples"));
}

#[test]
fn unknown_tokenizer_is_reported_not_fatal() {
    let dir = TempDir::new().unwrap();
    let config = write(&dir, "tok.json", r#"{"type": "BPE"}"#);

    let output = llmray(&["load", "tokenizer", &config]);
    assert_eq!(output.status.code(), Some(2));
    let log = stderr(&output);
    assert!(log.contains("there is no BPE tokenizer."));
    assert!(!log.contains("load_tokenizer finish"));
    assert!(!log.contains("call error"));
}

#[test]
fn malformed_csv_terminates_the_process() {
    let dir = TempDir::new().unwrap();
    let csv = write(&dir, "bad.csv", "a,y\n1,oops\n");
    let config = write(&dir, "dataset.json", &format!(r#"{{"type": "CsvDataset", "path": "{}"}}"#, csv));

    let output = llmray(&["load", "dataset", &config]);
    assert_eq!(output.status.code(), Some(llmray_core::FATAL_EXIT_CODE));
    let log = stderr(&output);
    assert!(log.contains("load_dataset start"));
    assert!(log.contains("ERROR"));
    assert!(log.contains("load_dataset: CsvDatasetFactory call error"));
    assert!(log.contains("'oops' is not a number"));
    assert!(!log.contains("load_dataset finish"));
    assert!(output.stdout.is_empty(), "no summary after a fatal load");
}

#[test]
fn missing_csv_file_terminates_the_process() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.csv");
    let config = write(
        &dir,
        "dataset.json",
        &format!(r#"{{"type": "CsvDataset", "path": "{}"}}"#, missing.display()),
    );

    let output = llmray(&["load", "dataset", &config]);
    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("CsvDatasetFactory call error"));
}

#[test]
fn optimizer_load_builds_model_first() {
    let dir = TempDir::new().unwrap();
    let model = write(&dir, "model.json", r#"{"type": "LinearModel", "input_dim": 4, "output_dim": 2}"#);
    let optimizer = write(&dir, "opt.json", r#"{"type": "Momentum", "lr": 0.05}"#);

    let output = llmray(&["load", "optimizer", &optimizer, &model]);
    assert!(output.status.success(), "{}", stderr(&output));
    let log = stderr(&output);
    assert!(position(&log, "load_model finish") < position(&log, "load_optimizer start"));
    assert!(String::from_utf8_lossy(&output.stdout).contains("8 parameters"));
}

#[test]
fn train_pipeline_writes_report() {
    let dir = TempDir::new().unwrap();
    let out_dir = dir.path().join("runs");
    let pipeline = write(
        &dir,
        "pipeline.json",
        &format!(
            r#"{{
                "General": {{"seed": 3, "output_dir": "{}"}},
                "Dataset": {{"type": "SyntheticDataset", "samples": 16, "input_dim": 2, "output_dim": 1}},
                "Model": {{"type": "LinearModel", "input_dim": 2, "output_dim": 1}},
                "Optimizer": {{"type": "SGD", "lr": 0.1}},
                "Trainer": {{"type": "DefaultTrainer", "epochs": 10, "log_interval": 0}}
            }}"#,
            out_dir.display()
        ),
    );

    let output = llmray(&["train", &pipeline]);
    assert!(output.status.success(), "{}", stderr(&output));
    let log = stderr(&output);
    for op in ["load_dataset", "load_model", "load_optimizer", "get_trainer", "trainer prepare", "train"] {
        assert!(position(&log, &format!("{} start", op)) < position(&log, &format!("{} finish", op)));
    }
    let reports: Vec<_> = std::fs::read_dir(Path::new(&out_dir)).unwrap().collect();
    assert_eq!(reports.len(), 1);
}

#[test]
fn trainer_stage_failure_is_fatal() {
    let dir = TempDir::new().unwrap();
    // model shape does not match the dataset, so prepare fails
    let pipeline = write(
        &dir,
        "pipeline.json",
        r#"{
            "Dataset": {"type": "SyntheticDataset", "samples": 4, "input_dim": 3, "output_dim": 1},
            "Model": {"type": "LinearModel", "input_dim": 2, "output_dim": 1},
            "Optimizer": {"type": "SGD"},
            "Trainer": {"type": "DefaultTrainer"}
        }"#,
    );

    let output = llmray(&["train", &pipeline]);
    assert_eq!(output.status.code(), Some(1));
    let log = stderr(&output);
    assert!(log.contains("trainer prepare: shape mismatch"));
    assert!(!log.contains("trainer prepare finish"));
    assert!(!log.contains("train start"));
}

#[test]
fn list_shows_every_category() {
    let output = llmray(&["list"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["CsvDataset", "CharTokenizer", "LinearModel", "SGD", "DefaultTrainer", "XavierInitializer", "BanditEnv"] {
        assert!(stdout.contains(name), "missing {}", name);
    }
}
