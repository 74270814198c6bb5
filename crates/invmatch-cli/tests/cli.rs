use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const APS_INVOICE: &str = "Automatic Protection Systems Ltd
INVOICE
Invoice No: 71234
Invoice Date: 14/01/2026
Order No: OT0363
INSTALL ADDRESS
Menkind Maidstone
Fremlin Walk

NET TOTAL £ 573.00
VAT @ 20% £ 114.60
TOTAL DUE £ 687.60
";

const APS_LEDGER: &str = "APS WORKS LOG,,,,,,
PO,STORE,QUOTE OVER,AUTHORISED,INVOICE NO,INVOICE AMOUNT,INVOICE SIGNED
OT0362,Bluewater,,,70001,90.00,02/01/2026
OT0363,Menkind Maidstone,Q-881,JB,,,
";

fn invmatch() -> Command {
    Command::cargo_bin("invmatch").unwrap()
}

fn setup(dir: &Path) {
    fs::create_dir_all(dir.join("invoices")).unwrap();
    fs::write(dir.join("invoices/aps-71234.txt"), APS_INVOICE).unwrap();
    fs::write(dir.join("invoices/scan.txt"), "Invoice No. 5771\nNet £100.00\n").unwrap();
    fs::write(dir.join("APS.csv"), APS_LEDGER).unwrap();
}

fn batch(dir: &Path) -> Command {
    let mut cmd = invmatch();
    cmd.arg("batch")
        .arg(dir.join("invoices/*.txt").to_str().unwrap())
        .arg("--ledger")
        .arg(dir.join("APS.csv"))
        .arg("--output-dir")
        .arg(dir.join("out"))
        .arg("--signed-on")
        .arg("2026-01-20");
    cmd
}

#[test]
fn test_help() {
    invmatch()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("batch"))
        .stdout(predicate::str::contains("process"));
}

#[test]
fn test_process_text_invoice() {
    let dir = TempDir::new().unwrap();
    setup(dir.path());

    invmatch()
        .arg("process")
        .arg(dir.path().join("invoices/aps-71234.txt"))
        .args(["--format", "text"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Supplier: APS Fire Systems (APS)"))
        .stdout(predicate::str::contains("PO: OT0363"))
        .stdout(predicate::str::contains("Net:   573.00 GBP"));
}

#[test]
fn test_process_missing_file() {
    invmatch()
        .args(["process", "/nonexistent/invoice.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Input file not found"));
}

#[test]
fn test_batch_writes_results_and_ledger() {
    let dir = TempDir::new().unwrap();
    setup(dir.path());

    batch(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("1 matched"))
        .stdout(predicate::str::contains("1 failed"));

    let out = dir.path().join("out");
    let summary = fs::read_to_string(out.join("summary.csv")).unwrap();
    assert!(summary.contains("aps-71234.txt,matched,APS Fire Systems,71234,OT0363,573.00,APS,matched,exact PO,4,1.00"));
    assert!(summary.contains("scan.txt,failed"));

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(out.join("results.json")).unwrap()).unwrap();
    assert_eq!(results["summary"]["total"], 2);
    assert_eq!(results["updates"][0]["row_index"], 3);

    let ledger = fs::read_to_string(out.join("APS.csv")).unwrap();
    assert!(ledger.contains("OT0363,Menkind Maidstone,Q-881,JB,71234,573.00,20/01/2026"));
    assert!(ledger.contains("OT0362,Bluewater,,,70001,90.00,02/01/2026"));
}

#[test]
fn test_batch_dry_run_leaves_ledger_alone() {
    let dir = TempDir::new().unwrap();
    setup(dir.path());

    batch(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Dry run: 1 ledger updates not written"));

    assert!(dir.path().join("out/summary.csv").exists());
    assert!(!dir.path().join("out/APS.csv").exists());
}

#[test]
fn test_batch_ledger_without_header_fails() {
    let dir = TempDir::new().unwrap();
    setup(dir.path());
    fs::write(dir.path().join("APS.csv"), "just,some\nrandom,cells\n").unwrap();

    batch(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("header row not found in sheet 'APS'"));
}

#[test]
fn test_config_init_get_set() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let path_str = path.to_str().unwrap();

    invmatch()
        .args(["config", "init", "--output", path_str])
        .assert()
        .success();

    invmatch()
        .args(["--config", path_str, "config", "set", "matching.min_margin", "10"])
        .assert()
        .success();

    invmatch()
        .args(["--config", path_str, "config", "get", "matching.min_margin"])
        .assert()
        .success()
        .stdout(predicate::str::contains("10.0"));

    invmatch()
        .args(["--config", path_str, "config", "get", "matching.nope"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration key not found"));
}
