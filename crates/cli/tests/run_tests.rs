// End-to-end tests for `genverify run` against small fixture files.
//
// Run with: cargo test -p genverify-cli --test run_tests -- --nocapture

use std::path::Path;
use std::process::Command;

use tempfile::TempDir;

fn genverify() -> Command {
    Command::new(env!("CARGO_BIN_EXE_genverify"))
}

/// Build a pipe-delimited line with `width` fields, the named columns set
/// and everything else empty.
fn line(width: usize, fields: &[(usize, &str)]) -> String {
    let mut cols = vec![String::new(); width];
    for (col, value) in fields {
        cols[*col] = (*value).to_string();
    }
    cols.join("|")
}

// ss_item_sk 2, ss_sold_customer_sk 3, ss_ticket_number 9
fn store_sale(item: &str, customer: &str, ticket: &str) -> String {
    line(23, &[(2, item), (3, customer), (9, ticket)])
}

// sr_item_sk 2, sr_customer_sk 3, sr_ticket_number 9
fn store_return(item: &str, customer: &str, ticket: &str) -> String {
    line(20, &[(2, item), (3, customer), (9, ticket)])
}

fn write_store_files(dir: &Path, sales: &[String], returns: &[String]) {
    let mut sales_body = sales.join("\n");
    sales_body.push('\n');
    let mut returns_body = returns.join("\n");
    returns_body.push('\n');
    std::fs::write(dir.join("store_sales.dat"), sales_body).unwrap();
    std::fs::write(dir.join("store_returns.dat"), returns_body).unwrap();
}

// ===========================================================================
// Verdicts and exit codes
// ===========================================================================

#[test]
fn verified_store_run_exits_zero() {
    let dir = TempDir::new().unwrap();
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001"), store_sale("102", "8", "5002")],
        &[store_return("101", "7", "5001")],
    );

    let output = genverify()
        .args(["run", "--domains", "store", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("KEY RESULTS for store:"), "stdout: {stdout}");
    assert!(stdout.contains("Successful comparisons: 100.00% (1)"), "stdout: {stdout}");
    assert!(stdout.contains("Verdict: SUCCESS"), "stdout: {stdout}");
    assert!(stdout.contains("Data generation time: 0 sec, existing data files used"));
    // 1 return over 2 sales is far off the expected ~10% band
    assert!(stdout.contains("WARNING: returns/sales ratio 50.00%"), "stdout: {stdout}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Processing STORE"), "stderr: {stderr}");
    assert!(stderr.contains("Using existing store data files"), "stderr: {stderr}");
    assert!(stderr.contains("Verifying store integrity..."), "stderr: {stderr}");
}

#[test]
fn customer_mismatch_exits_three_with_note() {
    let dir = TempDir::new().unwrap();
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001")],
        &[store_return("101", "9", "5001")],
    );

    let output = genverify()
        .args(["run", "--domains", "store", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(3));

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verdict: FAILED"), "stdout: {stdout}");
    assert!(stdout.contains("Failed comparisons: 1 (100.00%)"), "stdout: {stdout}");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("note: key 5001_101"), "stderr: {stderr}");
    assert!(
        stderr.contains("ss_sold_customer_sk=7 vs sr_customer_sk=9"),
        "stderr: {stderr}"
    );
    assert!(stderr.contains("error: verification failed in at least one domain"));
}

#[test]
fn quiet_suppresses_notes_but_not_the_verdict() {
    let dir = TempDir::new().unwrap();
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001")],
        &[store_return("101", "9", "5001")],
    );

    let output = genverify()
        .args(["run", "--domains", "store", "--quiet", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run --quiet");

    assert_eq!(output.status.code(), Some(3));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verdict: FAILED"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!stderr.contains("note:"), "stderr: {stderr}");
}

#[test]
fn missing_data_files_without_dbgen_exit_four() {
    let dir = TempDir::new().unwrap();

    let output = genverify()
        .args(["run", "--domains", "store", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(4));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("no data files for store and no --dbgen given"), "stderr: {stderr}");
    assert!(stderr.contains("hint:  pass --dbgen"), "stderr: {stderr}");
}

#[test]
fn unusable_dbgen_path_exits_five() {
    let dir = TempDir::new().unwrap();

    let output = genverify()
        .args(["run", "--domains", "store", "--dbgen", "/definitely/not/here/dsdgen", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("generator not found"), "stderr: {stderr}");
}

#[test]
fn worst_exit_code_wins_across_domains() {
    // web verifies clean, store has no data files: 4 beats 0
    let dir = TempDir::new().unwrap();
    let sale = line(34, &[(3, "55"), (17, "9001")]);
    let ret = line(24, &[(2, "55"), (13, "9001")]);
    std::fs::write(dir.path().join("web_sales.dat"), format!("{sale}\n")).unwrap();
    std::fs::write(dir.path().join("web_returns.dat"), format!("{ret}\n")).unwrap();

    let output = genverify()
        .args(["run", "--domains", "web,store", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(4));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("KEY RESULTS for web:"), "web should still verify: {stdout}");
    assert!(stdout.contains("Verdict: SUCCESS"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("1 passed, 0 failed, 1 errored"), "stderr: {stderr}");
}

#[test]
fn unknown_domains_are_skipped_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001")],
        &[store_return("101", "7", "5001")],
    );

    let output = genverify()
        .args(["run", "--domains", "store,warehouse", "--data-dir"])
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("skipping unknown domain 'warehouse'"), "stderr: {stderr}");
}

#[test]
fn all_unknown_domains_is_a_usage_error() {
    let output = genverify()
        .args(["run", "--domains", "warehouse,inventory"])
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error: no known domains"), "stderr: {stderr}");
    assert!(stderr.contains("hint:  expected a comma-separated subset"), "stderr: {stderr}");
}

// ===========================================================================
// Generator invocation
// ===========================================================================

#[cfg(unix)]
#[test]
fn generator_script_runs_in_the_data_directory() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();

    // Stage source files next to the script; `cp` without paths only works
    // when the child process cwd is the data directory.
    std::fs::write(
        dir.path().join("sales.src"),
        format!("{}\n", store_sale("101", "7", "5001")),
    )
    .unwrap();
    std::fs::write(
        dir.path().join("returns.src"),
        format!("{}\n", store_return("101", "7", "5001")),
    )
    .unwrap();

    let script = dir.path().join("fake_dsdgen");
    std::fs::write(
        &script,
        "#!/bin/sh\necho \"$@\" > argv.seen\ncp sales.src store_sales.dat\ncp returns.src store_returns.dat\n",
    )
    .unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    let output = genverify()
        .arg("run")
        .args(["--domains", "store", "--scale", "2"])
        .arg("--dbgen")
        .arg(&script)
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .expect("genverify run with generator");

    assert_eq!(
        output.status.code(),
        Some(0),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Generating store data with:"), "stderr: {stderr}");

    let argv = std::fs::read_to_string(dir.path().join("argv.seen")).unwrap();
    assert_eq!(argv.trim(), "-scale 2 -table store_sales");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Verdict: SUCCESS"));
    assert!(stdout.contains("Data generation time:"));
    assert!(!stdout.contains("existing data files used"));
}

#[cfg(unix)]
#[test]
fn failing_generator_exits_five_but_later_domains_still_run() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let script = dir.path().join("broken_dsdgen");
    std::fs::write(&script, "#!/bin/sh\nexit 3\n").unwrap();
    std::fs::set_permissions(&script, std::fs::Permissions::from_mode(0o755)).unwrap();

    // store data already present, catalog requires the broken generator
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001")],
        &[store_return("101", "7", "5001")],
    );

    let output = genverify()
        .arg("run")
        .args(["--domains", "catalog,store"])
        .arg("--dbgen")
        .arg(&script)
        .arg("--data-dir")
        .arg(dir.path())
        .output()
        .expect("genverify run");

    assert_eq!(output.status.code(), Some(5));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("generator failed for table catalog_sales"), "stderr: {stderr}");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("KEY RESULTS for store:"), "store should still run: {stdout}");
}

// ===========================================================================
// Report file output
// ===========================================================================

#[test]
fn output_flag_writes_the_json_report() {
    let dir = TempDir::new().unwrap();
    write_store_files(
        dir.path(),
        &[store_sale("101", "7", "5001")],
        &[store_return("101", "7", "5001")],
    );
    let report = dir.path().join("report.json");

    let output = genverify()
        .args(["run", "--domains", "store", "--data-dir"])
        .arg(dir.path())
        .arg("--output")
        .arg(&report)
        .output()
        .expect("genverify run --output");

    assert_eq!(output.status.code(), Some(0));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("wrote "), "stderr: {stderr}");

    let body = std::fs::read_to_string(&report).unwrap();
    let value: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(value["domains"][0]["domain"], "store");
    assert_eq!(value["domains"][0]["status"], "pass");
    assert_eq!(value["domains"][0]["summary"]["successful_comparisons"], 1);
}

// ===========================================================================
// schema subcommand
// ===========================================================================

#[test]
fn schema_lists_all_domains_by_default() {
    let output = genverify().arg("schema").output().expect("genverify schema");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("catalog:"), "stdout: {stdout}");
    assert!(stdout.contains("store:"), "stdout: {stdout}");
    assert!(stdout.contains("web:"), "stdout: {stdout}");
    assert!(stdout.contains("ss_ticket_number[9]"), "stdout: {stdout}");
    assert!(stdout.contains("then item existence"), "stdout: {stdout}");
}

#[test]
fn schema_for_one_domain_prints_its_rules_only() {
    let output = genverify().args(["schema", "web"]).output().expect("genverify schema web");

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("web:"));
    assert!(stdout.contains("ws_web_page_sk[12]"));
    assert!(!stdout.contains("store:"));
    assert!(!stdout.contains("catalog:"));
}

#[test]
fn schema_rejects_unknown_domain_with_hint() {
    let output = genverify().args(["schema", "warehouse"]).output().expect("genverify schema");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("error:"), "stderr: {stderr}");
    assert!(stderr.contains("hint:  expected catalog, store or web"), "stderr: {stderr}");
}
