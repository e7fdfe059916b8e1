use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use tempfile::TempDir;

fn mw_binary() -> PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // remove test binary name
    path.pop(); // remove deps/
    path.push("mw");
    path
}

fn setup_test_env() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().to_path_buf();

    let config_dir = root.join("config");
    fs::create_dir_all(&config_dir).unwrap();

    let data_dir = root.join("data");
    fs::create_dir_all(&data_dir).unwrap();

    let config_content = format!(
        r#"[db]
path = "{}/data/mw.sqlite"

[retrieval]
lookback_days = 30

[server]
bind = "127.0.0.1:8300"
"#,
        root.display()
    );

    let config_path = config_dir.join("mw.toml");
    fs::write(&config_path, config_content).unwrap();

    (tmp, config_path)
}

fn run_mw(config_path: &Path, args: &[&str]) -> (String, String, bool) {
    let binary = mw_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run mw binary at {:?}: {}", binary, e));

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();
    let stderr = String::from_utf8_lossy(&output.stderr).to_string();
    let success = output.status.success();
    (stdout, stderr, success)
}

#[test]
fn test_init_creates_database() {
    let (tmp, config_path) = setup_test_env();

    let (stdout, stderr, success) = run_mw(&config_path, &["init"]);
    assert!(success, "init failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("initialized"));
    assert!(tmp.path().join("data/mw.sqlite").exists());
}

#[test]
fn test_init_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    let (_, _, success1) = run_mw(&config_path, &["init"]);
    assert!(success1, "First init failed");

    let (_, _, success2) = run_mw(&config_path, &["init"]);
    assert!(success2, "Second init failed (not idempotent)");
}

#[test]
fn test_seed_then_search_finds_meeting() {
    let (_tmp, config_path) = setup_test_env();

    run_mw(&config_path, &["init"]);
    let (stdout, stderr, success) = run_mw(&config_path, &["seed"]);
    assert!(success, "seed failed: stdout={}, stderr={}", stdout, stderr);
    assert!(stdout.contains("Seeded"));

    let (stdout, stderr, success) = run_mw(&config_path, &["search", "budget"]);
    assert!(
        success,
        "search failed: stdout={}, stderr={}",
        stdout, stderr
    );
    assert!(stdout.contains("Q3 Planning"), "got: {}", stdout);
    assert!(stdout.contains("MTG-SEED-0001"));
}

#[test]
fn test_seed_idempotent() {
    let (_tmp, config_path) = setup_test_env();

    run_mw(&config_path, &["init"]);
    let (_, _, success1) = run_mw(&config_path, &["seed"]);
    assert!(success1, "First seed failed");

    // Second seed skips existing records instead of failing on
    // duplicate IDs.
    let (stdout, _, success2) = run_mw(&config_path, &["seed"]);
    assert!(success2, "Second seed failed (not idempotent)");
    assert!(stdout.contains("Seeded 0 records"), "got: {}", stdout);
}

#[test]
fn test_search_no_results() {
    let (_tmp, config_path) = setup_test_env();

    run_mw(&config_path, &["init"]);
    let (stdout, _, success) = run_mw(&config_path, &["search", "zzyzx"]);
    assert!(success);
    assert!(stdout.contains("No results."));
}

#[test]
fn test_search_all_terms_must_match() {
    let (_tmp, config_path) = setup_test_env();

    run_mw(&config_path, &["init"]);
    run_mw(&config_path, &["seed"]);

    // "budget" matches the planning meeting, but adding an unmatched
    // term filters it out.
    let (stdout, _, _) = run_mw(&config_path, &["search", "budget zzyzx"]);
    assert!(stdout.contains("No results."), "got: {}", stdout);
}

#[test]
fn test_ask_without_providers_fails() {
    let (_tmp, config_path) = setup_test_env();

    run_mw(&config_path, &["init"]);

    let binary = mw_binary();
    let output = Command::new(&binary)
        .arg("--config")
        .arg(config_path.to_str().unwrap())
        .args(["ask", "What is MongoDB used for?"])
        .env_remove("OPENAI_API_KEY")
        .env_remove("GEMINI_API_KEY")
        .output()
        .unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("No AI providers"),
        "expected provider error, got: {}",
        stderr
    );
}
