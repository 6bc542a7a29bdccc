//! Integration tests for neuro-cli.
//!
//! Tests invoke the `neuro` binary against the bundled sample graph and
//! temporary graph files.

use std::process::Command;

const SAMPLE_GRAPH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../graphs/relaxation.toml");

/// Helper to get the path to the `neuro` binary built by cargo.
fn neuro_bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_neuro"))
}

// ---------------------------------------------------------------------------
// `neuro check`
// ---------------------------------------------------------------------------

#[test]
fn cli_check_prints_graph_structure() {
    let output = neuro_bin()
        .args(["check", SAMPLE_GRAPH])
        .output()
        .expect("failed to run neuro check");

    assert!(output.status.success(), "neuro check failed");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("Relaxation"));
    assert!(stdout.contains("Nodes (7)"));
    assert!(stdout.contains("Connections (10)"));
    assert!(stdout.contains("eeg:0 -> scale:0"));
    assert!(stdout.contains("Processing order: eeg"));
    assert!(stdout.contains("show_text"));
    assert!(stdout.trim_end().ends_with("OK"));
}

#[test]
fn cli_check_rejects_unknown_node_kind() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    std::fs::write(
        &path,
        "name = \"Bad\"\n\n[[nodes]]\nid = \"x\"\nkind = \"reverb\"\n",
    )
    .unwrap();

    let output = neuro_bin()
        .arg("check")
        .arg(&path)
        .output()
        .expect("failed to run neuro check");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("unknown node kind: reverb"));
}

#[test]
fn cli_check_missing_file_fails() {
    let output = neuro_bin()
        .args(["check", "/nonexistent/graph.toml"])
        .output()
        .expect("failed to run neuro check");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to read file"));
}

// ---------------------------------------------------------------------------
// `neuro run`
// ---------------------------------------------------------------------------

#[test]
fn cli_run_reports_actions_and_feedback() {
    let output = neuro_bin()
        .args(["run", SAMPLE_GRAPH, "--duration", "3", "--noise", "0"])
        .output()
        .expect("failed to run neuro run");

    assert!(output.status.success(), "neuro run failed");
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("background #20A040"));
    assert!(stdout.contains("play audio sounds/rain.ogg (loops -1"));
    assert!(stdout.contains("Feedback after 3.00s:"));
    assert!(stdout.contains("relaxation"));
    assert!(stdout.contains("background"));
}

#[test]
fn cli_run_rejects_zero_tick_rate() {
    let output = neuro_bin()
        .args(["run", SAMPLE_GRAPH, "--tick-rate", "0"])
        .output()
        .expect("failed to run neuro run");

    assert!(!output.status.success());
}

// ---------------------------------------------------------------------------
// `neuro colors`
// ---------------------------------------------------------------------------

#[test]
fn cli_colors_prints_single_mapping() {
    let output = neuro_bin()
        .args(["colors", "--mapping", "grey-scale", "--steps", "3", "--unique", "2"])
        .output()
        .expect("failed to run neuro colors");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("Grey-Scale"));
    assert!(stdout.contains("0.00  #000000"));
    assert!(stdout.contains("1.00  #FFFFFF"));
    assert!(stdout.contains("Unique colors"));
    assert!(!stdout.contains("Rainbow"));
}

#[test]
fn cli_colors_lists_all_mappings() {
    let output = neuro_bin()
        .arg("colors")
        .output()
        .expect("failed to run neuro colors");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for name in ["Rainbow", "Blue-Pink-Red", "Black-Body-Radiation", "Red-Yellow-Green-Blue"] {
        assert!(stdout.contains(name), "missing mapping {name}");
    }
}

#[test]
fn cli_colors_rejects_unknown_mapping() {
    let output = neuro_bin()
        .args(["colors", "--mapping", "plasma"])
        .output()
        .expect("failed to run neuro colors");

    assert!(!output.status.success());
}
