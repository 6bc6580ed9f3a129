//! Command-line tests for the tripcraft binary

use std::process::{Command, Output};

fn tripcraft(args: &[&str]) -> Output {
    let dir = tempfile::tempdir().expect("Failed to create temp dir");
    let config = dir.path().join("absent.toml");
    Command::new(env!("CARGO_BIN_EXE_tripcraft"))
        .arg("--config")
        .arg(&config)
        .args(args)
        .env_remove("RUST_LOG")
        .env_remove("OPENAI_API_KEY")
        .output()
        .expect("Failed to execute command")
}

#[test]
fn test_help_lists_subcommands() {
    let output = tripcraft(&["--help"]);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("serve"));
    assert!(stdout.contains("plan"));
    assert!(stdout.contains("prompt"));
}

#[test]
fn test_prompt_prints_every_trip_field() {
    let output = tripcraft(&[
        "prompt",
        "--destination",
        "Paris, France",
        "--days",
        "5",
        "--budget",
        "moderate",
        "--budget-range",
        "$800-$1200 USD",
        "--purpose",
        "relaxation",
        "--interest",
        "food,history",
        "--dietary",
        "Vegetarian",
        "--mobility",
        "no-restrictions",
        "--accommodation",
        "mid-range-hotel",
    ]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    for line in [
        "Destination: Paris, France",
        "Duration: 5 days",
        "Budget: $800-$1200 USD",
        "Purpose: 🏖️ Relaxation",
        "Preferences: 🍴 Food, 🏛️ History",
        "Dietary: Vegetarian",
        "Mobility: 🚶 No restrictions",
        "Accommodation: 🏩 Mid-range Hotel",
    ] {
        assert!(stdout.contains(line), "missing '{line}' in:\n{stdout}");
    }
    assert!(stdout.contains("[system]"));
    assert!(stdout.contains("Create a detailed 5-day itinerary for Paris, France"));
}

#[test]
fn test_prompt_accepts_labels() {
    let output = tripcraft(&[
        "prompt",
        "--destination",
        "Lima",
        "--interest",
        "🌳 Nature",
        "--interest",
        "art",
        "--accommodation",
        "🏠 Budget Hostel",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Accommodation: 🏠 Budget Hostel"));
}

#[test]
fn test_plan_requires_two_interests() {
    let output = tripcraft(&["plan", "--destination", "Rome", "--interest", "art"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Please select at least 2 interests!"));
}

#[test]
fn test_unknown_choice_is_rejected() {
    let output = tripcraft(&["prompt", "--interest", "food,nope"]);
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("expected one of"));
}
