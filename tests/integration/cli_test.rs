use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

fn get_binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_titan"))
}

fn run(args: &[&str]) -> Output {
    Command::new(get_binary_path())
        .args(args)
        .output()
        .expect("Failed to execute titan")
}

#[test]
fn test_solve_target() {
    let output = run(&[
        "solve", "3", "5", "7", "11", "13", "17", "19", "23", "29", "31", "--target", "50",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "Command failed with status: {:?}\nstderr: {}\nstdout: {}",
        output.status,
        String::from_utf8_lossy(&output.stderr),
        stdout
    );
    assert!(stdout.contains("Solution found!"), "Should report a solution");
    assert!(stdout.contains("Sum: 50"), "Should report the target sum");
}

#[test]
fn test_solve_max_sum_sequential() {
    let output = run(&[
        "solve", "1", "2", "3", "5", "8", "13", "21", "34", "--max-sum", "--sequential",
    ]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    assert!(stdout.contains("Sum: 87"));
    assert!(stdout.contains("Subset (8 elements)"));
}

#[test]
fn test_solve_not_found_exit_code() {
    let output = run(&["solve", "2", "4", "6", "--target", "5"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("No solution exists."));
}

#[test]
fn test_solve_requires_goal() {
    let output = run(&["solve", "1", "2", "3"]);

    assert!(!output.status.success(), "Command should fail without a goal");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--target"), "Should mention the goal flags");
}

#[test]
fn test_solve_resource_exhausted() {
    let numbers: Vec<String> = (1..=12).map(|i| i.to_string()).collect();
    let mut args = vec!["solve"];
    args.extend(numbers.iter().map(String::as_str));
    args.extend(["--target", "10", "--max-tranche", "4"]);

    let output = run(&args);

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("resource exhausted"));
}

#[test]
fn test_generate_then_solve_resonance() {
    let output = run(&["generate", "--size", "16", "--range", "50", "--seed", "11"]);
    assert!(output.status.success());
    let instance = String::from_utf8_lossy(&output.stdout).to_string();
    let values: Vec<i64> = instance
        .split_whitespace()
        .map(|v| v.parse().expect("generator prints integers"))
        .collect();
    assert_eq!(values.len(), 16);
    assert_eq!(values.iter().sum::<i64>(), 0);

    let input_path = std::env::temp_dir().join(format!("titan_resonance_{}.txt", std::process::id()));
    fs::write(&input_path, &instance).expect("write instance");

    let output = run(&[
        "solve",
        "--input",
        input_path.to_str().expect("utf-8 temp path"),
        "--resonance",
        "-j",
        "2",
        "--verbose",
    ]);

    // Clean up
    let _ = fs::remove_file(&input_path);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(stdout.contains("Sum: 0"));
    assert!(stdout.contains("--- Statistics ---"));
}
