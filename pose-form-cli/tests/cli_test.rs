use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::{json, Value};
use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::Stdio;
use tempfile::TempDir;

fn pose(points: &[(&str, f64, f64)]) -> Value {
    let keypoints: Vec<Value> = points
        .iter()
        .map(|(name, x, y)| json!({"name": name, "x": x, "y": y, "score": 0.95}))
        .collect();
    json!({ "keypoints": keypoints })
}

fn standing() -> Value {
    pose(&[
        ("left_shoulder", 40.0, 40.0),
        ("right_shoulder", 60.0, 40.0),
        ("left_elbow", 40.0, 70.0),
        ("right_elbow", 60.0, 70.0),
        ("left_wrist", 40.0, 100.0),
        ("right_wrist", 60.0, 100.0),
        ("left_hip", 42.0, 100.0),
        ("right_hip", 58.0, 100.0),
        ("left_knee", 42.0, 140.0),
        ("right_knee", 58.0, 140.0),
        ("left_ankle", 42.0, 180.0),
        ("right_ankle", 58.0, 180.0),
    ])
}

fn squatting() -> Value {
    pose(&[
        ("left_shoulder", 40.0, 60.0),
        ("right_shoulder", 60.0, 60.0),
        ("left_elbow", 60.0, 80.0),
        ("right_elbow", 40.0, 80.0),
        ("left_wrist", 80.0, 100.0),
        ("right_wrist", 20.0, 100.0),
        ("left_hip", 42.0, 110.0),
        ("right_hip", 58.0, 110.0),
        ("left_knee", 72.0, 120.0),
        ("right_knee", 28.0, 120.0),
        ("left_ankle", 42.0, 160.0),
        ("right_ankle", 58.0, 160.0),
    ])
}

fn write_frames(dir: &Path, poses: &[Value]) -> std::path::PathBuf {
    let path = dir.join("frames.jsonl");
    let lines: Vec<String> = poses
        .iter()
        .enumerate()
        .map(|(i, pose)| json!({"timestamp_ms": i as u64 * 100, "poses": [pose]}).to_string())
        .collect();
    fs::write(&path, lines.join("\n")).unwrap();
    path
}

fn write_json(dir: &Path, name: &str, value: &Value) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, value.to_string()).unwrap();
    path
}

/// Command isolated from any user configuration
fn pose_form(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("pose-form").unwrap();
    cmd.env("POSE_FORM_CONFIG", dir.path().join("config.toml"));
    cmd
}

#[test]
fn test_help_command() {
    let mut cmd = Command::cargo_bin("pose-form").unwrap();
    cmd.arg("--help");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("Squat counting"))
        .stdout(predicate::str::contains("squat"))
        .stdout(predicate::str::contains("compare"));
}

#[test]
fn test_version_command() {
    let mut cmd = Command::cargo_bin("pose-form").unwrap();
    cmd.arg("--version");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("0.1.0"));
}

#[test]
fn test_completions_command() {
    let mut cmd = Command::cargo_bin("pose-form").unwrap();
    cmd.arg("completions").arg("bash");

    cmd.assert()
        .success()
        .stdout(predicate::str::contains("_pose-form"));
}

#[test]
fn test_squat_counts_reps() {
    let dir = TempDir::new().unwrap();
    let frames = write_frames(
        dir.path(),
        &[standing(), standing(), squatting(), standing(), squatting(), standing()],
    );

    pose_form(&dir)
        .args(["squat", "--input"])
        .arg(&frames)
        .assert()
        .success()
        .stdout(predicate::str::contains("Valid reps: 2"));
}

#[test]
fn test_squat_json_summary() {
    let dir = TempDir::new().unwrap();
    let frames = write_frames(dir.path(), &[standing(), squatting(), standing()]);

    let output = pose_form(&dir)
        .args(["squat", "--json", "--input"])
        .arg(&frames)
        .output()
        .unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["reps"], 1);
    assert_eq!(summary["frames"], 3);
    assert_eq!(summary["logs"][1]["phase"], "SQUATTING");
}

#[test]
fn test_compare_identical_poses() {
    let dir = TempDir::new().unwrap();
    let pose = write_json(dir.path(), "pose.json", &standing());

    let output = pose_form(&dir)
        .args(["compare", "--json", "--strategy", "keyAngles=0.5", "--strategy", "relativeAngles=0.5"])
        .arg("--pose")
        .arg(&pose)
        .arg("--reference")
        .arg(&pose)
        .output()
        .unwrap();
    assert!(output.status.success());

    let breakdown: Value = serde_json::from_slice(&output.stdout).unwrap();
    let combined = breakdown["combined"].as_f64().unwrap();
    assert!((combined - 1.0).abs() < 1e-9);
    assert_eq!(breakdown["parts"].as_array().unwrap().len(), 2);
}

#[test]
fn test_compare_rejects_unknown_strategy() {
    let dir = TempDir::new().unwrap();
    let pose = write_json(dir.path(), "pose.json", &standing());

    pose_form(&dir)
        .args(["compare", "--strategy", "wristFlicks=1.0"])
        .arg("--pose")
        .arg(&pose)
        .arg("--reference")
        .arg(&pose)
        .assert()
        .failure()
        .stderr(predicate::str::contains("wristFlicks"));
}

#[test]
fn test_compare_rejects_overweight_blend() {
    let dir = TempDir::new().unwrap();
    let pose = write_json(dir.path(), "pose.json", &standing());

    pose_form(&dir)
        .args(["compare", "--strategy", "keyAngles=0.8", "--strategy", "invariantFeatures=0.8"])
        .arg("--pose")
        .arg(&pose)
        .arg("--reference")
        .arg(&pose)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid strategy weights"));
}

#[test]
fn test_compare_rejects_angles_without_key_angles() {
    let dir = TempDir::new().unwrap();
    let pose = write_json(dir.path(), "pose.json", &standing());

    pose_form(&dir)
        .args(["compare", "--angles", "leftKneeAngle"])
        .arg("--pose")
        .arg(&pose)
        .arg("--reference")
        .arg(&pose)
        .assert()
        .failure()
        .stderr(predicate::str::contains("--angles needs a keyAngles strategy"));
}

#[test]
fn test_score_streams_every_third_frame() {
    let dir = TempDir::new().unwrap();
    let frames = write_frames(dir.path(), &vec![standing(); 6]);
    let reference = write_json(dir.path(), "reference.json", &standing());

    let output = pose_form(&dir)
        .args(["score", "--json", "--input"])
        .arg(&frames)
        .arg("--reference")
        .arg(&reference)
        .output()
        .unwrap();
    assert!(output.status.success());

    let scored: Vec<Value> = String::from_utf8(output.stdout)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(scored.len(), 2);
    assert_eq!(scored[0]["frame"], 2);
    assert_eq!(scored[0]["logged"], true);
}

#[test]
fn test_config_init_and_show() {
    let dir = TempDir::new().unwrap();
    let config_file = dir.path().join("config.toml");

    pose_form(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Configuration initialized"));
    assert!(config_file.exists());

    pose_form(&dir)
        .args(["config", "init"])
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));

    pose_form(&dir)
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("frame_deadline_ms = 1000"))
        .stdout(predicate::str::contains("relativeAngles"));
}

#[test]
fn test_squat_drops_frame_past_deadline() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("config.toml"), "[session]\nframe_deadline_ms = 200\n").unwrap();

    let mut child = std::process::Command::new(assert_cmd::cargo::cargo_bin("pose-form"))
        .env("POSE_FORM_CONFIG", dir.path().join("config.toml"))
        .env_remove("RUST_LOG")
        .args(["squat", "--json", "--input", "-"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();

    let mut stdin = child.stdin.take().unwrap();
    let frame = |pose: Value| format!("{}\n", json!({ "poses": [pose] }));
    stdin.write_all(frame(standing()).as_bytes()).unwrap();
    stdin.flush().unwrap();

    // Hold the next frame back until the deadline warning shows up
    let mut stderr = BufReader::new(child.stderr.take().unwrap());
    let mut line = String::new();
    loop {
        line.clear();
        assert!(stderr.read_line(&mut line).unwrap() > 0, "no deadline warning logged");
        if line.contains("missed its deadline") {
            break;
        }
    }
    let drain = std::thread::spawn(move || std::io::copy(&mut stderr, &mut std::io::sink()));

    // The late frame is discarded; the rest make one rep
    for pose in [squatting(), standing(), squatting(), standing()] {
        stdin.write_all(frame(pose).as_bytes()).unwrap();
    }
    drop(stdin);

    let output = child.wait_with_output().unwrap();
    drain.join().unwrap().unwrap();
    assert!(output.status.success());

    let summary: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(summary["missed_frames"], 1);
    assert_eq!(summary["frames"], 4);
    assert_eq!(summary["reps"], 1);
}
