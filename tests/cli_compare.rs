use std::path::{Path, PathBuf};
use std::process::Command;

use serde_json::Value;
use voiceauth::testing::synth::{self, VoiceProfile};

const SAMPLE_RATE: u32 = 16_000;

fn cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_voiceauth_cli"))
}

/// Per-test scratch directory under the system temp dir
fn scratch_dir(test: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("voiceauth_cli_{}_{}", test, std::process::id()));
    std::fs::create_dir_all(&dir).expect("create scratch dir");
    dir
}

fn write_voice(dir: &Path, name: &str, profile: &VoiceProfile, seconds: f32, seed: u64) -> String {
    let path = dir.join(name);
    let samples = synth::render_voice(profile, seconds, SAMPLE_RATE, seed);
    synth::write_wav_i16(&path, &samples, SAMPLE_RATE).expect("write wav");
    path.to_string_lossy().into_owned()
}

#[test]
fn compare_identical_recordings_accepts() {
    let dir = scratch_dir("accept");
    let reference = write_voice(&dir, "ref.wav", &VoiceProfile::low_voice(), 1.5, 1);

    let output = cli()
        .args(["compare", "--reference", &reference, "--probe", &reference])
        .output()
        .expect("failed to run voiceauth_cli compare");
    assert_eq!(output.status.code(), Some(0), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("compare report JSON payload");
    assert_eq!(json["verdict"], "accept");
    assert_eq!(json["outcome"], "compared");
    assert_eq!(json["provisional"], "pass");
    assert!(json["calibrated_score"].as_f64().unwrap_or_default() > 85.0);
}

#[test]
fn compare_different_speakers_exits_with_reject_code() {
    let dir = scratch_dir("reject");
    let reference = write_voice(&dir, "ref.wav", &VoiceProfile::low_voice(), 1.5, 1);
    let probe = write_voice(&dir, "probe.wav", &VoiceProfile::high_voice(), 1.5, 2);

    let output = cli()
        .args(["compare", "--reference", &reference, "--probe", &probe])
        .output()
        .expect("failed to run voiceauth_cli compare");
    assert_eq!(output.status.code(), Some(3));

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let json: Value = serde_json::from_str(stdout.trim()).expect("compare report JSON payload");
    assert_eq!(json["verdict"], "reject");
}

#[test]
fn compare_with_differing_phrases_fails() {
    let dir = scratch_dir("phrase");
    let reference = write_voice(&dir, "ref.wav", &VoiceProfile::low_voice(), 1.0, 1);

    let output = cli()
        .args([
            "compare",
            "--reference",
            &reference,
            "--probe",
            &reference,
            "--reference-phrase",
            "open sesame",
            "--probe-phrase",
            "open barley",
        ])
        .output()
        .expect("failed to run voiceauth_cli compare");
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8(output.stderr).expect("stderr UTF-8");
    assert!(stderr.contains("PassphraseMismatch"), "stderr was {stderr}");
}

#[test]
fn synth_then_features_reports_frames() {
    let dir = scratch_dir("features");
    let path = dir.join("synth.wav").to_string_lossy().into_owned();

    let status = cli()
        .args(["synth", "--voice", "high", "--seconds", "1.0", "--output", &path, "--seed", "9"])
        .status()
        .expect("failed to run voiceauth_cli synth");
    assert!(status.success());

    let output = cli()
        .args(["features", "--input", &path])
        .output()
        .expect("failed to run voiceauth_cli features");
    assert!(output.status.success());

    let json: Value = serde_json::from_slice(&output.stdout).expect("feature report JSON");
    assert_eq!(json["sample_rate"], 16_000);
    assert_eq!(json["frame_count"], 28);
    assert_eq!(json["mfcc_layout_version"], 1);
    assert_eq!(json["mean"]["mfcc"].as_array().map(|a| a.len()), Some(13));
}

#[test]
fn batch_prints_one_line_per_pair() {
    let dir = scratch_dir("batch");
    write_voice(&dir, "a.wav", &VoiceProfile::low_voice(), 1.0, 1);
    write_voice(&dir, "b.wav", &VoiceProfile::high_voice(), 1.0, 2);
    let manifest = dir.join("pairs.json");
    std::fs::write(
        &manifest,
        r#"[
            { "reference": "a.wav", "probe": "a.wav" },
            { "reference": "a.wav", "probe": "b.wav" }
        ]"#,
    )
    .expect("write manifest");

    let output = cli()
        .args(["batch", "--manifest", &manifest.to_string_lossy()])
        .output()
        .expect("failed to run voiceauth_cli batch");
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));

    let stdout = String::from_utf8(output.stdout).expect("stdout UTF-8");
    let lines: Vec<Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("batch line JSON"))
        .collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["index"], 0);
    assert_eq!(lines[0]["result"]["verdict"], "accept");
    assert_eq!(lines[1]["result"]["verdict"], "reject");
}
