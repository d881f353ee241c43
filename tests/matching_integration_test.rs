// Integration tests for end-to-end voice matching
//
// Drives the public API with synthetic voices encoded as WAV bytes, the same
// shape of input the authentication backend hands to the matcher.

use voiceauth::analysis::calibrate;
use voiceauth::config::{AppConfig, CalibrationCurve};
use voiceauth::error::{ErrorCode, MatchErrorCodes, RecordingRole};
use voiceauth::testing::synth::{self, VoiceProfile};
use voiceauth::{AudioSample, DecodeError, MatchError, MatchOutcome, Verdict, VoiceMatcher};

const SAMPLE_RATE: u32 = 16_000;
const PHRASE: &str = "the quick brown fox";

fn wav(profile: &VoiceProfile, seconds: f32, seed: u64) -> Vec<u8> {
    synth::encode_wav_i16(
        &synth::render_voice(profile, seconds, SAMPLE_RATE, seed),
        SAMPLE_RATE,
    )
    .expect("encode synthetic voice")
}

fn matcher() -> VoiceMatcher {
    voiceauth::init_logging();
    VoiceMatcher::new(AppConfig::default()).expect("default config is valid")
}

#[test]
fn test_identical_recordings_accept() {
    let reference = wav(&VoiceProfile::low_voice(), 2.0, 7);
    let result = matcher()
        .match_audio(&reference, PHRASE, &reference, PHRASE)
        .expect("self match");

    let ceiling = calibrate(100.0, &CalibrationCurve::default());
    assert_eq!(result.verdict, Verdict::Accept);
    assert_eq!(result.label, "excellent match");
    assert!(
        (result.calibrated_score - ceiling).abs() < 1e-6,
        "self match scored {}",
        result.calibrated_score
    );
}

#[test]
fn test_same_speaker_retake_accepts() {
    let profile = VoiceProfile::low_voice();
    let reference = wav(&profile, 2.0, 1);
    let probe = wav(&profile.retake(1.01, 0.95), 1.9, 2);

    let result = matcher()
        .match_audio(&reference, PHRASE, &probe, PHRASE)
        .expect("retake match");

    assert_eq!(result.outcome, MatchOutcome::Compared);
    assert_eq!(
        result.verdict,
        Verdict::Accept,
        "retake scored raw={} calibrated={}",
        result.raw_score,
        result.calibrated_score
    );
    assert!(
        result.label == "acceptable match" || result.label == "excellent match",
        "unexpected label {}",
        result.label
    );
}

#[test]
fn test_different_speaker_rejects() {
    let reference = wav(&VoiceProfile::low_voice(), 2.0, 1);
    let probe = wav(&VoiceProfile::high_voice(), 2.0, 2);

    let result = matcher()
        .match_audio(&reference, PHRASE, &probe, PHRASE)
        .expect("impostor match");

    assert_eq!(result.outcome, MatchOutcome::Compared);
    assert_eq!(result.verdict, Verdict::Reject);
    assert!(result.calibrated_score < 85.0);
}

#[test]
fn test_duration_mismatch_reports_policy_score() {
    let reference = wav(&VoiceProfile::low_voice(), 3.0, 1);
    let probe = wav(&VoiceProfile::low_voice(), 1.5, 1);

    let result = matcher()
        .match_audio(&reference, PHRASE, &probe, PHRASE)
        .expect("gated match");

    assert_eq!(result.outcome, MatchOutcome::DurationMismatch);
    assert_eq!(result.raw_score, 30.0);
    assert_eq!(result.frames_compared, 0);
    assert_eq!(result.verdict, Verdict::Reject);
    assert_eq!(result.label, "very different");
}

#[test]
fn test_silent_probe_scores_low() {
    let reference = AudioSample::new(
        synth::render_voice(&VoiceProfile::low_voice(), 1.0, SAMPLE_RATE, 3),
        SAMPLE_RATE,
    )
    .unwrap();
    let probe = AudioSample::new(synth::silence(1.0, SAMPLE_RATE), SAMPLE_RATE).unwrap();

    let result = matcher()
        .match_samples(&reference, &probe)
        .expect("silent probe still scores");

    assert!(result.raw_score.is_finite());
    assert!(result.calibrated_score.is_finite());
    assert!(result.calibrated_score < 60.0, "silence scored {}", result.calibrated_score);
    assert_eq!(result.verdict, Verdict::Reject);
}

#[test]
fn test_short_recordings_are_rejected_as_errors() {
    let reference = wav(&VoiceProfile::low_voice(), 0.1, 1);
    let probe = wav(&VoiceProfile::low_voice(), 0.1, 2);

    let err = matcher()
        .match_audio(&reference, PHRASE, &probe, PHRASE)
        .unwrap_err();
    assert!(matches!(
        err,
        MatchError::InsufficientAudio {
            role: RecordingRole::Reference,
            ..
        }
    ));
    assert_eq!(err.code(), MatchErrorCodes::INSUFFICIENT_AUDIO);
}

#[test]
fn test_malformed_reference_is_a_decode_error() {
    let probe = wav(&VoiceProfile::low_voice(), 1.0, 2);

    let err = matcher()
        .match_audio(b"RIFF\x00\x00\x00\x00JUNK", PHRASE, &probe, PHRASE)
        .unwrap_err();
    match &err {
        MatchError::Decode { role, source } => {
            assert_eq!(*role, RecordingRole::Reference);
            assert!(!matches!(source, DecodeError::EmptyPayload));
        }
        other => panic!("expected decode error, got {other}"),
    }
    assert_eq!(err.user_message(), "could not process audio");
}

#[test]
fn test_passphrase_mismatch_is_rejected() {
    let audio = wav(&VoiceProfile::low_voice(), 1.0, 1);
    let err = matcher()
        .match_audio(&audio, PHRASE, &audio, "the slow brown fox")
        .unwrap_err();
    assert_eq!(err, MatchError::PassphraseMismatch);
    assert_eq!(err.user_message(), "incorrect voice passphrase");
}

#[test]
fn test_config_file_overrides_thresholds() {
    let path = std::env::temp_dir().join(format!(
        "voiceauth_thresholds_{}.json",
        std::process::id()
    ));
    std::fs::write(
        &path,
        r#"{ "decision": { "acceptance_threshold": 95.0, "excellence_threshold": 98.0 } }"#,
    )
    .unwrap();
    let config = AppConfig::load_from_file(&path);
    let _ = std::fs::remove_file(&path);

    assert_eq!(config.decision.acceptance_threshold, 95.0);
    assert_eq!(config.decision.secondary_threshold, 60.0);

    // The curve tops out near 92.4, so nothing can pass a 95 threshold
    let matcher = VoiceMatcher::new(config).unwrap();
    let audio = wav(&VoiceProfile::low_voice(), 1.0, 1);
    let result = matcher.match_audio(&audio, PHRASE, &audio, PHRASE).unwrap();
    assert_eq!(result.verdict, Verdict::Reject);
    assert_eq!(result.label, "similar but insufficient");
}
