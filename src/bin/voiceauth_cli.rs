use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use voiceauth::analysis::features::MFCC_LAYOUT_VERSION;
use voiceauth::analysis::{FeatureExtractor, FeatureVector, ProvisionalFeedback};
use voiceauth::error::ErrorCode;
use voiceauth::testing::synth::{self, VoiceProfile};
use voiceauth::{
    decode_file, AppConfig, MatchRequest, MatchService, SimilarityResult, VoiceMatcher,
};

/// Exit code reported when the probe is rejected
const EXIT_REJECT: u8 = 3;

#[derive(Parser, Debug)]
#[command(
    name = "voiceauth_cli",
    about = "Offline harness for the voice-passphrase matching engine"
)]
struct Cli {
    /// JSON configuration file (defaults are used when omitted)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare a probe recording against a reference recording
    Compare {
        #[arg(long)]
        reference: PathBuf,
        #[arg(long)]
        probe: PathBuf,
        #[arg(long, default_value = "")]
        reference_phrase: String,
        #[arg(long, default_value = "")]
        probe_phrase: String,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print a feature summary for one recording
    Features {
        #[arg(long)]
        input: PathBuf,
    },
    /// Write a deterministic synthetic voice recording
    Synth {
        #[arg(long, value_enum)]
        voice: VoiceArg,
        #[arg(long, default_value_t = 2.0)]
        seconds: f32,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Scale the voice pitch (1.0 = unchanged)
        #[arg(long, default_value_t = 1.0)]
        pitch_ratio: f32,
        #[arg(long, default_value_t = 16_000)]
        sample_rate: u32,
    },
    /// Run every pair of a JSON manifest concurrently, one JSON line per pair
    Batch {
        #[arg(long)]
        manifest: PathBuf,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum VoiceArg {
    Low,
    High,
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    voiceauth::init_logging();
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Compare {
            reference,
            probe,
            reference_phrase,
            probe_phrase,
            output,
        } => run_compare(
            config,
            &reference,
            &probe,
            &reference_phrase,
            &probe_phrase,
            output,
        ),
        Commands::Features { input } => run_features(config, &input),
        Commands::Synth {
            voice,
            seconds,
            output,
            seed,
            pitch_ratio,
            sample_rate,
        } => run_synth(voice, seconds, &output, seed, pitch_ratio, sample_rate),
        Commands::Batch { manifest } => run_batch(config, &manifest),
    }
}

fn run_compare(
    config: AppConfig,
    reference: &Path,
    probe: &Path,
    reference_phrase: &str,
    probe_phrase: &str,
    output_path: Option<PathBuf>,
) -> Result<ExitCode> {
    let matcher = VoiceMatcher::new(config).context("building matcher")?;
    let reference_audio =
        fs::read(reference).with_context(|| format!("reading {}", reference.display()))?;
    let probe_audio = fs::read(probe).with_context(|| format!("reading {}", probe.display()))?;

    let result = matcher
        .match_audio(&reference_audio, reference_phrase, &probe_audio, probe_phrase)
        .with_context(|| format!("comparing {} with {}", probe.display(), reference.display()))?;

    let report = CompareReport {
        reference: reference.display().to_string(),
        probe: probe.display().to_string(),
        provisional: matcher.decision().provisional_feedback(result.calibrated_score),
        result: &result,
    };
    let json = serde_json::to_string_pretty(&report)?;
    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    if result.is_accept() {
        Ok(ExitCode::from(0))
    } else {
        Ok(ExitCode::from(EXIT_REJECT))
    }
}

fn run_features(config: AppConfig, input: &Path) -> Result<ExitCode> {
    config.validate().context("validating configuration")?;
    let sample = decode_file(input).with_context(|| format!("decoding {}", input.display()))?;
    let extractor = FeatureExtractor::new(config.analysis);
    let features = extractor.extract(&sample);

    let report = FeatureReport {
        input: input.display().to_string(),
        sample_rate: sample.sample_rate(),
        duration_seconds: sample.duration_seconds(),
        frame_count: features.len(),
        mfcc_layout_version: MFCC_LAYOUT_VERSION,
        mean: features.mean(),
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(ExitCode::from(0))
}

fn run_synth(
    voice: VoiceArg,
    seconds: f32,
    output: &Path,
    seed: u64,
    pitch_ratio: f32,
    sample_rate: u32,
) -> Result<ExitCode> {
    if !seconds.is_finite() || seconds <= 0.0 {
        bail!("--seconds must be positive (got {seconds})");
    }
    if sample_rate == 0 {
        bail!("--sample-rate must be positive");
    }
    let profile = match voice {
        VoiceArg::Low => VoiceProfile::low_voice(),
        VoiceArg::High => VoiceProfile::high_voice(),
    }
    .retake(pitch_ratio, 1.0);

    let samples = synth::render_voice(&profile, seconds, sample_rate, seed);
    synth::write_wav_i16(output, &samples, sample_rate)
        .with_context(|| format!("writing {}", output.display()))?;
    eprintln!(
        "Wrote {} samples ({:.2}s @ {} Hz) to {}",
        samples.len(),
        seconds,
        sample_rate,
        output.display()
    );
    Ok(ExitCode::from(0))
}

fn run_batch(config: AppConfig, manifest_path: &Path) -> Result<ExitCode> {
    let contents = fs::read_to_string(manifest_path)
        .with_context(|| format!("reading {}", manifest_path.display()))?;
    let entries: Vec<ManifestEntry> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing {}", manifest_path.display()))?;
    let base = manifest_path.parent().unwrap_or_else(|| Path::new("."));

    let mut requests = Vec::with_capacity(entries.len());
    for entry in &entries {
        let reference = base.join(&entry.reference);
        let probe = base.join(&entry.probe);
        requests.push(MatchRequest {
            reference_audio: fs::read(&reference)
                .with_context(|| format!("reading {}", reference.display()))?,
            reference_passphrase: entry.reference_phrase.clone(),
            probe_audio: fs::read(&probe).with_context(|| format!("reading {}", probe.display()))?,
            probe_passphrase: entry.probe_phrase.clone(),
        });
    }

    let max_concurrent = config.service.max_concurrent_matches;
    let matcher = Arc::new(VoiceMatcher::new(config).context("building matcher")?);
    let service = MatchService::new(matcher, max_concurrent);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .build()
        .context("starting runtime")?;
    let results = runtime.block_on(service.submit_all(requests));

    let mut failures = 0usize;
    for (index, (entry, result)) in entries.iter().zip(results).enumerate() {
        let line = match result {
            Ok(result) => BatchLine {
                index,
                reference: &entry.reference,
                probe: &entry.probe,
                result: Some(result),
                error: None,
            },
            Err(err) => {
                failures += 1;
                BatchLine {
                    index,
                    reference: &entry.reference,
                    probe: &entry.probe,
                    result: None,
                    error: Some(BatchError {
                        code: err.code(),
                        message: err.message(),
                    }),
                }
            }
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    if failures > 0 {
        eprintln!("{failures} of {} pairs failed", entries.len());
        return Ok(ExitCode::from(1));
    }
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct CompareReport<'a> {
    reference: String,
    probe: String,
    provisional: ProvisionalFeedback,
    #[serde(flatten)]
    result: &'a SimilarityResult,
}

#[derive(Serialize)]
struct FeatureReport {
    input: String,
    sample_rate: u32,
    duration_seconds: f64,
    frame_count: usize,
    mfcc_layout_version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    mean: Option<FeatureVector>,
}

#[derive(Deserialize, Debug)]
struct ManifestEntry {
    reference: PathBuf,
    probe: PathBuf,
    #[serde(default)]
    reference_phrase: String,
    #[serde(default)]
    probe_phrase: String,
}

#[derive(Serialize)]
struct BatchLine<'a> {
    index: usize,
    reference: &'a Path,
    probe: &'a Path,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<SimilarityResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<BatchError>,
}

#[derive(Serialize)]
struct BatchError {
    code: i32,
    message: String,
}
