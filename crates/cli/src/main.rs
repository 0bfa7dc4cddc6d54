use std::path::PathBuf;
use std::process;

use clap::Parser;
use serde_json::{json, Value};

use forehead_core::detection::domain::forehead_estimator::ForeheadConfig;
use forehead_core::detection::infrastructure::onnx_blazeface_detector::DEFAULT_CONFIDENCE;
use forehead_core::detection::infrastructure::onnx_face_mesh_detector::DEFAULT_PRESENCE_THRESHOLD;
use forehead_core::pipeline::infrastructure::locator_builder::{build_locator, LocatorSettings};
use forehead_core::pipeline::locate_forehead_use_case::ForeheadOutcome;
use forehead_core::shared::constants::NO_FACE_MESSAGE;

/// Locate the forehead tip in a single image and print it as JSON.
#[derive(Parser)]
#[command(name = "forehead-tip")]
struct Cli {
    /// Input image file (PNG, JPEG, ...).
    input: PathBuf,

    /// Directory searched for ONNX models before the user cache.
    #[arg(long)]
    model_dir: Option<PathBuf>,

    /// Download URL for the face detection model, used when not found locally.
    #[arg(long)]
    face_detector_url: Option<String>,

    /// Download URL for the face mesh model, used when not found locally.
    #[arg(long)]
    face_mesh_url: Option<String>,

    /// Face detection confidence threshold (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE)]
    confidence: f64,

    /// Minimum face-mesh presence score (0.0-1.0).
    #[arg(long, default_value_t = DEFAULT_PRESENCE_THRESHOLD)]
    presence_threshold: f64,
}

fn main() {
    env_logger::init();

    match run() {
        Ok(found) => process::exit(if found { 0 } else { 2 }),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

/// Prints the response body the HTTP service would return. `Ok(false)` means
/// no face was found.
fn run() -> Result<bool, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    if !cli.input.exists() {
        return Err(format!("Input file not found: {}", cli.input.display()).into());
    }

    let settings = LocatorSettings {
        workers: 1,
        face_confidence: cli.confidence,
        presence_threshold: cli.presence_threshold,
        model_dir: cli.model_dir,
        face_detector_url: cli.face_detector_url,
        face_mesh_url: cli.face_mesh_url,
        forehead: ForeheadConfig::default(),
    };
    let locator = build_locator(&settings, Some(download_progress))?;
    let bytes = std::fs::read(&cli.input)?;

    let (body, found) = response_body(locator.execute(&bytes)?)?;
    println!("{body}");
    log::info!("Processed {}", cli.input.display());
    Ok(found)
}

/// JSON body and found flag for an outcome, mirroring the HTTP responses.
fn response_body(outcome: ForeheadOutcome) -> Result<(Value, bool), Box<dyn std::error::Error>> {
    match outcome {
        ForeheadOutcome::Detected(tip) => Ok((serde_json::to_value(tip)?, true)),
        ForeheadOutcome::NoFaceFound => Ok((json!({ "error": NO_FACE_MESSAGE }), false)),
        ForeheadOutcome::InvalidInput(reason) => Err(reason.into()),
    }
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading {name}... {pct}%");
    } else {
        eprint!("\rDownloading {name}... {downloaded} bytes");
    }
}
