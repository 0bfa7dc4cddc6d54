use std::path::PathBuf;
use std::process;

use clap::Parser;

use forehead_core::detection::domain::forehead_estimator::ForeheadConfig;
use forehead_core::detection::infrastructure::onnx_blazeface_detector::DEFAULT_CONFIDENCE;
use forehead_core::detection::infrastructure::onnx_face_mesh_detector::DEFAULT_PRESENCE_THRESHOLD;
use forehead_core::pipeline::infrastructure::locator_builder::{build_locator, LocatorSettings};
use forehead_core::shared::constants::{DEFAULT_HOST, DEFAULT_PORT};

mod app;
mod error;
mod handlers;
#[cfg(test)]
mod test_support;

use app::{bind, router, serve, shutdown_signal, AppState};

const DEFAULT_MAX_BODY_MB: usize = 16;

/// HTTP service returning the forehead tip of a base64-encoded face image.
#[derive(Parser)]
#[command(name = "forehead-server")]
struct Cli {
    /// Interface to bind.
    #[arg(long, default_value = DEFAULT_HOST)]
    host: String,

    /// Port to listen on.
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,

    /// Detector instances, i.e. concurrent inferences (default: CPU count).
    #[arg(long)]
    workers: Option<usize>,

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

    /// Fraction of the forehead/nose-bridge distance the tip sits above the forehead landmark.
    #[arg(long, default_value_t = ForeheadConfig::default().height_factor)]
    height_factor: f64,

    /// Maximum request body size in MiB.
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_MB)]
    max_body_mb: usize,
}

impl Cli {
    fn locator_settings(&self) -> LocatorSettings {
        LocatorSettings {
            workers: self.workers.unwrap_or_else(default_workers),
            face_confidence: self.confidence,
            presence_threshold: self.presence_threshold,
            model_dir: self.model_dir.clone(),
            face_detector_url: self.face_detector_url.clone(),
            face_mesh_url: self.face_mesh_url.clone(),
            forehead: ForeheadConfig {
                height_factor: self.height_factor,
                ..ForeheadConfig::default()
            },
        }
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    // Model resolution uses blocking HTTP, so it happens before the runtime starts.
    let locator = build_locator(&cli.locator_settings(), Some(download_progress))?;
    let app = router(AppState::new(locator), cli.max_body_mb * 1024 * 1024);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    runtime.block_on(async move {
        let listener = bind(&cli.host, cli.port).await?;
        serve(listener, app, shutdown_signal()).await
    })?;
    Ok(())
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if cli.workers == Some(0) {
        return Err("Workers must be at least 1".into());
    }
    if cli.max_body_mb == 0 {
        return Err("Max body size must be at least 1 MiB".into());
    }
    if !cli.height_factor.is_finite() || cli.height_factor < 0.0 {
        return Err(format!(
            "Height factor must be a non-negative number, got {}",
            cli.height_factor
        )
        .into());
    }
    Ok(())
}

fn default_workers() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

fn download_progress(name: &str, downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        log::info!("Downloading {name}... {pct}%");
    } else {
        log::info!("Downloading {name}... {downloaded} bytes");
    }
}
