use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use camera_its_rs::its::{
    AnglePair, BurstConsistency, CaptureMetadata, CpuDebayer, FrameSyncCheck, ImageBuffer,
    ImageReader, ItsConfig, NoiseModelCheck, NoiseProfile, OrientationCheck, Patch,
    RawCaptureReader, RawLoaderReader, SyncCalibration, ThreeAResult, TiffImageReader,
};
use camera_its_rs::logger;

#[derive(Parser)]
#[command(name = "camera-its")]
#[command(about = "Run camera image test checks on captured frames")]
#[command(version)]
struct Cli {
    /// JSON file overriding check thresholds.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a chart capture is not flipped or mirrored.
    Orientation {
        /// Captured frame (TIFF, or raw with --raw).
        #[arg(long)]
        capture: PathBuf,

        /// Capture is a raw file; demosaic it before comparing.
        #[arg(long)]
        raw: bool,

        /// Chart template (TIFF).
        #[arg(long)]
        template: PathBuf,

        /// Normalized chart location inside the capture: x y w h.
        #[arg(long, num_args = 4, value_names = ["X", "Y", "W", "H"])]
        chart: Option<Vec<f64>>,

        /// Directory for per-orientation debug TIFFs.
        #[arg(long)]
        debug_dir: Option<PathBuf>,
    },

    /// Compare raw patch variance with the sensor noise model.
    NoiseModel {
        /// Raw capture (DNG or any rawloader format).
        #[arg(long)]
        raw: PathBuf,

        /// Noise profile per CFA position as `scale,offset` (4 values).
        #[arg(long = "profile", required = true)]
        profiles: Vec<String>,

        #[arg(long, default_value = "0")]
        sensitivity: i32,
    },

    /// Print the sensitivity/exposure pairs of a noise-model sweep.
    SweepPlan {
        #[arg(long)]
        sens_min: i32,

        /// Maximum analog sensitivity.
        #[arg(long)]
        sens_max_analog: i32,

        /// Converged AE sensitivity.
        #[arg(long)]
        sensitivity: i32,

        /// Converged AE exposure time.
        #[arg(long)]
        exposure_ns: i64,
    },

    /// Check center patch consistency across a burst of frames.
    Burst {
        /// Frames (TIFF, or raw with --raw), in capture order.
        #[arg(long = "frame", required = true)]
        frames: Vec<PathBuf>,

        /// Frames are raw files; demosaic them before measuring.
        #[arg(long)]
        raw: bool,

        #[arg(long, value_enum, default_value = "locked")]
        mode: BurstMode,

        /// Device supports manual sensor control (locked mode).
        #[arg(long)]
        manual_sensor: bool,

        #[arg(long, default_value = "30")]
        first_api_level: u32,
    },

    /// Check chart angle agreement between two synchronized cameras.
    FrameSync {
        /// JSON array of [angle_1, angle_2] pairs; null for undetected.
        #[arg(long)]
        angles: PathBuf,

        #[arg(long)]
        first_api_level: u32,

        #[arg(long, value_enum, default_value = "approximate")]
        sync: SyncArg,
    },

    /// Validate converged 3A results.
    ThreeA {
        /// JSON object with sensitivity, exposure_ns, awb_gains, awb_transform, focus_distance.
        #[arg(long)]
        result: PathBuf,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum BurstMode {
    Locked,
    Manual,
}

#[derive(Clone, Copy, ValueEnum)]
enum SyncArg {
    Approximate,
    Calibrated,
}

fn parse_profile(text: &str) -> Result<NoiseProfile> {
    let (scale, offset) = text
        .split_once(',')
        .with_context(|| format!("expected scale,offset, got {text:?}"))?;
    Ok(NoiseProfile::new(
        scale.trim().parse().context("noise profile scale")?,
        offset.trim().parse().context("noise profile offset")?,
    ))
}

fn read_frame(path: &Path, raw: bool) -> Result<ImageBuffer> {
    if raw {
        let capture = RawLoaderReader.read_raw_file(path)?;
        CpuDebayer::new()?.process(&capture)
    } else {
        Ok(TiffImageReader.read_image_file(path)?)
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let text = std::fs::read_to_string(path).with_context(|| path.display().to_string())?;
    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ItsConfig::from_json_file(path)?,
        None => ItsConfig::default(),
    };

    match cli.command {
        Commands::Orientation {
            capture,
            raw,
            template,
            chart,
            debug_dir,
        } => {
            let mut image = read_frame(&capture, raw)?;
            if let Some(c) = chart {
                image = image.patch(&Patch::new(c[0], c[1], c[2], c[3]))?;
            }
            let template = TiffImageReader.read_image_file(&template)?;

            let mut check = OrientationCheck::new(config.orientation);
            if let Some(dir) = debug_dir {
                check = check.with_debug_dir(dir);
            }
            let report = check.check(&image, &template)?;
            info!("Best orientation: {}", report.best);
        }
        Commands::NoiseModel {
            raw,
            profiles,
            sensitivity,
        } => {
            let noise_profile = profiles
                .iter()
                .map(|p| parse_profile(p))
                .collect::<Result<Vec<_>>>()?;
            let raw = RawLoaderReader.read_raw_file(&raw)?;
            let metadata = CaptureMetadata {
                sensitivity,
                noise_profile,
                ..CaptureMetadata::default()
            };

            let report = NoiseModelCheck::new(config.noise_model).check_sweep(&[(raw, metadata)])?;
            for sample in report.points.iter().flat_map(|p| &p.samples) {
                info!(
                    "{} mean {:.3} var {:.3e} model {:.3e} diff {:.3e} (thresh {:.3e})",
                    sample.channel,
                    sample.mean,
                    sample.measured,
                    sample.model,
                    sample.diff,
                    sample.threshold
                );
            }
        }
        Commands::SweepPlan {
            sens_min,
            sens_max_analog,
            sensitivity,
            exposure_ns,
        } => {
            let check = NoiseModelCheck::new(config.noise_model);
            let product = i64::from(sensitivity) * exposure_ns;
            for (sens, exposure) in check.plan_sweep(sens_min, sens_max_analog, product) {
                println!("{sens} {exposure}");
            }
        }
        Commands::Burst {
            frames,
            raw,
            mode,
            manual_sensor,
            first_api_level,
        } => {
            let images = frames
                .iter()
                .map(|f| read_frame(f, raw))
                .collect::<Result<Vec<_>>>()?;
            let check = match mode {
                BurstMode::Locked => BurstConsistency::locked(&config.burst, manual_sensor),
                BurstMode::Manual => BurstConsistency::manual(&config.burst, first_api_level),
            };
            let names: &[&str] = match images.first().map(|i| i.channels) {
                Some(3) => &["R", "G", "B"],
                Some(1) => &["Y"],
                _ => bail!("frames must be gray or RGB"),
            };
            let report = check.check(names, &images)?;
            for c in &report.channels {
                info!("{} spread {:.5} (thresh {:.3})", c.channel, c.spread, report.threshold);
            }
        }
        Commands::FrameSync {
            angles,
            first_api_level,
            sync,
        } => {
            let pairs: Vec<AnglePair> = read_json(&angles)?;
            let sync = match sync {
                SyncArg::Approximate => SyncCalibration::Approximate,
                SyncArg::Calibrated => SyncCalibration::Calibrated,
            };
            let report = FrameSyncCheck::new(config.frame_sync).run(&pairs, first_api_level, sync)?;
            info!(
                "{} pairs, max diff {:.3} deg (tol {:.3})",
                report.pairs.len(),
                report.max_diff,
                report.threshold
            );
        }
        Commands::ThreeA { result } => {
            let result: ThreeAResult = read_json(&result)?;
            result.validate()?;
            info!("3A results valid");
        }
    }
    Ok(())
}

fn main() {
    logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => info!("PASS"),
        Err(e) => {
            error!("FAIL: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use camera_its_rs::its::TiffImageWriter;

    #[test]
    fn test_read_frame_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.tiff");
        let image = ImageBuffer::filled(4, 4, 3, 0.5).unwrap();
        TiffImageWriter.write_file(&image, &path).unwrap();

        let frame = read_frame(&path, false).unwrap();
        assert_eq!((frame.width, frame.height, frame.channels), (4, 4, 3));
    }

    #[test]
    fn test_read_frame_raw_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("frame.dng");
        std::fs::write(&path, b"not a raw file").unwrap();
        assert!(read_frame(&path, true).is_err());
    }
}
