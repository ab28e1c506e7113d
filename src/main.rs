use std::path::{Path, PathBuf};
use std::rc::Rc;

use anyhow::{bail, Context};
use clap::Parser;

mod annotate;
mod config;
mod detection;
mod drawing;
mod error;
mod estimate;
mod sensor;
#[cfg(feature = "video")]
mod ui;
mod upload;
#[cfg_attr(not(feature = "video"), allow(dead_code))]
mod video;

use annotate::Annotator;
use config::{Backend, Config};
use detection::candle::CandleModel;
use detection::model::DetectionModel;
use detection::Detector;
use drawing::label::LabelRenderer;
use sensor::SensorProfile;
use upload::{MediaKind, Upload};

/// Detect potholes in a road image or video and draw a roadmap with their
/// estimated real-world size.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Road image (jpg, jpeg, png) or video (mp4)
    #[arg(required_unless_present = "list_devices")]
    input: Option<PathBuf>,

    /// Where to write the annotated roadmap [default: <input stem>_roadmap.<ext>]
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exported pothole detector (ONNX)
    #[arg(short, long, env = "POTHOLE_MODEL")]
    model: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Backend::Ort)]
    backend: Backend,

    /// Capture device, see --list-devices
    #[arg(short, long, default_value = "Iphone 14")]
    device: String,

    /// Focal length in mm [default: the device's]
    #[arg(long)]
    focal_length: Option<String>,

    /// Distance to the road surface in meters
    #[arg(long, default_value = "2")]
    distance: String,

    /// Minimum detector confidence
    #[arg(long, default_value_t = 0.1)]
    confidence: f32,

    /// Road is reported blocked above this many potholes in a frame
    #[arg(long, default_value_t = annotate::DEFAULT_BLOCKED_THRESHOLD)]
    threshold: usize,

    /// Square model input size in pixels
    #[arg(
        long,
        default_value_t = 640,
        value_parser = clap::value_parser!(u32).range(i64::from(config::MIN_INPUT_SIZE)..)
    )]
    input_size: u32,

    #[arg(long, default_value_t = 4)]
    intra_threads: usize,

    /// TrueType font for the area labels
    #[arg(long, env = "POTHOLE_FONT")]
    font: Option<PathBuf>,

    /// Directory the input is staged in while it is processed
    #[arg(long, default_value = "uploads")]
    uploads_dir: PathBuf,

    /// Print the device catalog and exit
    #[arg(long)]
    list_devices: bool,
}

impl Args {
    fn config(&self) -> Config {
        let defaults = Config::default();
        Config {
            model_path: self.model.clone().unwrap_or(defaults.model_path),
            backend: self.backend,
            input_size: self.input_size,
            confidence_threshold: self.confidence,
            intra_threads: self.intra_threads,
            blocked_threshold: self.threshold,
            font_path: self.font.clone(),
            ..defaults
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    if args.list_devices {
        list_devices();
        return Ok(());
    }
    let Some(input) = args.input.as_deref() else {
        bail!("an input image or video is required");
    };

    // Validate the settings before anything expensive is loaded.
    let device = sensor::find_device(&args.device)?;
    let profile =
        SensorProfile::from_device(device, args.focal_length.as_deref(), Some(&args.distance))
            .context("invalid camera settings")?;
    log::info!(
        "Device {}: focal length {} mm, distance {} m",
        device.name,
        profile.focal_length_mm(),
        profile.distance_to_object_m()
    );

    let config = args.config();
    config.validate()?;
    let config = Rc::new(config);
    let upload = Upload::stage(input, &args.uploads_dir)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| default_output(input));

    let labels = LabelRenderer::discover(config.font_path.as_deref(), config.font_scale)?;
    let annotator = Annotator::new(profile, config.blocked_threshold, labels);
    let detector = load_detector(config.clone())?;

    match upload.kind() {
        MediaKind::Image => process_image(upload.path(), &output, detector.as_ref(), &annotator),
        MediaKind::Video => process_video(upload.path(), &output, detector.as_ref(), &annotator),
    }
}

fn load_detector(config: Rc<Config>) -> anyhow::Result<Box<dyn Detector>> {
    let detector: Box<dyn Detector> = match config.backend {
        Backend::Ort => Box::new(DetectionModel::new(config)?),
        Backend::Candle => Box::new(CandleModel::new(config)?),
    };
    Ok(detector)
}

fn process_image(
    path: &Path,
    output: &Path,
    detector: &dyn Detector,
    annotator: &Annotator,
) -> anyhow::Result<()> {
    let image = image::open(path)
        .with_context(|| format!("failed to decode {}", path.display()))?
        .to_rgb8();

    let detections = detector.detect(&image)?;
    log::info!("{} potholes detected", detections.len());

    let result = annotator.annotate(image, &detections)?;
    result
        .image
        .save(output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("Roadmap written to {}", output.display());

    let message = result.status_message();
    if result.road_blocked {
        log::warn!("{message}");
    }
    println!("{message}");
    for (i, size) in result.sizes.iter().enumerate() {
        println!(
            "  pothole {}: {:.1} x {:.1} cm, {}",
            i + 1,
            size.width_mm / 10.0,
            size.height_mm / 10.0,
            size.label()
        );
    }
    Ok(())
}

#[cfg(feature = "video")]
fn process_video(
    path: &Path,
    output: &Path,
    detector: &dyn Detector,
    annotator: &Annotator,
) -> anyhow::Result<()> {
    use video::opencv::{VideoEncoder, VideoReader};
    use video::FrameSource;

    let mut reader = VideoReader::open(path)?;
    let progress = ui::FrameProgress::new(reader.meta().frame_count);
    let result = video::process_video(
        &mut reader,
        |meta| VideoEncoder::create(output, meta),
        detector,
        annotator,
        |done| progress.update(done),
    );
    progress.finish();
    let (report, _encoder) = result?;

    println!("Processed {} frames into {}", report.frames_processed, output.display());
    if report.truncated {
        println!(
            "Warning: only {} of {} frames could be decoded, the output video is partial.",
            report.frames_processed, report.frames_expected
        );
    }
    if report.frames_blocked > 0 {
        println!(
            "{} ({} of {} frames)",
            annotate::BLOCKED_MESSAGE,
            report.frames_blocked,
            report.frames_processed
        );
    } else if report.frames_processed > 0 {
        println!("{}", annotate::CLEAR_MESSAGE);
    } else {
        println!("No frames could be decoded from {}", path.display());
    }
    Ok(())
}

#[cfg(not(feature = "video"))]
fn process_video(
    path: &Path,
    _output: &Path,
    _detector: &dyn Detector,
    _annotator: &Annotator,
) -> anyhow::Result<()> {
    Err(error::PotholeError::UnsupportedInput(format!(
        "{}: video support is not compiled in (build with --features video)",
        path.display()
    ))
    .into())
}

fn default_output(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let extension = input
        .extension()
        .map(|e| e.to_string_lossy().to_ascii_lowercase())
        .unwrap_or_else(|| "png".to_string());
    PathBuf::from(format!("{stem}_roadmap.{extension}"))
}

fn list_devices() {
    for device in &sensor::DEVICE_CATALOG {
        println!(
            "{:<22} sensor {}x{} mm, {}x{} px, focal length {} mm",
            device.name,
            device.sensor_width_mm,
            device.sensor_height_mm,
            device.sensor_width_px,
            device.sensor_height_px,
            device.focal_length_mm
        );
    }
}
