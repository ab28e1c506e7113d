//! Frame-by-frame roadmap annotation of videos.

#[cfg(feature = "video")]
pub mod opencv;

use std::path::PathBuf;

use image::RgbImage;
use tempfile::TempDir;

use crate::annotate::Annotator;
use crate::detection::Detector;
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VideoMeta {
    pub fps: f64,
    pub width: u32,
    pub height: u32,
    /// 0 when unknown.
    pub frame_count: usize,
}

pub trait FrameSource {
    fn meta(&self) -> VideoMeta;

    /// Next decoded frame, `Ok(None)` at end of stream.
    fn next_frame(&mut self) -> Result<Option<RgbImage>>;
}

pub trait FrameSink {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()>;

    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VideoReport {
    pub frames_expected: usize,
    pub frames_processed: usize,
    pub frames_blocked: usize,
    /// Reading stopped before the reported frame count was reached.
    pub truncated: bool,
}

pub struct FrameSpool {
    dir: TempDir,
    frames: Vec<PathBuf>,
}

impl FrameSpool {
    pub fn new() -> Result<Self> {
        Ok(Self {
            dir: tempfile::Builder::new().prefix("pothole-frames").tempdir()?,
            frames: Vec::new(),
        })
    }

    pub fn push(&mut self, index: usize, frame: &RgbImage) -> Result<()> {
        let path = self.dir.path().join(format!("frame_{index}.png"));
        frame.save(&path)?;
        self.frames.push(path);
        Ok(())
    }

    pub fn drain_into<K: FrameSink + ?Sized>(self, sink: &mut K) -> Result<usize> {
        for path in &self.frames {
            let frame = image::open(path)?.to_rgb8();
            sink.write_frame(&frame)?;
        }
        sink.finish()?;
        Ok(self.frames.len())
    }
}

/// Annotates every frame of `source`. The sink is only opened once the whole
/// stream has been read, so a fatal error leaves no output behind.
pub fn process_video<S, K>(
    source: &mut S,
    open_sink: impl FnOnce(&VideoMeta) -> Result<K>,
    detector: &dyn Detector,
    annotator: &Annotator,
    mut progress: impl FnMut(usize),
) -> Result<(VideoReport, K)>
where
    S: FrameSource + ?Sized,
    K: FrameSink,
{
    let meta = source.meta();
    let mut report = VideoReport {
        frames_expected: meta.frame_count,
        ..VideoReport::default()
    };
    let mut spool = FrameSpool::new()?;

    log::info!(
        "Processing video: {}x{} @ {:.1} FPS, {} frames",
        meta.width,
        meta.height,
        meta.fps,
        meta.frame_count
    );

    loop {
        let index = report.frames_processed;
        if meta.frame_count > 0 && index >= meta.frame_count {
            break;
        }

        let frame = match source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => break,
            Err(e) => {
                log::warn!("Failed to decode frame {index}: {e}");
                report.truncated = true;
                break;
            }
        };

        let detections = detector.detect(&frame)?;
        let result = annotator.annotate(frame, &detections)?;
        if result.road_blocked {
            report.frames_blocked += 1;
            log::warn!(
                "Frame {index}: {} potholes detected, road is blocked for cars",
                detections.len()
            );
        }

        spool.push(index, &result.image)?;
        report.frames_processed += 1;
        progress(report.frames_processed);
    }

    if meta.frame_count > 0 && report.frames_processed < meta.frame_count {
        report.truncated = true;
    }
    if report.truncated {
        log::warn!(
            "Video ended early: {} of {} frames processed, output is partial",
            report.frames_processed,
            report.frames_expected
        );
    }

    let mut sink = open_sink(&meta)?;
    let written = spool.drain_into(&mut sink)?;
    log::info!("Assembled {written} frames");
    Ok((report, sink))
}
