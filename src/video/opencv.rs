use std::path::Path;

use image::RgbImage;
use opencv::{
    core::{Mat, Size},
    prelude::*,
    videoio::{self, VideoCapture, VideoWriter},
};

use super::{FrameSink, FrameSource, VideoMeta};
use crate::error::{PotholeError, Result};

impl From<opencv::Error> for PotholeError {
    fn from(e: opencv::Error) -> Self {
        PotholeError::Video(e.to_string())
    }
}

fn path_str(path: &Path) -> Result<&str> {
    path.to_str()
        .ok_or_else(|| PotholeError::Video(format!("non UTF-8 path {}", path.display())))
}

pub struct VideoReader {
    cap: VideoCapture,
    meta: VideoMeta,
}

impl VideoReader {
    pub fn open(path: &Path) -> Result<Self> {
        log::info!("Opening video: {}", path.display());
        let cap = VideoCapture::from_file(path_str(path)?, videoio::CAP_ANY)?;
        if !cap.is_opened()? {
            return Err(PotholeError::Video(format!(
                "Failed to open the video file {}",
                path.display()
            )));
        }

        let fps = cap.get(videoio::CAP_PROP_FPS)?;
        let frame_count = cap.get(videoio::CAP_PROP_FRAME_COUNT)?.max(0.0) as usize;
        let width = cap.get(videoio::CAP_PROP_FRAME_WIDTH)? as u32;
        let height = cap.get(videoio::CAP_PROP_FRAME_HEIGHT)? as u32;

        Ok(Self {
            cap,
            meta: VideoMeta {
                fps,
                width,
                height,
                frame_count,
            },
        })
    }
}

impl FrameSource for VideoReader {
    fn meta(&self) -> VideoMeta {
        self.meta
    }

    fn next_frame(&mut self) -> Result<Option<RgbImage>> {
        let mut mat = Mat::default();
        if !self.cap.read(&mut mat)? || mat.empty() {
            return Ok(None);
        }

        let width = mat.cols() as u32;
        let height = mat.rows() as u32;
        let mut data = mat.data_bytes()?.to_vec();
        // OpenCV hands out BGR.
        for pixel in data.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }

        RgbImage::from_raw(width, height, data)
            .map(Some)
            .ok_or_else(|| PotholeError::Video("decoded frame has an unexpected layout".to_string()))
    }
}

/// mp4v encoder keeping the source frame rate and dimensions.
pub struct VideoEncoder {
    writer: VideoWriter,
    width: u32,
    height: u32,
}

impl VideoEncoder {
    pub fn create(path: &Path, meta: &VideoMeta) -> Result<Self> {
        log::info!("Output video: {}", path.display());
        let fourcc = VideoWriter::fourcc('m', 'p', '4', 'v')?;
        let writer = VideoWriter::new(
            path_str(path)?,
            fourcc,
            meta.fps,
            Size::new(meta.width as i32, meta.height as i32),
            true,
        )?;
        if !writer.is_opened()? {
            return Err(PotholeError::Video(format!(
                "Failed to open video writer for {}",
                path.display()
            )));
        }

        Ok(Self {
            writer,
            width: meta.width,
            height: meta.height,
        })
    }
}

impl FrameSink for VideoEncoder {
    fn write_frame(&mut self, frame: &RgbImage) -> Result<()> {
        if frame.dimensions() != (self.width, self.height) {
            return Err(PotholeError::Video(format!(
                "frame is {:?}, writer expects {}x{}",
                frame.dimensions(),
                self.width,
                self.height
            )));
        }

        let mut bgr = frame.as_raw().clone();
        for pixel in bgr.chunks_exact_mut(3) {
            pixel.swap(0, 2);
        }
        let flat = Mat::from_slice(bgr.as_slice())?;
        let mat = flat.reshape(3, self.height as i32)?.try_clone()?;
        self.writer.write(&mat)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.release()?;
        Ok(())
    }
}
