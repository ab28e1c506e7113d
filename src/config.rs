use std::path::PathBuf;

use clap::ValueEnum;

use crate::error::{PotholeError, Result};

/// YOLOv8 feature maps are strided by 32, smaller inputs leave no grid.
pub const MIN_INPUT_SIZE: u32 = 32;

/// Runtime used to execute the exported detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    Ort,
    Candle,
}

pub struct Config {
    pub model_path: PathBuf,
    pub backend: Backend,
    pub input_size: u32,
    pub input_mean: f32,
    pub input_std: f32,
    pub pad_value: u8,
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
    pub intra_threads: usize,
    /// Road is reported blocked when a frame has more detections than this.
    pub blocked_threshold: usize,
    pub font_path: Option<PathBuf>,
    pub font_scale: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("content/runs/detect/train5/weights/best.onnx"),
            backend: Backend::Ort,
            input_size: 640,
            input_mean: 0.0,
            input_std: 255.0,
            pad_value: 114,
            confidence_threshold: 0.1,
            iou_threshold: 0.45,
            intra_threads: 4,
            blocked_threshold: 5,
            font_path: None,
            font_scale: 22.0,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.input_size < MIN_INPUT_SIZE {
            return Err(PotholeError::InvalidConfiguration(format!(
                "input size must be at least {MIN_INPUT_SIZE} pixels, got {}",
                self.input_size
            )));
        }
        if !self.input_std.is_finite() || self.input_std == 0.0 {
            return Err(PotholeError::InvalidConfiguration(format!(
                "input std must be a non-zero number, got {}",
                self.input_std
            )));
        }
        Ok(())
    }
}
