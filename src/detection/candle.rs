use std::collections::HashMap;
use std::rc::Rc;

use candle_core::{DType, Device, Tensor};
use candle_onnx::onnx::ModelProto;
use image::RgbImage;
use ndarray::Array2;

use super::preprocessing::preprocess_image;
use super::{process_detections, Detection, Detector, PostProcess};
use crate::config::Config;
use crate::error::{PotholeError, Result};

/// Pure-Rust alternative to the ONNX Runtime session, evaluating the same
/// exported graph with candle.
pub struct CandleModel {
    model: ModelProto,
    input_name: String,
    output_name: String,
    config: Rc<Config>,
}

impl CandleModel {
    pub fn new(config: Rc<Config>) -> Result<Self> {
        config.validate()?;
        log::info!("Loading model {} (candle)", config.model_path.display());
        let model = candle_onnx::read_file(&config.model_path).map_err(|e| {
            PotholeError::ModelLoad(format!("{}: {e}", config.model_path.display()))
        })?;

        let graph = model
            .graph
            .as_ref()
            .ok_or_else(|| PotholeError::ModelLoad("model has no graph".to_string()))?;
        let input_name = graph
            .input
            .first()
            .map(|i| i.name.clone())
            .ok_or_else(|| PotholeError::ModelLoad("model declares no inputs".to_string()))?;
        let output_name = graph
            .output
            .first()
            .map(|o| o.name.clone())
            .ok_or_else(|| PotholeError::ModelLoad("model declares no outputs".to_string()))?;

        Ok(Self {
            model,
            input_name,
            output_name,
            config,
        })
    }
}

impl Detector for CandleModel {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let (input_array, letterbox) = preprocess_image(image, &self.config)?;
        let shape = input_array.shape().to_vec();
        let (data, _) = input_array.into_raw_vec_and_offset();
        let input = Tensor::from_vec(data, shape, &Device::Cpu)?;

        let mut inputs = HashMap::new();
        inputs.insert(self.input_name.clone(), input);
        let mut outputs = candle_onnx::simple_eval(&self.model, inputs)?;
        let head = outputs.remove(&self.output_name).ok_or_else(|| {
            PotholeError::Inference(format!("missing output '{}'", self.output_name))
        })?;

        let head = head.to_dtype(DType::F32)?.squeeze(0)?;
        let (rows, cols) = head.dims2()?;
        let values = head.flatten_all()?.to_vec1::<f32>()?;
        let head = Array2::from_shape_vec((rows, cols), values)?;

        process_detections(
            head.view(),
            &letterbox,
            image.dimensions(),
            PostProcess {
                confidence_threshold: self.config.confidence_threshold,
                iou_threshold: self.config.iou_threshold,
            },
        )
    }
}
