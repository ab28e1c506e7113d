use std::rc::Rc;

use image::RgbImage;
use ndarray::Ix2;
use ort::{CPUExecutionProvider, GraphOptimizationLevel, Session};

use super::preprocessing::preprocess_image;
use super::{process_detections, Detection, Detector, PostProcess};
use crate::config::Config;
use crate::error::{PotholeError, Result};

/// YOLOv8 pothole model executed with ONNX Runtime.
pub struct DetectionModel {
    session: Session,
    input_name: String,
    config: Rc<Config>,
}

impl DetectionModel {
    pub fn new(config: Rc<Config>) -> Result<Self> {
        config.validate()?;
        ort::init()
            .with_execution_providers([CPUExecutionProvider::default().build()])
            .commit()?;

        log::info!("Loading model {}", config.model_path.display());
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(config.intra_threads)?
            .commit_from_file(&config.model_path)
            .map_err(|e| {
                PotholeError::ModelLoad(format!("{}: {e}", config.model_path.display()))
            })?;

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .ok_or_else(|| PotholeError::ModelLoad("model declares no inputs".to_string()))?;
        log::info!("Model loaded");

        Ok(Self {
            session,
            input_name,
            config,
        })
    }
}

impl Detector for DetectionModel {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>> {
        let (input_array, letterbox) = preprocess_image(image, &self.config)?;

        let outputs = self
            .session
            .run(ort::inputs![self.input_name.as_str() => input_array.view()]?)?;
        let head = outputs[0].try_extract_tensor::<f32>()?;

        let shape = head.shape().to_vec();
        if shape.len() != 3 || shape[0] != 1 {
            return Err(PotholeError::Inference(format!(
                "unexpected output shape {shape:?}"
            )));
        }
        let head = head
            .index_axis(ndarray::Axis(0), 0)
            .into_dimensionality::<Ix2>()?;

        let detections = process_detections(
            head,
            &letterbox,
            image.dimensions(),
            PostProcess {
                confidence_threshold: self.config.confidence_threshold,
                iou_threshold: self.config.iou_threshold,
            },
        )?;
        log::debug!("{} detections", detections.len());
        Ok(detections)
    }
}
