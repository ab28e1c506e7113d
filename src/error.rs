use thiserror::Error;

pub type Result<T> = std::result::Result<T, PotholeError>;

#[derive(Error, Debug)]
pub enum PotholeError {
    /// Sensor, focal length or distance values that cannot drive the estimator
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Unknown device '{0}'")]
    UnknownDevice(String),

    #[error("Unsupported input: {0}")]
    UnsupportedInput(String),

    #[error("Failed to load model: {0}")]
    ModelLoad(String),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Video error: {0}")]
    Video(String),

    #[error("Font error: {0}")]
    Font(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("ONNX Runtime error: {0}")]
    Ort(#[from] ort::Error),

    #[error("Candle error: {0}")]
    Candle(#[from] candle_core::Error),

    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}
