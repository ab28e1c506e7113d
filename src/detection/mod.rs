pub mod bbox;
pub mod candle;
pub mod model;
pub mod preprocessing;

use image::RgbImage;
use ndarray::{ArrayView2, Axis};

use crate::error::{PotholeError, Result};
use bbox::Letterbox;

/// A pothole box in pixel coordinates of the frame it was detected in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub confidence: f32,
    pub class_id: usize,
}

impl Detection {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32, confidence: f32, class_id: usize) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            confidence,
            class_id,
        }
    }

    pub fn area(&self) -> f32 {
        (self.x2 - self.x1).max(0.0) * (self.y2 - self.y1).max(0.0)
    }

    /// Box extent after truncating the corners to whole pixels.
    pub fn pixel_extent(&self) -> (f64, f64) {
        let width = self.x2.trunc() - self.x1.trunc();
        let height = self.y2.trunc() - self.y1.trunc();
        (f64::from(width.max(0.0)), f64::from(height.max(0.0)))
    }
}

pub trait Detector {
    fn detect(&self, image: &RgbImage) -> Result<Vec<Detection>>;
}

#[derive(Debug, Clone, Copy)]
pub struct PostProcess {
    pub confidence_threshold: f32,
    pub iou_threshold: f32,
}

/// Decodes a YOLOv8 head into detections in original image coordinates.
///
/// `output` is either `[4 + classes, anchors]` (the exported layout) or its
/// transpose; rows 0..4 hold centre x/y and width/height in model input pixels.
pub fn process_detections(
    output: ArrayView2<f32>,
    letterbox: &Letterbox,
    image_dimensions: (u32, u32),
    post: PostProcess,
) -> Result<Vec<Detection>> {
    let output = if output.nrows() > output.ncols() {
        output.reversed_axes()
    } else {
        output
    };

    if output.nrows() < 5 {
        return Err(PotholeError::Inference(format!(
            "expected at least 5 rows in the detection head, got shape {:?}",
            output.shape()
        )));
    }

    let (width, height) = image_dimensions;
    let mut detections = Vec::new();

    for anchor in output.axis_iter(Axis(1)) {
        let scores = anchor.slice(ndarray::s![4..]);
        let (class_id, confidence) = scores
            .iter()
            .copied()
            .enumerate()
            .fold((0, f32::MIN), |best, (i, s)| if s > best.1 { (i, s) } else { best });

        if confidence <= post.confidence_threshold {
            continue;
        }

        let bbox = bbox::decode_box([anchor[0], anchor[1]], [anchor[2], anchor[3]]);
        let [x1, y1, x2, y2] = letterbox.to_original(bbox, width, height);
        if x2 <= x1 || y2 <= y1 {
            continue;
        }

        detections.push(Detection::new(x1, y1, x2, y2, confidence, class_id));
    }

    Ok(bbox::non_maximum_suppression(detections, post.iou_threshold))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    const POST: PostProcess = PostProcess {
        confidence_threshold: 0.1,
        iou_threshold: 0.45,
    };

    // Padded with empty anchors so the head is wider than it is tall, like a
    // real 8400-anchor output.
    fn head(anchors: &[[f32; 5]]) -> Array2<f32> {
        let mut out = Array2::zeros((5, anchors.len().max(8)));
        for (i, a) in anchors.iter().enumerate() {
            for (row, value) in a.iter().enumerate() {
                out[[row, i]] = *value;
            }
        }
        out
    }

    #[test]
    fn decodes_and_maps_back_to_image() {
        let letterbox = Letterbox::new(1280, 720, 640);
        let output = head(&[
            [200.0, 215.0, 200.0, 50.0, 0.9],
            // Below threshold.
            [400.0, 300.0, 40.0, 40.0, 0.05],
        ]);

        let detections = process_detections(output.view(), &letterbox, (1280, 720), POST).unwrap();

        assert_eq!(detections.len(), 1);
        let d = detections[0];
        assert_eq!((d.x1, d.y1, d.x2, d.y2), (200.0, 100.0, 600.0, 200.0));
        assert_eq!(d.class_id, 0);
        assert_eq!(d.confidence, 0.9);
    }

    #[test]
    fn accepts_transposed_head() {
        let letterbox = Letterbox::new(640, 640, 640);
        let output = head(&[
            [100.0, 100.0, 20.0, 20.0, 0.7],
            [300.0, 300.0, 20.0, 20.0, 0.6],
            [500.0, 500.0, 20.0, 20.0, 0.5],
            [600.0, 100.0, 20.0, 20.0, 0.4],
            [100.0, 600.0, 20.0, 20.0, 0.3],
            [320.0, 320.0, 20.0, 20.0, 0.2],
        ]);
        let transposed = output.t();

        let detections = process_detections(transposed, &letterbox, (640, 640), POST).unwrap();
        assert_eq!(detections.len(), 6);
        assert_eq!(detections[0].confidence, 0.7);
    }

    #[test]
    fn suppresses_duplicate_boxes() {
        let letterbox = Letterbox::new(640, 640, 640);
        let output = head(&[
            [100.0, 100.0, 40.0, 40.0, 0.6],
            [102.0, 101.0, 40.0, 40.0, 0.8],
        ]);

        let detections = process_detections(output.view(), &letterbox, (640, 640), POST).unwrap();
        assert_eq!(detections.len(), 1);
        assert_eq!(detections[0].confidence, 0.8);
    }

    #[test]
    fn rejects_headless_output() {
        let letterbox = Letterbox::new(640, 640, 640);
        let output = Array2::<f32>::zeros((4, 3));
        assert!(process_detections(output.view(), &letterbox, (640, 640), POST).is_err());
    }
}
