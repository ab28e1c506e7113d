use super::Detection;

/// Converts a YOLO centre/size box into corner form.
pub fn decode_box(center: [f32; 2], size: [f32; 2]) -> [f32; 4] {
    let x1 = center[0] - size[0] / 2.0;
    let y1 = center[1] - size[1] / 2.0;
    let x2 = center[0] + size[0] / 2.0;
    let y2 = center[1] + size[1] / 2.0;

    [x1, y1, x2, y2]
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Letterbox {
    pub scale: f32,
    pub pad_x: f32,
    pub pad_y: f32,
    pub resized_width: u32,
    pub resized_height: u32,
}

impl Letterbox {
    pub fn new(width: u32, height: u32, input_size: u32) -> Self {
        let input_size = input_size.max(1);
        let scale = (input_size as f32 / width as f32).min(input_size as f32 / height as f32);
        let resized_width = ((width as f32 * scale).round() as u32).clamp(1, input_size);
        let resized_height = ((height as f32 * scale).round() as u32).clamp(1, input_size);

        Self {
            scale,
            pad_x: ((input_size - resized_width) / 2) as f32,
            pad_y: ((input_size - resized_height) / 2) as f32,
            resized_width,
            resized_height,
        }
    }

    /// Maps a corner box from model input space back to the original image,
    /// clamped to its bounds.
    pub fn to_original(&self, bbox: [f32; 4], width: u32, height: u32) -> [f32; 4] {
        let max_x = width as f32;
        let max_y = height as f32;
        [
            ((bbox[0] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((bbox[1] - self.pad_y) / self.scale).clamp(0.0, max_y),
            ((bbox[2] - self.pad_x) / self.scale).clamp(0.0, max_x),
            ((bbox[3] - self.pad_y) / self.scale).clamp(0.0, max_y),
        ]
    }
}

pub fn iou(a: &Detection, b: &Detection) -> f32 {
    let x1 = a.x1.max(b.x1);
    let y1 = a.y1.max(b.y1);
    let x2 = a.x2.min(b.x2);
    let y2 = a.y2.min(b.y2);

    let intersection = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    let union = a.area() + b.area() - intersection;
    if union <= 0.0 {
        return 0.0;
    }
    intersection / union
}

/// Greedy per-class non-maximum suppression. The result is ordered by
/// descending confidence.
pub fn non_maximum_suppression(mut detections: Vec<Detection>, iou_threshold: f32) -> Vec<Detection> {
    detections.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));

    let mut kept: Vec<Detection> = Vec::with_capacity(detections.len());
    for candidate in detections {
        let suppressed = kept
            .iter()
            .any(|k| k.class_id == candidate.class_id && iou(k, &candidate) > iou_threshold);
        if !suppressed {
            kept.push(candidate);
        }
    }
    kept
}
