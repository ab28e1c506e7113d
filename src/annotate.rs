use image::{Rgb, RgbImage};

use crate::detection::Detection;
use crate::drawing::label::LabelRenderer;
use crate::drawing::line::draw_thick_line;
use crate::drawing::rectangle::draw_rectangle;
use crate::error::Result;
use crate::estimate::{estimate, RealWorldSize};
use crate::sensor::SensorProfile;

pub const DEFAULT_BLOCKED_THRESHOLD: usize = 5;

const BOX_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BOX_WIDTH: u32 = 5;
const LABEL_TEXT: Rgb<u8> = Rgb([255, 255, 255]);
const BLOCKED_COLOR: Rgb<u8> = Rgb([255, 0, 0]);
const BLOCKED_WIDTH: f32 = 10.0;

pub const BLOCKED_MESSAGE: &str = "Too many potholes detected. Road is blocked for cars.";
pub const CLEAR_MESSAGE: &str = "Road is clear for vehicles to drive through.";
pub const NO_DETECTIONS_MESSAGE: &str = "No Detections identified for the above media";

pub struct FrameResult {
    pub image: RgbImage,
    pub road_blocked: bool,
    pub sizes: Vec<RealWorldSize>,
}

impl FrameResult {
    pub fn status_message(&self) -> &'static str {
        if self.sizes.is_empty() {
            NO_DETECTIONS_MESSAGE
        } else if self.road_blocked {
            BLOCKED_MESSAGE
        } else {
            CLEAR_MESSAGE
        }
    }
}

pub struct Annotator {
    profile: SensorProfile,
    threshold: usize,
    labels: LabelRenderer,
}

impl Annotator {
    pub fn new(profile: SensorProfile, threshold: usize, labels: LabelRenderer) -> Self {
        Self {
            profile,
            threshold,
            labels,
        }
    }

    /// Labels every detection with its estimated area and marks the frame
    /// when more than `threshold` potholes were found.
    pub fn annotate(&self, mut image: RgbImage, detections: &[Detection]) -> Result<FrameResult> {
        let dimensions = image.dimensions();

        let mut sizes = Vec::with_capacity(detections.len());
        for detection in detections {
            let size = estimate(detection, dimensions, &self.profile)?;
            log::debug!(
                "pothole {:.0}x{:.0} mm, {} cm2 (confidence {:.2})",
                size.width_mm,
                size.height_mm,
                size.area_cm2,
                detection.confidence
            );

            let corners = (
                detection.x1.max(0.0) as u32,
                detection.y1.max(0.0) as u32,
                detection.x2.max(0.0) as u32,
                detection.y2.max(0.0) as u32,
            );
            draw_rectangle(&mut image, corners, BOX_COLOR, BOX_WIDTH);
            self.labels.draw(
                &mut image,
                (corners.0 as i32, corners.1 as i32),
                &size.label(),
                BOX_COLOR,
                LABEL_TEXT,
            );
            sizes.push(size);
        }

        let road_blocked = detections.len() > self.threshold;
        if road_blocked {
            let (width, height) = dimensions;
            draw_thick_line(
                &mut image,
                (0.0, 0.0),
                (width as f32, height as f32),
                BLOCKED_COLOR,
                BLOCKED_WIDTH,
            );
        }

        Ok(FrameResult {
            image,
            road_blocked,
            sizes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn annotator() -> Annotator {
        let profile = SensorProfile::new(7.0, 5.0, 4032, 3024, 7.5, 2.0).unwrap();
        Annotator::new(profile, DEFAULT_BLOCKED_THRESHOLD, LabelRenderer::new(None, 22.0))
    }

    fn road() -> RgbImage {
        RgbImage::from_pixel(400, 300, Rgb([90, 90, 90]))
    }

    /// `count` small boxes along the bottom edge, away from the image centre.
    fn potholes(count: usize) -> Vec<Detection> {
        (0..count)
            .map(|i| {
                let x = 10.0 + i as f32 * 40.0;
                Detection::new(x, 250.0, x + 30.0, 280.0, 0.8, 0)
            })
            .collect()
    }

    #[test]
    fn no_detections_leaves_image_untouched() {
        let original = road();
        let result = annotator().annotate(original.clone(), &[]).unwrap();

        assert!(!result.road_blocked);
        assert!(result.sizes.is_empty());
        assert_eq!(result.image, original);
        assert_eq!(result.status_message(), NO_DETECTIONS_MESSAGE);
    }

    #[test]
    fn threshold_is_strictly_greater_than() {
        let annotator = annotator();

        let at_threshold = annotator.annotate(road(), &potholes(5)).unwrap();
        assert!(!at_threshold.road_blocked);
        assert_eq!(at_threshold.status_message(), CLEAR_MESSAGE);

        let over = annotator.annotate(road(), &potholes(6)).unwrap();
        assert!(over.road_blocked);
        assert_eq!(over.status_message(), BLOCKED_MESSAGE);
    }

    #[test]
    fn blocked_frames_get_a_diagonal() {
        let annotator = annotator();

        let clear = annotator.annotate(road(), &potholes(5)).unwrap();
        assert_eq!(*clear.image.get_pixel(200, 150), Rgb([90, 90, 90]));

        let blocked = annotator.annotate(road(), &potholes(6)).unwrap();
        assert_eq!(*blocked.image.get_pixel(200, 150), BLOCKED_COLOR);
        assert_eq!(*blocked.image.get_pixel(2, 1), BLOCKED_COLOR);
        assert_eq!(*blocked.image.get_pixel(350, 50), Rgb([90, 90, 90]));
    }

    #[test]
    fn outlines_each_detection_and_reports_sizes() {
        let result = annotator().annotate(road(), &potholes(2)).unwrap();

        assert_eq!(result.sizes.len(), 2);
        // Bottom stroke of the first box is 5 px wide; the label ends above it.
        assert_eq!(*result.image.get_pixel(25, 280), BOX_COLOR);
        assert_eq!(*result.image.get_pixel(25, 276), BOX_COLOR);
        assert_eq!(*result.image.get_pixel(25, 275), Rgb([90, 90, 90]));
    }

    #[test]
    fn reported_sizes_match_the_estimator() {
        let profile = SensorProfile::new(7.0, 5.0, 4032, 3024, 7.5, 2.0).unwrap();
        let sizes: Vec<_> = potholes(3)
            .iter()
            .map(|d| estimate(d, (400, 300), &profile).unwrap().area_cm2)
            .collect();
        let result = annotator().annotate(road(), &potholes(3)).unwrap();
        let reported: Vec<_> = result.sizes.iter().map(|s| s.area_cm2).collect();
        assert_eq!(sizes, reported);
    }
}
