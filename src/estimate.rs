//! Pinhole-camera size estimation: `real = distance * on_sensor / focal_length`.

use crate::detection::Detection;
use crate::error::Result;
use crate::sensor::SensorProfile;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RealWorldSize {
    pub width_mm: f64,
    pub height_mm: f64,
    /// Area from the dimensions rounded to whole centimetres.
    pub area_cm2: u64,
}

impl RealWorldSize {
    fn from_dimensions(width_mm: f64, height_mm: f64) -> Self {
        let width_cm = (width_mm / 10.0).round().max(0.0);
        let height_cm = (height_mm / 10.0).round().max(0.0);
        Self {
            width_mm,
            height_mm,
            area_cm2: (width_cm * height_cm) as u64,
        }
    }

    pub fn label(&self) -> String {
        format!("Area: {} Sq Cm", self.area_cm2)
    }
}

/// Estimates the real-world size of `detection` in an image of
/// `image_dimensions` (width, height) pixels.
pub fn estimate(
    detection: &Detection,
    image_dimensions: (u32, u32),
    profile: &SensorProfile,
) -> Result<RealWorldSize> {
    profile.validate()?;

    let (box_width_px, box_height_px) = detection.pixel_extent();
    let (image_width, image_height) = image_dimensions;

    // The sensor's long axis is fixed; portrait captures swap the box axes.
    let (along_width_px, along_height_px) = if image_width > image_height {
        (box_width_px, box_height_px)
    } else {
        (box_height_px, box_width_px)
    };

    let distance_mm = profile.distance_to_object_m() * 1000.0;
    let width_mm = project(
        along_width_px,
        profile.sensor_width_mm(),
        profile.sensor_width_px(),
        distance_mm,
        profile.focal_length_mm(),
    );
    let height_mm = project(
        along_height_px,
        profile.sensor_height_mm(),
        profile.sensor_height_px(),
        distance_mm,
        profile.focal_length_mm(),
    );

    Ok(RealWorldSize::from_dimensions(width_mm, height_mm))
}

fn project(extent_px: f64, sensor_mm: f64, sensor_px: f64, distance_mm: f64, focal_mm: f64) -> f64 {
    let on_sensor_mm = sensor_mm * extent_px / sensor_px;
    distance_mm * on_sensor_mm / focal_mm
}
