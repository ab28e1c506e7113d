use crate::error::{PotholeError, Result};

pub const DEFAULT_DISTANCE_M: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceSpec {
    pub name: &'static str,
    pub sensor_width_mm: f64,
    pub sensor_height_mm: f64,
    pub sensor_width_px: u32,
    pub sensor_height_px: u32,
    pub focal_length_mm: f64,
    pub distance_to_object_m: f64,
}

pub static DEVICE_CATALOG: [DeviceSpec; 5] = [
    DeviceSpec {
        name: "Iphone 14",
        sensor_width_mm: 7.0,
        sensor_height_mm: 5.0,
        sensor_width_px: 4032,
        sensor_height_px: 3024,
        focal_length_mm: 7.5,
        distance_to_object_m: DEFAULT_DISTANCE_M,
    },
    DeviceSpec {
        name: "Pixel 6A",
        sensor_width_mm: 7.68,
        sensor_height_mm: 5.76,
        sensor_width_px: 4032,
        sensor_height_px: 3024,
        focal_length_mm: 4.38,
        distance_to_object_m: DEFAULT_DISTANCE_M,
    },
    DeviceSpec {
        name: "One Plus",
        sensor_width_mm: 7.4,
        sensor_height_mm: 5.5,
        sensor_width_px: 4032,
        sensor_height_px: 3024,
        focal_length_mm: 5.6,
        distance_to_object_m: DEFAULT_DISTANCE_M,
    },
    DeviceSpec {
        name: "iQOO Neo6",
        sensor_width_mm: 7.4,
        sensor_height_mm: 5.5,
        sensor_width_px: 9280,
        sensor_height_px: 6944,
        focal_length_mm: 5.0,
        distance_to_object_m: DEFAULT_DISTANCE_M,
    },
    DeviceSpec {
        name: "motorola edge 40 neo",
        sensor_width_mm: 8.0,
        sensor_height_mm: 6.0,
        sensor_width_px: 8160,
        sensor_height_px: 6120,
        focal_length_mm: 6.0,
        distance_to_object_m: DEFAULT_DISTANCE_M,
    },
];

/// Looks a device up by name. Exact matches win; otherwise the comparison
/// ignores ASCII case.
pub fn find_device(name: &str) -> Result<&'static DeviceSpec> {
    let name = name.trim();
    DEVICE_CATALOG
        .iter()
        .find(|d| d.name == name)
        .or_else(|| DEVICE_CATALOG.iter().find(|d| d.name.eq_ignore_ascii_case(name)))
        .ok_or_else(|| PotholeError::UnknownDevice(name.to_string()))
}

/// Physical and pixel geometry of a sensor plus the capture parameters the
/// estimator needs. Only constructed through [`SensorProfile::new`], which
/// rejects non-positive or non-finite values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SensorProfile {
    sensor_width_mm: f64,
    sensor_height_mm: f64,
    sensor_width_px: f64,
    sensor_height_px: f64,
    focal_length_mm: f64,
    distance_to_object_m: f64,
}

impl SensorProfile {
    pub fn new(
        sensor_width_mm: f64,
        sensor_height_mm: f64,
        sensor_width_px: u32,
        sensor_height_px: u32,
        focal_length_mm: f64,
        distance_to_object_m: f64,
    ) -> Result<Self> {
        let profile = Self {
            sensor_width_mm,
            sensor_height_mm,
            sensor_width_px: f64::from(sensor_width_px),
            sensor_height_px: f64::from(sensor_height_px),
            focal_length_mm,
            distance_to_object_m,
        };
        profile.validate()?;
        Ok(profile)
    }

    /// Builds a profile from a catalog device, applying the free-text focal
    /// length and distance overrides when given.
    pub fn from_device(
        device: &DeviceSpec,
        focal_length: Option<&str>,
        distance: Option<&str>,
    ) -> Result<Self> {
        let focal_length_mm = match focal_length {
            Some(text) => parse_positive("focal length", text)?,
            None => device.focal_length_mm,
        };
        let distance_to_object_m = match distance {
            Some(text) => parse_positive("distance", text)?,
            None => device.distance_to_object_m,
        };

        Self::new(
            device.sensor_width_mm,
            device.sensor_height_mm,
            device.sensor_width_px,
            device.sensor_height_px,
            focal_length_mm,
            distance_to_object_m,
        )
    }

    pub fn validate(&self) -> Result<()> {
        let fields = [
            ("sensor width (mm)", self.sensor_width_mm),
            ("sensor height (mm)", self.sensor_height_mm),
            ("sensor width (px)", self.sensor_width_px),
            ("sensor height (px)", self.sensor_height_px),
            ("focal length", self.focal_length_mm),
            ("distance", self.distance_to_object_m),
        ];
        for (name, value) in fields {
            if !value.is_finite() || value <= 0.0 {
                return Err(PotholeError::InvalidConfiguration(format!(
                    "{name} must be a positive number, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn sensor_width_mm(&self) -> f64 {
        self.sensor_width_mm
    }

    pub fn sensor_height_mm(&self) -> f64 {
        self.sensor_height_mm
    }

    pub fn sensor_width_px(&self) -> f64 {
        self.sensor_width_px
    }

    pub fn sensor_height_px(&self) -> f64 {
        self.sensor_height_px
    }

    pub fn focal_length_mm(&self) -> f64 {
        self.focal_length_mm
    }

    pub fn distance_to_object_m(&self) -> f64 {
        self.distance_to_object_m
    }
}

fn parse_positive(name: &str, text: &str) -> Result<f64> {
    let value: f64 = text.trim().parse().map_err(|_| {
        PotholeError::InvalidConfiguration(format!("{name} '{text}' is not a number"))
    })?;
    if !value.is_finite() || value <= 0.0 {
        return Err(PotholeError::InvalidConfiguration(format!(
            "{name} must be a positive number, got '{text}'"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_devices_by_name() {
        let device = find_device("Pixel 6A").unwrap();
        assert_eq!(device.focal_length_mm, 4.38);

        let device = find_device("IPHONE 14").unwrap();
        assert_eq!(device.name, "Iphone 14");
    }

    #[test]
    fn unknown_device_is_an_error() {
        assert!(matches!(
            find_device("Nokia 3310"),
            Err(PotholeError::UnknownDevice(name)) if name == "Nokia 3310"
        ));
    }

    #[test]
    fn catalog_defaults_are_used_without_overrides() {
        let device = find_device("motorola edge 40 neo").unwrap();
        let profile = SensorProfile::from_device(device, None, None).unwrap();
        assert_eq!(profile.focal_length_mm(), 6.0);
        assert_eq!(profile.distance_to_object_m(), DEFAULT_DISTANCE_M);
        assert_eq!(profile.sensor_width_px(), 8160.0);
    }

    #[test]
    fn overrides_are_trimmed_and_parsed() {
        let device = find_device("Iphone 14").unwrap();
        let profile = SensorProfile::from_device(device, Some(" 5.2 "), Some("3.5")).unwrap();
        assert_eq!(profile.focal_length_mm(), 5.2);
        assert_eq!(profile.distance_to_object_m(), 3.5);
    }

    #[test]
    fn rejects_bad_overrides() {
        let device = find_device("Iphone 14").unwrap();
        for (focal, distance) in [
            (Some("abc"), None),
            (Some("0"), None),
            (Some("-7.5"), None),
            (None, Some("0")),
            (None, Some("")),
            (None, Some("inf")),
        ] {
            let result = SensorProfile::from_device(device, focal, distance);
            assert!(
                matches!(result, Err(PotholeError::InvalidConfiguration(_))),
                "focal {focal:?} distance {distance:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_zero_sensor_geometry() {
        assert!(SensorProfile::new(7.0, 5.0, 0, 3024, 7.5, 2.0).is_err());
        assert!(SensorProfile::new(0.0, 5.0, 4032, 3024, 7.5, 2.0).is_err());
    }
}
