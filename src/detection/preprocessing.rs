use crate::config::Config;
use crate::detection::bbox::Letterbox;
use image::{imageops, imageops::FilterType, Rgb, RgbImage};
use ndarray::{Array, Array4};

/// Letterboxes `rgb_image` onto the square model input and lays it out as a
/// normalised `[1, 3, size, size]` planar tensor.
pub fn preprocess_image(
    rgb_image: &RgbImage,
    config: &Config,
) -> Result<(Array4<f32>, Letterbox), ndarray::ShapeError> {
    let size = config.input_size;
    let letterbox = Letterbox::new(rgb_image.width(), rgb_image.height(), size);

    let resized = imageops::resize(
        rgb_image,
        letterbox.resized_width,
        letterbox.resized_height,
        FilterType::Triangle,
    );
    let mut canvas = RgbImage::from_pixel(size, size, Rgb([config.pad_value; 3]));
    imageops::replace(
        &mut canvas,
        &resized,
        letterbox.pad_x as i64,
        letterbox.pad_y as i64,
    );

    let raw = canvas.as_raw();
    let mut input_data = Vec::with_capacity((size * size * 3) as usize);

    for c in 0..3 {
        for i in 0..size {
            for j in 0..size {
                let index = (i * size + j) * 3;
                let pixel_value = raw[index as usize + c] as f32;
                input_data.push((pixel_value - config.input_mean) / config.input_std);
            }
        }
    }

    let shape = [1, 3, size as usize, size as usize];
    Ok((Array::from_shape_vec(shape, input_data)?, letterbox))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pads_and_normalises() {
        let config = Config {
            input_size: 8,
            ..Config::default()
        };
        let image = RgbImage::from_pixel(8, 4, Rgb([255, 0, 51]));

        let (tensor, letterbox) = preprocess_image(&image, &config).unwrap();

        assert_eq!(tensor.shape(), &[1, 3, 8, 8]);
        assert_eq!((letterbox.pad_x, letterbox.pad_y), (0.0, 2.0));
        // Padding rows carry the pad value.
        let pad = 114.0 / 255.0;
        assert!((tensor[[0, 0, 0, 0]] - pad).abs() < 1e-6);
        assert!((tensor[[0, 2, 7, 7]] - pad).abs() < 1e-6);
        // Image rows are planar and scaled to 0..1.
        assert!((tensor[[0, 0, 3, 4]] - 1.0).abs() < 1e-6);
        assert!(tensor[[0, 1, 3, 4]].abs() < 1e-6);
        assert!((tensor[[0, 2, 3, 4]] - 0.2).abs() < 1e-6);
    }
}
