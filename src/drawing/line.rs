use image::{Rgb, RgbImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point;

/// Draws a straight stroke of `width` pixels between two points as a filled
/// quadrilateral.
pub fn draw_thick_line(
    image: &mut RgbImage,
    start: (f32, f32),
    end: (f32, f32),
    color: Rgb<u8>,
    width: f32,
) {
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let length = (dx * dx + dy * dy).sqrt();
    if length == 0.0 {
        return;
    }
    let half = width / 2.0;
    let (nx, ny) = (-dy / length * half, dx / length * half);

    let corners = [
        Point::new((start.0 + nx).round() as i32, (start.1 + ny).round() as i32),
        Point::new((end.0 + nx).round() as i32, (end.1 + ny).round() as i32),
        Point::new((end.0 - nx).round() as i32, (end.1 - ny).round() as i32),
        Point::new((start.0 - nx).round() as i32, (start.1 - ny).round() as i32),
    ];
    draw_polygon_mut(image, &corners, color);
}
