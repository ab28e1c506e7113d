use image::{Rgb, RgbImage};

/// Draws a box outline whose stroke grows inward from the given corners, the
/// way the label and roadmap overlays expect.
pub fn draw_rectangle(
    image: &mut RgbImage,
    (x1, y1, x2, y2): (u32, u32, u32, u32),
    color: Rgb<u8>,
    thickness: u32,
) {
    if image.width() == 0 || image.height() == 0 {
        return;
    }
    let x2 = x2.min(image.width() - 1);
    let y2 = y2.min(image.height() - 1);
    if x1 > x2 || y1 > y2 {
        return;
    }

    // Draw horizontal lines
    for dy in 0..thickness {
        let top = y1.saturating_add(dy).min(y2);
        let bottom = y2.saturating_sub(dy).max(y1);

        for x in x1..=x2 {
            image.put_pixel(x, top, color);
            image.put_pixel(x, bottom, color);
        }
    }

    // Draw vertical lines
    for dx in 0..thickness {
        let left = x1.saturating_add(dx).min(x2);
        let right = x2.saturating_sub(dx).max(x1);

        for y in y1..=y2 {
            image.put_pixel(left, y, color);
            image.put_pixel(right, y, color);
        }
    }
}
