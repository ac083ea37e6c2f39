//! Per-region imaging: polygon-masked crops of the page.

use image::{GrayImage, Luma, Rgba, RgbaImage};
use imageproc::drawing::draw_polygon_mut;
use imageproc::point::Point as PixelPoint;

use crate::geometry::{Polygon, Size};

/// Crop `image` to the bounds of `polygon`, painting everything outside the
/// polygon with `fill`.
///
/// Returns `None` for polygons with fewer than three vertices or lying
/// entirely outside the image.
pub fn masked_crop(image: &RgbaImage, polygon: &Polygon, fill: Rgba<u8>) -> Option<RgbaImage> {
    let bounds = polygon.bounding_rect().clipped(image_size(image));
    if bounds.is_null() {
        return None;
    }
    let (x0, y0, width, height) = bounds.to_pixel_bounds();

    let mut points: Vec<PixelPoint<i32>> = polygon
        .points()
        .iter()
        .map(|p| PixelPoint::new((p.x - x0 as f32).round() as i32, (p.y - y0 as f32).round() as i32))
        .collect();
    points.dedup();
    // The polygon is implicitly closed; an explicit closing vertex is rejected
    while points.len() > 1 && points.first() == points.last() {
        points.pop();
    }
    if points.len() < 3 {
        return None;
    }

    let mut mask = GrayImage::new(width, height);
    draw_polygon_mut(&mut mask, &points, Luma([255u8]));

    let mut out = RgbaImage::from_pixel(width, height, fill);
    for (x, y, m) in mask.enumerate_pixels() {
        if m[0] != 0 {
            out.put_pixel(x, y, *image.get_pixel(x0 + x, y0 + y));
        }
    }
    Some(out)
}

fn image_size(image: &RgbaImage) -> Size {
    Size::new(image.width(), image.height())
}
