//! Raster surface for collage composition.
//!
//! | Primitive | Implementation |
//! |---|---|
//! | Scale | `image::imageops::resize` with `Lanczos3` |
//! | Rounded clip | per-pixel test at pixel centres |
//! | Draw | source-over alpha blend |
//! | Encode | `image::codecs::png::PngEncoder` |

use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageError, Rgba, RgbaImage};

/// An opaque RGBA drawing surface.
pub struct Canvas {
    pixels: RgbaImage,
}

impl Canvas {
    /// A `width`×`height` canvas filled with `background`.
    pub fn new(width: u32, height: u32, background: [u8; 3]) -> Self {
        let [r, g, b] = background;
        Self {
            pixels: RgbaImage::from_pixel(width, height, Rgba([r, g, b, 255])),
        }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[cfg(test)]
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        self.pixels.get_pixel(x, y).0
    }

    /// Draw `image` scaled to exactly `w`×`h` at `(x, y)`, clipped to a
    /// rounded rectangle of corner radius `radius`.
    ///
    /// The radius is capped at half the shorter side.
    pub fn draw_rounded(&mut self, image: &DynamicImage, x: u32, y: u32, w: u32, h: u32, radius: u32) {
        if w == 0 || h == 0 {
            return;
        }
        let scaled = image::imageops::resize(&image.to_rgba8(), w, h, FilterType::Lanczos3);
        let radius = radius.min(w / 2).min(h / 2) as f32;

        for (sx, sy, src) in scaled.enumerate_pixels() {
            let (px, py) = (x + sx, y + sy);
            if px >= self.width() || py >= self.height() {
                continue;
            }
            if !inside_rounded_rect(sx as f32 + 0.5, sy as f32 + 0.5, w as f32, h as f32, radius) {
                continue;
            }
            let dst = self.pixels.get_pixel_mut(px, py);
            *dst = blend_over(*src, *dst);
        }
    }

    /// Encode the surface as PNG.
    pub fn encode_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut buf = Vec::new();
        PngEncoder::new(&mut buf).write_image(
            self.pixels.as_raw(),
            self.width(),
            self.height(),
            ExtendedColorType::Rgba8,
        )?;
        Ok(buf)
    }
}

/// Whether `(px, py)`, relative to the rectangle's top-left, lies inside a
/// `w`×`h` rectangle with corners rounded to `r`.
///
/// Requires `2r <= min(w, h)`.
pub fn inside_rounded_rect(px: f32, py: f32, w: f32, h: f32, r: f32) -> bool {
    if px < 0.0 || py < 0.0 || px > w || py > h {
        return false;
    }
    // Nearest point on the inner rectangle shrunk by r
    let cx = px.clamp(r, w - r);
    let cy = py.clamp(r, h - r);
    let (dx, dy) = (px - cx, py - cy);
    dx * dx + dy * dy <= r * r
}

fn blend_over(src: Rgba<u8>, dst: Rgba<u8>) -> Rgba<u8> {
    let alpha = src[3] as u32;
    if alpha == 255 {
        return Rgba([src[0], src[1], src[2], 255]);
    }
    let mix = |s: u8, d: u8| ((s as u32 * alpha + d as u32 * (255 - alpha) + 127) / 255) as u8;
    Rgba([
        mix(src[0], dst[0]),
        mix(src[1], dst[1]),
        mix(src[2], dst[2]),
        255,
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: [u8; 3] = [0x0b, 0x10, 0x24];

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    #[test]
    fn new_canvas_is_background() {
        let canvas = Canvas::new(10, 8, BG);
        assert_eq!((canvas.width(), canvas.height()), (10, 8));
        assert_eq!(canvas.pixel(0, 0), [0x0b, 0x10, 0x24, 255]);
        assert_eq!(canvas.pixel(9, 7), [0x0b, 0x10, 0x24, 255]);
    }

    #[test]
    fn rounded_clip_excludes_corners() {
        let mut canvas = Canvas::new(60, 60, BG);
        canvas.draw_rounded(&solid(10, 10, [255, 255, 255, 255]), 5, 5, 50, 50, 18);

        // Centre and edge midpoints are drawn
        assert_eq!(canvas.pixel(30, 30), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(5, 30), [255, 255, 255, 255]);
        assert_eq!(canvas.pixel(30, 54), [255, 255, 255, 255]);
        // Extreme corners of the cell are clipped away
        assert_eq!(canvas.pixel(5, 5), [0x0b, 0x10, 0x24, 255]);
        assert_eq!(canvas.pixel(54, 54), [0x0b, 0x10, 0x24, 255]);
        // Outside the cell is untouched
        assert_eq!(canvas.pixel(2, 30), [0x0b, 0x10, 0x24, 255]);
    }

    #[test]
    fn zero_radius_fills_whole_cell() {
        let mut canvas = Canvas::new(20, 20, BG);
        canvas.draw_rounded(&solid(4, 4, [0, 255, 0, 255]), 0, 0, 20, 20, 0);
        assert_eq!(canvas.pixel(0, 0), [0, 255, 0, 255]);
        assert_eq!(canvas.pixel(19, 19), [0, 255, 0, 255]);
    }

    #[test]
    fn transparent_source_shows_background() {
        let mut canvas = Canvas::new(10, 10, [0, 0, 0]);
        canvas.draw_rounded(&solid(10, 10, [255, 255, 255, 0]), 0, 0, 10, 10, 0);
        assert_eq!(canvas.pixel(5, 5), [0, 0, 0, 255]);
    }

    #[test]
    fn half_alpha_blends() {
        let blended = blend_over(Rgba([255, 0, 0, 128]), Rgba([0, 0, 255, 255]));
        assert_eq!(blended[3], 255);
        assert!(blended[0] > 120 && blended[0] < 135);
        assert!(blended[2] > 120 && blended[2] < 135);
    }

    #[test]
    fn inside_rounded_rect_geometry() {
        assert!(inside_rounded_rect(50.0, 50.0, 100.0, 100.0, 18.0));
        assert!(inside_rounded_rect(0.5, 50.0, 100.0, 100.0, 18.0));
        assert!(!inside_rounded_rect(0.5, 0.5, 100.0, 100.0, 18.0));
        assert!(inside_rounded_rect(18.0, 0.5, 100.0, 100.0, 18.0));
        assert!(!inside_rounded_rect(-1.0, 50.0, 100.0, 100.0, 18.0));
    }

    #[test]
    fn encode_png_roundtrips_dimensions() {
        let canvas = Canvas::new(7, 5, BG);
        let bytes = canvas.encode_png().unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (7, 5));
    }
}
