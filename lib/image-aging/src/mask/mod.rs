//! Procedural grayscale masks, one generator per damage archetype.
//!
//! A mask value of 0 leaves the page untouched and 255 is the strongest mark.
//! Organic generators draw jittered primitives onto an oversized square canvas
//! and soften them with a box-approximated Gaussian blur; gradient generators
//! are analytic; the structural generators (folds, cracks, torn edges, tides)
//! cover the whole page.

pub mod gradient;
pub mod organic;
pub mod structural;

use crate::util::randint;
use image::{GrayImage, Luma, imageops};
use imageproc::drawing::draw_filled_circle_mut;
use rand::Rng;

pub type Mask = GrayImage;

pub use gradient::{Corner, corner_gradient, edge_darkening, vignette};
pub use organic::*;
pub use structural::{crack_pattern, fold_line, moisture_tide, paper_grain, torn_edge};

/// Side of the square canvas an organic generator allocates for `size`.
pub fn canvas_side(size: u32, multiplier: f32) -> u32 {
    ((size as f32 * multiplier) as u32).max(1)
}

pub(crate) fn square_canvas(size: u32, multiplier: f32) -> Mask {
    let side = canvas_side(size, multiplier);
    GrayImage::new(side, side)
}

/// Approximate Gaussian blur from repeated box passes; cost does not grow
/// with `sigma`, which reaches hundreds of pixels on page-sized marks.
pub(crate) fn blur(mask: &Mask, sigma: f32) -> Mask {
    let short_side = mask.width().min(mask.height());
    let sigma = sigma.min(short_side as f32 / 2.0);
    if short_side < 2 || sigma < 0.1 {
        return mask.clone();
    }
    imageops::fast_blur(mask, sigma)
}

/// Adds uniform noise in `[-amplitude, amplitude)` to every pixel.
pub(crate) fn add_noise<R: Rng + ?Sized>(rng: &mut R, mask: &mut Mask, amplitude: i32) {
    if amplitude <= 0 {
        return;
    }

    for pixel in mask.pixels_mut() {
        let noisy = pixel[0] as i32 + rng.random_range(-amplitude..amplitude);
        pixel[0] = noisy.clamp(0, 255) as u8;
    }
}

/// Noise only where the mask is already marked, so blank canvas stays blank.
pub(crate) fn add_noise_inside<R: Rng + ?Sized>(rng: &mut R, mask: &mut Mask, amplitude: i32) {
    if amplitude <= 0 {
        return;
    }

    for pixel in mask.pixels_mut() {
        if pixel[0] == 0 {
            continue;
        }
        let noisy = pixel[0] as i32 + rng.random_range(-amplitude..amplitude);
        pixel[0] = noisy.clamp(0, 255) as u8;
    }
}

/// Stamps circles along the segment to get a line `width` pixels thick.
pub(crate) fn draw_thick_line(
    mask: &mut Mask,
    start: (f32, f32),
    end: (f32, f32),
    width: u32,
    value: u8,
) {
    let radius = (width as i32 / 2).max(1);
    let (dx, dy) = (end.0 - start.0, end.1 - start.1);
    let steps = dx.abs().max(dy.abs()).ceil().max(1.0) as i32;

    for step in 0..=steps {
        let t = step as f32 / steps as f32;
        let x = (start.0 + dx * t).round() as i32;
        let y = (start.1 + dy * t).round() as i32;
        draw_filled_circle_mut(mask, (x, y), radius, Luma([value]));
    }
}

/// Fills the inclusive rectangle, clipped to the canvas.
pub(crate) fn fill_rect(mask: &mut Mask, x0: i32, y0: i32, x1: i32, y1: i32, value: u8) {
    let (w, h) = (mask.width() as i32, mask.height() as i32);
    let (x0, x1) = (x0.max(0), x1.min(w - 1));
    let (y0, y1) = (y0.max(0), y1.min(h - 1));

    for y in y0..=y1 {
        for x in x0..=x1 {
            mask.put_pixel(x as u32, y as u32, Luma([value]));
        }
    }
}

/// Scatters `count` small dots of `max_radius` within `spread` of the center.
pub(crate) fn scatter_dots<R: Rng + ?Sized>(
    rng: &mut R,
    mask: &mut Mask,
    center: (i32, i32),
    spread: i32,
    count: u32,
    max_radius: i32,
    opacity: (i32, i32),
) {
    for _ in 0..count {
        let x = center.0 + randint(rng, -spread, spread);
        let y = center.1 + randint(rng, -spread, spread);
        let radius = randint(rng, 1, max_radius.max(1));
        let value = randint(rng, opacity.0, opacity.1) as u8;
        draw_filled_circle_mut(mask, (x, y), radius, Luma([value]));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_canvas_side() {
        assert_eq!(canvas_side(100, 2.0), 200);
        assert_eq!(canvas_side(100, 2.5), 250);
        assert_eq!(canvas_side(0, 2.0), 1);
    }

    #[test]
    fn test_fill_rect_clips() {
        let mut mask = GrayImage::new(10, 10);
        fill_rect(&mut mask, -5, -5, 3, 3, 200);
        assert_eq!(mask.get_pixel(0, 0)[0], 200);
        assert_eq!(mask.get_pixel(3, 3)[0], 200);
        assert_eq!(mask.get_pixel(4, 4)[0], 0);

        fill_rect(&mut mask, 20, 20, 30, 30, 255);
        assert!(mask.pixels().all(|p| p[0] != 255));
    }

    #[test]
    fn test_noise_inside_keeps_blank() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut mask = GrayImage::new(16, 16);
        mask.put_pixel(8, 8, Luma([100]));
        add_noise_inside(&mut rng, &mut mask, 20);

        let marked = mask.pixels().filter(|p| p[0] != 0).count();
        assert!(marked <= 1);
    }

    #[test]
    fn test_blur_spreads_and_keeps_size() {
        let mut mask = GrayImage::new(64, 64);
        fill_rect(&mut mask, 28, 28, 35, 35, 255);

        let soft = blur(&mask, 6.0);
        assert_eq!(soft.dimensions(), (64, 64));
        assert!(soft.get_pixel(32, 32)[0] < 255);
        assert!(soft.get_pixel(32, 32)[0] > soft.get_pixel(20, 32)[0]);
        assert!(soft.get_pixel(20, 32)[0] > 0);
        assert_eq!(soft.get_pixel(0, 0)[0], 0);

        assert_eq!(blur(&mask, 0.0), mask);
        assert_eq!(blur(&GrayImage::new(1, 1), 500.0).dimensions(), (1, 1));
    }

    #[test]
    fn test_thick_line_covers_endpoints() {
        let mut mask = GrayImage::new(50, 50);
        draw_thick_line(&mut mask, (5.0, 5.0), (40.0, 30.0), 4, 180);
        assert_eq!(mask.get_pixel(5, 5)[0], 180);
        assert_eq!(mask.get_pixel(40, 30)[0], 180);
    }
}
