//! Analytic page-sized gradients; intensity falls off with a power of distance.

use super::Mask;
use crate::util::{randint, uniform};
use image::{GrayImage, Luma};
use rand::Rng;

const CORNER_EXPONENT: f32 = 2.0;
const EDGE_EXPONENT: f32 = 1.2;
const VIGNETTE_EXPONENT: f32 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    pub fn all() -> [Self; 4] {
        [
            Self::TopLeft,
            Self::TopRight,
            Self::BottomLeft,
            Self::BottomRight,
        ]
    }

    fn anchor(&self, width: u32, height: u32) -> (f32, f32) {
        let (right, bottom) = (width.saturating_sub(1) as f32, height.saturating_sub(1) as f32);
        match self {
            Self::TopLeft => (0.0, 0.0),
            Self::TopRight => (right, 0.0),
            Self::BottomLeft => (0.0, bottom),
            Self::BottomRight => (right, bottom),
        }
    }
}

/// Darkening that peaks at `corner` and reaches zero one reach away.
/// The reach is drawn from a sixth to a quarter of the shorter side.
pub fn corner_gradient<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    corner: Corner,
) -> Mask {
    let min_dim = width.min(height) as i32;
    let reach = randint(rng, min_dim / 6, min_dim / 4).max(1) as f32;
    let peak = 100.0;
    let (ax, ay) = corner.anchor(width, height);

    GrayImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - ax, y as f32 - ay);
        let d = (dx * dx + dy * dy).sqrt() / reach;
        if d >= 1.0 {
            Luma([0])
        } else {
            Luma([(peak * (1.0 - d).powf(CORNER_EXPONENT)) as u8])
        }
    })
}

/// Band of darkening along all four borders.
pub fn edge_darkening<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Mask {
    let min_dim = width.min(height) as f32;
    let band = (min_dim * uniform(rng, 0.05, 0.12)).max(1.0);
    let peak = randint(rng, 60, 110) as f32;
    let (right, bottom) = (width.saturating_sub(1), height.saturating_sub(1));

    GrayImage::from_fn(width, height, |x, y| {
        let d = x.min(y).min(right - x).min(bottom - y) as f32 / band;
        if d >= 1.0 {
            Luma([0])
        } else {
            Luma([(peak * (1.0 - d).powf(EDGE_EXPONENT)) as u8])
        }
    })
}

/// Radial darkening from the page center, capped at 200.
pub fn vignette(width: u32, height: u32, strength: f32) -> Mask {
    let (cx, cy) = (width as f32 / 2.0, height as f32 / 2.0);
    let max_distance = (cx * cx + cy * cy).sqrt().max(1.0);

    GrayImage::from_fn(width, height, |x, y| {
        let (dx, dy) = (x as f32 - cx, y as f32 - cy);
        let d = (dx * dx + dy * dy).sqrt() / max_distance;
        let darkness = 180.0 * strength * d.powf(VIGNETTE_EXPONENT);
        Luma([darkness.clamp(0.0, 200.0) as u8])
    })
}
