use super::{Mask, add_noise_inside, blur, fill_rect};
use crate::util::{coin, randint, uniform};
use image::{GrayImage, Luma};
use imageproc::drawing::draw_filled_circle_mut;
use rand::Rng;

const CRACK_STEP: f32 = 2.0;
const CRACK_TURN_DEGREES: f32 = 15.0;
const CRACK_BRANCH_PROBABILITY: f64 = 0.1;
const TORN_MAX_DEPTH: i32 = 25;

/// Crease across the full height (`vertical`) or width of the page.
pub fn fold_line<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32, vertical: bool) -> Mask {
    let mut mask = GrayImage::new(width, height);
    let (span, across) = if vertical { (height, width) } else { (width, height) };
    let center = randint(rng, (across as f32 * 0.3) as i32, (across as f32 * 0.7) as i32);

    for along in 0..span as i32 {
        let pos = center + randint(rng, -3, 3);
        let thickness = randint(rng, 2, 5);
        let value = randint(rng, 60, 120) as u8;

        if vertical {
            fill_rect(&mut mask, pos - thickness, along, pos + thickness, along, value);
        } else {
            fill_rect(&mut mask, along, pos - thickness, along, pos + thickness, value);
        }
    }

    blur(&mask, 2.0)
}

/// Random-walk crack with occasional fainter side branches.
pub fn crack_pattern<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width, height);
    let (w, h) = (width as i32, height as i32);
    let in_bounds = |x: i32, y: i32| x >= 0 && x < w && y >= 0 && y < h;

    let mut x = randint(rng, (w as f32 * 0.2) as i32, (w as f32 * 0.8) as i32);
    let mut y = randint(rng, (h as f32 * 0.2) as i32, (h as f32 * 0.8) as i32);
    let mut heading = uniform(rng, 0.0, 360.0);

    for _ in 0..randint(rng, 30, 100) {
        heading += uniform(rng, -CRACK_TURN_DEGREES, CRACK_TURN_DEGREES);
        x += (heading.to_radians().cos() * CRACK_STEP) as i32;
        y += (heading.to_radians().sin() * CRACK_STEP) as i32;

        if !in_bounds(x, y) {
            continue;
        }

        let thickness = randint(rng, 1, 3);
        let value = randint(rng, 80, 150) as u8;
        draw_filled_circle_mut(&mut mask, (x, y), thickness, Luma([value]));

        if coin(rng, CRACK_BRANCH_PROBABILITY) {
            let branch_heading = (heading + uniform(rng, -60.0, 60.0)).to_radians();
            let (mut bx, mut by) = (x, y);
            for _ in 0..randint(rng, 10, 30) {
                bx += (branch_heading.cos() * CRACK_STEP) as i32;
                by += (branch_heading.sin() * CRACK_STEP) as i32;
                if in_bounds(bx, by) {
                    mask.put_pixel(bx as u32, by as u32, Luma([value / 2]));
                }
            }
        }
    }

    blur(&mask, 0.5)
}

/// Ragged border: every border pixel gets its own notch depth.
pub fn torn_edge<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width, height);
    let (w, h) = (width as i32, height as i32);
    let value = randint(rng, 180, 230) as u8;

    for x in 0..w {
        let top = randint(rng, 0, TORN_MAX_DEPTH);
        let bottom = randint(rng, 0, TORN_MAX_DEPTH);
        fill_rect(&mut mask, x, 0, x, top - 1, value);
        fill_rect(&mut mask, x, h - bottom, x, h - 1, value);
    }

    for y in 0..h {
        let left = randint(rng, 0, TORN_MAX_DEPTH);
        let right = randint(rng, 0, TORN_MAX_DEPTH);
        fill_rect(&mut mask, 0, y, left - 1, y, value);
        fill_rect(&mut mask, w - right, y, w - 1, y, value);
    }

    add_noise_inside(rng, &mut mask, 25);
    blur(&mask, 1.5)
}

/// Wavy dried-water band: faint wash toward one edge bounded by a darker tide line.
pub fn moisture_tide<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width, height);
    let (w, h) = (width as i32, height as i32);
    let from_bottom = coin(rng, 0.5);

    let level = h as f32 * uniform(rng, 0.1, 0.45);
    let amplitude = h as f32 * uniform(rng, 0.01, 0.04);
    let frequency = uniform(rng, 1.0, 4.0) * std::f32::consts::TAU / w.max(1) as f32;
    let phase = uniform(rng, 0.0, std::f32::consts::TAU);
    let wash = randint(rng, 25, 45) as u8;
    let line = randint(rng, 70, 110) as u8;
    let line_width = randint(rng, 3, 6);

    for x in 0..w {
        let depth = (level + amplitude * (x as f32 * frequency + phase).sin()) as i32
            + randint(rng, -1, 1);

        if from_bottom {
            let edge = h - depth;
            fill_rect(&mut mask, x, edge, x, h - 1, wash);
            fill_rect(&mut mask, x, edge - line_width, x, edge, line);
        } else {
            fill_rect(&mut mask, x, 0, x, depth, wash);
            fill_rect(&mut mask, x, depth, x, depth + line_width, line);
        }
    }

    blur(&mask, 3.0)
}

/// Signed per-pixel grain in `[-30, 30)` scaled by `strength`, row-major.
pub fn paper_grain<R: Rng + ?Sized>(
    rng: &mut R,
    width: u32,
    height: u32,
    strength: f32,
) -> Vec<i16> {
    (0..width as usize * height as usize)
        .map(|_| (rng.random_range(-30i16..30) as f32 * strength) as i16)
        .collect()
}
