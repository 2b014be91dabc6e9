use super::{
    Mask, add_noise_inside, blur, canvas_side, draw_thick_line, scatter_dots, square_canvas,
};
use crate::util::{randint, uniform};
use image::{GrayImage, Luma};
use imageproc::{
    drawing::{draw_filled_circle_mut, draw_filled_ellipse_mut, draw_hollow_ellipse_mut},
    geometric_transformations::{Interpolation, rotate_about_center},
};
use rand::Rng;
use std::f32::consts::TAU;

pub const BLOB_CANVAS: f32 = 2.0;
pub const WATER_STAIN_CANVAS: f32 = 2.5;
pub const FINGERPRINT_CANVAS: f32 = 2.0;
pub const DUST_CANVAS: f32 = 2.0;
pub const STREAK_CANVAS: f32 = 2.0;
pub const BLEEDING_INK_CANVAS: f32 = 2.2;
pub const COFFEE_RING_CANVAS: f32 = 2.4;
pub const SOOT_CANVAS: f32 = 2.6;
pub const INK_BLOTCH_CANVAS: f32 = 2.0;
pub const GRIME_CANVAS: f32 = 2.8;
pub const AGE_RINGS_CANVAS: f32 = 2.5;
pub const INK_HALO_CANVAS: f32 = 2.4;
pub const FOXING_CANVAS: f32 = 2.0;
pub const FADING_CANVAS: f32 = 2.8;
pub const TEXT_SMUDGE_CANVAS: (f32, f32) = (2.4, 1.2);

fn center_of(mask: &Mask) -> (i32, i32) {
    ((mask.width() / 2) as i32, (mask.height() / 2) as i32)
}

/// Irregular smudge built from 8-15 overlapping circles around the center.
pub fn organic_blob<R: Rng + ?Sized>(rng: &mut R, size: u32, irregularity: f32) -> Mask {
    let mut mask = square_canvas(size, BLOB_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let spread = (s * irregularity) as i32;

    for _ in 0..randint(rng, 8, 15) {
        let ox = randint(rng, -spread, spread);
        let oy = randint(rng, -spread, spread);
        let radius = randint(rng, (s * 0.3) as i32, (s * 0.7) as i32);
        let value = randint(rng, 100, 200) as u8;
        draw_filled_circle_mut(&mut mask, (cx + ox, cy + oy), radius, Luma([value]));
    }

    let mask = blur(&mask, s * 0.15);
    let mut mask = blur(&mask, s * 0.1);
    add_noise_inside(rng, &mut mask, 20);
    mask
}

/// Large faint stain: 3-6 jittered rings whose opacity is divided by the ring index.
pub fn water_stain<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, WATER_STAIN_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;

    for ring in 0..randint(rng, 3, 6) {
        let ring_size = (s * (0.5 + ring as f32 * 0.3)) as i32;
        let value = (randint(rng, 30, 80) / (ring + 1)) as u8;
        let jitter = ring_size / 3;

        for _ in 0..randint(rng, 5, 10) {
            let ox = randint(rng, -jitter, jitter);
            let oy = randint(rng, -jitter, jitter);
            draw_filled_circle_mut(&mut mask, (cx + ox, cy + oy), ring_size, Luma([value]));
        }
    }

    blur(&mask, s * 0.3)
}

/// Elongated ridges, lightly blurred, then rotated by a random angle.
pub fn fingerprint<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, FINGERPRINT_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let quarter = size as i32 / 4;

    for _ in 0..randint(rng, 4, 7) {
        let offset = randint(rng, -quarter, quarter);
        let width = randint(rng, (s * 0.1) as i32, (s * 0.2) as i32);
        let length = (s * uniform(rng, 0.6, 1.2)) as i32;
        let value = randint(rng, 80, 150) as u8;
        draw_filled_ellipse_mut(
            &mut mask,
            (cx, cy + offset),
            (length / 2).max(1),
            (width / 2).max(1),
            Luma([value]),
        );
    }

    let mask = blur(&mask, s * 0.08);
    let angle = uniform(rng, 0.0, TAU);
    rotate_about_center(&mask, angle, Interpolation::Bilinear, Luma([0]))
}

/// Tiny scattered specks anywhere on the canvas.
pub fn dust_speckles<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, DUST_CANVAS);
    let side = mask.width() as i32;

    for _ in 0..randint(rng, 10, 25) {
        let x = randint(rng, 0, side);
        let y = randint(rng, 0, side);
        let radius = randint(rng, 1, 4);
        let value = randint(rng, 100, 180) as u8;
        draw_filled_circle_mut(&mut mask, (x, y), radius, Luma([value]));
    }

    blur(&mask, 1.0)
}

/// A handful of thick strokes at random headings, blurred into smears.
pub fn streak<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, STREAK_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let half = size as i32 / 2;

    for _ in 0..randint(rng, 3, 8) {
        let sx = randint(rng, cx - half, cx + half) as f32;
        let sy = randint(rng, cy - half, cy + half) as f32;
        let length = randint(rng, (s * 0.3) as i32, (s * 0.8) as i32) as f32;
        let heading = uniform(rng, 0.0, TAU);
        let width = randint(rng, 2, 6) as u32;
        let value = randint(rng, 70, 140) as u8;

        let end = (sx + length * heading.cos(), sy + length * heading.sin());
        draw_thick_line(&mut mask, (sx, sy), end, width, value);
    }

    blur(&mask, s * 0.12)
}

/// Dark core with capillary tendrils feathering outwards.
pub fn bleeding_ink<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, BLEEDING_INK_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;

    for _ in 0..randint(rng, 12, 24) {
        let heading = uniform(rng, 0.0, TAU);
        let length = s * uniform(rng, 0.4, 0.9);
        let width = randint(rng, 1, 3) as u32;
        let value = randint(rng, 70, 130) as u8;
        let end = (cx as f32 + length * heading.cos(), cy as f32 + length * heading.sin());

        draw_thick_line(&mut mask, (cx as f32, cy as f32), end, width, value);
        let droplet = randint(rng, 1, (s * 0.04) as i32 + 1);
        draw_filled_circle_mut(&mut mask, (end.0 as i32, end.1 as i32), droplet, Luma([value]));
    }

    let jitter = (s * 0.08) as i32;
    for _ in 0..randint(rng, 2, 4) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let radius = randint(rng, (s * 0.15) as i32, (s * 0.3) as i32);
        let value = randint(rng, 170, 230) as u8;
        draw_filled_circle_mut(&mut mask, (cx + ox, cy + oy), radius, Luma([value]));
    }

    let mut mask = blur(&mask, s * 0.04);
    add_noise_inside(rng, &mut mask, 15);
    mask
}

/// Cup ring: a faint interior and a darker, broken rim.
pub fn coffee_ring<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, COFFEE_RING_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let radius = s * uniform(rng, 0.7, 0.9);
    let thickness = (s * uniform(rng, 0.06, 0.12)).max(2.0);

    let interior = randint(rng, 15, 35) as u8;
    let r = (radius * 0.95) as i32;
    draw_filled_circle_mut(&mut mask, (cx, cy), r, Luma([interior]));

    let segments = randint(rng, 36, 72);
    let gap_start = uniform(rng, 0.0, TAU);
    let gap_len = uniform(rng, 0.0, 0.9);
    let rim = randint(rng, 110, 170);

    for i in 0..segments {
        let angle = TAU * i as f32 / segments as f32;
        let from_gap = (angle - gap_start).rem_euclid(TAU);
        if from_gap < gap_len {
            continue;
        }

        let wobble = uniform(rng, -thickness * 0.4, thickness * 0.4);
        let x = cx as f32 + (radius + wobble) * angle.cos();
        let y = cy as f32 + (radius + wobble) * angle.sin();
        let dot = randint(rng, (thickness * 0.5) as i32, thickness as i32).max(1);
        let value = (rim + randint(rng, -20, 20)).clamp(0, 255) as u8;
        draw_filled_circle_mut(&mut mask, (x as i32, y as i32), dot, Luma([value]));
    }

    blur(&mask, s * 0.02 + 1.0)
}

/// Diffuse dark cloud peppered with fine particles.
pub fn soot<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, SOOT_CANVAS);
    let center = center_of(&mask);
    let s = size as f32;
    let jitter = (s * 0.3) as i32;

    for _ in 0..randint(rng, 3, 6) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let rx = randint(rng, (s * 0.3) as i32, (s * 0.7) as i32).max(1);
        let ry = randint(rng, (s * 0.3) as i32, (s * 0.7) as i32).max(1);
        let value = randint(rng, 40, 90) as u8;
        draw_filled_ellipse_mut(&mut mask, (center.0 + ox, center.1 + oy), rx, ry, Luma([value]));
    }

    let mut mask = blur(&mask, s * 0.2);
    let count = randint(rng, 30, 80) as u32;
    scatter_dots(rng, &mut mask, center, (s * 0.8) as i32, count, 3, (120, 200));

    let mut mask = blur(&mask, 1.2);
    add_noise_inside(rng, &mut mask, 15);
    mask
}

/// Saturated ink pool with satellite splatter droplets.
pub fn ink_blotch<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, INK_BLOTCH_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let jitter = (s * 0.2) as i32;

    for _ in 0..randint(rng, 5, 10) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let radius = randint(rng, (s * 0.25) as i32, (s * 0.45) as i32);
        let value = randint(rng, 200, 250) as u8;
        draw_filled_circle_mut(&mut mask, (cx + ox, cy + oy), radius, Luma([value]));
    }

    for _ in 0..randint(rng, 6, 16) {
        let heading = uniform(rng, 0.0, TAU);
        let distance = s * uniform(rng, 0.5, 0.9);
        let x = cx as f32 + distance * heading.cos();
        let y = cy as f32 + distance * heading.sin();
        let radius = randint(rng, 1, (s * 0.06) as i32 + 1);
        let value = randint(rng, 180, 240) as u8;
        draw_filled_circle_mut(&mut mask, (x as i32, y as i32), radius, Luma([value]));
    }

    blur(&mask, s * 0.04)
}

/// Broad low-contrast dirt patches.
pub fn atmospheric_grime<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, GRIME_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let jitter = size as i32;

    for _ in 0..randint(rng, 10, 20) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let rx = randint(rng, (s * 0.2) as i32, (s * 0.6) as i32).max(1);
        let ry = randint(rng, (s * 0.2) as i32, (s * 0.6) as i32).max(1);
        let value = randint(rng, 15, 45) as u8;
        draw_filled_ellipse_mut(&mut mask, (cx + ox, cy + oy), rx, ry, Luma([value]));
    }

    let mut mask = blur(&mask, s * 0.35);
    add_noise_inside(rng, &mut mask, 10);
    mask
}

/// Concentric tide-mark outlines that fade outward.
pub fn age_rings<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, AGE_RINGS_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let jitter = (s * 0.05) as i32;
    let base = randint(rng, 60, 120) as f32;

    for ring in 0..randint(rng, 2, 5) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let radius = s * (0.4 + ring as f32 * 0.25);
        let aspect = uniform(rng, 0.85, 1.15);
        let thickness = randint(rng, 2, 4);
        let value = (base * (1.0 - ring as f32 * 0.15)).max(10.0) as u8;

        for t in 0..thickness {
            let rx = (radius as i32 + t).max(1);
            let ry = ((radius * aspect) as i32 + t).max(1);
            draw_hollow_ellipse_mut(&mut mask, (cx + ox, cy + oy), rx, ry, Luma([value]));
        }
    }

    blur(&mask, s * 0.03)
}

/// Darker ring with a paler core, the halo around spread ink.
pub fn ink_halo<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, INK_HALO_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;

    let outer = (s * 0.8) as i32;
    let inner = (s * uniform(rng, 0.45, 0.6)) as i32;
    let halo = randint(rng, 60, 110) as u8;
    let core = randint(rng, 10, 30) as u8;

    draw_filled_circle_mut(&mut mask, (cx, cy), outer, Luma([halo]));
    draw_filled_circle_mut(&mut mask, (cx, cy), inner, Luma([core]));

    blur(&mask, s * 0.15)
}

/// Rust-brown foxing spots, each with a denser core.
pub fn foxing_spots<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, FOXING_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let spread = (s * 0.7) as i32;

    for _ in 0..randint(rng, 3, 9) {
        let x = cx + randint(rng, -spread, spread);
        let y = cy + randint(rng, -spread, spread);
        let radius = randint(rng, (s * 0.04) as i32, (s * 0.14) as i32).max(1);
        let outer = randint(rng, 70, 120) as u8;
        let core = randint(rng, 140, 200) as u8;

        draw_filled_circle_mut(&mut mask, (x, y), radius, Luma([outer]));
        draw_filled_circle_mut(&mut mask, (x, y), (radius / 2).max(1), Luma([core]));
    }

    let mut mask = blur(&mask, s * 0.03 + 0.8);
    add_noise_inside(rng, &mut mask, 12);
    mask
}

/// Very soft, very wide patches of uneven tone.
pub fn uneven_fading<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let mut mask = square_canvas(size, FADING_CANVAS);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;
    let jitter = (s * 0.4) as i32;

    for _ in 0..randint(rng, 3, 6) {
        let ox = randint(rng, -jitter, jitter);
        let oy = randint(rng, -jitter, jitter);
        let rx = randint(rng, (s * 0.5) as i32, s as i32).max(1);
        let ry = randint(rng, (s * 0.5) as i32, s as i32).max(1);
        let value = randint(rng, 20, 50) as u8;
        draw_filled_ellipse_mut(&mut mask, (cx + ox, cy + oy), rx, ry, Luma([value]));
    }

    blur(&mask, s * 0.45)
}

/// Page-sized mask of scattered rust spots with soft halos.
pub fn rust_stains<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> Mask {
    let mut mask = GrayImage::new(width.max(1), height.max(1));
    let min_dim = width.min(height).max(1) as f32;

    for _ in 0..randint(rng, 2, 6) {
        let x = randint(rng, 0, width as i32 - 1);
        let y = randint(rng, 0, height as i32 - 1);
        let radius = (min_dim * uniform(rng, 0.008, 0.03)).max(1.0);
        let halo = randint(rng, 30, 60) as u8;
        let core = randint(rng, 130, 200) as u8;

        draw_filled_circle_mut(&mut mask, (x, y), (radius * 2.2) as i32, Luma([halo]));
        draw_filled_circle_mut(&mut mask, (x, y), radius as i32, Luma([core]));
        let count = randint(rng, 3, 10) as u32;
        scatter_dots(rng, &mut mask, (x, y), (radius * 3.0) as i32, count, 2, (90, 160));
    }

    blur(&mask, min_dim * 0.004 + 1.0)
}

/// Canvas of the text-area smudge: wider than tall.
pub fn text_smudge_dims(size: u32) -> (u32, u32) {
    (
        canvas_side(size, TEXT_SMUDGE_CANVAS.0),
        canvas_side(size, TEXT_SMUDGE_CANVAS.1),
    )
}

/// Horizontal smears laid over lines of text.
pub fn text_smudge<R: Rng + ?Sized>(rng: &mut R, size: u32) -> Mask {
    let (w, h) = text_smudge_dims(size);
    let mut mask = GrayImage::new(w, h);
    let (cx, cy) = center_of(&mask);
    let s = size as f32;

    let lines = randint(rng, 3, 6);
    let spacing = s * uniform(rng, 0.15, 0.25);
    let top = cy as f32 - spacing * (lines - 1) as f32 / 2.0;
    let jitter = (s * 0.2) as i32;

    for line in 0..lines {
        let y = (top + spacing * line as f32) as i32 + randint(rng, -2, 2);
        let x = cx + randint(rng, -jitter, jitter);
        let rx = randint(rng, (s * 0.5) as i32, s as i32).max(1);
        let ry = randint(rng, (s * 0.03) as i32, (s * 0.07) as i32).max(1);
        let value = randint(rng, 70, 140) as u8;
        draw_filled_ellipse_mut(&mut mask, (x, y), rx, ry, Luma([value]));
    }

    let mut mask = blur(&mask, s * 0.06);
    add_noise_inside(rng, &mut mask, 10);
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    fn assert_square(mask: &Mask, size: u32, multiplier: f32) {
        let side = canvas_side(size, multiplier);
        assert_eq!(mask.dimensions(), (side, side));
    }

    fn marked(mask: &Mask) -> usize {
        mask.pixels().filter(|p| p[0] > 0).count()
    }

    #[test]
    fn test_blob_is_centered_and_sized() {
        let mut rng = StdRng::seed_from_u64(10);
        let mask = organic_blob(&mut rng, 40, 0.4);
        assert_square(&mask, 40, BLOB_CANVAS);

        let (cx, cy) = (mask.width() / 2, mask.height() / 2);
        assert!(mask.get_pixel(cx, cy)[0] > 50);
        assert!(marked(&mask) > 0);
    }

    #[test]
    fn test_water_stain_is_faint() {
        let mut rng = StdRng::seed_from_u64(11);
        let mask = water_stain(&mut rng, 40);
        assert_square(&mask, 40, WATER_STAIN_CANVAS);
        assert!(mask.pixels().all(|p| p[0] <= 80));
    }

    #[test]
    fn test_fingerprint_keeps_canvas() {
        let mut rng = StdRng::seed_from_u64(12);
        let mask = fingerprint(&mut rng, 30);
        assert_square(&mask, 30, FINGERPRINT_CANVAS);
        assert!(marked(&mask) > 0);
    }

    #[test]
    fn test_small_generators_have_documented_canvas() {
        let mut rng = StdRng::seed_from_u64(13);
        let size = 36;

        assert_square(&dust_speckles(&mut rng, size), size, DUST_CANVAS);
        assert_square(&streak(&mut rng, size), size, STREAK_CANVAS);
        assert_square(&bleeding_ink(&mut rng, size), size, BLEEDING_INK_CANVAS);
        assert_square(&coffee_ring(&mut rng, size), size, COFFEE_RING_CANVAS);
        assert_square(&soot(&mut rng, size), size, SOOT_CANVAS);
        assert_square(&ink_blotch(&mut rng, size), size, INK_BLOTCH_CANVAS);
        assert_square(&atmospheric_grime(&mut rng, size), size, GRIME_CANVAS);
        assert_square(&age_rings(&mut rng, size), size, AGE_RINGS_CANVAS);
        assert_square(&ink_halo(&mut rng, size), size, INK_HALO_CANVAS);
        assert_square(&foxing_spots(&mut rng, size), size, FOXING_CANVAS);
        assert_square(&uneven_fading(&mut rng, size), size, FADING_CANVAS);
        assert_eq!(text_smudge(&mut rng, size).dimensions(), text_smudge_dims(size));
    }

    #[test]
    fn test_ink_halo_core_is_lighter_than_ring() {
        let mut rng = StdRng::seed_from_u64(14);
        let mask = ink_halo(&mut rng, 60);
        let (cx, cy) = (mask.width() / 2, mask.height() / 2);
        let ring = mask.get_pixel(cx + 40, cy)[0];
        assert!(mask.get_pixel(cx, cy)[0] < ring);
    }

    #[test]
    fn test_rust_stains_cover_page() {
        let mut rng = StdRng::seed_from_u64(15);
        let mask = rust_stains(&mut rng, 120, 80);
        assert_eq!(mask.dimensions(), (120, 80));
        assert!(marked(&mask) > 0);
    }

    #[test]
    fn test_same_seed_same_mask() {
        let a = organic_blob(&mut StdRng::seed_from_u64(99), 30, 0.5);
        let b = organic_blob(&mut StdRng::seed_from_u64(99), 30, 0.5);
        assert_eq!(a.as_raw(), b.as_raw());
    }
}
