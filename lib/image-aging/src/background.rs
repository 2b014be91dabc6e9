use crate::util::{pick, randint};
use image::{Rgb, RgbImage};
use rand::Rng;

const PAPER_TONES: [Rgb<u8>; 4] = [
    Rgb([194, 178, 128]),
    Rgb([186, 168, 120]),
    Rgb([198, 182, 140]),
    Rgb([180, 160, 115]),
];

const GRAIN: i32 = 15;
const TONE_PATCHES: usize = 5;

/// Blank aged-paper page: a tan base with per-channel grain and a few soft
/// radial patches that are lighter or darker than their surroundings.
pub fn ancient_paper<R: Rng + ?Sized>(rng: &mut R, width: u32, height: u32) -> RgbImage {
    let base = *pick(rng, &PAPER_TONES);
    let mut page = RgbImage::from_fn(width, height, |_, _| {
        Rgb(base.0.map(|c| (c as i32 + rng.random_range(-GRAIN..GRAIN)).clamp(0, 255) as u8))
    });

    for _ in 0..TONE_PATCHES {
        let cx = randint(rng, 0, width as i32);
        let cy = randint(rng, 0, height as i32);
        let radius = randint(rng, 100, 300);
        let shift = randint(rng, -20, 20) as f32;
        shade_patch(&mut page, (cx, cy), radius, shift);
    }

    page
}

fn shade_patch(page: &mut RgbImage, (cx, cy): (i32, i32), radius: i32, shift: f32) {
    let (w, h) = (page.width() as i32, page.height() as i32);
    let (x0, x1) = ((cx - radius).max(0), (cx + radius).min(w));
    let (y0, y1) = ((cy - radius).max(0), (cy + radius).min(h));

    for y in y0..y1 {
        for x in x0..x1 {
            let (dx, dy) = ((x - cx) as f32, (y - cy) as f32);
            let dist = (dx * dx + dy * dy).sqrt();
            if dist >= radius as f32 {
                continue;
            }

            let delta = shift * (1.0 - dist / radius as f32);
            let pixel = page.get_pixel_mut(x as u32, y as u32);
            for channel in pixel.0.iter_mut() {
                *channel = (*channel as f32 + delta).clamp(0.0, 255.0) as u8;
            }
        }
    }
}
