//! Where a mark lands on the page.
//!
//! Offsets are always inside `0..=page - mask` on each axis; when a mask is
//! wider or taller than the page that range collapses to zero and the mark is
//! pinned to the origin on that axis, leaving the compositor to clip it.

use crate::util::{coin, randint, uniform};
use rand::Rng;

const EDGE_PLACEMENT_PROBABILITY: f64 = 0.3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub x: u32,
    pub y: u32,
}

/// Largest legal offsets on each axis for a `mask` on a `page`.
pub fn max_offsets(page: (u32, u32), mask: (u32, u32)) -> (u32, u32) {
    (page.0.saturating_sub(mask.0), page.1.saturating_sub(mask.1))
}

/// Distance from the page border that counts as "near the edge" for a mark of
/// nominal `size`, capped at a quarter of the shorter page side.
pub fn edge_margin<R: Rng + ?Sized>(rng: &mut R, size: u32, page: (u32, u32)) -> u32 {
    let bias = uniform(rng, 0.5, 1.5);
    let margin = (size as f32 * bias) as u32;
    margin.min(page.0.min(page.1) / 4)
}

/// Picks an offset, hugging a random border 30% of the time and otherwise
/// keeping clear of the margin where the page allows it.
pub fn place<R: Rng + ?Sized>(
    rng: &mut R,
    page: (u32, u32),
    mask: (u32, u32),
    size: u32,
) -> Placement {
    let (max_x, max_y) = max_offsets(page, mask);
    let margin = edge_margin(rng, size, page);

    if coin(rng, EDGE_PLACEMENT_PROBABILITY) && max_x > 0 && max_y > 0 {
        if coin(rng, 0.5) {
            Placement {
                x: near_edge(rng, max_x, margin),
                y: anywhere(rng, max_y),
            }
        } else {
            Placement {
                x: anywhere(rng, max_x),
                y: near_edge(rng, max_y, margin),
            }
        }
    } else {
        Placement {
            x: inset(rng, max_x, margin),
            y: inset(rng, max_y, margin),
        }
    }
}

fn anywhere<R: Rng + ?Sized>(rng: &mut R, max: u32) -> u32 {
    randint(rng, 0, max as i32) as u32
}

/// Within `margin` of the low or the high border.
fn near_edge<R: Rng + ?Sized>(rng: &mut R, max: u32, margin: u32) -> u32 {
    if coin(rng, 0.5) && margin > 0 {
        randint(rng, 0, margin.min(max) as i32) as u32
    } else {
        let low = max.saturating_sub(margin);
        randint(rng, low as i32, max as i32) as u32
    }
}

/// Inside `margin..=max - margin`, or the whole range when that is empty.
fn inset<R: Rng + ?Sized>(rng: &mut R, max: u32, margin: u32) -> u32 {
    let lo = margin.min(max);
    match max.checked_sub(margin) {
        Some(hi) if hi >= lo => randint(rng, lo as i32, hi as i32) as u32,
        _ => anywhere(rng, max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_offsets_never_exceed_valid_range() {
        let mut rng = StdRng::seed_from_u64(50);
        for _ in 0..2000 {
            let page = (rng.random_range(1..400), rng.random_range(1..400));
            let mask = (rng.random_range(1..600), rng.random_range(1..600));
            let size = rng.random_range(1..300);
            let (max_x, max_y) = max_offsets(page, mask);
            let placement = place(&mut rng, page, mask, size);

            assert!(placement.x <= max_x && placement.y <= max_y, "{page:?} {mask:?}");
            let visible_w = (page.0 - placement.x).min(mask.0);
            let visible_h = (page.1 - placement.y).min(mask.1);
            assert!(visible_w > 0 && visible_h > 0);
        }
    }

    #[test]
    fn test_oversized_mask_pins_to_origin() {
        let mut rng = StdRng::seed_from_u64(51);
        let placement = place(&mut rng, (100, 100), (250, 250), 120);
        assert_eq!(placement, Placement { x: 0, y: 0 });

        let placement = place(&mut rng, (100, 400), (250, 50), 120);
        assert_eq!(placement.x, 0);
        assert!(placement.y <= 350);
    }

    #[test]
    fn test_margin_is_capped() {
        let mut rng = StdRng::seed_from_u64(52);
        for _ in 0..100 {
            assert!(edge_margin(&mut rng, 1000, (400, 300)) <= 75);
        }
    }

    #[test]
    fn test_inset_keeps_clear_of_margin() {
        let mut rng = StdRng::seed_from_u64(53);
        for _ in 0..500 {
            let offset = inset(&mut rng, 200, 40);
            assert!((40..=160).contains(&offset));
        }
        for _ in 0..500 {
            assert!(inset(&mut rng, 50, 40) <= 50);
        }
    }

    #[test]
    fn test_edge_bias_reaches_both_borders() {
        let mut rng = StdRng::seed_from_u64(54);
        let (mut low, mut high) = (false, false);
        for _ in 0..200 {
            let offset = near_edge(&mut rng, 500, 30);
            assert!(offset <= 30 || offset >= 470);
            low |= offset <= 30;
            high |= offset >= 470;
        }
        assert!(low && high);
    }
}
