use crate::{
    archetype::{ArchetypeSampler, Color, MarkArchetype},
    mask::Mask,
    placement::{self, Placement},
};
use image::{Rgba, RgbaImage, imageops};
use rand::Rng;

/// One drawn mark, alive only until it is laid onto the overlay.
#[derive(Debug, Clone)]
pub struct MarkDescriptor {
    pub archetype: MarkArchetype,
    pub mask: Mask,
    pub color: Color,
    pub intensity: f32,
    pub placement: Placement,
}

impl MarkDescriptor {
    /// Every call draws archetype, size, colour, strength and position afresh.
    pub fn draw<R: Rng + ?Sized>(
        rng: &mut R,
        sampler: &ArchetypeSampler,
        page: (u32, u32),
    ) -> Self {
        let archetype = sampler.sample(rng);
        let size = archetype.draw_size(rng, page.0.min(page.1));
        let mask = archetype.generate(rng, size, page);
        let color = archetype.draw_color(rng);
        let intensity = archetype.draw_intensity(rng);

        let placement = if archetype.is_full_canvas() {
            Placement { x: 0, y: 0 }
        } else {
            placement::place(rng, page, mask.dimensions(), size)
        };

        log::debug!(
            "mark {} size={size} mask={:?} at ({}, {}) intensity={intensity:.2}",
            archetype.name(),
            mask.dimensions(),
            placement.x,
            placement.y
        );

        Self {
            archetype,
            mask,
            color,
            intensity,
            placement,
        }
    }

    pub fn to_layer(&self, global_intensity: f32) -> RgbaImage {
        colorize(&self.mask, self.color, global_intensity * self.intensity)
    }

    /// Alpha-composites the coloured mark onto `overlay`; anything past the
    /// overlay's bounds is clipped.
    pub fn apply(&self, overlay: &mut RgbaImage, global_intensity: f32) {
        let layer = self.to_layer(global_intensity);
        imageops::overlay(
            overlay,
            &layer,
            self.placement.x as i64,
            self.placement.y as i64,
        );
    }
}

/// Solid `color` layer whose alpha is the mask scaled by `scale`.
///
/// A marked pixel keeps at least alpha 1 for any positive scale, so faint
/// marks at low intensity never round away to nothing.
pub fn colorize(mask: &Mask, color: Color, scale: f32) -> RgbaImage {
    let [r, g, b] = color.0;
    RgbaImage::from_fn(mask.width(), mask.height(), |x, y| {
        let value = mask.get_pixel(x, y)[0];
        let alpha = (value as f32 * scale).clamp(0.0, 255.0) as u8;
        let alpha = if value > 0 && scale > 0.0 { alpha.max(1) } else { alpha };
        Rgba([r, g, b, alpha])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::archetype::ArchetypeSet;
    use image::{GrayImage, Luma, Rgb};
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn test_colorize_scales_and_clips_alpha() {
        let mut mask = GrayImage::new(2, 1);
        mask.put_pixel(0, 0, Luma([100]));
        mask.put_pixel(1, 0, Luma([200]));

        let layer = colorize(&mask, Rgb([10, 20, 30]), 1.5);
        assert_eq!(layer.get_pixel(0, 0), &Rgba([10, 20, 30, 150]));
        assert_eq!(layer.get_pixel(1, 0), &Rgba([10, 20, 30, 255]));

        let faint = colorize(&mask, Rgb([10, 20, 30]), 0.2);
        assert_eq!(faint.get_pixel(0, 0)[3], 20);

        let barely = colorize(&mask, Rgb([10, 20, 30]), 0.001);
        assert_eq!(barely.get_pixel(0, 0)[3], 1);
        assert_eq!(colorize(&mask, Rgb([10, 20, 30]), 0.0).get_pixel(1, 0)[3], 0);
    }

    #[test]
    fn test_apply_clips_outside_overlay() {
        let mut mask = GrayImage::new(10, 10);
        for p in mask.pixels_mut() {
            *p = Luma([255]);
        }
        let mark = MarkDescriptor {
            archetype: MarkArchetype::Blob,
            mask,
            color: Rgb([50, 40, 30]),
            intensity: 1.0,
            placement: Placement { x: 5, y: 5 },
        };

        let mut overlay = RgbaImage::new(8, 8);
        mark.apply(&mut overlay, 1.0);
        assert_eq!(overlay.get_pixel(7, 7), &Rgba([50, 40, 30, 255]));
        assert_eq!(overlay.get_pixel(4, 4)[3], 0);
    }

    #[test]
    fn test_draw_full_canvas_skips_placement() -> anyhow::Result<()> {
        let sampler = ArchetypeSet::Extended.sampler()?;
        let mut rng = StdRng::seed_from_u64(60);
        for _ in 0..200 {
            let mark = MarkDescriptor::draw(&mut rng, &sampler, (120, 80));
            if mark.archetype.is_full_canvas() {
                assert_eq!(mark.mask.dimensions(), (120, 80));
                assert_eq!(mark.placement, Placement { x: 0, y: 0 });
            }
            assert!(mark.placement.x <= 120 && mark.placement.y <= 80);
        }
        Ok(())
    }
}
