//! Two-layer compositing: marks and page-wide effects accumulate on a
//! transparent overlay which is blended onto the working page exactly once.

use crate::{
    archetype::{ArchetypeSet, Color},
    mark::{MarkDescriptor, colorize},
    mask::{self, Corner},
    severity::{EffectCategory, EffectRule, SeverityProfile},
    util::{coin, pick, randu32},
};
use image::{Rgb, RgbaImage, imageops};
use photon_rs::{PhotonImage, monochrome};
use rand::Rng;

const CORNER_TONES: [Color; 4] = [
    Rgb([80, 70, 55]),
    Rgb([90, 80, 65]),
    Rgb([70, 60, 50]),
    Rgb([60, 50, 40]),
];
const FOLD_TONES: [Color; 3] = [Rgb([70, 60, 50]), Rgb([80, 70, 60]), Rgb([60, 50, 40])];
const CRACK_TONES: [Color; 3] = [Rgb([60, 50, 40]), Rgb([70, 60, 50]), Rgb([50, 40, 30])];
const TIDE_TONES: [Color; 3] = [Rgb([150, 125, 80]), Rgb([140, 115, 70]), Rgb([160, 135, 90])];
const TORN_TONES: [Color; 3] = [Rgb([90, 80, 65]), Rgb([100, 90, 75]), Rgb([80, 70, 55])];
const EDGE_TONES: [Color; 3] = [Rgb([70, 60, 45]), Rgb([80, 70, 55]), Rgb([60, 50, 40])];
const VIGNETTE_TONE: Color = Rgb([40, 35, 30]);
const DEEP_VIGNETTE_TONE: Color = Rgb([30, 25, 20]);

/// One page-wide effect, fully decided before any pixel is touched.
///
/// `intensity` on the layer effects is the severity multiplier; the
/// configured intensity scalar is applied on top when rendering.
#[derive(Debug, Clone, PartialEq)]
pub enum GlobalEffect {
    CornerDarkening {
        corner: Corner,
        color: Color,
        intensity: f32,
    },
    Vignette {
        strength: f32,
        color: Color,
        intensity: f32,
    },
    OverlayDesaturation {
        amount: f32,
    },
    FoldLine {
        vertical: bool,
        color: Color,
        intensity: f32,
    },
    Crack {
        color: Color,
        intensity: f32,
    },
    MoistureTide {
        color: Color,
        intensity: f32,
    },
    TornEdge {
        color: Color,
        intensity: f32,
    },
    EdgeDarkening {
        color: Color,
        intensity: f32,
    },
    PaperGrain {
        strength: f32,
    },
    Yellowing {
        amount: f32,
    },
}

impl GlobalEffect {
    pub fn category(&self) -> EffectCategory {
        match self {
            Self::CornerDarkening { .. } => EffectCategory::CornerDarkening,
            Self::Vignette { .. } => EffectCategory::Vignette,
            Self::OverlayDesaturation { .. } => EffectCategory::OverlayDesaturation,
            Self::FoldLine { .. } => EffectCategory::FoldLine,
            Self::Crack { .. } => EffectCategory::Crack,
            Self::MoistureTide { .. } => EffectCategory::MoistureTide,
            Self::TornEdge { .. } => EffectCategory::TornEdge,
            Self::EdgeDarkening { .. } => EffectCategory::EdgeDarkening,
            Self::PaperGrain { .. } => EffectCategory::PaperGrain,
            Self::Yellowing { .. } => EffectCategory::Yellowing,
        }
    }

    /// Draws which effects fire for one page, in rendering order.
    ///
    /// The basic set ages the page itself (vignette, grain and yellowing on
    /// the base); the extended set keeps the page colour and only desaturates
    /// and grains the overlay.
    pub fn plan<R: Rng + ?Sized>(
        rng: &mut R,
        profile: &SeverityProfile,
        set: ArchetypeSet,
        intensity: f32,
    ) -> Vec<Self> {
        let mut plan = vec![];

        if profile.corner.is_enabled() {
            for corner in Corner::all() {
                if coin(rng, profile.corner.probability) {
                    plan.push(Self::CornerDarkening {
                        corner,
                        color: *pick(rng, &CORNER_TONES),
                        intensity: profile.corner.intensity,
                    });
                }
            }
        }

        match set {
            ArchetypeSet::Basic => {
                for _ in 0..activations(rng, &profile.vignette) {
                    let deep = profile.vignette_strength >= 0.9;
                    plan.push(Self::Vignette {
                        strength: profile.vignette_strength,
                        color: if deep { DEEP_VIGNETTE_TONE } else { VIGNETTE_TONE },
                        intensity: profile.vignette.intensity,
                    });
                }
            }
            ArchetypeSet::Extended => {
                for _ in 0..activations(rng, &profile.overlay_desaturation) {
                    plan.push(Self::OverlayDesaturation {
                        amount: profile.overlay_desaturation.intensity,
                    });
                }
            }
        }

        for _ in 0..activations(rng, &profile.fold) {
            plan.push(Self::FoldLine {
                vertical: coin(rng, 0.5),
                color: *pick(rng, &FOLD_TONES),
                intensity: profile.fold.intensity,
            });
        }

        for _ in 0..activations(rng, &profile.crack) {
            plan.push(Self::Crack {
                color: *pick(rng, &CRACK_TONES),
                intensity: profile.crack.intensity,
            });
        }

        for _ in 0..activations(rng, &profile.moisture_tide) {
            plan.push(Self::MoistureTide {
                color: *pick(rng, &TIDE_TONES),
                intensity: profile.moisture_tide.intensity,
            });
        }

        for _ in 0..activations(rng, &profile.torn_edge) {
            plan.push(Self::TornEdge {
                color: *pick(rng, &TORN_TONES),
                intensity: profile.torn_edge.intensity,
            });
        }

        for _ in 0..activations(rng, &profile.edge_darkening) {
            plan.push(Self::EdgeDarkening {
                color: *pick(rng, &EDGE_TONES),
                intensity: profile.edge_darkening.intensity,
            });
        }

        for _ in 0..activations(rng, &profile.paper_grain) {
            plan.push(Self::PaperGrain {
                strength: profile.paper_grain.intensity,
            });
        }

        if set == ArchetypeSet::Basic {
            for _ in 0..activations(rng, &profile.yellowing) {
                plan.push(Self::Yellowing {
                    amount: profile.yellowing.intensity * intensity,
                });
            }
        }

        plan
    }
}

/// How many instances of `rule` fire; a disabled rule draws nothing.
fn activations<R: Rng + ?Sized>(rng: &mut R, rule: &EffectRule) -> u32 {
    if !rule.is_enabled() {
        return 0;
    }

    let count = randu32(rng, rule.min_count, rule.max_count);
    (0..count).filter(|_| coin(rng, rule.probability)).count() as u32
}

#[derive(Debug, Clone)]
pub struct Compositor {
    base: RgbaImage,
    overlay: RgbaImage,
    intensity: f32,
    set: ArchetypeSet,
}

impl Compositor {
    /// `base` is the working copy of the page; the caller's image is never touched.
    pub fn new(base: RgbaImage, intensity: f32, set: ArchetypeSet) -> Self {
        let overlay = RgbaImage::new(base.width(), base.height());
        Self {
            base,
            overlay,
            intensity,
            set,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }

    pub fn add_mark(&mut self, mark: &MarkDescriptor) {
        mark.apply(&mut self.overlay, self.intensity);
    }

    pub fn apply<R: Rng + ?Sized>(&mut self, rng: &mut R, effect: &GlobalEffect) {
        let (width, height) = self.dimensions();
        log::debug!("global effect {effect:?}");

        match *effect {
            GlobalEffect::CornerDarkening {
                corner,
                color,
                intensity,
            } => {
                let mask = mask::corner_gradient(rng, width, height, corner);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::Vignette {
                strength,
                color,
                intensity,
            } => {
                let mask = mask::vignette(width, height, strength);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::OverlayDesaturation { amount } => self.desaturate_overlay(amount),
            GlobalEffect::FoldLine {
                vertical,
                color,
                intensity,
            } => {
                let mask = mask::fold_line(rng, width, height, vertical);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::Crack { color, intensity } => {
                let mask = mask::crack_pattern(rng, width, height);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::MoistureTide { color, intensity } => {
                let mask = mask::moisture_tide(rng, width, height);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::TornEdge { color, intensity } => {
                let mask = mask::torn_edge(rng, width, height);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::EdgeDarkening { color, intensity } => {
                let mask = mask::edge_darkening(rng, width, height);
                self.layer(&mask, color, intensity);
            }
            GlobalEffect::PaperGrain { strength } => {
                let grain = mask::paper_grain(rng, width, height, strength);
                let target = match self.set {
                    ArchetypeSet::Basic => &mut self.base,
                    ArchetypeSet::Extended => &mut self.overlay,
                };
                add_grain(target, &grain);
            }
            GlobalEffect::Yellowing { amount } => yellow(&mut self.base, amount),
        }
    }

    /// Blends the overlay onto the page once and hands back the result.
    pub fn finish(mut self) -> RgbaImage {
        imageops::overlay(&mut self.base, &self.overlay, 0, 0);
        self.base
    }

    fn layer(&mut self, mask: &mask::Mask, color: Color, multiplier: f32) {
        let layer = colorize(mask, color, self.intensity * multiplier);
        imageops::overlay(&mut self.overlay, &layer, 0, 0);
    }

    /// Pulls the overlay's colours toward grey; alpha is kept.
    fn desaturate_overlay(&mut self, amount: f32) {
        let amount = amount.clamp(0.0, 1.0);
        let (width, height) = self.dimensions();
        let mut photon_img = PhotonImage::new(self.overlay.to_vec(), width, height);
        monochrome::desaturate(&mut photon_img);

        let Some(gray) = RgbaImage::from_raw(width, height, photon_img.get_raw_pixels()) else {
            log::warn!("desaturation returned a mismatched buffer, skipping");
            return;
        };

        for (pixel, gray) in self.overlay.pixels_mut().zip(gray.pixels()) {
            for i in 0..3 {
                pixel[i] = (pixel[i] as f32 * (1.0 - amount) + gray[i] as f32 * amount) as u8;
            }
        }
    }
}

fn add_grain(image: &mut RgbaImage, grain: &[i16]) {
    for (pixel, offset) in image.pixels_mut().zip(grain) {
        for i in 0..3 {
            pixel[i] = (pixel[i] as i16 + offset).clamp(0, 255) as u8;
        }
    }
}

/// Warm sepia cast: red and green lifted, blue pulled down.
fn yellow(image: &mut RgbaImage, amount: f32) {
    let factors = [1.0 + 0.3 * amount, 1.0 + 0.15 * amount, 1.0 - 0.2 * amount];
    for pixel in image.pixels_mut() {
        for (i, factor) in factors.iter().enumerate() {
            pixel[i] = (pixel[i] as f32 * factor).clamp(0.0, 255.0) as u8;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::severity::AgingLevel;
    use image::Rgba;
    use rand::{SeedableRng, rngs::StdRng};

    fn page(width: u32, height: u32, color: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(width, height, Rgba(color))
    }

    #[test]
    fn test_light_plan_has_no_structural_damage() {
        let profile = AgingLevel::Light.profile();
        for seed in 0..200 {
            let mut rng = StdRng::seed_from_u64(seed);
            let plan = GlobalEffect::plan(&mut rng, &profile, ArchetypeSet::Extended, 0.2);
            assert!(plan.iter().all(|effect| matches!(
                effect,
                GlobalEffect::OverlayDesaturation { .. } | GlobalEffect::EdgeDarkening { .. }
            )));
        }
    }

    #[test]
    fn test_plan_follows_fixed_order() {
        let order = EffectCategory::all();
        let profile = AgingLevel::Extreme.profile();

        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            for set in [ArchetypeSet::Basic, ArchetypeSet::Extended] {
                let plan = GlobalEffect::plan(&mut rng, &profile, set, 1.0);
                let ranks: Vec<_> = plan
                    .iter()
                    .filter_map(|e| order.iter().position(|c| *c == e.category()))
                    .collect();
                assert!(ranks.windows(2).all(|w| w[0] <= w[1]), "{plan:?}");
            }
        }
    }

    #[test]
    fn test_variants_split_page_effects() {
        let profile = AgingLevel::Heavy.profile();
        let mut rng = StdRng::seed_from_u64(70);

        let basic = GlobalEffect::plan(&mut rng, &profile, ArchetypeSet::Basic, 1.0);
        assert!(basic.iter().any(|e| matches!(e, GlobalEffect::Yellowing { .. })));
        assert!(basic.iter().any(|e| matches!(e, GlobalEffect::Vignette { .. })));

        let extended = GlobalEffect::plan(&mut rng, &profile, ArchetypeSet::Extended, 1.0);
        assert!(!extended.iter().any(|e| matches!(
            e,
            GlobalEffect::Yellowing { .. } | GlobalEffect::Vignette { .. }
        )));
        assert!(extended.iter().any(|e| matches!(e, GlobalEffect::OverlayDesaturation { .. })));
    }

    #[test]
    fn test_extended_grain_spares_page_colour() {
        let mut rng = StdRng::seed_from_u64(71);
        let white = page(40, 30, [255, 255, 255, 255]);
        let mut compositor = Compositor::new(white.clone(), 1.0, ArchetypeSet::Extended);
        compositor.apply(&mut rng, &GlobalEffect::PaperGrain { strength: 0.7 });
        compositor.apply(&mut rng, &GlobalEffect::OverlayDesaturation { amount: 0.5 });

        assert_eq!(compositor.finish(), white);
    }

    #[test]
    fn test_basic_yellowing_tints_page() {
        let mut rng = StdRng::seed_from_u64(72);
        let gray = page(10, 10, [200, 200, 200, 255]);
        let mut compositor = Compositor::new(gray, 1.0, ArchetypeSet::Basic);
        compositor.apply(&mut rng, &GlobalEffect::Yellowing { amount: 0.5 });

        let pixel = *compositor.finish().get_pixel(5, 5);
        assert!((229..=230).contains(&pixel[0]), "{pixel:?}");
        assert!((214..=215).contains(&pixel[1]), "{pixel:?}");
        assert!((179..=180).contains(&pixel[2]), "{pixel:?}");
        assert_eq!(pixel[3], 255);
    }

    #[test]
    fn test_overlapping_marks_blend_not_accumulate() {
        let white = page(4, 4, [255, 255, 255, 255]);
        let mut compositor = Compositor::new(white, 1.0, ArchetypeSet::Extended);
        let mut mask = mask::Mask::new(4, 4);
        for p in mask.pixels_mut() {
            p[0] = 128;
        }

        for _ in 0..2 {
            compositor.layer(&mask, Rgb([0, 0, 0]), 1.0);
        }
        let result = compositor.finish();
        let value = result.get_pixel(1, 1)[0];
        // two half-opaque black layers leave roughly a quarter of the white
        assert!((60..=68).contains(&value), "{value}");
    }

    #[test]
    fn test_corner_effect_darkens_corner_only() {
        let mut rng = StdRng::seed_from_u64(73);
        let white = page(120, 120, [255, 255, 255, 255]);
        let mut compositor = Compositor::new(white, 1.0, ArchetypeSet::Extended);
        compositor.apply(
            &mut rng,
            &GlobalEffect::CornerDarkening {
                corner: Corner::TopLeft,
                color: Rgb([60, 50, 40]),
                intensity: 0.9,
            },
        );

        let result = compositor.finish();
        assert!(result.get_pixel(0, 0)[0] < 255);
        assert_eq!(result.get_pixel(119, 119), &Rgba([255, 255, 255, 255]));
    }
}
