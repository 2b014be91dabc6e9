//! Mark archetypes and the weighted tables that choose between them.

use crate::{
    Error, Result,
    mask::{self, Mask},
    util::{pick, randint, uniform},
};
use image::Rgb;
use rand::{
    Rng,
    distr::{Distribution, weighted::WeightedIndex},
};
use std::str::FromStr;

pub type Color = Rgb<u8>;

/// Shared ink, paper, mould and soot tones.
pub const AGING_PALETTE: [Color; 17] = [
    Rgb([101, 67, 33]),
    Rgb([92, 64, 51]),
    Rgb([80, 60, 40]),
    Rgb([70, 50, 30]),
    Rgb([180, 150, 90]),
    Rgb([165, 135, 85]),
    Rgb([150, 130, 70]),
    Rgb([120, 115, 100]),
    Rgb([100, 95, 85]),
    Rgb([90, 85, 75]),
    Rgb([130, 80, 50]),
    Rgb([110, 70, 40]),
    Rgb([140, 90, 60]),
    Rgb([100, 110, 90]),
    Rgb([85, 95, 80]),
    Rgb([60, 55, 50]),
    Rgb([75, 70, 65]),
];

const WATER_TONES: [Color; 4] = [
    Rgb([180, 150, 90]),
    Rgb([165, 135, 85]),
    Rgb([150, 130, 70]),
    Rgb([140, 120, 80]),
];
const FINGER_TONES: [Color; 3] = [Rgb([80, 60, 40]), Rgb([70, 50, 30]), Rgb([90, 70, 50])];
const STREAK_TONES: [Color; 4] = [
    Rgb([92, 64, 51]),
    Rgb([80, 60, 40]),
    Rgb([100, 95, 85]),
    Rgb([110, 70, 40]),
];
const INK_TONES: [Color; 4] = [
    Rgb([35, 30, 45]),
    Rgb([45, 35, 30]),
    Rgb([30, 35, 50]),
    Rgb([55, 40, 30]),
];
const COFFEE_TONES: [Color; 3] = [Rgb([120, 80, 45]), Rgb([105, 70, 40]), Rgb([135, 95, 55])];
const SOOT_TONES: [Color; 3] = [Rgb([50, 45, 40]), Rgb([60, 55, 50]), Rgb([40, 38, 36])];
const GRIME_TONES: [Color; 4] = [
    Rgb([110, 100, 80]),
    Rgb([100, 95, 85]),
    Rgb([100, 110, 90]),
    Rgb([85, 95, 80]),
];
const RING_TONES: [Color; 3] = [Rgb([150, 120, 75]), Rgb([140, 110, 65]), Rgb([160, 130, 85])];
const FOXING_TONES: [Color; 4] = [
    Rgb([140, 90, 60]),
    Rgb([130, 80, 50]),
    Rgb([150, 100, 65]),
    Rgb([120, 75, 45]),
];
const FADING_TONES: [Color; 3] = [Rgb([200, 185, 150]), Rgb([190, 175, 140]), Rgb([185, 165, 125])];
const RUST_TONES: [Color; 3] = [Rgb([140, 70, 35]), Rgb([125, 60, 30]), Rgb([155, 85, 45])];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkArchetype {
    Blob,
    WaterStain,
    Fingerprint,
    Dust,
    Streak,
    BleedingInk,
    CoffeeRing,
    Soot,
    InkBlotch,
    AtmosphericGrime,
    AgeRings,
    InkHalo,
    FoxingSpots,
    UnevenFading,
    RustStains,
    TextSmudge,
}

impl MarkArchetype {
    pub fn all() -> [Self; 16] {
        [
            Self::Blob,
            Self::WaterStain,
            Self::Fingerprint,
            Self::Dust,
            Self::Streak,
            Self::BleedingInk,
            Self::CoffeeRing,
            Self::Soot,
            Self::InkBlotch,
            Self::AtmosphericGrime,
            Self::AgeRings,
            Self::InkHalo,
            Self::FoxingSpots,
            Self::UnevenFading,
            Self::RustStains,
            Self::TextSmudge,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::WaterStain => "water_stain",
            Self::Fingerprint => "fingerprint",
            Self::Dust => "dust",
            Self::Streak => "streak",
            Self::BleedingInk => "bleeding_ink",
            Self::CoffeeRing => "coffee_ring",
            Self::Soot => "soot",
            Self::InkBlotch => "ink_blotch",
            Self::AtmosphericGrime => "atmospheric_grime",
            Self::AgeRings => "age_rings",
            Self::InkHalo => "ink_halo",
            Self::FoxingSpots => "foxing_spots",
            Self::UnevenFading => "uneven_fading",
            Self::RustStains => "rust_stains",
            Self::TextSmudge => "text_smudge",
        }
    }

    /// Nominal size as a fraction of the shorter page side.
    pub fn size_range(&self) -> (f32, f32) {
        match self {
            Self::Blob => (0.06, 0.18),
            Self::WaterStain => (0.15, 0.35),
            Self::Fingerprint => (0.05, 0.12),
            Self::Dust => (0.08, 0.15),
            Self::Streak => (0.08, 0.20),
            Self::BleedingInk => (0.05, 0.12),
            Self::CoffeeRing => (0.10, 0.22),
            Self::Soot => (0.12, 0.30),
            Self::InkBlotch => (0.04, 0.10),
            Self::AtmosphericGrime => (0.20, 0.40),
            Self::AgeRings => (0.12, 0.28),
            Self::InkHalo => (0.05, 0.12),
            Self::FoxingSpots => (0.10, 0.25),
            Self::UnevenFading => (0.25, 0.45),
            Self::RustStains => (1.0, 1.0),
            Self::TextSmudge => (0.10, 0.25),
        }
    }

    pub fn palette(&self) -> &'static [Color] {
        match self {
            Self::Blob | Self::Dust => &AGING_PALETTE,
            Self::WaterStain => &WATER_TONES,
            Self::Fingerprint => &FINGER_TONES,
            Self::Streak => &STREAK_TONES,
            Self::BleedingInk | Self::InkBlotch | Self::InkHalo | Self::TextSmudge => &INK_TONES,
            Self::CoffeeRing => &COFFEE_TONES,
            Self::Soot => &SOOT_TONES,
            Self::AtmosphericGrime => &GRIME_TONES,
            Self::AgeRings => &RING_TONES,
            Self::FoxingSpots => &FOXING_TONES,
            Self::UnevenFading => &FADING_TONES,
            Self::RustStains => &RUST_TONES,
        }
    }

    pub fn intensity_range(&self) -> (f32, f32) {
        match self {
            Self::Blob => (0.7, 1.3),
            Self::WaterStain => (0.3, 0.6),
            Self::Fingerprint => (0.5, 0.9),
            Self::Dust => (0.4, 0.8),
            Self::Streak => (0.5, 1.0),
            Self::BleedingInk => (0.6, 1.1),
            Self::CoffeeRing => (0.5, 0.9),
            Self::Soot => (0.4, 0.8),
            Self::InkBlotch => (0.8, 1.3),
            Self::AtmosphericGrime => (0.3, 0.6),
            Self::AgeRings => (0.4, 0.7),
            Self::InkHalo => (0.5, 0.9),
            Self::FoxingSpots => (0.6, 1.0),
            Self::UnevenFading => (0.3, 0.6),
            Self::RustStains => (0.5, 0.9),
            Self::TextSmudge => (0.5, 0.9),
        }
    }

    /// Full-canvas archetypes cover the page and skip placement.
    pub fn is_full_canvas(&self) -> bool {
        matches!(self, Self::RustStains)
    }

    /// Dimensions of the mask produced for a nominal `size`.
    pub fn canvas_dims(&self, size: u32, page: (u32, u32)) -> (u32, u32) {
        let square = |multiplier| {
            let side = mask::canvas_side(size, multiplier);
            (side, side)
        };

        match self {
            Self::Blob => square(mask::BLOB_CANVAS),
            Self::WaterStain => square(mask::WATER_STAIN_CANVAS),
            Self::Fingerprint => square(mask::FINGERPRINT_CANVAS),
            Self::Dust => square(mask::DUST_CANVAS),
            Self::Streak => square(mask::STREAK_CANVAS),
            Self::BleedingInk => square(mask::BLEEDING_INK_CANVAS),
            Self::CoffeeRing => square(mask::COFFEE_RING_CANVAS),
            Self::Soot => square(mask::SOOT_CANVAS),
            Self::InkBlotch => square(mask::INK_BLOTCH_CANVAS),
            Self::AtmosphericGrime => square(mask::GRIME_CANVAS),
            Self::AgeRings => square(mask::AGE_RINGS_CANVAS),
            Self::InkHalo => square(mask::INK_HALO_CANVAS),
            Self::FoxingSpots => square(mask::FOXING_CANVAS),
            Self::UnevenFading => square(mask::FADING_CANVAS),
            Self::RustStains => (page.0.max(1), page.1.max(1)),
            Self::TextSmudge => mask::text_smudge_dims(size),
        }
    }

    /// Draws a nominal size from the archetype's fraction of `min_dim`.
    pub fn draw_size<R: Rng + ?Sized>(&self, rng: &mut R, min_dim: u32) -> u32 {
        let (lo, hi) = self.size_range();
        let min_dim = min_dim as f32;
        randint(rng, (min_dim * lo) as i32, (min_dim * hi) as i32).max(1) as u32
    }

    pub fn draw_color<R: Rng + ?Sized>(&self, rng: &mut R) -> Color {
        *pick(rng, self.palette())
    }

    pub fn draw_intensity<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        let (lo, hi) = self.intensity_range();
        uniform(rng, lo, hi)
    }

    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R, size: u32, page: (u32, u32)) -> Mask {
        match self {
            Self::Blob => {
                let irregularity = uniform(rng, 0.3, 0.6);
                mask::organic_blob(rng, size, irregularity)
            }
            Self::WaterStain => mask::water_stain(rng, size),
            Self::Fingerprint => mask::fingerprint(rng, size),
            Self::Dust => mask::dust_speckles(rng, size),
            Self::Streak => mask::streak(rng, size),
            Self::BleedingInk => mask::bleeding_ink(rng, size),
            Self::CoffeeRing => mask::coffee_ring(rng, size),
            Self::Soot => mask::soot(rng, size),
            Self::InkBlotch => mask::ink_blotch(rng, size),
            Self::AtmosphericGrime => mask::atmospheric_grime(rng, size),
            Self::AgeRings => mask::age_rings(rng, size),
            Self::InkHalo => mask::ink_halo(rng, size),
            Self::FoxingSpots => mask::foxing_spots(rng, size),
            Self::UnevenFading => mask::uneven_fading(rng, size),
            Self::RustStains => mask::rust_stains(rng, page.0, page.1),
            Self::TextSmudge => mask::text_smudge(rng, size),
        }
    }
}

/// Which archetypes a run may draw and with what weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ArchetypeSet {
    /// Blob, water stain, fingerprint, dust and streak only.
    Basic,
    #[default]
    Extended,
}

impl ArchetypeSet {
    pub fn weights(&self) -> &'static [(MarkArchetype, f32)] {
        use MarkArchetype::*;

        match self {
            Self::Basic => &[
                (Blob, 0.30),
                (WaterStain, 0.15),
                (Fingerprint, 0.20),
                (Dust, 0.15),
                (Streak, 0.20),
            ],
            Self::Extended => &[
                (Blob, 0.12),
                (WaterStain, 0.08),
                (Fingerprint, 0.07),
                (Dust, 0.08),
                (Streak, 0.07),
                (BleedingInk, 0.06),
                (CoffeeRing, 0.05),
                (Soot, 0.05),
                (InkBlotch, 0.04),
                (AtmosphericGrime, 0.06),
                (AgeRings, 0.04),
                (InkHalo, 0.05),
                (FoxingSpots, 0.08),
                (UnevenFading, 0.04),
                (RustStains, 0.03),
                (TextSmudge, 0.08),
            ],
        }
    }

    pub fn sampler(&self) -> Result<ArchetypeSampler> {
        let table = self.weights();
        let index = WeightedIndex::new(table.iter().map(|(_, weight)| *weight))?;
        Ok(ArchetypeSampler { table, index })
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Extended => "extended",
        }
    }
}

impl FromStr for ArchetypeSet {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "basic" => Ok(Self::Basic),
            "extended" => Ok(Self::Extended),
            other => Err(Error::InvalidConfig(format!("unknown archetype set `{other}`"))),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ArchetypeSampler {
    table: &'static [(MarkArchetype, f32)],
    index: WeightedIndex<f32>,
}

impl ArchetypeSampler {
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> MarkArchetype {
        self.table[self.index.sample(rng)].0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};
    use std::collections::HashMap;

    #[test]
    fn test_weights_sum_to_one() {
        for set in [ArchetypeSet::Basic, ArchetypeSet::Extended] {
            let total: f32 = set.weights().iter().map(|(_, w)| w).sum();
            assert!((total - 1.0).abs() < 1e-4, "{set:?} sums to {total}");
        }
        assert_eq!(ArchetypeSet::Extended.weights().len(), MarkArchetype::all().len());
    }

    #[test]
    fn test_basic_set_only_draws_basic_archetypes() -> anyhow::Result<()> {
        let sampler = ArchetypeSet::Basic.sampler()?;
        let mut rng = StdRng::seed_from_u64(40);
        let mut counts: HashMap<MarkArchetype, u32> = HashMap::new();

        for _ in 0..5000 {
            *counts.entry(sampler.sample(&mut rng)).or_default() += 1;
        }

        assert_eq!(counts.len(), 5);
        let blobs = counts[&MarkArchetype::Blob] as f32 / 5000.0;
        assert!((0.25..0.35).contains(&blobs), "blob share {blobs}");
        Ok(())
    }

    #[test]
    fn test_generated_masks_match_canvas_dims() {
        let mut rng = StdRng::seed_from_u64(41);
        let page = (300, 200);

        for archetype in MarkArchetype::all() {
            let size = archetype.draw_size(&mut rng, 200).min(60);
            let mask = archetype.generate(&mut rng, size, page);
            assert_eq!(
                mask.dimensions(),
                archetype.canvas_dims(size, page),
                "{}",
                archetype.name()
            );
            assert!(mask.pixels().any(|p| p[0] > 0), "{} is blank", archetype.name());
        }
    }

    #[test]
    fn test_draws_stay_in_ranges() {
        let mut rng = StdRng::seed_from_u64(42);
        for archetype in MarkArchetype::all() {
            let (lo, hi) = archetype.intensity_range();
            for _ in 0..20 {
                let intensity = archetype.draw_intensity(&mut rng);
                assert!(intensity >= lo && intensity <= hi);
                assert!(archetype.palette().contains(&archetype.draw_color(&mut rng)));
                assert!(archetype.draw_size(&mut rng, 1000) >= 1);
            }
        }
    }

    #[test]
    fn test_set_names() {
        for set in [ArchetypeSet::Basic, ArchetypeSet::Extended] {
            assert_eq!(set.to_str().parse::<ArchetypeSet>().ok(), Some(set));
        }
        assert_eq!(" Basic ".parse::<ArchetypeSet>().ok(), Some(ArchetypeSet::Basic));
        assert!("deluxe".parse::<ArchetypeSet>().is_err());
    }

    #[test]
    fn test_only_rust_is_full_canvas() {
        let full: Vec<_> = MarkArchetype::all()
            .into_iter()
            .filter(MarkArchetype::is_full_canvas)
            .collect();
        assert_eq!(full, vec![MarkArchetype::RustStains]);
    }
}
