//! Severity tiers and the per-effect lookup tables they drive.
//!
//! Every conditional effect is reached through [`SeverityProfile::rule`], an
//! exhaustive match over [`EffectCategory`]; adding an effect means adding a
//! field here, which every tier's constructor must then fill in.

use num_enum::{FromPrimitive, IntoPrimitive};
use std::{fmt, str::FromStr};

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, FromPrimitive, IntoPrimitive,
)]
#[repr(u8)]
pub enum AgingLevel {
    Light = 0,
    #[default]
    Medium = 1,
    Heavy = 2,
    Extreme = 3,
}

impl AgingLevel {
    pub fn all() -> [Self; 4] {
        [Self::Light, Self::Medium, Self::Heavy, Self::Extreme]
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Heavy => "heavy",
            Self::Extreme => "extreme",
        }
    }

    /// Unknown names fall back to [`AgingLevel::Medium`].
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "light" => Self::Light,
            "heavy" => Self::Heavy,
            "extreme" => Self::Extreme,
            _ => Self::Medium,
        }
    }

    pub fn profile(&self) -> SeverityProfile {
        match self {
            Self::Light => SeverityProfile {
                corner: EffectRule::disabled(),
                vignette: EffectRule::disabled(),
                vignette_strength: 0.0,
                overlay_desaturation: EffectRule::always(0.1),
                fold: EffectRule::disabled(),
                crack: EffectRule::disabled(),
                moisture_tide: EffectRule::disabled(),
                torn_edge: EffectRule::disabled(),
                edge_darkening: EffectRule::chance(0.1, 0.5),
                paper_grain: EffectRule::disabled(),
                yellowing: EffectRule::disabled(),
            },
            Self::Medium => SeverityProfile {
                corner: EffectRule::chance(0.4, 0.6),
                vignette: EffectRule::always(0.5),
                vignette_strength: 0.3,
                overlay_desaturation: EffectRule::always(0.2),
                fold: EffectRule::disabled(),
                crack: EffectRule::disabled(),
                moisture_tide: EffectRule::chance(0.15, 0.6),
                torn_edge: EffectRule::chance(0.1, 0.5),
                edge_darkening: EffectRule::chance(0.25, 0.6),
                paper_grain: EffectRule::always(0.2),
                yellowing: EffectRule::always(0.3),
            },
            Self::Heavy => SeverityProfile {
                corner: EffectRule::chance(0.6, 0.6),
                vignette: EffectRule::always(0.5),
                vignette_strength: 0.6,
                overlay_desaturation: EffectRule::always(0.35),
                fold: EffectRule::chance(0.4, 0.7),
                crack: EffectRule::counted(0, 2, 0.8),
                moisture_tide: EffectRule::chance(0.35, 0.8),
                torn_edge: EffectRule::chance(0.3, 0.7),
                edge_darkening: EffectRule::chance(0.45, 0.7),
                paper_grain: EffectRule::always(0.4),
                yellowing: EffectRule::always(0.6),
            },
            Self::Extreme => SeverityProfile {
                corner: EffectRule::chance(0.9, 0.9),
                vignette: EffectRule::always(0.8),
                vignette_strength: 0.9,
                overlay_desaturation: EffectRule::always(0.5),
                fold: EffectRule::chance(0.7, 1.0).with_count(1, 3),
                crack: EffectRule::counted(2, 4, 1.1),
                moisture_tide: EffectRule::chance(0.6, 1.0),
                torn_edge: EffectRule::chance(0.6, 0.9),
                edge_darkening: EffectRule::chance(0.7, 0.9),
                paper_grain: EffectRule::always(0.7),
                yellowing: EffectRule::always(0.9),
            },
        }
    }
}

impl fmt::Display for AgingLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

impl FromStr for AgingLevel {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// How often an effect fires, how many instances, and how strongly.
///
/// Each of `min_count..=max_count` instances is kept with `probability`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectRule {
    pub probability: f64,
    pub min_count: u32,
    pub max_count: u32,
    pub intensity: f32,
}

impl EffectRule {
    pub const fn disabled() -> Self {
        Self {
            probability: 0.0,
            min_count: 0,
            max_count: 0,
            intensity: 0.0,
        }
    }

    pub const fn always(intensity: f32) -> Self {
        Self::chance(1.0, intensity)
    }

    pub const fn chance(probability: f64, intensity: f32) -> Self {
        Self {
            probability,
            min_count: 1,
            max_count: 1,
            intensity,
        }
    }

    pub const fn counted(min_count: u32, max_count: u32, intensity: f32) -> Self {
        Self {
            probability: 1.0,
            min_count,
            max_count,
            intensity,
        }
    }

    pub const fn with_count(mut self, min_count: u32, max_count: u32) -> Self {
        self.min_count = min_count;
        self.max_count = max_count;
        self
    }

    pub fn is_enabled(&self) -> bool {
        self.probability > 0.0 && self.max_count > 0 && self.intensity > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectCategory {
    CornerDarkening,
    Vignette,
    OverlayDesaturation,
    FoldLine,
    Crack,
    MoistureTide,
    TornEdge,
    EdgeDarkening,
    PaperGrain,
    Yellowing,
}

impl EffectCategory {
    pub fn all() -> [Self; 10] {
        [
            Self::CornerDarkening,
            Self::Vignette,
            Self::OverlayDesaturation,
            Self::FoldLine,
            Self::Crack,
            Self::MoistureTide,
            Self::TornEdge,
            Self::EdgeDarkening,
            Self::PaperGrain,
            Self::Yellowing,
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeverityProfile {
    /// Rolled once per corner.
    pub corner: EffectRule,
    pub vignette: EffectRule,
    pub vignette_strength: f32,
    /// Intensity is the desaturation blend applied to the overlay.
    pub overlay_desaturation: EffectRule,
    pub fold: EffectRule,
    pub crack: EffectRule,
    pub moisture_tide: EffectRule,
    pub torn_edge: EffectRule,
    pub edge_darkening: EffectRule,
    /// Intensity scales the ±30 grain amplitude.
    pub paper_grain: EffectRule,
    /// Intensity is multiplied by the configured mark intensity.
    pub yellowing: EffectRule,
}

impl SeverityProfile {
    pub fn rule(&self, category: EffectCategory) -> &EffectRule {
        match category {
            EffectCategory::CornerDarkening => &self.corner,
            EffectCategory::Vignette => &self.vignette,
            EffectCategory::OverlayDesaturation => &self.overlay_desaturation,
            EffectCategory::FoldLine => &self.fold,
            EffectCategory::Crack => &self.crack,
            EffectCategory::MoistureTide => &self.moisture_tide,
            EffectCategory::TornEdge => &self.torn_edge,
            EffectCategory::EdgeDarkening => &self.edge_darkening,
            EffectCategory::PaperGrain => &self.paper_grain,
            EffectCategory::Yellowing => &self.yellowing,
        }
    }
}
