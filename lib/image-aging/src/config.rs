use crate::{Error, Result, archetype::ArchetypeSet, severity::AgingLevel};
use derivative::Derivative;
use derive_setters::Setters;
use std::ops::RangeInclusive;

pub const MARK_COUNT_RANGE: RangeInclusive<u32> = 1..=20;
pub const INTENSITY_RANGE: RangeInclusive<f32> = 0.2..=1.5;

#[derive(Debug, Clone, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct AgingConfig {
    pub level: AgingLevel,

    #[derivative(Default(value = "8"))]
    pub mark_count: u32,

    #[derivative(Default(value = "0.7"))]
    pub intensity: f32,

    pub archetype_set: ArchetypeSet,

    /// Fixed seed for reproducible output; unseeded runs draw from OS entropy.
    #[setters(strip_option)]
    pub seed: Option<u64>,
}

impl AgingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy with count and intensity pulled into their valid ranges.
    pub fn normalized(&self) -> Self {
        let mut config = self.clone();
        config.mark_count = self
            .mark_count
            .clamp(*MARK_COUNT_RANGE.start(), *MARK_COUNT_RANGE.end());

        config.intensity = if self.intensity.is_nan() {
            *INTENSITY_RANGE.start()
        } else {
            self.intensity
                .clamp(*INTENSITY_RANGE.start(), *INTENSITY_RANGE.end())
        };

        if config.mark_count != self.mark_count || config.intensity != self.intensity {
            log::warn!(
                "clamped aging config: marks {} -> {}, intensity {} -> {}",
                self.mark_count,
                config.mark_count,
                self.intensity,
                config.intensity
            );
        }

        config
    }

    /// Strict check for callers that would rather reject than clamp.
    pub fn validate(&self) -> Result<()> {
        if !MARK_COUNT_RANGE.contains(&self.mark_count) {
            return Err(Error::InvalidConfig(format!(
                "mark count {} outside {}..={}",
                self.mark_count,
                MARK_COUNT_RANGE.start(),
                MARK_COUNT_RANGE.end()
            )));
        }

        if !INTENSITY_RANGE.contains(&self.intensity) {
            return Err(Error::InvalidConfig(format!(
                "intensity {} outside {}..={}",
                self.intensity,
                INTENSITY_RANGE.start(),
                INTENSITY_RANGE.end()
            )));
        }

        Ok(())
    }
}
