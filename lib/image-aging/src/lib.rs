//! Procedural document aging: stains, folds, cracks and grime composited onto
//! a page, plus a byte-budgeted encoder for the result.

pub mod archetype;
pub mod background;
pub mod compositor;
pub mod config;
pub mod encoder;
pub mod mark;
pub mod mask;
pub mod pipeline;
pub mod placement;
pub mod severity;

mod util;

pub use archetype::{ArchetypeSet, MarkArchetype};
pub use background::ancient_paper;
pub use compositor::{Compositor, GlobalEffect};
pub use config::AgingConfig;
pub use encoder::{EncodeSpec, EncodedImage, OutputFormat, encode};
pub use mark::MarkDescriptor;
pub use mask::Mask;
pub use pipeline::{age, age_all, age_encoded_all, age_with_rng, decode};
pub use severity::{AgingLevel, EffectCategory, EffectRule, SeverityProfile};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Encode error: {0}")]
    Encode(String),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image resize error: {0}")]
    Resize(#[from] fast_image_resize::ResizeError),

    #[error("Image buffer error: {0}")]
    ResizeBuffer(#[from] fast_image_resize::ImageBufferError),

    #[error("Weighted selection error: {0}")]
    Weighted(#[from] rand::distr::weighted::Error),
}
