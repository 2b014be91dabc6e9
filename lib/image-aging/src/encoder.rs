//! Size-constrained encoding.
//!
//! Each format walks a short ladder of progressively cheaper encodings and
//! stops at the first one under the byte budget. If none fits, the image is
//! shrunk by [`SHRINK_FACTOR`] per step and re-encoded with the format's
//! cheapest pass, until the shorter side would drop below [`MIN_SHORT_SIDE`].
//! The smallest buffer seen is then returned even if it is over budget.

use crate::{Error, Result};
use derivative::Derivative;
use derive_setters::Setters;
use fast_image_resize::{PixelType, ResizeOptions, Resizer, images::Image as FrImage};
use image::{
    ExtendedColorType, ImageEncoder, RgbImage, RgbaImage,
    codecs::{
        bmp::BmpEncoder,
        jpeg::{JpegEncoder, PixelDensity},
        png::{CompressionType, FilterType, PngEncoder},
        tiff::TiffEncoder,
    },
    imageops,
};
use std::{fmt, io::Cursor, str::FromStr};

pub const MIN_DPI: u32 = 72;
pub const MAX_DPI: u32 = 600;
pub const SHRINK_FACTOR: f32 = 0.9;
pub const MIN_SHORT_SIDE: u32 = 400;

const JPEG_FIRST_QUALITY: u8 = 95;
const JPEG_QUALITY_STEPS: [u8; 7] = [90, 80, 70, 60, 50, 40, 30];
const PNG_POSTERIZE_LEVELS: [u8; 3] = [64, 32, 16];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    #[default]
    Png,
    Jpeg,
    Bmp,
    Tiff,
}

impl OutputFormat {
    pub fn all() -> [Self; 4] {
        [Self::Png, Self::Jpeg, Self::Bmp, Self::Tiff]
    }

    pub fn extension(&self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Bmp => "bmp",
            Self::Tiff => "tiff",
        }
    }

    pub fn image_format(&self) -> image::ImageFormat {
        match self {
            Self::Png => image::ImageFormat::Png,
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Bmp => image::ImageFormat::Bmp,
            Self::Tiff => image::ImageFormat::Tiff,
        }
    }

    fn ladder(&self) -> Vec<Pass> {
        match self {
            Self::Png => std::iter::once(Pass::Rgba)
                .chain(PNG_POSTERIZE_LEVELS.into_iter().map(Pass::Posterize))
                .collect(),
            Self::Jpeg => std::iter::once(JPEG_FIRST_QUALITY)
                .chain(JPEG_QUALITY_STEPS)
                .map(Pass::Quality)
                .collect(),
            Self::Bmp => vec![Pass::Rgb, Pass::Gray],
            Self::Tiff => vec![Pass::Rgba, Pass::Rgb, Pass::Gray],
        }
    }

    fn cheapest(&self) -> Pass {
        match self {
            Self::Png => Pass::Posterize(PNG_POSTERIZE_LEVELS[PNG_POSTERIZE_LEVELS.len() - 1]),
            Self::Jpeg => Pass::Quality(JPEG_QUALITY_STEPS[JPEG_QUALITY_STEPS.len() - 1]),
            Self::Bmp | Self::Tiff => Pass::Gray,
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "PNG",
            Self::Jpeg => "JPEG",
            Self::Bmp => "BMP",
            Self::Tiff => "TIFF",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            "bmp" => Ok(Self::Bmp),
            "tif" | "tiff" => Ok(Self::Tiff),
            other => Err(Error::InvalidConfig(format!("unsupported output format `{other}`"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Derivative, Setters)]
#[derivative(Default)]
#[setters(prefix = "with_")]
#[non_exhaustive]
pub struct EncodeSpec {
    pub format: OutputFormat,

    /// Clamped into 72..=600 when written.
    #[derivative(Default(value = "300"))]
    pub dpi: u32,

    #[derivative(Default(value = "1_000_000"))]
    pub byte_budget: usize,
}

impl EncodeSpec {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncodedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub within_budget: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Full colour with alpha at default compression.
    Rgba,
    /// RGB channels cut to this many levels, best compression.
    Posterize(u8),
    /// Alpha flattened onto white.
    Rgb,
    /// Flattened, then 8-bit luma.
    Gray,
    /// Flattened JPEG at this quality.
    Quality(u8),
}

/// Encodes `image` under `spec.byte_budget` where possible. A pass the codec
/// rejects is skipped, so this only fails when no pass at any scale produced
/// bytes; a missed budget is reported through [`EncodedImage::within_budget`].
pub fn encode(image: &RgbaImage, spec: &EncodeSpec) -> Result<EncodedImage> {
    let dpi = spec.dpi.clamp(MIN_DPI, MAX_DPI);
    let format = spec.format;
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(Error::Encode(format!("can't encode an empty {width}x{height} image")));
    }

    let mut best: Option<EncodedImage> = None;
    let mut last_error = None;

    for pass in format.ladder() {
        let attempt = match encode_pass(image, format, pass, dpi, spec.byte_budget) {
            Ok(attempt) => attempt,
            Err(e) => {
                log::warn!("{format} {pass:?} rejected: {e}");
                last_error = Some(e);
                continue;
            }
        };

        log::debug!("{format} {pass:?}: {} bytes", attempt.data.len());
        if attempt.within_budget {
            log::info!("encoded {format} in {} bytes", attempt.data.len());
            return Ok(attempt);
        }
        keep_smaller(&mut best, attempt);
    }

    let mut scale = 1.0;
    loop {
        scale *= SHRINK_FACTOR;
        let target = (
            (width as f32 * scale).round() as u32,
            (height as f32 * scale).round() as u32,
        );
        if target.0.min(target.1) < MIN_SHORT_SIDE {
            break;
        }

        let attempt = resize(image, target).and_then(|shrunk| {
            encode_pass(&shrunk, format, format.cheapest(), dpi, spec.byte_budget)
        });
        let attempt = match attempt {
            Ok(attempt) => attempt,
            Err(e) => {
                log::warn!("{format} at {}x{} rejected: {e}", target.0, target.1);
                last_error = Some(e);
                continue;
            }
        };

        log::debug!("{format} shrunk to {target:?}: {} bytes", attempt.data.len());
        if attempt.within_budget {
            log::info!(
                "encoded {format} at {}x{} in {} bytes",
                target.0,
                target.1,
                attempt.data.len()
            );
            return Ok(attempt);
        }
        keep_smaller(&mut best, attempt);
    }

    let Some(best) = best else {
        let reason = last_error.map(|e| e.to_string()).unwrap_or_default();
        return Err(Error::Encode(format!(
            "no {format} encoding of {width}x{height} produced: {reason}"
        )));
    };

    log::warn!(
        "{format} best effort {} bytes at {}x{} exceeds budget {}",
        best.data.len(),
        best.width,
        best.height,
        spec.byte_budget
    );
    Ok(best)
}

fn keep_smaller(best: &mut Option<EncodedImage>, attempt: EncodedImage) {
    if best
        .as_ref()
        .is_none_or(|current| attempt.data.len() < current.data.len())
    {
        *best = Some(attempt);
    }
}

fn encode_pass(
    image: &RgbaImage,
    format: OutputFormat,
    pass: Pass,
    dpi: u32,
    budget: usize,
) -> Result<EncodedImage> {
    let (width, height) = image.dimensions();
    let data = match (format, pass) {
        (OutputFormat::Png, Pass::Posterize(levels)) => {
            let mut quantized = image.clone();
            posterize(&mut quantized, levels);
            write_png(&quantized, CompressionType::Best, dpi)?
        }
        (OutputFormat::Png, _) => write_png(image, CompressionType::Default, dpi)?,
        (OutputFormat::Jpeg, pass) => {
            let quality = match pass {
                Pass::Quality(quality) => quality,
                _ => JPEG_FIRST_QUALITY,
            };
            write_jpeg(&flatten(image), quality, dpi)?
        }
        (OutputFormat::Bmp, Pass::Gray) => {
            let gray = imageops::grayscale(&flatten(image));
            write_bmp(gray.as_raw(), width, height, ExtendedColorType::L8, dpi)?
        }
        (OutputFormat::Bmp, _) => {
            let rgb = flatten(image);
            write_bmp(rgb.as_raw(), width, height, ExtendedColorType::Rgb8, dpi)?
        }
        (OutputFormat::Tiff, Pass::Rgba) => {
            write_tiff(image.as_raw(), width, height, ExtendedColorType::Rgba8)?
        }
        (OutputFormat::Tiff, Pass::Gray) => {
            let gray = imageops::grayscale(&flatten(image));
            write_tiff(gray.as_raw(), width, height, ExtendedColorType::L8)?
        }
        (OutputFormat::Tiff, _) => {
            let rgb = flatten(image);
            write_tiff(rgb.as_raw(), width, height, ExtendedColorType::Rgb8)?
        }
    };

    Ok(EncodedImage {
        within_budget: data.len() <= budget,
        data,
        width,
        height,
        format,
    })
}

/// Composites onto white and drops the alpha channel.
pub fn flatten(image: &RgbaImage) -> RgbImage {
    RgbImage::from_fn(image.width(), image.height(), |x, y| {
        let [r, g, b, a] = image.get_pixel(x, y).0;
        let alpha = a as f32 / 255.0;
        let over_white = |c: u8| (c as f32 * alpha + 255.0 * (1.0 - alpha)).round() as u8;
        image::Rgb([over_white(r), over_white(g), over_white(b)])
    })
}

/// Cuts each colour channel down to `levels` evenly spaced values.
fn posterize(image: &mut RgbaImage, levels: u8) {
    let step = 255.0 / (levels.max(2) as f32 - 1.0);
    for pixel in image.pixels_mut() {
        for channel in pixel.0.iter_mut().take(3) {
            let bucket = (*channel as f32 / step).round();
            *channel = (bucket * step).round().clamp(0.0, 255.0) as u8;
        }
    }
}

fn resize(image: &RgbaImage, (width, height): (u32, u32)) -> Result<RgbaImage> {
    let src_image = FrImage::from_vec_u8(
        image.width(),
        image.height(),
        image.as_raw().clone(),
        PixelType::U8x4,
    )?;
    let mut dst_image = FrImage::new(width, height, PixelType::U8x4);
    Resizer::new().resize(&src_image, &mut dst_image, &ResizeOptions::new())?;

    RgbaImage::from_raw(width, height, dst_image.into_vec())
        .ok_or_else(|| Error::Encode(format!("resized buffer does not fit {width}x{height}")))
}

fn pixels_per_metre(dpi: u32) -> u32 {
    (dpi as f64 / 0.0254).round() as u32
}

fn write_png(image: &RgbaImage, compression: CompressionType, dpi: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    PngEncoder::new_with_quality(&mut buffer, compression, FilterType::Adaptive).write_image(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgba8,
    )?;

    Ok(insert_png_phys(buffer, dpi))
}

/// Splices a `pHYs` chunk directly after IHDR (signature 8 + IHDR 25 bytes).
fn insert_png_phys(png: Vec<u8>, dpi: u32) -> Vec<u8> {
    const IHDR_END: usize = 33;
    if png.len() < IHDR_END {
        return png;
    }

    let ppm = pixels_per_metre(dpi).to_be_bytes();
    let mut body = Vec::with_capacity(13);
    body.extend_from_slice(b"pHYs");
    body.extend_from_slice(&ppm);
    body.extend_from_slice(&ppm);
    body.push(1);

    let mut crc = flate2::Crc::new();
    crc.update(&body);

    let mut out = Vec::with_capacity(png.len() + 21);
    out.extend_from_slice(&png[..IHDR_END]);
    out.extend_from_slice(&9u32.to_be_bytes());
    out.extend_from_slice(&body);
    out.extend_from_slice(&crc.sum().to_be_bytes());
    out.extend_from_slice(&png[IHDR_END..]);
    out
}

fn write_jpeg(image: &RgbImage, quality: u8, dpi: u32) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    let mut encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder.set_pixel_density(PixelDensity::dpi(dpi as u16));
    encoder.encode(
        image.as_raw(),
        image.width(),
        image.height(),
        ExtendedColorType::Rgb8,
    )?;
    Ok(buffer)
}

fn write_bmp(
    raw: &[u8],
    width: u32,
    height: u32,
    color: ExtendedColorType,
    dpi: u32,
) -> Result<Vec<u8>> {
    let mut buffer = vec![];
    BmpEncoder::new(&mut buffer).encode(raw, width, height, color)?;

    // BITMAPINFOHEADER biXPelsPerMeter / biYPelsPerMeter
    if buffer.len() >= 46 {
        let ppm = (pixels_per_metre(dpi) as i32).to_le_bytes();
        buffer[38..42].copy_from_slice(&ppm);
        buffer[42..46].copy_from_slice(&ppm);
    }
    Ok(buffer)
}

fn write_tiff(raw: &[u8], width: u32, height: u32, color: ExtendedColorType) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(vec![]);
    TiffEncoder::new(&mut buffer).encode(raw, width, height, color)?;
    Ok(buffer.into_inner())
}
