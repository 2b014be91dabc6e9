// cargo test -p image-aging --test encoder_test

use image::{ImageReader, Rgba, RgbaImage};
use image_aging::{
    EncodeSpec, Error, OutputFormat,
    encoder::{self, MIN_SHORT_SIDE},
};
use std::io::Cursor;

fn noisy(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let v = (x.wrapping_mul(7919) ^ y.wrapping_mul(104729)).wrapping_mul(2654435761);
        Rgba([(v >> 8) as u8, (v >> 16) as u8, (v >> 24) as u8, 200 + (v % 56) as u8])
    })
}

fn mean_abs_diff(a: &RgbaImage, b: &RgbaImage) -> f64 {
    let total: u64 = a
        .as_raw()
        .iter()
        .zip(b.as_raw())
        .map(|(x, y)| (*x as i32 - *y as i32).unsigned_abs() as u64)
        .sum();
    total as f64 / a.as_raw().len() as f64
}

#[test]
fn test_generous_budget_never_downscales() -> anyhow::Result<()> {
    let image = noisy(800, 600);
    for format in OutputFormat::all() {
        let spec = EncodeSpec::new()
            .with_format(format)
            .with_byte_budget(10_000_000);
        let encoded = encoder::encode(&image, &spec)?;
        assert!(!encoded.data.is_empty());
        assert_eq!((encoded.width, encoded.height), (800, 600), "{format}");
    }
    Ok(())
}

#[test]
fn test_tiny_budget_stops_at_floor() -> anyhow::Result<()> {
    let image = noisy(3000, 3000);
    let spec = EncodeSpec::new()
        .with_format(OutputFormat::Jpeg)
        .with_byte_budget(2_000);

    let encoded = encoder::encode(&image, &spec)?;
    assert!(!encoded.data.is_empty());
    assert!(!encoded.within_budget);
    assert!(encoded.width.min(encoded.height) >= MIN_SHORT_SIDE);
    assert!(encoded.width < 3000);

    let decoded = image::load_from_memory(&encoded.data)?;
    assert_eq!((decoded.width(), decoded.height()), (encoded.width, encoded.height));
    Ok(())
}

#[test]
fn test_png_round_trip_is_lossless() -> anyhow::Result<()> {
    let image = noisy(320, 240);
    let encoded = encoder::encode(&image, &EncodeSpec::new())?;
    assert!(encoded.within_budget);

    let decoded = image::load_from_memory(&encoded.data)?.to_rgba8();
    assert_eq!(mean_abs_diff(&image, &decoded), 0.0);
    Ok(())
}

#[test]
fn test_jpeg_round_trip_is_lossy() -> anyhow::Result<()> {
    let image = noisy(320, 240);
    let spec = EncodeSpec::new().with_format(OutputFormat::Jpeg);
    let encoded = encoder::encode(&image, &spec)?;

    let decoded = image::load_from_memory(&encoded.data)?.to_rgba8();
    let flattened = image::DynamicImage::ImageRgb8(encoder::flatten(&image)).to_rgba8();
    let diff = mean_abs_diff(&flattened, &decoded);
    assert!(diff > 0.5, "jpeg unexpectedly exact: {diff}");
    Ok(())
}

#[test]
fn test_png_posterizes_before_shrinking() -> anyhow::Result<()> {
    let image = RgbaImage::from_fn(500, 500, |x, y| {
        Rgba([(x / 2) as u8, (y / 2) as u8, ((x + y) / 4) as u8, 255])
    });
    let full = encoder::encode(&image, &EncodeSpec::new().with_byte_budget(usize::MAX))?;

    let spec = EncodeSpec::new().with_byte_budget(full.data.len() - 1);
    let reduced = encoder::encode(&image, &spec)?;
    assert!(reduced.data.len() < full.data.len());
    assert_eq!((reduced.width, reduced.height), (500, 500));
    Ok(())
}

#[test]
fn test_dpi_is_clamped_into_metadata() -> anyhow::Result<()> {
    let image = noisy(16, 16);
    let low = encoder::encode(&image, &EncodeSpec::new().with_dpi(10))?;
    let floor = encoder::encode(&image, &EncodeSpec::new().with_dpi(72))?;
    assert_eq!(low.data, floor.data);

    let high = encoder::encode(&image, &EncodeSpec::new().with_dpi(5000))?;
    let ceiling = encoder::encode(&image, &EncodeSpec::new().with_dpi(600))?;
    assert_eq!(high.data, ceiling.data);
    Ok(())
}

#[test]
fn test_codec_rejection_falls_through_to_shrink() -> anyhow::Result<()> {
    // wider than a JPEG frame allows; one shrink step brings it back in range
    let image = RgbaImage::from_pixel(66_000, 450, Rgba([200, 180, 150, 255]));
    let spec = EncodeSpec::new()
        .with_format(OutputFormat::Jpeg)
        .with_byte_budget(10_000_000);

    let encoded = encoder::encode(&image, &spec)?;
    assert!(!encoded.data.is_empty());
    assert_eq!((encoded.width, encoded.height), (59_400, 405));

    let dimensions = ImageReader::new(Cursor::new(&encoded.data))
        .with_guessed_format()?
        .into_dimensions()?;
    assert_eq!(dimensions, (59_400, 405));
    Ok(())
}

#[test]
fn test_empty_image_reports_encode_error() {
    let empty = RgbaImage::new(0, 0);
    for format in OutputFormat::all() {
        let result = encoder::encode(&empty, &EncodeSpec::new().with_format(format));
        assert!(matches!(result, Err(Error::Encode(_))), "{format}: {result:?}");
    }
}
