use crate::{
    Error, Result,
    compositor::{Compositor, GlobalEffect},
    config::AgingConfig,
    mark::MarkDescriptor,
};
use image::{DynamicImage, RgbaImage};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

/// Ages a copy of `source`. Seeded configs are reproducible; unseeded ones
/// draw from OS entropy.
pub fn age(source: &DynamicImage, config: &AgingConfig) -> Result<RgbaImage> {
    let mut rng = task_rng(config.seed, 0);
    age_with_rng(source, config, &mut rng)
}

/// Same as [`age`] but draws every random decision from `rng`.
pub fn age_with_rng<R: Rng + ?Sized>(
    source: &DynamicImage,
    config: &AgingConfig,
    rng: &mut R,
) -> Result<RgbaImage> {
    let config = config.normalized();
    let sampler = config.archetype_set.sampler()?;
    let mut compositor = Compositor::new(
        source.to_rgba8(),
        config.intensity,
        config.archetype_set,
    );
    let page = compositor.dimensions();

    log::debug!(
        "aging {}x{} page: level={} marks={} intensity={} set={}",
        page.0,
        page.1,
        config.level,
        config.mark_count,
        config.intensity,
        config.archetype_set.to_str()
    );

    for _ in 0..config.mark_count {
        let mark = MarkDescriptor::draw(rng, &sampler, page);
        compositor.add_mark(&mark);
    }

    let profile = config.level.profile();
    let plan = GlobalEffect::plan(rng, &profile, config.archetype_set, config.intensity);
    for effect in &plan {
        compositor.apply(rng, effect);
    }

    Ok(compositor.finish())
}

/// Ages every named image on the rayon pool; results keep input order.
pub fn age_all(
    items: &[(String, DynamicImage)],
    config: &AgingConfig,
) -> Result<Vec<(String, RgbaImage)>> {
    items
        .par_iter()
        .enumerate()
        .map(|(index, (name, image))| {
            let mut rng = task_rng(config.seed, index);
            let aged = age_with_rng(image, config, &mut rng)?;
            Ok((name.clone(), aged))
        })
        .collect()
}

/// Decodes and ages every `(name, bytes)` item independently; an undecodable
/// item yields [`Error::Decode`] in its own slot.
pub fn age_encoded_all(
    items: &[(String, Vec<u8>)],
    config: &AgingConfig,
) -> Vec<(String, Result<RgbaImage>)> {
    items
        .par_iter()
        .enumerate()
        .map(|(index, (name, bytes))| {
            let result = decode(bytes).and_then(|image| {
                let mut rng = task_rng(config.seed, index);
                age_with_rng(&image, config, &mut rng)
            });

            if let Err(e) = &result {
                log::warn!("skipping {name}: {e}");
            }

            (name.clone(), result)
        })
        .collect()
}

/// Decodes an encoded source; any codec failure becomes [`Error::Decode`].
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::Decode(e.to_string()))
}

fn task_rng(seed: Option<u64>, index: usize) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(index as u64)),
        None => StdRng::from_os_rng(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{archetype::ArchetypeSet, severity::AgingLevel};
    use image::Rgba;

    fn white(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(width, height, Rgba([255, 255, 255, 255])))
    }

    #[test]
    fn test_age_keeps_dimensions_and_source() -> anyhow::Result<()> {
        let source = DynamicImage::ImageRgb8(image::RgbImage::new(160, 90));
        let before = source.clone();
        let config = AgingConfig::new().with_seed(1).with_level(AgingLevel::Extreme);

        let aged = age(&source, &config)?;
        assert_eq!(aged.dimensions(), (160, 90));
        assert_eq!(source, before);
        Ok(())
    }

    #[test]
    fn test_seeded_runs_repeat() -> anyhow::Result<()> {
        let source = white(120, 120);
        for set in [ArchetypeSet::Basic, ArchetypeSet::Extended] {
            let config = AgingConfig::new()
                .with_seed(99)
                .with_level(AgingLevel::Heavy)
                .with_archetype_set(set);
            assert_eq!(age(&source, &config)?, age(&source, &config)?);
        }
        Ok(())
    }

    #[test]
    fn test_out_of_range_config_is_clamped() -> anyhow::Result<()> {
        let source = white(80, 60);
        let config = AgingConfig::new().with_seed(5).with_mark_count(0).with_intensity(9.0);
        let aged = age(&source, &config)?;
        assert_eq!(aged.dimensions(), (80, 60));
        Ok(())
    }

    #[test]
    fn test_batch_isolates_bad_items() {
        let mut png = vec![];
        white(40, 40)
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let items = vec![
            ("good.png".to_string(), png.clone()),
            ("bad.png".to_string(), b"not an image".to_vec()),
            ("also-good.png".to_string(), png),
        ];
        let config = AgingConfig::new().with_seed(3).with_mark_count(2);
        let results = age_encoded_all(&items, &config);

        let names: Vec<_> = results.iter().map(|(name, _)| name.as_str()).collect();
        assert_eq!(names, ["good.png", "bad.png", "also-good.png"]);
        assert!(results[0].1.is_ok());
        assert!(matches!(results[1].1, Err(Error::Decode(_))));
        assert!(results[2].1.is_ok());
    }

    #[test]
    fn test_decode_maps_codec_errors() -> anyhow::Result<()> {
        let mut png = vec![];
        white(12, 8).write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)?;
        let decoded = decode(&png)?;
        assert_eq!((decoded.width(), decoded.height()), (12, 8));

        assert!(matches!(decode(&png[..20]), Err(Error::Decode(_))));
        assert!(matches!(decode(b""), Err(Error::Decode(_))));
        Ok(())
    }
}
