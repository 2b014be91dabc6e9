use anyhow::{Context, Result};
use image::DynamicImage;
use image_aging::{AgingConfig, AgingLevel, ArchetypeSet, EncodeSpec, OutputFormat};
use rand::{SeedableRng, rngs::StdRng};
use std::{fs, path::PathBuf, time::Instant};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output_dir = PathBuf::from("./output");
    fs::create_dir_all(&output_dir)?;

    let mut rng = StdRng::seed_from_u64(7);
    let page = DynamicImage::ImageRgb8(image_aging::ancient_paper(&mut rng, 1200, 800));

    for level in AgingLevel::all() {
        for set in [ArchetypeSet::Basic, ArchetypeSet::Extended] {
            let config = AgingConfig::new()
                .with_level(level)
                .with_archetype_set(set)
                .with_mark_count(12)
                .with_seed(42);

            let start = Instant::now();
            let aged = image_aging::age(&page, &config)?;
            log::info!("{level} {} aged in {:?}", set.to_str(), start.elapsed());

            let spec = EncodeSpec::new().with_format(OutputFormat::Jpeg);
            let encoded = image_aging::encode(&aged, &spec)?;
            let output_path = output_dir.join(format!("{level}_{}.jpg", set.to_str()));
            fs::write(&output_path, &encoded.data)
                .with_context(|| output_path.to_string_lossy().to_string())?;
            log::info!(
                "Saving {:?}: {} bytes, {}x{}",
                output_path,
                encoded.data.len(),
                encoded.width,
                encoded.height
            );
        }
    }

    Ok(())
}
