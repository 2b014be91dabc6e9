use crate::{cli::AgingOptions, config::Config};
use anyhow::{Context, Result, bail};
use cutil::archive::{aged_file_name, pack_entries};
use image::DynamicImage;
use image_aging::{AgingConfig, EncodeSpec, EncodedImage};
use log::{error, info, warn};
use rand::{SeedableRng, rngs::StdRng};
use std::{
    collections::HashSet,
    fs,
    path::{Path, PathBuf},
    time::Instant,
};

/// Sample page sizes and aging strengths for `samples`.
const SAMPLE_PAGES: [(&str, u32, u32, u32, f32); 4] = [
    ("moderate_aging", 1400, 600, 12, 0.7),
    ("heavy_aging", 1400, 600, 18, 0.9),
    ("balanced", 1200, 500, 15, 0.8),
    ("extreme_aging", 1600, 700, 20, 1.0),
];

fn effective(config: &Config, options: &AgingOptions) -> Result<(AgingConfig, EncodeSpec)> {
    let mut config = config.clone();
    options.apply(&mut config);

    let mut aging = config.aging_config()?;
    aging.seed = options.seed;
    Ok((aging, config.encode_spec()?))
}

pub fn age(
    config: &Config,
    inputs: &[PathBuf],
    output: Option<&Path>,
    archive: Option<&Path>,
    options: &AgingOptions,
) -> Result<()> {
    let (aging, spec) = effective(config, options)?;
    let start = Instant::now();

    let mut failed = 0;
    let mut items = Vec::with_capacity(inputs.len());
    for input in inputs {
        match fs::read(input) {
            Ok(bytes) => items.push((input.to_string_lossy().to_string(), bytes)),
            Err(e) => {
                error!("Can't read {}: {e}", input.display());
                failed += 1;
            }
        }
    }

    let mut entries = vec![];
    let mut names = HashSet::new();
    for (name, aged) in image_aging::age_encoded_all(&items, &aging) {
        let encoded = match aged.and_then(|aged| image_aging::encode(&aged, &spec)) {
            Ok(encoded) => encoded,
            Err(e) => {
                error!("{name}: {e}");
                failed += 1;
                continue;
            }
        };

        report(&name, &encoded, spec.byte_budget);
        let file_name = unique_name(&mut names, &name, spec.format.extension());
        entries.push((file_name, encoded.data));
    }

    match archive {
        Some(archive) => {
            pack_entries(archive, &entries)?;
            info!("packed {} images into {}", entries.len(), archive.display());
        }
        None => {
            let output = output.unwrap_or(Path::new(&config.output.dir));
            fs::create_dir_all(output)
                .with_context(|| format!("Can't create {}", output.display()))?;

            for (file_name, data) in &entries {
                let path = output.join(file_name);
                fs::write(&path, data).with_context(|| path.display().to_string())?;
                info!("saved {}", path.display());
            }
        }
    }

    info!("aged {} of {} images in {:?}", entries.len(), inputs.len(), start.elapsed());
    if failed > 0 {
        bail!("{failed} of {} images failed", inputs.len());
    }

    Ok(())
}

pub fn samples(
    config: &Config,
    output: Option<&Path>,
    count: usize,
    options: &AgingOptions,
) -> Result<()> {
    let (aging, spec) = effective(config, options)?;
    let output = output.unwrap_or(Path::new(&config.output.dir));
    fs::create_dir_all(output).with_context(|| format!("Can't create {}", output.display()))?;

    let mut rng = match aging.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    for (index, (name, width, height, marks, intensity)) in
        SAMPLE_PAGES.iter().cycle().take(count).enumerate()
    {
        let paper = image_aging::ancient_paper(&mut rng, *width, *height);
        let mut page_config = aging.clone();
        if options.marks.is_none() {
            page_config.mark_count = *marks;
        }
        if options.intensity.is_none() {
            page_config.intensity = *intensity;
        }

        let aged = image_aging::age_with_rng(
            &DynamicImage::ImageRgb8(paper),
            &page_config,
            &mut rng,
        )?;
        let encoded = image_aging::encode(&aged, &spec)?;

        let stem = if index < SAMPLE_PAGES.len() {
            name.to_string()
        } else {
            format!("{name}_{}", index / SAMPLE_PAGES.len() + 1)
        };
        let path = output.join(format!("{stem}.{}", spec.format.extension()));
        fs::write(&path, &encoded.data).with_context(|| path.display().to_string())?;
        report(&path.to_string_lossy(), &encoded, spec.byte_budget);
    }

    Ok(())
}

pub fn print_config(config: &Config, options: &AgingOptions) -> Result<()> {
    let mut config = config.clone();
    options.apply(&mut config);
    config.aging_config()?;
    config.encode_spec()?;

    if !config.config_path.as_os_str().is_empty() {
        println!("# {}", config.config_path.display());
    }
    print!("{}", config.to_toml()?);
    Ok(())
}

fn report(name: &str, encoded: &EncodedImage, budget: usize) {
    if encoded.within_budget {
        info!(
            "{name}: {} bytes, {}x{} {}",
            encoded.data.len(),
            encoded.width,
            encoded.height,
            encoded.format
        );
    } else {
        warn!(
            "{name}: {} bytes exceeds the {budget} byte budget at {}x{}",
            encoded.data.len(),
            encoded.width,
            encoded.height
        );
    }
}

/// `{base}_aged.{ext}`, numbered when two inputs share a base name.
fn unique_name(seen: &mut HashSet<String>, original: &str, extension: &str) -> String {
    let first = aged_file_name(original, extension);
    let stem = first.trim_end_matches(&format!(".{extension}")).to_string();

    let mut name = first;
    let mut counter = 2;
    while !seen.insert(name.clone()) {
        name = format!("{stem}_{counter}.{extension}");
        counter += 1;
    }
    name
}
