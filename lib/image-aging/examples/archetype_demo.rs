use anyhow::Result;
use image_aging::MarkArchetype;
use rand::{SeedableRng, rngs::StdRng};
use std::{fs, path::PathBuf};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let output_dir = PathBuf::from("./output/masks");
    fs::create_dir_all(&output_dir)?;

    let mut rng = StdRng::seed_from_u64(1);
    let page = (600, 400);

    for archetype in MarkArchetype::all() {
        let size = archetype.draw_size(&mut rng, page.0.min(page.1));
        let mask = archetype.generate(&mut rng, size, page);
        let output_path = output_dir.join(format!("{}.png", archetype.name()));
        mask.save(&output_path)?;
        log::info!("{} size={size} mask={:?}", archetype.name(), mask.dimensions());
    }

    Ok(())
}
