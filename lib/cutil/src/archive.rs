//! Packing encoded outputs into a single compressed `.tar.gz` and restoring them.

use anyhow::{Context, Result, bail};
use flate2::{Compression, read::GzDecoder, write::GzEncoder};
use std::{collections::HashSet, fs, path::Path};
use tar::{Archive, Builder, Header};

/// Derives the output name `{base}_aged.{ext}` from an input file name.
///
/// # Examples
///
/// ```
/// use cutil::archive::aged_file_name;
///
/// assert_eq!(aged_file_name("scan.png", "jpg"), "scan_aged.jpg");
/// assert_eq!(aged_file_name("/tmp/page.01.tiff", "png"), "page.01_aged.png");
/// ```
pub fn aged_file_name(original: &str, extension: &str) -> String {
    let base = Path::new(original)
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .filter(|stem| !stem.is_empty())
        .unwrap_or_else(|| "image".to_string());

    format!("{base}_aged.{extension}")
}

/// Writes every `(name, bytes)` entry as a regular file into a gzip'd tarball.
///
/// Entry names must be unique.
pub fn pack_entries(output: &Path, entries: &[(String, Vec<u8>)]) -> Result<()> {
    let mut seen = HashSet::new();
    for (name, _) in entries {
        if !seen.insert(name.as_str()) {
            bail!("duplicate archive entry: {name}");
        }
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let file = fs::File::create(output)
        .with_context(|| format!("Can't create archive: {}", output.display()))?;
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = Builder::new(encoder);

    for (name, data) in entries {
        let mut header = Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_slice())
            .with_context(|| format!("Can't append {name}"))?;
    }

    builder.into_inner()?.finish()?;
    Ok(())
}

/// Unpacks an archive created by [`pack_entries`] into `target`.
pub fn unpack(input: &Path, target: &Path) -> Result<()> {
    if !input.exists() {
        bail!("Can't find archive file: {}", input.display());
    }

    if !target.exists() {
        fs::create_dir_all(target)?;
    }

    let file = fs::File::open(input)?;
    let mut archive = Archive::new(GzDecoder::new(file));
    archive.unpack(target)?;
    Ok(())
}
