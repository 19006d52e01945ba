use crate::catalog::{CatalogEntry, CatalogStore};
use crate::embed::EmbeddingSource;
use anyhow::{Context, Result};
use log::{info, warn};
use std::path::Path;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp"];

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Label under which an image is stored: the file stem, extension stripped.
pub fn label_for(path: &Path) -> Result<String> {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .with_context(|| format!("no usable file name in {}", path.display()))?;
    Ok(stem.to_string())
}

/// Embeds one image and appends it to the catalog under its stem label.
/// Returns the label, or `None` when no face was detected.
pub fn ingest_image(
    store: &CatalogStore,
    source: &dyn EmbeddingSource,
    image: &Path,
) -> Result<Option<String>> {
    let name = label_for(image)?;
    match source.embed(image)? {
        Some(encoding) => {
            store.append_and_save(CatalogEntry {
                name: name.clone(),
                encoding,
            })?;
            Ok(Some(name))
        }
        None => Ok(None),
    }
}

/// Embeds every image file in `dir` (by extension, sorted by path) and
/// appends each to the catalog. Images without a detectable face are
/// skipped with a warning. Returns the number of entries added.
pub fn ingest_dir(store: &CatalogStore, source: &dyn EmbeddingSource, dir: &Path) -> Result<usize> {
    if !dir.is_dir() {
        anyhow::bail!("{} is not a directory", dir.display());
    }

    let mut images: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("listing {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?
        .into_iter()
        .map(|e| e.path())
        .filter(|p| is_image(p))
        .collect();
    images.sort();

    let mut added = 0;
    for image in &images {
        match ingest_image(store, source, image)? {
            Some(name) => {
                info!("Added encoding for {}", name);
                added += 1;
            }
            None => warn!("No face detected in {}, skipping", image.display()),
        }
    }
    Ok(added)
}
