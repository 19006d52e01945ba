use crate::embed::Embedding;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One labeled embedding in the catalog.
///
/// The label is the source image's file stem. Labels are not unique;
/// duplicates simply rank as separate candidates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub encoding: Embedding,
}

/// Durable list of labeled embeddings behind a load/append/save contract.
///
/// The backing file is a single JSON array of `{name, encoding}` objects.
/// Every operation does a full load/compute/save cycle; nothing is cached
/// between calls. Append-only: there is no delete or update.
pub struct CatalogStore {
    path: PathBuf,
}

impl CatalogStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the full catalog. An absent or empty file is an empty catalog,
    /// not an error. Malformed content, or entries whose embeddings disagree
    /// on dimensionality, is fatal.
    pub fn load(&self) -> Result<Vec<CatalogEntry>> {
        if !self.path.exists() {
            return Ok(vec![]);
        }
        let data = std::fs::read(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        if data.is_empty() {
            return Ok(vec![]);
        }
        let entries: Vec<CatalogEntry> = serde_json::from_slice(&data)
            .with_context(|| format!("parsing catalog {}", self.path.display()))?;
        check_dimensions(&entries)
            .with_context(|| format!("validating catalog {}", self.path.display()))?;
        Ok(entries)
    }

    /// Writes the full catalog, replacing the file's prior contents.
    pub fn save(&self, entries: &[CatalogEntry]) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec(entries)?;
        std::fs::write(&self.path, data)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }

    /// Loads the current catalog, appends `entry`, and writes everything
    /// back. Not an incremental write, and not coordinated with concurrent
    /// writers.
    pub fn append_and_save(&self, entry: CatalogEntry) -> Result<()> {
        let mut entries = self.load()?;
        entries.push(entry);
        self.save(&entries)
    }
}

fn check_dimensions(entries: &[CatalogEntry]) -> Result<()> {
    let mut dims = entries.iter().map(|e| e.encoding.dim());
    if let Some(first) = dims.next() {
        if let Some(bad) = dims.find(|&d| d != first) {
            anyhow::bail!("mixed embedding dimensionalities ({} vs {})", first, bad);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, encoding: Vec<f32>) -> CatalogEntry {
        CatalogEntry {
            name: name.to_string(),
            encoding: Embedding(encoding),
        }
    }

    #[test]
    fn absent_file_loads_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CatalogStore::new(dir.path().join("catalog.json"));
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn empty_file_loads_empty() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, b"")?;
        let store = CatalogStore::new(path);
        assert!(store.load()?.is_empty());
        Ok(())
    }

    #[test]
    fn appends_are_cumulative_and_ordered() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CatalogStore::new(dir.path().join("catalog.json"));
        store.append_and_save(entry("alice", vec![0.0, 0.0]))?;
        store.append_and_save(entry("bob", vec![3.0, 4.0]))?;

        let entries = store.load()?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].name, "alice");
        assert_eq!(entries[1].name, "bob");
        assert_eq!(entries[1].encoding, Embedding(vec![3.0, 4.0]));
        Ok(())
    }

    #[test]
    fn save_then_load_round_trips() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let store = CatalogStore::new(dir.path().join("catalog.json"));
        let entries = vec![
            entry("carol", vec![1.0, 2.0, 3.0]),
            entry("carol", vec![1.5, 2.5, 3.5]),
            entry("dave", vec![-1.0, 0.0, 1.0]),
        ];
        store.save(&entries)?;
        assert_eq!(store.load()?, entries);
        Ok(())
    }

    #[test]
    fn wire_format_uses_name_and_encoding_fields() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, br#"[{"name":"alice","encoding":[0.0,0.0]}]"#)?;
        let store = CatalogStore::new(path);
        let entries = store.load()?;
        assert_eq!(entries, vec![entry("alice", vec![0.0, 0.0])]);
        Ok(())
    }

    #[test]
    fn malformed_json_is_fatal() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(&path, b"{ this is not a catalog")?;
        let store = CatalogStore::new(path);
        assert!(store.load().is_err());
        Ok(())
    }

    #[test]
    fn mixed_dimensionalities_are_rejected() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            br#"[{"name":"a","encoding":[1.0,2.0]},{"name":"b","encoding":[1.0]}]"#,
        )?;
        let store = CatalogStore::new(path);
        assert!(store.load().is_err());
        Ok(())
    }
}
