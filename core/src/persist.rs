use anyhow::{Context, Result};
use std::fs::{self, create_dir_all};
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

use crate::index::StopWords;

/// Write the artifact through a temporary file in the same directory, then rename it into
/// place. A failed run never leaves a partial artifact at `path`.
pub fn write_artifact(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).with_context(|| format!("writing {}", path.display()))?;
    Ok(())
}

pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("reading {}", path.display()))
}

/// Load a stop-word list that must exist.
pub fn load_stop_words(path: &Path) -> Result<StopWords> {
    let text = fs::read_to_string(path).with_context(|| format!("reading stop words from {}", path.display()))?;
    let words = StopWords::parse(&text);
    tracing::info!(count = words.len(), path = %path.display(), "loaded stop words");
    Ok(words)
}

/// Load a stop-word list if the file exists; otherwise nothing is filtered as a stop word.
pub fn load_optional_stop_words(path: &Path) -> Result<StopWords> {
    if path.exists() {
        load_stop_words(path)
    } else {
        tracing::debug!(path = %path.display(), "no stop word file");
        Ok(StopWords::empty())
    }
}
