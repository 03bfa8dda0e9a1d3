use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs as async_fs;

/// File-backed storage with atomic writes and corrupt-file quarantine,
/// sized for the reference lap store's needs (spec §4.5).
#[derive(Debug, Clone)]
pub struct FileStorage {
    base_dir: PathBuf,
}

impl FileStorage {
    pub async fn new(base_dir: &Path) -> Result<Self> {
        async_fs::create_dir_all(base_dir)
            .await
            .with_context(|| format!("failed to create storage directory: {base_dir:?}"))?;
        Ok(Self {
            base_dir: base_dir.to_path_buf(),
        })
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Write to a temp file, then rename over the target, the target
    /// either has the old content or the new content, never a partial
    /// write (spec §4.5: "writes use write-to-temp + rename").
    pub async fn write_atomic(&self, path: &Path, content: &str) -> Result<()> {
        let temp_path = path.with_extension("tmp");

        async_fs::write(&temp_path, content)
            .await
            .with_context(|| format!("failed to write temp file: {temp_path:?}"))?;

        async_fs::rename(&temp_path, path)
            .await
            .with_context(|| format!("failed to rename temp file to target: {path:?}"))?;

        Ok(())
    }

    /// Reads `path` if present; `None` if it does not exist (spec §4.5:
    /// "reads tolerate missing files").
    pub async fn read_to_string_opt(&self, path: &Path) -> Result<Option<String>> {
        if !path.exists() {
            return Ok(None);
        }
        let content = async_fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read file: {path:?}"))?;
        Ok(Some(content))
    }

    /// Moves a corrupt file aside with a timestamped `.corrupt` suffix so
    /// it can be inspected later, clearing the way for a fresh empty
    /// store at the original path (spec §4.5: "a corrupt file is
    /// quarantined").
    pub async fn quarantine(&self, path: &Path) -> Result<PathBuf> {
        let timestamp = chrono::Utc::now().format("%Y%m%d_%H%M%S");
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("reference");
        let quarantined = self
            .base_dir
            .join("quarantine")
            .join(format!("{file_name}.{timestamp}.corrupt"));

        if let Some(parent) = quarantined.parent() {
            async_fs::create_dir_all(parent)
                .await
                .with_context(|| format!("failed to create quarantine directory: {parent:?}"))?;
        }

        async_fs::rename(path, &quarantined)
            .await
            .with_context(|| format!("failed to quarantine corrupt file: {path:?}"))?;

        Ok(quarantined)
    }

    pub async fn list_json_files(&self) -> Result<Vec<PathBuf>> {
        let mut files = Vec::new();
        let mut entries = async_fs::read_dir(&self.base_dir)
            .await
            .with_context(|| format!("failed to read directory: {:?}", self.base_dir))?;

        while let Some(entry) = entries
            .next_entry()
            .await
            .context("failed to read directory entry")?
        {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) == Some("json") {
                files.push(path);
            }
        }
        Ok(files)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn atomic_write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let path = dir.path().join("monza__bmw_m4_gt3.json");

        storage.write_atomic(&path, "{\"a\":1}").await.unwrap();
        let content = storage.read_to_string_opt(&path).await.unwrap();
        assert_eq!(content, Some("{\"a\":1}".to_string()));
    }

    #[tokio::test]
    async fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let path = dir.path().join("missing.json");
        assert_eq!(storage.read_to_string_opt(&path).await.unwrap(), None);
    }

    #[tokio::test]
    async fn quarantine_moves_file_aside() {
        let dir = tempfile::tempdir().unwrap();
        let storage = FileStorage::new(dir.path()).await.unwrap();
        let path = dir.path().join("corrupt.json");
        storage.write_atomic(&path, "not json").await.unwrap();

        let quarantined = storage.quarantine(&path).await.unwrap();
        assert!(!path.exists());
        assert!(quarantined.exists());
    }
}
