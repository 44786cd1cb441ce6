// src/core/fs_ops.rs
//! File system operations on the storage areas

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::app_log;

pub struct FsOps;

impl FsOps {
    pub async fn ensure_dir_exists(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)
                .await
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
            app_log!(info, "Created directory: {}", path.display());
        }
        Ok(())
    }

    pub async fn read_file_safe(path: &Path) -> Result<String> {
        fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read file: {}", path.display()))
    }

    /// Write bytes to a file that must not exist yet. Concurrent writers racing
    /// for the same name get an error instead of clobbering each other.
    pub async fn write_new_file(path: &Path, content: &[u8]) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to create file: {}", path.display()))?;

        file.write_all(content)
            .await
            .with_context(|| format!("Failed to write file: {}", path.display()))?;
        file.flush().await?;

        app_log!(info, "Written file: {} ({} bytes)", path.display(), content.len());
        Ok(())
    }

    /// Append one line to a log-style file, creating it if needed.
    pub async fn append_line(path: &Path, line: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            Self::ensure_dir_exists(parent).await?;
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await
            .with_context(|| format!("Failed to open file for append: {}", path.display()))?;

        let mut entry = line.trim_end_matches('\n').to_string();
        entry.push('\n');
        file.write_all(entry.as_bytes())
            .await
            .with_context(|| format!("Failed to append to file: {}", path.display()))?;
        Ok(())
    }

    /// File stems of every `*.<extension>` file directly inside `dir`, sorted.
    pub async fn list_stems(dir: &Path, extension: &str) -> Result<Vec<String>> {
        let mut stems = Vec::new();

        if !dir.exists() {
            return Ok(stems);
        }

        let mut entries = fs::read_dir(dir)
            .await
            .with_context(|| format!("Failed to read directory: {}", dir.display()))?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.is_file() && Self::get_extension(&path).as_deref() == Some(extension) {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    stems.push(stem.to_string());
                }
            }
        }

        stems.sort();
        Ok(stems)
    }

    pub fn normalize_path(base: &Path, relative: &Path) -> PathBuf {
        if relative.is_absolute() {
            relative.to_path_buf()
        } else {
            base.join(relative)
        }
    }

    pub fn get_extension(path: &Path) -> Option<String> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase())
    }
}
