//! Single-file staging area: selection is separate from commit.

use std::path::{Path, PathBuf};

use anyhow::Context;
use tracing::debug;

use crate::error::ControllerError;

pub const DEFAULT_MAX_FILE_SIZE: u64 = 2048 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileSource {
    Bytes(Vec<u8>),
    Path(PathBuf),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    file_name: String,
    size: u64,
    source: FileSource,
}

impl StagedFile {
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            size: bytes.len() as u64,
            source: FileSource::Bytes(bytes),
        }
    }

    pub async fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if !metadata.is_file() {
            anyhow::bail!("{} is not a regular file", path.display());
        }
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video".to_string());
        Ok(Self {
            file_name,
            size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn source(&self) -> &FileSource {
        &self.source
    }
}

#[derive(Debug)]
pub struct StagingArea {
    max_file_size: u64,
    staged: Option<StagedFile>,
}

impl StagingArea {
    pub fn new(max_file_size: u64) -> Self {
        Self {
            max_file_size,
            staged: None,
        }
    }

    /// Stages `file`, replacing whatever was staged before.
    pub fn stage(&mut self, file: StagedFile) -> Result<Option<StagedFile>, ControllerError> {
        if file.size > self.max_file_size {
            return Err(ControllerError::FileTooLarge {
                file_name: file.file_name,
                size: file.size,
                limit: self.max_file_size,
            });
        }
        debug!(file_name = %file.file_name, size = file.size, "staged file");
        Ok(self.staged.replace(file))
    }

    pub fn take(&mut self) -> Option<StagedFile> {
        self.staged.take()
    }

    /// Puts a file back after a failed transfer unless something newer was staged.
    pub fn restore(&mut self, file: StagedFile) {
        if self.staged.is_none() {
            self.staged = Some(file);
        }
    }

    pub fn staged(&self) -> Option<&StagedFile> {
        self.staged.as_ref()
    }
}
