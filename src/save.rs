use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::download::{SaveAs, SaveError};

/// Saves downloads into a fixed directory, creating it on first use.
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SaveAs for DirectorySaver {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf, SaveError> {
        // Server-supplied names may carry directory parts; keep only the last one.
        let name = Path::new(filename)
            .file_name()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SaveError::InvalidName(filename.to_string()))?;

        tokio::fs::create_dir_all(&self.dir).await?;
        let path = self.dir.join(name);
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("Wrote {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}
