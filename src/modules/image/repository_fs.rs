use std::io;
use std::path::{Path, PathBuf};

use uuid::Uuid;

use crate::{
    api::error,
    modules::image::{
        model::{Code, StoredImage, UploadConfig, FILE_PREFIX, TEMP_PREFIX},
        repository::ImageRepository,
    },
};

/// Flat content directory. The filesystem listing is the only record of
/// which images exist.
#[derive(Clone)]
pub struct ImageRepositoryFs {
    root: PathBuf,
}

impl ImageRepositoryFs {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Rooted at the configured content directory.
    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(&config.upload_dir)
    }

    /// Names of the regular files in the content directory.
    async fn scan(&self) -> io::Result<Vec<String>> {
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        Ok(names)
    }

    async fn commit(&self, code: &Code, extension: &str, temp: &Path) -> io::Result<StoredImage> {
        for existing in self.scan().await?.into_iter().filter(|name| code.owns(name)) {
            log::info!("Removing previous image {} for code {}", existing, code);
            match tokio::fs::remove_file(self.root.join(&existing)).await {
                Ok(()) => {}
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(e),
            }
        }

        let filename = code.filename(extension);
        tokio::fs::rename(temp, self.root.join(&filename)).await?;
        Ok(StoredImage { code: code.clone(), filename })
    }
}

#[async_trait::async_trait]
impl ImageRepository for ImageRepositoryFs {
    async fn list(&self) -> Result<Vec<StoredImage>, error::SystemError> {
        let names = self.scan().await.map_err(error::SystemError::StorageUnavailable)?;

        let images = names
            .into_iter()
            .filter(|name| name.starts_with(FILE_PREFIX))
            .filter_map(|filename| match Code::from_filename(&filename) {
                Some(code) => Some(StoredImage { code, filename }),
                None => {
                    log::debug!("Skipping {} with no 4-digit code", filename);
                    None
                }
            })
            .collect();
        Ok(images)
    }

    async fn find_by_code(&self, code: &Code) -> Result<Option<StoredImage>, error::SystemError> {
        let names = self.scan().await.map_err(error::SystemError::StorageUnavailable)?;

        Ok(names
            .into_iter()
            .find(|name| code.owns(name))
            .map(|filename| StoredImage { code: code.clone(), filename }))
    }

    async fn replace(
        &self,
        code: &Code,
        extension: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, error::SystemError> {
        let temp = self.root.join(format!("{TEMP_PREFIX}{}{extension}", Uuid::now_v7()));

        let result = match tokio::fs::write(&temp, bytes).await {
            Ok(()) => self.commit(code, extension, &temp).await,
            Err(e) => Err(e),
        };

        if result.is_err() {
            if let Err(e) = tokio::fs::remove_file(&temp).await {
                if e.kind() != io::ErrorKind::NotFound {
                    log::error!("Failed to remove temp file {}: {:?}", temp.display(), e);
                }
            }
        }

        result.map_err(error::SystemError::StorageWriteFailed)
    }

    async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>, error::SystemError> {
        match tokio::fs::read(self.root.join(filename)).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(error::SystemError::StorageUnavailable(e)),
        }
    }
}
