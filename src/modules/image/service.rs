use std::sync::Arc;

use chrono::Utc;
use mime_guess::Mime;
use tokio::sync::OwnedMutexGuard;

use crate::api::error;
use crate::modules::image::{
    model::{
        extension_of, is_image_type, Code, CodeStrategy, IncomingImage, StoredImage, UploadConfig,
        UploadForm, FILE_PREFIX,
    },
    repository::ImageRepository,
    schema::ImageResponse,
    state::{CodeLocks, UploadTimes},
};

/// Random codes drawn before an auto upload gives up on finding a free one.
const AUTO_CODE_ATTEMPTS: usize = 8;

#[derive(Clone)]
pub struct ImageService<R>
where
    R: ImageRepository + Send + Sync,
{
    image_repo: Arc<R>,
    config: UploadConfig,
    upload_times: Arc<UploadTimes>,
    code_locks: Arc<CodeLocks>,
}

impl<R> ImageService<R>
where
    R: ImageRepository + Send + Sync,
{
    pub fn new(image_repo: Arc<R>, config: UploadConfig) -> Self {
        log::info!(
            "ImageService initialized (dir: {}, limit: {} bytes)",
            config.upload_dir,
            config.max_file_size
        );
        Self {
            image_repo,
            config,
            upload_times: Arc::new(UploadTimes::default()),
            code_locks: Arc::new(CodeLocks::default()),
        }
    }

    pub fn max_file_size(&self) -> usize {
        self.config.max_file_size
    }

    fn to_response(&self, stored: StoredImage) -> ImageResponse {
        ImageResponse {
            uploaded_at: self.upload_times.get(&stored.code),
            image_url: format!("{}/{}", self.config.base_url, stored.filename),
            code: stored.code.to_string(),
        }
    }

    /// Validate presence, media type and size of the file part
    fn validate_file<'a>(
        &self,
        image: Option<&'a IncomingImage>,
    ) -> Result<&'a IncomingImage, error::SystemError> {
        let image =
            image.ok_or_else(|| error::SystemError::invalid_file("No image file provided"))?;

        if !is_image_type(&image.mime_type) {
            log::warn!("Rejected upload {} with type {}", image.original_name, image.mime_type);
            return Err(error::SystemError::invalid_file("Only image files are allowed!"));
        }

        if image.bytes.len() > self.config.max_file_size {
            return Err(error::SystemError::PayloadTooLarge(self.config.max_file_size));
        }

        Ok(image)
    }

    /// Draws random codes until one is free, holding its lock on return.
    /// When every draw collides the last code is reused and its image replaced.
    async fn claim_random_code(&self) -> Result<(Code, OwnedMutexGuard<()>), error::SystemError> {
        let mut attempt = 1;
        loop {
            let code = Code::random();
            let guard = self.code_locks.lock(&code).await;
            if self.image_repo.find_by_code(&code).await?.is_none() {
                return Ok((code, guard));
            }
            if attempt == AUTO_CODE_ATTEMPTS {
                log::warn!("No free code after {} draws, overwriting {}", attempt, code);
                return Ok((code, guard));
            }
            log::warn!("Generated code {} is taken, drawing again", code);
            attempt += 1;
        }
    }

    pub async fn list_images(&self) -> Result<Vec<ImageResponse>, error::SystemError> {
        let images = self.image_repo.list().await?;
        Ok(images.into_iter().map(|stored| self.to_response(stored)).collect())
    }

    pub async fn get_image(&self, code: &Code) -> Result<ImageResponse, error::SystemError> {
        let stored = self
            .image_repo
            .find_by_code(code)
            .await?
            .ok_or_else(|| error::SystemError::not_found("Image not found"))?;
        Ok(self.to_response(stored))
    }

    /// Validate the form, then store its file under the chosen code,
    /// replacing any image already stored for that code.
    pub async fn upload_image(
        &self,
        form: UploadForm,
        strategy: CodeStrategy,
    ) -> Result<ImageResponse, error::SystemError> {
        let image = self.validate_file(form.image.as_ref())?;

        let (code, _guard) = match strategy {
            CodeStrategy::Explicit => {
                let code = Code::parse(form.code.as_deref().unwrap_or("")).inspect_err(|_| {
                    log::warn!("Rejected upload with invalid code {:?}", form.code);
                })?;
                let guard = self.code_locks.lock(&code).await;
                (code, guard)
            }
            CodeStrategy::Random => self.claim_random_code().await?,
        };

        let extension = extension_of(&image.original_name);
        let stored = self.image_repo.replace(&code, &extension, &image.bytes).await?;

        let uploaded_at = Utc::now();
        self.upload_times.set(code.clone(), uploaded_at);
        log::info!("Stored {} ({} bytes) for code {}", stored.filename, image.bytes.len(), code);

        Ok(ImageResponse {
            code: code.to_string(),
            image_url: format!("{}/{}", self.config.base_url, stored.filename),
            uploaded_at: Some(uploaded_at),
        })
    }

    /// Raw bytes and content type of a stored image, for direct serving.
    pub async fn open_upload(&self, filename: &str) -> Result<(Vec<u8>, Mime), error::SystemError> {
        if !filename.starts_with(FILE_PREFIX)
            || filename.contains(['/', '\\'])
            || filename.contains("..")
        {
            return Err(error::SystemError::not_found("File not found"));
        }

        let bytes = self
            .image_repo
            .read(filename)
            .await?
            .ok_or_else(|| error::SystemError::not_found("File not found"))?;
        Ok((bytes, mime_guess::from_path(filename).first_or_octet_stream()))
    }
}
