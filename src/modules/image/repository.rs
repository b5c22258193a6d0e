use crate::{
    api::error,
    modules::image::model::{Code, StoredImage},
};

#[async_trait::async_trait]
pub trait ImageRepository {
    /// Every stored image, in whatever order the backing store yields them.
    async fn list(&self) -> Result<Vec<StoredImage>, error::SystemError>;

    async fn find_by_code(&self, code: &Code) -> Result<Option<StoredImage>, error::SystemError>;

    /// Stores `bytes` as the single image for `code`, removing whatever was
    /// stored for it before.
    async fn replace(
        &self,
        code: &Code,
        extension: &str,
        bytes: &[u8],
    ) -> Result<StoredImage, error::SystemError>;

    async fn read(&self, filename: &str) -> Result<Option<Vec<u8>>, error::SystemError>;
}
