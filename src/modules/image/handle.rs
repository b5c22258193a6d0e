use actix_multipart::{Field, Multipart};
use actix_web::web;
use futures_util::TryStreamExt;

use crate::api::{error, success};
use crate::modules::image::{
    model::{is_image_type, CodeStrategy, IncomingImage, UploadForm},
    repository::ImageRepository,
    schema::ImageResponse,
    service::ImageService,
};
use crate::utils::ValidatedCode;

const IMAGE_FIELD: &str = "image";
const CODE_FIELD: &str = "code";
const CODE_FIELD_LIMIT: usize = 64;

/// Reads a field into memory, failing as soon as it grows past `limit`.
async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, error::SystemError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| error::SystemError::bad_request(format!("Failed to read upload: {e}")))?
    {
        if bytes.len() + chunk.len() > limit {
            return Err(error::SystemError::PayloadTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }
    Ok(bytes)
}

/// Collects the `image` file part and the `code` text part of a multipart
/// body. Other parts, and any `image` part after the first, are skipped.
async fn read_upload_form(
    mut payload: Multipart,
    max_file_size: usize,
) -> Result<UploadForm, error::SystemError> {
    let mut form = UploadForm::default();

    while let Some(mut field) = payload
        .try_next()
        .await
        .map_err(|e| error::SystemError::bad_request(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_owned();
        match name.as_str() {
            IMAGE_FIELD if form.image.is_none() => {
                let original_name = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename())
                    .unwrap_or_default()
                    .to_string();

                // Detect MIME type
                let mime_type = field.content_type().map(|m| m.to_string()).unwrap_or_else(|| {
                    mime_guess::from_path(&original_name).first_or_octet_stream().to_string()
                });

                // Non-images are rejected by the service; their bytes are not worth buffering.
                let bytes = if is_image_type(&mime_type) {
                    read_field(&mut field, max_file_size).await?
                } else {
                    Vec::new()
                };

                form.image = Some(IncomingImage { original_name, mime_type, bytes });
            }
            CODE_FIELD => {
                form.code = match read_field(&mut field, CODE_FIELD_LIMIT).await {
                    Ok(bytes) => Some(String::from_utf8_lossy(&bytes).into_owned()),
                    Err(error::SystemError::PayloadTooLarge(_)) => None,
                    Err(e) => return Err(e),
                };
            }
            _ => {}
        }
    }

    Ok(form)
}

/// List every stored image
pub async fn list_images<R>(
    service: web::Data<ImageService<R>>,
) -> Result<success::Success<Vec<ImageResponse>>, error::Error>
where
    R: ImageRepository + Send + Sync + 'static,
{
    let images = service.list_images().await?;
    log::debug!("Listing {} images", images.len());
    Ok(success::Success::ok(images))
}

pub async fn get_image<R>(
    code: ValidatedCode,
    service: web::Data<ImageService<R>>,
) -> Result<success::Success<ImageResponse>, error::Error>
where
    R: ImageRepository + Send + Sync + 'static,
{
    let image = service.get_image(&code.0).await?;
    Ok(success::Success::ok(image))
}

/// Upload with the code taken from the `code` form field
pub async fn upload_image<R>(
    payload: Multipart,
    service: web::Data<ImageService<R>>,
) -> Result<success::Success<ImageResponse>, error::Error>
where
    R: ImageRepository + Send + Sync + 'static,
{
    let form = read_upload_form(payload, service.max_file_size()).await?;
    let image = service.upload_image(form, CodeStrategy::Explicit).await?;
    Ok(success::Success::ok(image))
}

/// Upload under a freshly generated code
pub async fn upload_image_auto<R>(
    payload: Multipart,
    service: web::Data<ImageService<R>>,
) -> Result<success::Success<ImageResponse>, error::Error>
where
    R: ImageRepository + Send + Sync + 'static,
{
    let form = read_upload_form(payload, service.max_file_size()).await?;
    let image = service.upload_image(form, CodeStrategy::Random).await?;
    Ok(success::Success::ok(image))
}
