use std::path::PathBuf;

use actix_cors::Cors;

use crate::{api::error, modules::image::UploadConfig, ENV};

/// Creates the content directory if needed and returns its path.
pub async fn prepare_upload_dir(dir: &str) -> Result<PathBuf, error::SystemError> {
    let path = PathBuf::from(dir);
    tokio::fs::create_dir_all(&path).await.map_err(error::SystemError::StorageUnavailable)?;
    log::info!("Upload directory ready at {}", path.display());
    Ok(path)
}

pub fn upload_config() -> UploadConfig {
    UploadConfig {
        max_file_size: ENV.max_upload_size,
        upload_dir: ENV.upload_dir.clone(),
        ..UploadConfig::default()
    }
}

/// Permissive unless an origin is configured.
pub fn cors(origin: Option<&str>) -> Cors {
    match origin {
        Some(origin) => Cors::default()
            .allowed_origin(origin)
            .allowed_methods(vec!["GET", "POST"])
            .allow_any_header()
            .max_age(3600),
        None => Cors::permissive(),
    }
}
