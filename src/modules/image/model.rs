use std::fmt;
use std::path::Path;

use rand::Rng;

use crate::api::error;
use crate::constants::DEFAULT_MAX_UPLOAD_SIZE;

pub const FILE_PREFIX: &str = "image-";
pub const TEMP_PREFIX: &str = "temp-";

/// A 4-character decimal-digit string. Kept as text so leading zeros survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Code(String);

impl Code {
    pub const LEN: usize = 4;

    pub fn parse(raw: &str) -> Result<Self, error::SystemError> {
        if raw.len() == Self::LEN && raw.bytes().all(|b| b.is_ascii_digit()) {
            Ok(Code(raw.to_string()))
        } else {
            Err(error::SystemError::InvalidCode)
        }
    }

    /// Uniform draw from 1000..=9999.
    pub fn random() -> Self {
        let n: u16 = rand::thread_rng().gen_range(1000..=9999);
        Code(n.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `image-<code><ext>`, where `ext` is either empty or starts with a dot.
    pub fn filename(&self, extension: &str) -> String {
        format!("{FILE_PREFIX}{}{extension}", self.0)
    }

    /// Recovers the code from a stored filename: the four characters after
    /// the first `-`.
    pub fn from_filename(filename: &str) -> Option<Self> {
        let rest = filename.strip_prefix(FILE_PREFIX)?;
        Self::parse(rest.get(..Self::LEN)?).ok()
    }

    /// True when `filename` is the stored file for this code, with or
    /// without an extension.
    pub fn owns(&self, filename: &str) -> bool {
        match filename.strip_prefix(FILE_PREFIX).and_then(|r| r.strip_prefix(self.as_str())) {
            Some(rest) => rest.is_empty() || rest.starts_with('.'),
            None => false,
        }
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Extension of the client's original filename, dot included, or empty.
/// Anything but ASCII alphanumerics is dropped.
pub fn extension_of(original_name: &str) -> String {
    match Path::new(original_name).extension().and_then(|ext| ext.to_str()) {
        Some(ext) if !ext.is_empty() && ext.bytes().all(|b| b.is_ascii_alphanumeric()) => {
            format!(".{ext}")
        }
        _ => String::new(),
    }
}

/// True for any `image/*` media type.
pub fn is_image_type(mime_type: &str) -> bool {
    mime_type
        .parse::<mime_guess::Mime>()
        .map(|m| m.type_() == mime_guess::mime::IMAGE)
        .unwrap_or(false)
}

/// File upload configuration
#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub max_file_size: usize,
    pub upload_dir: String,
    pub base_url: String,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_UPLOAD_SIZE,
            upload_dir: "./uploads".to_string(),
            base_url: "/uploads".to_string(),
        }
    }
}

/// File part of a multipart upload, fully buffered.
#[derive(Debug, Clone)]
pub struct IncomingImage {
    pub original_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Default)]
pub struct UploadForm {
    pub image: Option<IncomingImage>,
    pub code: Option<String>,
}

/// How the upload pipeline picks the code for a new image.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeStrategy {
    /// Use the `code` form field.
    Explicit,
    /// Draw a random code, resampling while it is taken.
    Random,
}

/// A file present in the content directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub code: Code,
    pub filename: String,
}
