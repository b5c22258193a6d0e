use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::borrow::Cow;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Payload Too Large: {0}")]
    PayloadTooLarge(Cow<'static, str>),
    #[error("Internal Server Error: {0}")]
    InternalServer(Cow<'static, str>),
}

#[derive(serde::Serialize)]
pub struct ErrorBody {
    pub error: Cow<'static, str>,
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match *self {
            Error::BadRequest(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Error::InternalServer(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let msg = match self {
            Error::BadRequest(msg)
            | Error::NotFound(msg)
            | Error::PayloadTooLarge(msg)
            | Error::InternalServer(msg) => msg.clone(),
        };
        HttpResponse::build(self.status_code()).json(ErrorBody { error: msg })
    }
}

#[derive(thiserror::Error, Debug)]
pub enum SystemError {
    #[error("A valid 4-digit code is required")]
    InvalidCode,
    #[error("Invalid file: {0}")]
    InvalidFile(Cow<'static, str>),
    #[error("File exceeds the {0} byte limit")]
    PayloadTooLarge(usize),
    #[error("Not Found: {0}")]
    NotFound(Cow<'static, str>),
    #[error("Bad Request: {0}")]
    BadRequest(Cow<'static, str>),
    // filesystem errors
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(#[source] std::io::Error),
    #[error("Storage write failed: {0}")]
    StorageWriteFailed(#[source] std::io::Error),
}

impl From<SystemError> for Error {
    fn from(value: SystemError) -> Self {
        match value {
            SystemError::InvalidCode => {
                Error::BadRequest(SystemError::InvalidCode.to_string().into())
            }
            SystemError::InvalidFile(msg) => Error::BadRequest(msg),
            SystemError::BadRequest(msg) => Error::BadRequest(msg),
            SystemError::NotFound(msg) => Error::NotFound(msg),
            SystemError::PayloadTooLarge(limit) => Error::PayloadTooLarge(
                format!("File size exceeds maximum allowed size of {} bytes", limit).into(),
            ),
            SystemError::StorageUnavailable(err) => {
                log::error!("Failed to read images directory: {:?}", err);
                Error::InternalServer("Failed to read images directory".into())
            }
            SystemError::StorageWriteFailed(err) => {
                log::error!("Failed to process the image: {:?}", err);
                Error::InternalServer("Failed to process the image".into())
            }
        }
    }
}

impl SystemError {
    pub fn invalid_file(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::InvalidFile(msg.into())
    }

    pub fn bad_request(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::BadRequest(msg.into())
    }

    pub fn not_found(msg: impl Into<Cow<'static, str>>) -> Self {
        Self::NotFound(msg.into())
    }
}
