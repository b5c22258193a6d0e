pub mod handle;
pub mod model;
pub mod repository;
pub mod repository_fs;
pub mod route;
pub mod schema;
pub mod service;
pub mod state;

pub use model::{Code, UploadConfig};
pub use repository_fs::ImageRepositoryFs;
pub use service::ImageService;
