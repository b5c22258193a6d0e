pub mod assets;
pub mod image;

use actix_web::web;

use crate::modules::image::repository::ImageRepository;

/// JSON API under `/api`, plus the landing page and stored files.
pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: ImageRepository + Send + Sync + 'static,
{
    cfg.service(web::scope("/api").configure(image::route::configure::<R>))
        .configure(assets::route::configure::<R>);
}
