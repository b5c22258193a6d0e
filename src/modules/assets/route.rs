use actix_web::web;

use crate::modules::{assets::handle, image::repository::ImageRepository};

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: ImageRepository + Send + Sync + 'static,
{
    cfg.service(handle::index).service(
        web::resource("/uploads/{filename}").route(web::get().to(handle::serve_upload::<R>)),
    );
}
