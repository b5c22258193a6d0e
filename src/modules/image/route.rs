use actix_web::web;

use crate::modules::image::{handle, repository::ImageRepository};

pub fn configure<R>(cfg: &mut web::ServiceConfig)
where
    R: ImageRepository + Send + Sync + 'static,
{
    cfg.service(web::resource("/images").route(web::get().to(handle::list_images::<R>)))
        .service(web::resource("/images/{code}").route(web::get().to(handle::get_image::<R>)))
        .service(web::resource("/upload").route(web::post().to(handle::upload_image::<R>)))
        .service(
            web::resource("/upload/auto").route(web::post().to(handle::upload_image_auto::<R>)),
        );
}
