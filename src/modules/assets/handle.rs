use actix_web::{get, http::header, web, HttpResponse};

use crate::api::error;
use crate::modules::image::{repository::ImageRepository, service::ImageService};

const INDEX_HTML: &str = include_str!("../../../public/index.html");

#[get("/")]
pub async fn index() -> HttpResponse {
    HttpResponse::Ok().content_type("text/html; charset=utf-8").body(INDEX_HTML)
}

/// Raw bytes of a stored image, typed by its extension
pub async fn serve_upload<R>(
    filename: web::Path<String>,
    service: web::Data<ImageService<R>>,
) -> Result<HttpResponse, error::Error>
where
    R: ImageRepository + Send + Sync + 'static,
{
    let (bytes, mime_type) = service.open_upload(&filename.into_inner()).await?;
    Ok(HttpResponse::Ok()
        .insert_header(header::ContentType(mime_type))
        .insert_header(header::CacheControl(vec![header::CacheDirective::NoCache]))
        .body(bytes))
}
