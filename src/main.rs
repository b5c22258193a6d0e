use actix_web::{self, middleware::Logger, web, App, HttpServer};
use std::sync::{Arc, LazyLock};

use crate::modules::image::{ImageRepositoryFs, ImageService};

mod api;
mod configs;
mod constants;
mod modules;
#[cfg(test)]
mod test;
mod utils;

pub static ENV: LazyLock<constants::Env> = LazyLock::new(|| {
    dotenvy::dotenv().ok();
    env_logger::init();
    log::info!("Environment variables loaded from .env file");
    constants::Env::default()
});

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let upload_config = configs::upload_config();
    configs::prepare_upload_dir(&upload_config.upload_dir)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    let image_repo = ImageRepositoryFs::from_config(&upload_config);
    let image_service = ImageService::new(Arc::new(image_repo), upload_config);

    log::info!("Starting server at http://{}:{}", ENV.ip.as_str(), ENV.port);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(configs::cors(ENV.cors_origin.as_deref()))
            .app_data(web::Data::new(image_service.clone()))
            .configure(modules::configure::<ImageRepositoryFs>)
    })
    .bind((ENV.ip.as_str(), ENV.port))?
    .workers(ENV.workers)
    .run()
    .await
}
