use std::io;

use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{web, App, HttpServer};
use tracing_subscriber::EnvFilter;

mod data;
mod utils;

use data::database::Database;
use utils::config::Settings;

#[actix_web::main]
async fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = Settings::from_env().map_err(|e| {
        tracing::error!(error = %e, "invalid configuration");
        io::Error::new(io::ErrorKind::InvalidInput, e)
    })?;

    let db = Database::new(&settings.database_path);
    db.migrate().map_err(|e| {
        tracing::error!(error = %e, "failed to prepare database");
        io::Error::other(e)
    })?;

    let bind = (settings.bind_host.clone(), settings.bind_port);
    tracing::info!(host = %bind.0, port = bind.1, "starting job board API");

    let db = web::Data::new(db);
    let settings = web::Data::new(settings);

    HttpServer::new(move || {
        let cors = match &settings.cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allow_any_method()
                .allow_any_header(),
            None => Cors::permissive(),
        };

        App::new()
            .wrap(cors)
            .wrap(Logger::default())
            .app_data(db.clone())
            .app_data(settings.clone())
            .configure(utils::routes::configure)
    })
    .bind(bind)?
    .run()
    .await
}
