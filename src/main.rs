use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};

use learnloop_server::{
    app_state::AppState,
    config::{Config, StorageBackend},
    handlers::configure_routes,
    middleware::RequestIdMiddleware,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env();
    if config.storage_backend == StorageBackend::Mongo {
        config.validate_for_production();
    }

    let bind_address = (config.web_server_host.clone(), config.web_server_port);
    let state = AppState::new(config)
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;

    log::info!(
        "Starting HTTP server on http://{}:{}",
        bind_address.0,
        bind_address.1
    );

    HttpServer::new(move || {
        App::new()
            .app_data(web::Data::new(state.clone()))
            .wrap(Cors::permissive())
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware)
            .configure(configure_routes)
    })
    .bind(bind_address)?
    .run()
    .await
}
