use std::time::Duration;

use actix_web::{App, HttpServer, middleware, web};

use roadfix::auth::rate_limit::LoginLimiter;
use roadfix::auth::token::TokenKeys;
use roadfix::config::AppConfig;
use roadfix::db;
use roadfix::handlers;
use roadfix::media::MediaClient;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env().map_err(std::io::Error::other)?;
    log::debug!("Loaded {:?}", config);

    // Initialize database
    let pool = db::init_pool(&config).await.map_err(std::io::Error::other)?;
    db::run_migrations(&pool).await.map_err(std::io::Error::other)?;

    // Admin and mayor accounts come from configuration
    db::seed_staff(&pool, &config).await.map_err(std::io::Error::other)?;

    // Revocations only matter until the token would have expired anyway
    db::spawn_token_cleanup(pool.clone(), Duration::from_secs(60 * 60));

    let keys = web::Data::new(TokenKeys::new(&config.jwt_secret, config.token_ttl_secs));
    let limiter = web::Data::new(LoginLimiter::default());
    let media = web::Data::new(MediaClient::new(config.media.clone()).map_err(std::io::Error::other)?);
    if !media.is_configured() {
        log::warn!("MEDIA_UPLOAD_URL not set - requests with images will fail");
    }

    log::info!("Starting server at http://{}", config.bind_addr);

    HttpServer::new(move || {
        App::new()
            .wrap(middleware::Logger::default())
            .app_data(web::Data::new(pool.clone()))
            .app_data(keys.clone())
            .app_data(limiter.clone())
            .app_data(media.clone())
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(handlers::not_found))
    })
    .bind(&config.bind_addr)?
    .run()
    .await
}
