use std::sync::Arc;

use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpServer};
use chrono::Duration;

use taskkeeper::{
    auth::{AuthMiddleware, CredentialStore, TokenService},
    config::Config,
    db,
    repository::{PgTaskRepository, PgUserRepository},
    routes::{self, health},
    TaskService,
};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::from_env()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;

    let tokens = TokenService::new(
        &config.jwt_secret,
        Duration::minutes(config.access_token_ttl_minutes),
    );
    let credentials = CredentialStore::new(config.bcrypt_cost);

    let service = match &config.database_url {
        Some(url) => {
            let pool = db::connect(url, config.database_max_connections)
                .await
                .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e))?;
            TaskService::new(
                Arc::new(PgUserRepository::new(pool.clone())),
                Arc::new(PgTaskRepository::new(pool)),
                tokens,
                credentials,
            )
        }
        None => {
            log::warn!("DATABASE_URL not set; using in-memory storage, data will not persist");
            TaskService::in_memory(tokens, credentials)
        }
    };
    let service = web::Data::new(service);

    log::info!("Starting taskkeeper server at {}", config.server_url());
    HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .service(
                web::scope("/api")
                    .wrap(AuthMiddleware)
                    .configure(routes::config),
            )
    })
    .bind((config.server_host.as_str(), config.server_port))?
    .run()
    .await
}
