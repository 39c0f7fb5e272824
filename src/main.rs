use std::path::Path;

use actix_web::{App, HttpServer, middleware, web};

use bookify::config::Config;
use bookify::cors::AllowedOrigins;
use bookify::{cors, db, handlers};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = Config::from_env();

    // SQLite will not create missing parent directories
    if let Some(dir) = sqlite_parent_dir(&config.database_url) {
        std::fs::create_dir_all(dir)?;
    }

    let pool = db::init_pool(&config.database_url)
        .await
        .map_err(std::io::Error::other)?;
    db::run_migrations(&pool)
        .await
        .map_err(std::io::Error::other)?;

    log::info!(
        "Allowing cross-origin requests from: {}",
        config.allowed_origins.join(", ")
    );
    log::info!("Starting server at http://{}", config.bind);

    let allowed_origins = web::Data::new(AllowedOrigins::new(config.allowed_origins.clone()));
    HttpServer::new(move || {
        App::new()
            .wrap(cors::cors(&allowed_origins))
            .wrap(middleware::from_fn(cors::drop_unlisted_origin))
            .wrap(middleware::Logger::default())
            .app_data(allowed_origins.clone())
            .app_data(web::Data::new(pool.clone()))
            .configure(handlers::configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}

fn sqlite_parent_dir(database_url: &str) -> Option<&Path> {
    let path = database_url
        .strip_prefix("sqlite://")
        .or_else(|| database_url.strip_prefix("sqlite:"))?;
    let path = path.split('?').next()?;
    if path.is_empty() || path.starts_with(":memory:") {
        return None;
    }
    Path::new(path).parent().filter(|p| !p.as_os_str().is_empty())
}
