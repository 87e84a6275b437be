use actix_web::{middleware::Logger, App, HttpServer};
use log::info;
use nextflix::config::Config;
use nextflix::database::seed_demo;
use nextflix::handlers::{configure, Settings};
use nextflix::identity_service;
use std::io;

fn startup_error<E: std::fmt::Display>(err: E) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

#[actix_rt::main]
async fn main() -> io::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("nextflix=debug,actix_web=info"),
    )
    .init();

    let config = Config::load().map_err(startup_error)?;
    let tera = tera::Tera::new(&config.templates).map_err(startup_error)?;
    let db = config.open_db().map_err(startup_error)?;
    if config.seed_demo {
        let admin_hash =
            bcrypt::hash("password", config.bcrypt_cost).map_err(startup_error)?;
        if seed_demo(&db, admin_hash).map_err(startup_error)? {
            info!("Seeded demo catalogue, sign in as admin/password");
        }
    }

    let settings = Settings {
        bcrypt_cost: config.bcrypt_cost,
    };
    let cookie_key = config.cookie_key.clone();
    let secure_cookies = config.secure_cookies;
    info!("Listening on {}", config.bind);
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(identity_service(&cookie_key, secure_cookies))
            .data(tera.clone())
            .data(db.clone())
            .data(settings)
            .configure(configure)
    })
    .bind(&config.bind)?
    .run()
    .await
}
